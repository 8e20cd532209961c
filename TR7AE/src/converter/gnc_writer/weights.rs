//! One VirtSegment per exported vertex
//!
//! Every vertex gets its own segment record, even when bound to a single
//! bone, so vertex `i` always points at segment `bone_count + i`.

use glam::Vec3;

use super::constants::{MAX_INFLUENCES, RECORD_SIZE, VIRT_SEGMENT_FLAGS};
use super::section::Section;
use super::skeleton::CanonicalSkeleton;
use crate::error::{Error, Result};
use crate::scene::VertexWeights;

/// Skinning record of one vertex, in canonical bone indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtSegment {
    /// `None` for single-bone vertices (written as four zeros).
    pub offset: Option<Vec3>,
    pub index: u16,
    pub weight_index: u16,
    /// Weight of `weight_index`; `index` takes the rest.
    pub weight: f32,
    /// Bone whose space the stored position is expressed in (`index`).
    pub bind_bone: usize,
}

impl VirtSegment {
    /// Resolve up to two influences.
    ///
    /// With two, the higher source index becomes `index` and the lower one
    /// `weight_index`, carrying its own weight.
    pub fn resolve(influences: &VertexWeights, skeleton: &CanonicalSkeleton) -> Result<Self> {
        if influences.bones.len() != influences.weights.len() {
            return Err(Error::model(format!(
                "vertex has {} bone indices but {} weights",
                influences.bones.len(),
                influences.weights.len()
            )));
        }
        if influences.bones.len() > MAX_INFLUENCES {
            return Err(Error::ExportLimitExceeded {
                limit: "bone influences per vertex",
                actual: influences.bones.len(),
                max: MAX_INFLUENCES,
            });
        }

        match (influences.bones.as_slice(), influences.weights.as_slice()) {
            ([], _) => Err(Error::model("vertex has no bone influence")),
            ([a, b], [wa, wb]) if a != b => {
                let (high, low, low_weight) = if a > b { (*a, *b, *wb) } else { (*b, *a, *wa) };
                let index = skeleton.remap(high)?;
                let weight_index = skeleton.remap(low)?;
                let frame = skeleton.reference_frame(weight_index);
                let offset = skeleton.relative_translation(index, frame)
                    - skeleton.relative_translation(weight_index, frame);
                Ok(Self {
                    offset: Some(offset),
                    index: index as u16,
                    weight_index: weight_index as u16,
                    weight: low_weight,
                    bind_bone: index,
                })
            }
            (bones, weights) => {
                let bone = skeleton.remap(bones[0])?;
                Ok(Self {
                    offset: None,
                    index: bone as u16,
                    weight_index: bone as u16,
                    weight: weights.iter().sum(),
                    bind_bone: bone,
                })
            }
        }
    }

    /// Append the 0x40-byte record for global vertex `vertex`.
    pub fn write(&self, section: &mut Section, vertex: usize) {
        let start = section.len();
        section.write_zeros(32);
        match self.offset {
            Some(offset) => {
                section.write_f32(offset.x);
                section.write_f32(offset.y);
                section.write_f32(offset.z);
                section.write_f32(1.0);
            }
            None => section.write_zeros(16),
        }
        section.write_i32(VIRT_SEGMENT_FLAGS);
        section.write_i16(vertex as i16);
        section.write_i16(vertex as i16);
        section.write_u16(self.index);
        section.write_u16(self.weight_index);
        section.write_f32(self.weight);
        debug_assert_eq!(section.len() - start, RECORD_SIZE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneBone;
    use glam::Mat4;

    fn skeleton() -> CanonicalSkeleton {
        let bone = |name: &str, parent: i32, x: f32| SceneBone {
            name: name.to_string(),
            parent_index: parent,
            world: Mat4::from_translation(Vec3::new(x, 0.0, 0.0)).to_cols_array_2d(),
        };
        CanonicalSkeleton::from_scene(&[bone("b0", -1, 0.0), bone("b1", 0, 2.0), bone("b2", 1, 5.0)])
            .unwrap()
    }

    fn weights(bones: &[u32], weights: &[f32]) -> VertexWeights {
        VertexWeights {
            bones: bones.to_vec(),
            weights: weights.to_vec(),
        }
    }

    #[test]
    fn test_single_influence() {
        let segment = VirtSegment::resolve(&weights(&[1], &[1.0]), &skeleton()).unwrap();
        assert_eq!(segment.offset, None);
        assert_eq!((segment.index, segment.weight_index), (1, 1));
        assert_eq!(segment.weight, 1.0);
        assert_eq!(segment.bind_bone, 1);
    }

    #[test]
    fn test_two_influences_order_by_source_index() {
        let segment = VirtSegment::resolve(&weights(&[1, 2], &[0.25, 0.75]), &skeleton()).unwrap();
        assert_eq!((segment.index, segment.weight_index), (2, 1));
        assert_eq!(segment.weight, 0.25);
        assert_eq!(segment.bind_bone, 2);
        // b2 and b1 relative to b0 (parent of b1): 5 - 2.
        let offset = segment.offset.unwrap();
        assert!((offset - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-5);

        let swapped = VirtSegment::resolve(&weights(&[2, 1], &[0.75, 0.25]), &skeleton()).unwrap();
        assert_eq!((swapped.index, swapped.weight_index, swapped.weight), (2, 1, 0.25));
        assert_eq!(swapped.bind_bone, 2);
    }

    #[test]
    fn test_duplicate_bone_collapses() {
        let segment = VirtSegment::resolve(&weights(&[2, 2], &[0.5, 0.5]), &skeleton()).unwrap();
        assert_eq!(segment.offset, None);
        assert_eq!(segment.weight, 1.0);
    }

    #[test]
    fn test_three_influences_rejected() {
        let err = VirtSegment::resolve(&weights(&[0, 1, 2], &[0.2, 0.3, 0.5]), &skeleton()).unwrap_err();
        assert!(matches!(err, Error::ExportLimitExceeded { actual: 3, max: 2, .. }));
    }

    #[test]
    fn test_missing_influence_rejected() {
        assert!(VirtSegment::resolve(&weights(&[], &[]), &skeleton()).is_err());
        assert!(VirtSegment::resolve(&weights(&[0], &[]), &skeleton()).is_err());
        assert!(VirtSegment::resolve(&weights(&[9], &[1.0]), &skeleton()).is_err());
    }

    #[test]
    fn test_record_layout() {
        let segment = VirtSegment::resolve(&weights(&[0, 1], &[0.5, 0.5]), &skeleton()).unwrap();
        let mut section = Section::new();
        segment.write(&mut section, 7);
        let d = &section.data;
        assert_eq!(d.len(), RECORD_SIZE);
        assert_eq!(&d[0x2C..0x30], &1.0f32.to_le_bytes());
        assert_eq!(&d[0x30..0x34], &8i32.to_le_bytes());
        assert_eq!(&d[0x34..0x38], &[7, 0, 7, 0]);
        assert_eq!(&d[0x38..0x3C], &[1, 0, 0, 0]);
        assert_eq!(&d[0x3C..0x40], &0.5f32.to_le_bytes());
    }
}
