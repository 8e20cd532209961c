//! Canonical bone order and the bone table

use glam::{Mat4, Vec3};

use super::constants::{BONE_POSITION_W, RECORD_SIZE};
use super::section::Section;
use crate::error::{Error, Result};
use crate::formats::mesh::skeleton::root_correction;
use crate::scene::SceneBone;

/// Bones sorted by name, with the source-to-canonical index map.
pub struct CanonicalSkeleton {
    /// Object-space transform per canonical bone, as given.
    pub worlds: Vec<Mat4>,
    /// Transforms a reader rebuilds from the written table. Vertices are
    /// stored relative to these.
    pub binds: Vec<Mat4>,
    /// Canonical parent per canonical bone, `-1` for roots.
    pub parents: Vec<i32>,
    /// Canonical index of each source bone.
    remap: Vec<usize>,
}

impl CanonicalSkeleton {
    /// Sort bones by name (stable) and remap parents.
    ///
    /// Parents must still precede their children afterwards, otherwise the
    /// written table could not be read back.
    pub fn from_scene(bones: &[SceneBone]) -> Result<Self> {
        let mut order: Vec<usize> = (0..bones.len()).collect();
        order.sort_by(|&a, &b| bones[a].name.cmp(&bones[b].name));

        let mut remap = vec![0usize; bones.len()];
        for (canonical, &source) in order.iter().enumerate() {
            remap[source] = canonical;
        }

        let mut parents = Vec::with_capacity(bones.len());
        for (canonical, &source) in order.iter().enumerate() {
            let bone = &bones[source];
            let parent = match bone.parent_index {
                -1 => -1,
                p if p >= 0 && (p as usize) < bones.len() => remap[p as usize] as i32,
                p => {
                    return Err(Error::model(format!(
                        "bone '{}' has parent index {p}, skeleton has {} bones",
                        bone.name,
                        bones.len()
                    )));
                }
            };
            if parent >= canonical as i32 {
                return Err(Error::model(format!(
                    "bone '{}' sorts before its parent; rename bones so parents sort first",
                    bone.name
                )));
            }
            parents.push(parent);
        }

        let mut skeleton = Self {
            worlds: order.iter().map(|&s| bones[s].world_matrix()).collect(),
            binds: Vec::with_capacity(bones.len()),
            parents,
            remap,
        };
        for index in 0..skeleton.len() {
            let local = Mat4::from_translation(skeleton.local_translation(index));
            let bind = match skeleton.parents[index] {
                -1 => local,
                parent => skeleton.binds[parent as usize] * local,
            };
            skeleton
                .binds
                .push(if index == 0 { root_correction() * bind } else { bind });
        }
        Ok(skeleton)
    }

    pub fn len(&self) -> usize {
        self.worlds.len()
    }

    /// Canonical index of source bone `source`.
    pub fn remap(&self, source: u32) -> Result<usize> {
        self.remap
            .get(source as usize)
            .copied()
            .ok_or_else(|| Error::model(format!("vertex weight names bone {source}, skeleton has {} bones", self.len())))
    }

    /// Translation of canonical bone `child` in the space of `parent`.
    ///
    /// Uses the full source worlds, so rotations in the input skeleton shape
    /// VirtSegment offsets even though vertices bind to translation-only
    /// matrices. Re-exporting an imported rotated skeleton therefore shifts
    /// the offsets.
    pub fn relative_translation(&self, child: usize, parent: usize) -> Vec3 {
        (self.worlds[parent].inverse() * self.worlds[child]).w_axis.truncate()
    }

    /// Reference frame for VirtSegment offsets: the parent of `bone`.
    ///
    /// Roots fall back to the last bone of the table.
    pub fn reference_frame(&self, bone: usize) -> usize {
        match self.parents[bone] {
            -1 => self.len() - 1,
            parent => parent as usize,
        }
    }

    /// Position of canonical bone `index` as stored in its record.
    fn local_translation(&self, index: usize) -> Vec3 {
        match self.parents[index] {
            -1 if index == 0 => (root_correction().inverse() * self.worlds[0]).w_axis.truncate(),
            -1 => self.worlds[index].w_axis.truncate(),
            parent => self.relative_translation(index, parent as usize),
        }
    }

    /// Write one record per bone; bounds, flags and HInfo are zeroed.
    pub fn write(&self, section: &mut Section) {
        for index in 0..self.len() {
            let start = section.len();
            section.write_zeros(32);
            let t = self.local_translation(index);
            section.write_f32(t.x);
            section.write_f32(t.y);
            section.write_f32(t.z);
            section.write_u32(BONE_POSITION_W);
            section.write_u32(0);
            section.write_i16(0);
            section.write_i16(-1);
            section.write_i32(self.parents[index]);
            section.write_u32(0);
            debug_assert_eq!(section.len() - start, RECORD_SIZE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bone(name: &str, parent: i32, at: [f32; 3]) -> SceneBone {
        SceneBone {
            name: name.to_string(),
            parent_index: parent,
            world: Mat4::from_translation(Vec3::from_array(at)).to_cols_array_2d(),
        }
    }

    #[test]
    fn test_bones_sorted_by_name() {
        let bones = vec![
            bone("b_root", -1, [0.0; 3]),
            bone("c_leaf", 0, [1.0, 2.0, 3.0]),
            bone("a_root", -1, [5.0, 0.0, 0.0]),
        ];
        let skeleton = CanonicalSkeleton::from_scene(&bones).unwrap();
        assert_eq!(skeleton.remap(0).unwrap(), 1);
        assert_eq!(skeleton.remap(1).unwrap(), 2);
        assert_eq!(skeleton.remap(2).unwrap(), 0);
        assert_eq!(skeleton.parents, vec![-1, -1, 1]);
        assert_eq!(skeleton.local_translation(2), Vec3::new(1.0, 2.0, 3.0));
        // Canonical bone 0 is read back with the root correction applied.
        assert!(skeleton.binds[0].abs_diff_eq(root_correction() * Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)), 1e-5));
        assert!(skeleton.remap(3).is_err());
    }

    #[test]
    fn test_child_sorting_before_parent_rejected() {
        let bones = vec![bone("z", -1, [0.0; 3]), bone("a", 0, [0.0; 3])];
        assert!(matches!(
            CanonicalSkeleton::from_scene(&bones),
            Err(Error::InvalidModel { .. })
        ));
    }

    #[test]
    fn test_root_correction_removed() {
        let world = root_correction() * Mat4::from_translation(Vec3::new(0.0, 4.0, 0.0));
        let bones = vec![SceneBone {
            name: "bone000".to_string(),
            parent_index: -1,
            world: world.to_cols_array_2d(),
        }];
        let skeleton = CanonicalSkeleton::from_scene(&bones).unwrap();
        let t = skeleton.local_translation(0);
        assert!((t - Vec3::new(0.0, 4.0, 0.0)).length() < 1e-5);
        assert!(skeleton.binds[0].abs_diff_eq(world, 1e-5));
    }

    #[test]
    fn test_bone_record_layout() {
        let bones = vec![bone("bone000", -1, [0.0; 3]), bone("bone001", 0, [0.0; 3])];
        let skeleton = CanonicalSkeleton::from_scene(&bones).unwrap();
        let mut section = Section::new();
        skeleton.write(&mut section);
        assert_eq!(section.len(), 2 * RECORD_SIZE);
        let record = &section.data[RECORD_SIZE..];
        assert_eq!(&record[0x2C..0x30], &BONE_POSITION_W.to_le_bytes());
        assert_eq!(&record[0x36..0x38], &(-1i16).to_le_bytes());
        assert_eq!(&record[0x38..0x3C], &0u32.to_le_bytes());
        assert_eq!(&section.data[0x38..0x3C], &u32::MAX.to_le_bytes());
    }
}
