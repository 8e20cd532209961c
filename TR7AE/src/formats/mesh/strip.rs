//! Submesh draw-record chain
//!
//! Draw record (relative to the record start):
//!
//! | Offset | Field |
//! |--------|-------|
//! | 0x00 | `u16` index count (0 terminates the chain) |
//! | 0x02 | `u16` draw group |
//! | 0x04 | `u32` material key |
//! | 0x08 | `f32` sort push |
//! | 0x0C | `f32` scroll offset |
//! | 0x10 | `u32` next record, relative to the model base |
//! | 0x14 | `u16` indices |

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::formats::common::LeView;

pub const DRAW_RECORD_HEADER_SIZE: usize = 0x14;

/// Offset of the next-record slot inside a draw record.
pub const NEXT_RECORD_SLOT: usize = 0x10;

/// The 32-bit material word of a draw record.
///
/// Legend reads the low 13 bits as a texture page; Anniversary reads the
/// same word as `texture_id: u8, blend: u8, properties: u16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialKey(pub u32);

impl MaterialKey {
    /// Texture page (low 13 bits of the low half).
    pub fn texture_page(self) -> u16 {
        (self.0 & 0x1FFF) as u16
    }

    /// Whole word as the signed page id used in submesh names.
    pub fn tpage_id(self) -> i32 {
        self.0 as i32
    }

    pub fn texture_id(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    pub fn blend(self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    pub fn properties(self) -> u16 {
        (self.0 >> 16) as u16
    }

    pub fn is_double_sided(self) -> bool {
        self.properties() & 1 != 0
    }
}

/// Header fields of one draw record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawRecord {
    /// Number of `u16` indices that follow the header.
    pub face_count: u16,
    pub draw_group: u16,
    pub material_key: MaterialKey,
    pub sort_push: f32,
    pub scroll_offset: f32,
    /// Next record, relative to the model base.
    pub next_offset: u32,
}

/// One material-homogeneous triangle list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submesh {
    pub name: String,
    pub material: String,
    pub indices: Vec<u16>,
    /// Present for skinned models, absent for level geometry.
    pub record: Option<DrawRecord>,
}

/// Submesh name carrying the page id and draw group for re-export.
pub fn submesh_name(index: usize, record: &DrawRecord) -> String {
    format!(
        "Mesh_{index}_tpageid_{}_dg_{}",
        record.material_key.tpage_id(),
        record.draw_group
    )
}

/// Walk the draw-record chain starting at `base + face_offset`.
///
/// Stops at the first zero-count record. Revisiting a record is reported as
/// a malformed chain.
pub fn decode_strips(view: &LeView<'_>, base: usize, face_offset: u32) -> Result<Vec<Submesh>> {
    let mut submeshes = Vec::new();
    let mut visited = HashSet::new();
    let mut at = base + face_offset as usize;

    loop {
        if !visited.insert(at) {
            return Err(Error::malformed(format!(
                "draw record chain loops back to {at:#x}"
            )));
        }

        let face_count = view.u16_at(at)?;
        if face_count == 0 {
            break;
        }

        let record = DrawRecord {
            face_count,
            draw_group: view.u16_at(at + 2)?,
            material_key: MaterialKey(view.u32_at(at + 4)?),
            sort_push: view.f32_at(at + 8)?,
            scroll_offset: view.f32_at(at + 12)?,
            next_offset: view.u32_at(at + NEXT_RECORD_SLOT)?,
        };
        let raw = view.bytes(at + DRAW_RECORD_HEADER_SIZE, usize::from(face_count) * 2)?;
        let indices = raw
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();

        submeshes.push(Submesh {
            name: submesh_name(submeshes.len(), &record),
            material: format!("Material_{}", record.material_key.texture_page()),
            indices,
            record: Some(record),
        });
        at = base + record.next_offset as usize;
    }

    debug!("decoded {} submeshes", submeshes.len());
    Ok(submeshes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(count: u16, group: u16, key: u32, next: u32, indices: &[u16]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&group.to_le_bytes());
        out.extend_from_slice(&key.to_le_bytes());
        out.extend_from_slice(&0f32.to_le_bytes());
        out.extend_from_slice(&0f32.to_le_bytes());
        out.extend_from_slice(&next.to_le_bytes());
        for i in indices {
            out.extend_from_slice(&i.to_le_bytes());
        }
        out
    }

    #[test]
    fn test_material_key_views() {
        let key = MaterialKey(0x0001_2345);
        assert_eq!(key.texture_page(), 0x0345);
        assert_eq!(key.texture_id(), 0x45);
        assert_eq!(key.blend(), 0x23);
        assert_eq!(key.properties(), 1);
        assert!(key.is_double_sided());
        assert_eq!(MaterialKey(0xFFFF_FFFF).tpage_id(), -1);
    }

    #[test]
    fn test_chain_terminates_on_zero_count() {
        let first = record(3, 2, 17, 0x1A, &[0, 1, 2]);
        assert_eq!(first.len(), 0x1A);
        let mut data = first;
        data.extend(record(6, 4, 18, 0x3A, &[0, 1, 2, 2, 1, 3]));
        // Terminator: only the count is read.
        data.extend_from_slice(&0u16.to_le_bytes());

        let view = LeView::new(&data);
        let strips = decode_strips(&view, 0, 0).unwrap();
        assert_eq!(strips.len(), 2);
        assert_eq!(strips[0].name, "Mesh_0_tpageid_17_dg_2");
        assert_eq!(strips[0].material, "Material_17");
        assert_eq!(strips[1].indices, vec![0, 1, 2, 2, 1, 3]);
    }

    #[test]
    fn test_circular_chain_is_rejected() {
        let data = record(3, 0, 0, 0, &[0, 1, 2]);
        let view = LeView::new(&data);
        assert!(matches!(
            decode_strips(&view, 0, 0),
            Err(Error::MalformedContainer { .. })
        ));
    }
}
