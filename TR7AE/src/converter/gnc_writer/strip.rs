//! Submesh naming and the draw-record chain

use super::constants::{MAX_INDICES_PER_SUBMESH, NAME_FIELDS};
use super::section::Section;
use crate::error::{Error, Result};
use crate::formats::mesh::strip::{DRAW_RECORD_HEADER_SIZE, NEXT_RECORD_SLOT};
use crate::scene::SceneMesh;

/// Draw-record fields recovered from a `Mesh_<n>_tpageid_<id>_dg_<group>` name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshTag {
    pub tpage_id: i32,
    pub draw_group: u16,
}

impl MeshTag {
    pub fn parse(name: &str) -> Result<Self> {
        let invalid = |reason: String| Error::NamingConvention {
            name: name.to_string(),
            reason,
        };

        let fields: Vec<&str> = name.split('_').collect();
        if fields.len() != NAME_FIELDS {
            return Err(invalid(format!(
                "expected {NAME_FIELDS} '_'-separated fields (Mesh_<n>_tpageid_<id>_dg_<group>), found {}",
                fields.len()
            )));
        }
        let tpage_id = fields[3]
            .parse::<i32>()
            .map_err(|_| invalid(format!("texture page '{}' is not an integer", fields[3])))?;
        let draw_group = fields[5]
            .parse::<i32>()
            .ok()
            .filter(|g| (i32::from(i16::MIN)..=i32::from(u16::MAX)).contains(g))
            .ok_or_else(|| invalid(format!("draw group '{}' is not a 16-bit integer", fields[5])))?;

        Ok(Self {
            tpage_id,
            draw_group: draw_group as u16,
        })
    }
}

/// Check the per-submesh index limit.
pub fn check_index_count(mesh: &SceneMesh) -> Result<()> {
    if mesh.indices.len() > MAX_INDICES_PER_SUBMESH {
        return Err(Error::ExportLimitExceeded {
            limit: "indices per submesh",
            actual: mesh.indices.len(),
            max: MAX_INDICES_PER_SUBMESH,
        });
    }
    Ok(())
}

/// Append one draw record per mesh plus the zero terminator.
///
/// `first_vertices[i]` is the global index of mesh `i`'s first vertex. The
/// next-record slots are relocated; returns the terminator offset.
pub fn write_strips(
    section: &mut Section,
    meshes: &[SceneMesh],
    tags: &[MeshTag],
    first_vertices: &[usize],
) -> u32 {
    for ((mesh, tag), &first) in meshes.iter().zip(tags).zip(first_vertices) {
        let start = section.len();
        let next = start + DRAW_RECORD_HEADER_SIZE + mesh.indices.len() * 2;
        section.write_u16(mesh.indices.len() as u16);
        section.write_u16(tag.draw_group);
        section.write_i32(tag.tpage_id);
        section.write_f32(0.0);
        section.write_f32(0.0);
        debug_assert_eq!(section.len(), start + NEXT_RECORD_SLOT);
        section.write_ptr(next as u32);
        for &index in &mesh.indices {
            section.write_u16((index as usize + first) as u16);
        }
    }
    let terminator = section.pos();
    section.write_u32(0);
    terminator
}
