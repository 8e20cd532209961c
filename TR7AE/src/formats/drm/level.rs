//! Level terrain (BG object) geometry
//!
//! A level DRM carries the level version at +0xA8 of its first section. The
//! first word of that section points to the terrain, whose BG-object list
//! holds unskinned, per-object scaled geometry:
//!
//! | Offset | Field |
//! |--------|-------|
//! | 0x00 | scale `f32 x3` |
//! | 0x30 | texture strip pointer |
//! | 0x44 | vertex list pointer |
//! | 0x48 | vertex count |
//!
//! BG object stride is 0x60. Vertices are 12 bytes (`i16 x, y, z`, pad,
//! `i16 u, v` in 1/4096 units).

use std::collections::HashSet;

use tracing::{debug, warn};

use super::container::{ContainerOptions, SectionContainer};
use super::section::Pointer;
use crate::error::{Error, Result};
use crate::formats::mesh::{Model, Submesh, VertexBuffers};

/// Level structure version at +0xA8 of section 0.
pub const LEVEL_VERSION: u32 = 79824059;
const LEVEL_VERSION_OFFSET: usize = 0xA8;

const TERRAIN_BG_OBJECT_COUNT: usize = 0x30;
const TERRAIN_BG_OBJECT_LIST: usize = 0x34;

const BG_OBJECT_STRIDE: usize = 0x60;
const BG_OBJECT_STRIP: usize = 0x30;
const BG_OBJECT_VERTICES: usize = 0x44;
const BG_OBJECT_VERTEX_COUNT: usize = 0x48;

const BG_VERTEX_STRIDE: usize = 12;
const UV_SCALE: f32 = 1.0 / 4096.0;

const STRIP_TPAGE: usize = 0x0C;
const STRIP_NEXT: usize = 0x18;
const STRIP_INDICES: usize = 0x1C;

/// Returns true if `data` is a DRM whose first section holds a level.
pub fn is_level(data: &[u8]) -> bool {
    if !SectionContainer::is_drm(data) {
        return false;
    }
    let Ok(drm) = SectionContainer::parse_drm(data, ContainerOptions::default()) else {
        return false;
    };
    drm.sections
        .first()
        .and_then(|s| drm.view().peek_u32(s.payload_offset + LEVEL_VERSION_OFFSET))
        == Some(LEVEL_VERSION)
}

/// Decode every BG object of a level into one unskinned model each.
pub fn decode_level(drm: &SectionContainer<'_>) -> Result<Vec<Model>> {
    let first = drm.section(0)?;
    let Some(terrain) = drm.resolve_pointer_at(first.payload_offset, first)? else {
        warn!("level terrain pointer is null");
        return Ok(Vec::new());
    };

    let view = drm.view();
    let count = view.u32_at(terrain.offset + TERRAIN_BG_OBJECT_COUNT)? as usize;
    let terrain_section = drm.section(terrain.section)?;
    let Some(list) =
        drm.resolve_pointer_at(terrain.offset + TERRAIN_BG_OBJECT_LIST, terrain_section)?
    else {
        warn!("level has no BG objects");
        return Ok(Vec::new());
    };
    debug!("{count} BG objects in terrain");

    (0..count)
        .map(|i| read_bg_object(drm, list, i))
        .collect()
}

fn read_bg_object(drm: &SectionContainer<'_>, list: Pointer, index: usize) -> Result<Model> {
    let view = drm.view();
    let section = drm.section(list.section)?;
    let at = list.offset + index * BG_OBJECT_STRIDE;

    let [sx, sy, sz] = view.vec3_at(at)?;
    let vertex_count = view.u32_at(at + BG_OBJECT_VERTEX_COUNT)? as usize;
    let vertices = drm
        .resolve_pointer_at(at + BG_OBJECT_VERTICES, section)?
        .ok_or_else(|| Error::malformed(format!("BG object {index} has no vertex list")))?;

    let raw = view.bytes(vertices.offset, vertex_count.saturating_mul(BG_VERTEX_STRIDE))?;
    let mut buffers = VertexBuffers {
        positions: Vec::with_capacity(vertex_count),
        uvs: Vec::with_capacity(vertex_count),
        ..VertexBuffers::default()
    };
    for v in raw.chunks_exact(BG_VERTEX_STRIDE) {
        let i16_at = |o: usize| f32::from(i16::from_le_bytes([v[o], v[o + 1]]));
        // Stored as x, z, y
        buffers
            .positions
            .push([-(i16_at(0) * sx), i16_at(4) * sz, i16_at(2) * sy]);
        buffers
            .uvs
            .push([i16_at(8) * UV_SCALE, i16_at(10) * UV_SCALE]);
    }

    let strips = drm.resolve_pointer_at(at + BG_OBJECT_STRIP, section)?;
    let submeshes = read_texture_strips(drm, strips, index)?;
    debug!(
        "BG object {index}: {vertex_count} vertices, {} strips",
        submeshes.len()
    );

    let model = Model {
        name: format!("BGObject_{index}"),
        header: None,
        bones: Vec::new(),
        vertices: buffers,
        submeshes,
    };
    model.check_indices()?;
    Ok(model)
}

/// Follow a texture-strip chain until a zero count or a null next pointer.
fn read_texture_strips(
    drm: &SectionContainer<'_>,
    mut next: Option<Pointer>,
    object: usize,
) -> Result<Vec<Submesh>> {
    let view = drm.view();
    let mut visited = HashSet::new();
    let mut strips = Vec::new();

    while let Some(ptr) = next {
        if !visited.insert(ptr.offset) {
            return Err(Error::malformed(format!(
                "texture strip chain of BG object {object} loops back to {:#x}",
                ptr.offset
            )));
        }
        let count = view.u32_at(ptr.offset)? as usize;
        if count == 0 {
            break;
        }
        let tpage = view.u32_at(ptr.offset + STRIP_TPAGE)? & 0x1FFF;
        next = drm.resolve_pointer_at(ptr.offset + STRIP_NEXT, drm.section(ptr.section)?)?;

        let raw = view.bytes(ptr.offset + STRIP_INDICES, count.saturating_mul(2))?;
        strips.push(Submesh {
            name: format!("BGObject_{object}_strip_{}", strips.len()),
            material: format!("Material_{tpage}"),
            indices: raw
                .chunks_exact(2)
                .map(|c| u16::from_le_bytes([c[0], c[1]]))
                .collect(),
            record: None,
        });
    }

    Ok(strips)
}
