//! Bone table decoding and world-matrix composition
//!
//! Bone record (stride 0x40, relative to the record start):
//!
//! | Offset | Field |
//! |--------|-------|
//! | 0x00 | min/max bounds (unused, 32 bytes) |
//! | 0x20 | position `f32 x3` + `w` |
//! | 0x30 | flags |
//! | 0x34 | first vertex `i16` |
//! | 0x36 | last vertex `i16` |
//! | 0x38 | parent index (`0xFFFFFFFF` = root) |
//! | 0x3C | HInfo offset (0 = none) |

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec3};
use serde::Serialize;
use tracing::{debug, warn};

use super::header::MeshHeader;
use super::hinfo::HitCollisionBlock;
use crate::error::{Error, Result};
use crate::formats::common::LeView;

pub(crate) const BONE_POSITION: usize = 0x20;
pub(crate) const BONE_FLAGS: usize = 0x30;
pub(crate) const BONE_FIRST_VERTEX: usize = 0x34;
pub(crate) const BONE_LAST_VERTEX: usize = 0x36;
pub(crate) const BONE_PARENT: usize = 0x38;
pub(crate) const BONE_HINFO: usize = 0x3C;

/// Parent index of a root bone.
pub const ROOT_PARENT: i32 = -1;

/// One skeleton joint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bone {
    pub index: usize,
    pub name: String,
    pub local_position: Vec3,
    /// `-1` for roots.
    pub parent_index: i32,
    pub flags: u32,
    pub first_vertex: i16,
    pub last_vertex: i16,
    pub hinfo_offset: Option<u32>,
    pub hinfo: Option<HitCollisionBlock>,
    /// Object-space transform, valid after [`compose_world_matrices`].
    pub world: Mat4,
}

impl Bone {
    pub fn is_root(&self) -> bool {
        self.parent_index < 0
    }
}

/// Fixed 90 degree X rotation applied to bone 0.
pub fn root_correction() -> Mat4 {
    Mat4::from_rotation_x(FRAC_PI_2)
}

/// Read `header.bone_count` bones and compose their world matrices.
pub fn read_skeleton(view: &LeView<'_>, base: usize, header: &MeshHeader) -> Result<Vec<Bone>> {
    let count = header.bone_count as usize;
    let mut bones = Vec::with_capacity(count);

    for index in 0..count {
        let at = header.bone_record(base, index);
        let raw_parent = view.u32_at(at + BONE_PARENT)?;
        let parent_index = if raw_parent == u32::MAX {
            ROOT_PARENT
        } else {
            i32::try_from(raw_parent).map_err(|_| {
                Error::malformed(format!("bone {index} has parent index {raw_parent:#x}"))
            })?
        };

        let hinfo_offset = match view.u32_at(at + BONE_HINFO)? {
            0 => None,
            offset => Some(offset),
        };
        let hinfo = hinfo_offset
            .map(|offset| HitCollisionBlock::read(view, base, offset))
            .transpose()?;

        bones.push(Bone {
            index,
            name: format!("bone{index:03}"),
            local_position: Vec3::from_array(view.vec3_at(at + BONE_POSITION)?),
            parent_index,
            flags: view.u32_at(at + BONE_FLAGS)?,
            first_vertex: view.i16_at(at + BONE_FIRST_VERTEX)?,
            last_vertex: view.i16_at(at + BONE_LAST_VERTEX)?,
            hinfo_offset,
            hinfo,
            world: Mat4::IDENTITY,
        });
    }

    compose_world_matrices(&mut bones)?;
    debug!("read {count} bones");
    Ok(bones)
}

/// Compose world matrices in index order.
///
/// Every parent must precede its child; bone 0 may name itself as parent.
/// Anything else is rejected instead of producing a silently wrong skeleton.
pub fn compose_world_matrices(bones: &mut [Bone]) -> Result<()> {
    for i in 0..bones.len() {
        let local = Mat4::from_translation(bones[i].local_position);
        let parent = bones[i].parent_index;

        let mut world = if parent < 0 || (i == 0 && parent == 0) {
            local
        } else if (parent as usize) < i {
            bones[parent as usize].world * local
        } else {
            return Err(Error::malformed(format!(
                "bone {i} references parent {parent}, which does not precede it"
            )));
        };
        if i == 0 {
            world = root_correction() * world;
        }
        bones[i].world = world;
    }
    Ok(())
}

/// Append one synthetic `HMarker%03i` bone per HInfo marker.
pub fn append_marker_bones(bones: &mut Vec<Bone>) {
    let real_count = bones.len();
    let markers: Vec<_> = bones
        .iter()
        .filter_map(|b| b.hinfo.as_ref())
        .flat_map(|h| h.markers.iter().copied())
        .collect();

    for (n, marker) in markers.into_iter().enumerate() {
        let Some(parent) = usize::try_from(marker.bone)
            .ok()
            .filter(|&p| p < real_count)
        else {
            warn!("marker {n} references missing bone {}", marker.bone);
            continue;
        };
        let world = bones[parent].world * Mat4::from_translation(marker.position);
        bones.push(Bone {
            index: bones.len(),
            name: format!("HMarker{n:03}"),
            local_position: marker.position,
            parent_index: parent as i32,
            flags: 0,
            first_vertex: 0,
            last_vertex: 0,
            hinfo_offset: None,
            hinfo: None,
            world,
        });
    }
}
