//! Mesh header at the start of a model payload
//!
//! All offsets stored in the header (and in the structures it points to) are
//! relative to the payload start, called the model base below.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::formats::common::LeView;

/// Version word at the model base.
pub const MESH_VERSION: u32 = 0x04C20453;

/// Stride of bone and VirtSegment records.
pub const BONE_STRIDE: usize = 0x40;

pub(crate) const OFFSET_BONE_COUNT: usize = 0x04;
pub(crate) const OFFSET_VIRT_SEGMENT_COUNT: usize = 0x08;
pub(crate) const OFFSET_BONE_TABLE: usize = 0x0C;
pub(crate) const OFFSET_SCALE: usize = 0x10;
pub(crate) const OFFSET_VERTEX_COUNT: usize = 0x20;
pub(crate) const OFFSET_VERTEX_LIST: usize = 0x24;
pub(crate) const OFFSET_FACE_LIST: usize = 0x58;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeshHeader {
    pub version: u32,
    pub bone_count: u32,
    pub virt_segment_count: u32,
    pub bone_offset: u32,
    /// Per-axis dequantization scale; `w` is always 1.0 in shipped files.
    pub scale: [f32; 4],
    pub vertex_count: u32,
    pub vertex_offset: u32,
    pub face_offset: u32,
}

impl MeshHeader {
    /// Returns true if a model header starts at `base`.
    pub fn is_mesh_at(view: &LeView<'_>, base: usize) -> bool {
        view.peek_u32(base) == Some(MESH_VERSION)
    }

    pub fn read(view: &LeView<'_>, base: usize) -> Result<Self> {
        let version = view.u32_at(base)?;
        if version != MESH_VERSION {
            return Err(Error::TypeMismatch {
                expected: "mesh version 0x04C20453",
                found: format!("{version:#010x}"),
            });
        }
        let header = Self {
            version,
            bone_count: view.u32_at(base + OFFSET_BONE_COUNT)?,
            virt_segment_count: view.u32_at(base + OFFSET_VIRT_SEGMENT_COUNT)?,
            bone_offset: view.u32_at(base + OFFSET_BONE_TABLE)?,
            scale: [
                view.f32_at(base + OFFSET_SCALE)?,
                view.f32_at(base + OFFSET_SCALE + 4)?,
                view.f32_at(base + OFFSET_SCALE + 8)?,
                view.f32_at(base + OFFSET_SCALE + 12)?,
            ],
            vertex_count: view.u32_at(base + OFFSET_VERTEX_COUNT)?,
            vertex_offset: view.u32_at(base + OFFSET_VERTEX_LIST)?,
            face_offset: view.u32_at(base + OFFSET_FACE_LIST)?,
        };
        if header.bone_count == 0 {
            return Err(Error::malformed("mesh declares no bones (a root bone is required)"));
        }
        Ok(header)
    }

    /// Absolute offset of bone (or VirtSegment) record `index`.
    pub fn bone_record(&self, base: usize, index: usize) -> usize {
        base + self.bone_offset as usize + index * BONE_STRIDE
    }
}
