//! Packed vertex records and skinning resolution
//!
//! Vertex record (16 bytes):
//!
//! | Offset | Field |
//! |--------|-------|
//! | 0x00 | position `i16 x3`, multiplied by the header scale |
//! | 0x06 | normal `i8 x3`, divided by 127 |
//! | 0x09 | pad |
//! | 0x0A | bone `u16` |
//! | 0x0C | `u`, `v` as the high half of an `f32` each |
//!
//! A bone value past the last real bone names a VirtSegment record in the
//! same table, whose `+0x38` holds `u16 a, u16 b, f32 w`: the vertex is then
//! weighted `(1 - w)` to `a` and `w` to `b`.

use glam::Vec3;
use half::bf16;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::header::MeshHeader;
use super::skeleton::Bone;
use crate::error::{Error, Result};
use crate::formats::common::LeView;

pub const VERTEX_STRIDE: usize = 16;

/// Offset of `index, weight_index, weight` inside a VirtSegment record.
pub(crate) const VIRT_WEIGHT_RECORD: usize = 0x38;

/// One 16-byte vertex record as stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackedVertex {
    pub position: [i16; 3],
    pub normal: [i8; 3],
    pub bone: u16,
    pub uv: [u16; 2],
}

impl PackedVertex {
    pub fn read(view: &LeView<'_>, at: usize) -> Result<Self> {
        Ok(Self {
            position: [view.i16_at(at)?, view.i16_at(at + 2)?, view.i16_at(at + 4)?],
            normal: [view.i8_at(at + 6)?, view.i8_at(at + 7)?, view.i8_at(at + 8)?],
            bone: view.u16_at(at + 10)?,
            uv: [view.u16_at(at + 12)?, view.u16_at(at + 14)?],
        })
    }

    pub fn to_bytes(self) -> [u8; VERTEX_STRIDE] {
        let mut out = [0u8; VERTEX_STRIDE];
        for (i, p) in self.position.iter().enumerate() {
            out[i * 2..i * 2 + 2].copy_from_slice(&p.to_le_bytes());
        }
        for (i, n) in self.normal.iter().enumerate() {
            out[6 + i] = *n as u8;
        }
        out[10..12].copy_from_slice(&self.bone.to_le_bytes());
        out[12..14].copy_from_slice(&self.uv[0].to_le_bytes());
        out[14..16].copy_from_slice(&self.uv[1].to_le_bytes());
        out
    }
}

/// Expand a stored UV half into the `f32` it is the top 16 bits of.
pub fn unpack_uv(half: u16) -> f32 {
    bf16::from_bits(half).to_f32()
}

/// Pack a UV pair into the stored word: `u` high half low, `v` high half high.
///
/// Each half rounds up when the discarded low word is `>= 0x8000`.
pub fn pack_uv(u: f32, v: f32) -> u32 {
    let round = |f: f32| {
        let bits = f.to_bits();
        let high = (bits >> 16) as u16;
        bf16::from_bits(if bits & 0xFFFF >= 0x8000 { high.wrapping_add(1) } else { high })
    };
    (u32::from(round(v).to_bits()) << 16) | u32::from(round(u).to_bits())
}

/// Quantize one position component: `round(value / scale)`, saturating.
pub fn quantize_position(value: f32, scale: f32) -> i16 {
    let q = (value / scale).round();
    if q > f32::from(i16::MAX) || q < f32::from(i16::MIN) {
        warn!("position {value} does not fit a 16-bit coordinate at scale {scale}; clamping");
    }
    q as i16
}

/// Quantize one normal component: `trunc(n * 127 + 0.5000000001)`.
pub fn quantize_normal(value: f32) -> i8 {
    (f64::from(value) * 127.0 + 0.500_000_000_1) as i8
}

/// Decoded vertex streams in column layout, one slot per vertex.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VertexBuffers {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub bone_indices: Vec<[u16; 2]>,
    /// `[w0, w1]` with `w0 + w1 == 1`.
    pub bone_weights: Vec<[f32; 2]>,
}

impl VertexBuffers {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Decode every vertex of a model into object space.
pub fn decode_vertices(
    view: &LeView<'_>,
    base: usize,
    header: &MeshHeader,
    bones: &[Bone],
) -> Result<VertexBuffers> {
    let count = header.vertex_count as usize;
    let start = base + header.vertex_offset as usize;
    view.bytes(start, count.saturating_mul(VERTEX_STRIDE))?;

    let scale = Vec3::new(header.scale[0], header.scale[1], header.scale[2]);
    let bone_count = header.bone_count as usize;
    let mut out = VertexBuffers {
        positions: Vec::with_capacity(count),
        normals: Vec::with_capacity(count),
        uvs: Vec::with_capacity(count),
        bone_indices: Vec::with_capacity(count),
        bone_weights: Vec::with_capacity(count),
    };

    for v in 0..count {
        let packed = PackedVertex::read(view, start + v * VERTEX_STRIDE)?;
        let position = Vec3::new(
            f32::from(packed.position[0]),
            f32::from(packed.position[1]),
            f32::from(packed.position[2]),
        ) * scale;
        let normal = Vec3::new(
            f32::from(packed.normal[0]),
            f32::from(packed.normal[1]),
            f32::from(packed.normal[2]),
        ) / 127.0;

        let (indices, weights) = if usize::from(packed.bone) >= bone_count {
            let at = header.bone_record(base, usize::from(packed.bone)) + VIRT_WEIGHT_RECORD;
            let a = view.u16_at(at)?;
            let b = view.u16_at(at + 2)?;
            let w = view.f32_at(at + 4)?;
            ([a, b], [1.0 - w, w])
        } else {
            ([packed.bone, 0], [1.0, 0.0])
        };

        let bone = bones.get(usize::from(indices[0])).ok_or_else(|| {
            Error::malformed(format!(
                "vertex {v} references bone {} of {}",
                indices[0],
                bones.len()
            ))
        })?;
        if usize::from(indices[1]) >= bones.len() {
            return Err(Error::malformed(format!(
                "vertex {v} blends with bone {} of {}",
                indices[1],
                bones.len()
            )));
        }

        out.positions
            .push(bone.world.transform_point3(position).to_array());
        out.normals
            .push(bone.world.transform_vector3(normal).to_array());
        out.uvs
            .push([unpack_uv(packed.uv[0]), unpack_uv(packed.uv[1])]);
        out.bone_indices.push(indices);
        out.bone_weights.push(weights);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uv_roundtrip_on_representable_values() {
        for value in [0.0f32, 0.5, 1.0, -0.25, 0.75, 2.0] {
            let packed = pack_uv(value, value);
            assert_eq!(unpack_uv(packed as u16), value);
            assert_eq!(unpack_uv((packed >> 16) as u16), value);
        }
    }

    #[test]
    fn test_uv_rounds_up_on_high_low_word() {
        // 0x3F80_8000 has a low word of 0x8000: carries into the high half.
        let u = f32::from_bits(0x3F80_8000);
        assert_eq!(pack_uv(u, 0.0) & 0xFFFF, 0x3F81);
        let u = f32::from_bits(0x3F80_7FFF);
        assert_eq!(pack_uv(u, 0.0) & 0xFFFF, 0x3F80);
    }

    #[test]
    fn test_quantize_position_roundtrip() {
        let scale = 0.1f32;
        for q in [-32768i16, -12345, -1, 0, 1, 7, 4242, 32767] {
            let decoded = f32::from(q) * scale;
            assert_eq!(quantize_position(decoded, scale), q);
        }
    }

    #[test]
    fn test_quantize_position_saturates() {
        assert_eq!(quantize_position(1.0e6, 0.1), i16::MAX);
        assert_eq!(quantize_position(-1.0e6, 0.1), i16::MIN);
    }

    #[test]
    fn test_quantize_normal() {
        assert_eq!(quantize_normal(1.0), 127);
        assert_eq!(quantize_normal(0.0), 0);
        // -1 * 127 + 0.5 = -126.5, truncated toward zero.
        assert_eq!(quantize_normal(-1.0), -126);
    }

    #[test]
    fn test_packed_vertex_layout() {
        let vertex = PackedVertex {
            position: [1, -2, 3],
            normal: [127, -127, 0],
            bone: 0x0102,
            uv: [0x3F80, 0x4000],
        };
        let bytes = vertex.to_bytes();
        assert_eq!(&bytes[0..6], &[1, 0, 0xFE, 0xFF, 3, 0]);
        assert_eq!(bytes[9], 0);
        let view = LeView::new(&bytes);
        assert_eq!(PackedVertex::read(&view, 0).unwrap(), vertex);
    }
}
