//! Synthetic containers for unit tests

use crate::formats::drm::container::SECT_MAGIC;
use crate::formats::drm::section::RELOCATION_SIZE;
use crate::formats::drm::Relocation;
use crate::formats::mesh::header::MESH_VERSION;
use crate::formats::mesh::vertex::PackedVertex;

/// `(section type, id, relocations, payload)` for [`build_drm`].
pub(crate) type SectionSpec = (u8, u32, Vec<Relocation>, Vec<u8>);

/// Serialize a version-14 DRM.
pub(crate) fn build_drm(sections: &[SectionSpec]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&14u32.to_le_bytes());
    out.extend_from_slice(&(sections.len() as u32).to_le_bytes());
    for (kind, id, relocations, payload) in sections {
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(&[*kind, 0, 0, 0]);
        out.extend_from_slice(&((relocations.len() as u32) << 8).to_le_bytes());
        out.extend_from_slice(&id.to_le_bytes());
        out.extend_from_slice(&[0; 4]);
    }
    for (_, _, relocations, payload) in sections {
        for reloc in relocations {
            out.extend_from_slice(&reloc.to_bytes());
        }
        out.extend_from_slice(payload);
    }
    out
}

/// Serialize a standalone `"SECT"` file.
pub(crate) fn build_standalone(relocations: &[Relocation], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(0x18 + relocations.len() * RELOCATION_SIZE + payload.len());
    out.extend_from_slice(&SECT_MAGIC.to_le_bytes());
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(&((relocations.len() as u32) << 8).to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&u32::MAX.to_le_bytes());
    for reloc in relocations {
        out.extend_from_slice(&reloc.to_bytes());
    }
    out.extend_from_slice(payload);
    out
}

/// A model payload built field by field.
pub(crate) struct MeshFixture {
    pub scale: f32,
    /// `(local position, raw parent)`
    pub bones: Vec<([f32; 3], u32)>,
    /// `(bone a, bone b, weight of b)` records after the bones
    pub virt_segments: Vec<(u16, u16, f32)>,
    pub vertices: Vec<PackedVertex>,
    /// `(draw group, material key, indices)`
    pub records: Vec<(u16, u32, Vec<u16>)>,
}

pub(crate) const FIXTURE_BONE_TABLE: usize = 0x60;

impl MeshFixture {
    /// One root bone, a unit quad of 4 vertices and a 6-index submesh.
    pub fn quad() -> Self {
        let vertex = |x: i16, y: i16| PackedVertex {
            position: [x, y, 0],
            normal: [0, 0, 127],
            bone: 0,
            uv: [0, 0x3F80],
        };
        Self {
            scale: 1.0,
            bones: vec![([0.0; 3], u32::MAX)],
            virt_segments: Vec::new(),
            vertices: vec![vertex(0, 0), vertex(1, 0), vertex(0, 1), vertex(1, 1)],
            records: vec![(0, 1, vec![0, 1, 2, 2, 1, 3])],
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let record_count = self.bones.len() + self.virt_segments.len();
        let vertex_offset = FIXTURE_BONE_TABLE + record_count * 0x40;
        let face_offset = vertex_offset + self.vertices.len() * 16;

        let mut out = vec![0u8; face_offset];
        let put = |out: &mut Vec<u8>, at: usize, bytes: &[u8]| {
            out[at..at + bytes.len()].copy_from_slice(bytes);
        };

        put(&mut out, 0x00, &MESH_VERSION.to_le_bytes());
        put(&mut out, 0x04, &(self.bones.len() as u32).to_le_bytes());
        put(&mut out, 0x08, &(self.virt_segments.len() as u32).to_le_bytes());
        put(&mut out, 0x0C, &(FIXTURE_BONE_TABLE as u32).to_le_bytes());
        for axis in 0..3 {
            put(&mut out, 0x10 + axis * 4, &self.scale.to_le_bytes());
        }
        put(&mut out, 0x1C, &1.0f32.to_le_bytes());
        put(&mut out, 0x20, &(self.vertices.len() as u32).to_le_bytes());
        put(&mut out, 0x24, &(vertex_offset as u32).to_le_bytes());
        put(&mut out, 0x58, &(face_offset as u32).to_le_bytes());

        for (i, (position, parent)) in self.bones.iter().enumerate() {
            let at = FIXTURE_BONE_TABLE + i * 0x40;
            for (axis, value) in position.iter().enumerate() {
                put(&mut out, at + 0x20 + axis * 4, &value.to_le_bytes());
            }
            put(&mut out, at + 0x2C, &1.0f32.to_le_bytes());
            put(&mut out, at + 0x36, &(-1i16).to_le_bytes());
            put(&mut out, at + 0x38, &parent.to_le_bytes());
        }
        for (i, (a, b, w)) in self.virt_segments.iter().enumerate() {
            let at = FIXTURE_BONE_TABLE + (self.bones.len() + i) * 0x40 + 0x38;
            put(&mut out, at, &a.to_le_bytes());
            put(&mut out, at + 2, &b.to_le_bytes());
            put(&mut out, at + 4, &w.to_le_bytes());
        }
        for (i, vertex) in self.vertices.iter().enumerate() {
            put(&mut out, vertex_offset + i * 16, &vertex.to_bytes());
        }

        for (group, key, indices) in &self.records {
            let next = out.len() + 0x14 + indices.len() * 2;
            out.extend_from_slice(&(indices.len() as u16).to_le_bytes());
            out.extend_from_slice(&group.to_le_bytes());
            out.extend_from_slice(&key.to_le_bytes());
            out.extend_from_slice(&[0; 8]);
            out.extend_from_slice(&(next as u32).to_le_bytes());
            for index in indices {
                out.extend_from_slice(&index.to_le_bytes());
            }
        }
        out.extend_from_slice(&[0; 4]);
        out
    }
}
