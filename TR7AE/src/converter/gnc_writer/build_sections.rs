//! Mesh payload layout
//!
//! Header, bones, one VirtSegment per vertex, the cloned HInfo block, the
//! vertex buffer and the draw records, in that order. Everything is
//! validated before the first byte is written.

use tracing::debug;

use super::constants::{
    BONES_START, BONE_MIRROR_DATA, DRAW_GROUP_CENTER, EXPORT_SCALE, HEADER_BONE_TABLE,
    HEADER_DEPTH_RANGE, HEADER_ENV_MAPPED_VERTICES, HEADER_EYE_ENV_MAPPED_VERTICES,
    HEADER_FACE_LIST, HEADER_RELOCATION_COUNT, HEADER_TAIL, HEADER_VERTEX_LIST,
    HEADER_WORDS_AT_0X94, HEADER_ZERO_RUN, MAX_SUBMESHES, MAX_VERTICES, MIN_BONES_FOR_HINFO,
};
use super::hinfo::{template_blob, write_hinfo};
use super::section::Section;
use super::skeleton::CanonicalSkeleton;
use super::strip::{check_index_count, write_strips, MeshTag};
use super::vertex::{pack_vertex, write_vertices};
use super::weights::VirtSegment;
use super::GncWriter;
use crate::error::{Error, Result};
use crate::formats::mesh::vertex::PackedVertex;
use crate::formats::mesh::MESH_VERSION;
use crate::scene::SceneMesh;

/// Everything resolved from the scene before writing.
struct Layout {
    skeleton: CanonicalSkeleton,
    tags: Vec<MeshTag>,
    first_vertices: Vec<usize>,
    segments: Vec<VirtSegment>,
    vertices: Vec<PackedVertex>,
}

impl GncWriter<'_> {
    pub(super) fn build_section(&self) -> Result<Section> {
        let layout = self.resolve()?;
        let blob = template_blob(self.template)?;
        let vertex_count = layout.vertices.len() as u32;

        let mut section = Section::new();
        write_header(&mut section, layout.skeleton.len() as u32, vertex_count);
        debug_assert_eq!(section.len(), BONES_START);

        layout.skeleton.write(&mut section);
        for (vertex, segment) in layout.segments.iter().enumerate() {
            segment.write(&mut section, vertex);
        }
        let hinfo = write_hinfo(&mut section, blob, self.options)?;

        let vertex_list = section.pos();
        write_vertices(&mut section, &layout.vertices);
        let face_list = section.pos();
        let terminator = write_strips(&mut section, &self.model.meshes, &layout.tags, &layout.first_vertices);

        section.patch_u32(HEADER_VERTEX_LIST, vertex_list);
        section.patch_u32(HEADER_FACE_LIST, face_list);
        section.patch_u32(HEADER_ENV_MAPPED_VERTICES, terminator);
        section.patch_u32(HEADER_EYE_ENV_MAPPED_VERTICES, terminator);

        debug!(
            "mesh payload: {} bones, {vertex_count} vertices, HInfo at {hinfo:#x}, faces at {face_list:#x}, {} bytes",
            layout.skeleton.len(),
            section.len()
        );
        Ok(section)
    }

    fn resolve(&self) -> Result<Layout> {
        let model = self.model;
        let skeleton = CanonicalSkeleton::from_scene(&model.bones)?;
        if skeleton.len() < MIN_BONES_FOR_HINFO {
            return Err(Error::model(format!(
                "the hit-collision layout needs at least {MIN_BONES_FOR_HINFO} bones, model has {}",
                skeleton.len()
            )));
        }
        if model.meshes.len() > MAX_SUBMESHES {
            return Err(Error::ExportLimitExceeded {
                limit: "submesh count",
                actual: model.meshes.len(),
                max: MAX_SUBMESHES,
            });
        }
        let vertex_count = model.vertex_count();
        if vertex_count > MAX_VERTICES {
            return Err(Error::ExportLimitExceeded {
                limit: "vertex count",
                actual: vertex_count,
                max: MAX_VERTICES,
            });
        }

        let tags = model
            .meshes
            .iter()
            .map(|mesh| MeshTag::parse(&mesh.name))
            .collect::<Result<Vec<_>>>()?;

        let mut first_vertices = Vec::with_capacity(model.meshes.len());
        let mut segments = Vec::with_capacity(vertex_count);
        let mut vertices = Vec::with_capacity(vertex_count);
        for mesh in &model.meshes {
            check_index_count(mesh)?;
            check_streams(mesh)?;
            first_vertices.push(vertices.len());

            for i in 0..mesh.positions.len() {
                let segment = VirtSegment::resolve(&mesh.weights[i], &skeleton)
                    .map_err(|e| in_mesh(e, mesh, i))?;
                let bone = (skeleton.len() + vertices.len()) as u16;
                vertices.push(pack_vertex(
                    mesh.positions[i],
                    mesh.normals[i],
                    mesh.uvs[i],
                    &skeleton.binds[segment.bind_bone],
                    bone,
                ));
                segments.push(segment);
            }
        }

        Ok(Layout {
            skeleton,
            tags,
            first_vertices,
            segments,
            vertices,
        })
    }
}

/// Every vertex stream must be complete and every index in range.
fn check_streams(mesh: &SceneMesh) -> Result<()> {
    let n = mesh.positions.len();
    for (stream, len) in [
        ("normals", mesh.normals.len()),
        ("uvs", mesh.uvs.len()),
        ("weights", mesh.weights.len()),
    ] {
        if len != n {
            return Err(Error::model(format!(
                "mesh '{}' has {n} positions but {len} {stream}",
                mesh.name
            )));
        }
    }
    if let Some(&bad) = mesh.indices.iter().find(|&&i| i as usize >= n) {
        return Err(Error::model(format!(
            "mesh '{}' index {bad} is past its {n} vertices",
            mesh.name
        )));
    }
    Ok(())
}

/// Prefix model errors with the vertex they came from.
fn in_mesh(err: Error, mesh: &SceneMesh, vertex: usize) -> Error {
    match err {
        Error::InvalidModel { message } => {
            Error::model(format!("mesh '{}' vertex {vertex}: {message}", mesh.name))
        }
        other => other,
    }
}

fn write_header(section: &mut Section, bone_count: u32, vertex_count: u32) {
    section.write_u32(MESH_VERSION);
    section.write_u32(bone_count);
    section.write_u32(vertex_count);
    debug_assert_eq!(section.len(), HEADER_BONE_TABLE);
    section.write_ptr(BONES_START as u32);
    for _ in 0..3 {
        section.write_f32(EXPORT_SCALE);
    }
    section.write_f32(1.0);
    section.write_u32(vertex_count);
    section.write_ptr(0);
    section.write_zeros(4 * 5);
    for v in HEADER_DEPTH_RANGE {
        section.write_f32(v);
    }
    section.write_zeros(4 * 5);
    debug_assert_eq!(section.len(), HEADER_FACE_LIST);
    section.write_ptr(0);
    section.write_ptr(0);
    section.write_ptr(0);
    section.write_zeros(4 * 4);
    section.write_ptr(BONE_MIRROR_DATA);
    section.write_ptr(DRAW_GROUP_CENTER);
    section.write_zeros(4 * 6);
    for v in HEADER_WORDS_AT_0X94 {
        section.write_i32(v);
    }
    section.write_zeros(4 * HEADER_ZERO_RUN);
    for v in HEADER_TAIL {
        section.write_i32(v);
    }
    debug_assert_eq!(section.relocations.len(), HEADER_RELOCATION_COUNT);
}
