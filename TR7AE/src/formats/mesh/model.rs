//! Model assembly: header → skeleton → vertices → submeshes

use serde::Serialize;
use tracing::debug;

use super::header::MeshHeader;
use super::skeleton::{append_marker_bones, read_skeleton, Bone};
use super::strip::{decode_strips, Submesh};
use super::vertex::{decode_vertices, VertexBuffers};
use crate::error::{Error, Result};
use crate::formats::common::LeView;

/// Options for model decoding.
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    /// Decode texture sections of DRM files.
    pub load_textures: bool,
    /// Add one `HMarker%03i` bone per HInfo marker.
    pub marker_bones: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            load_textures: true,
            marker_bones: false,
        }
    }
}

/// A decoded model: skeleton, shared vertex streams and submeshes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Model {
    pub name: String,
    pub header: Option<MeshHeader>,
    pub bones: Vec<Bone>,
    pub vertices: VertexBuffers,
    pub submeshes: Vec<Submesh>,
}

impl Model {
    /// Decode the model whose header starts at absolute offset `base`.
    pub fn decode(data: &[u8], base: usize, name: &str, options: DecodeOptions) -> Result<Self> {
        let view = LeView::new(data);
        let header = MeshHeader::read(&view, base)?;
        debug!(
            "model '{name}': {} bones, {} vertices, scale {:?}",
            header.bone_count, header.vertex_count, header.scale
        );

        let mut bones = read_skeleton(&view, base, &header)?;
        let vertices = decode_vertices(&view, base, &header, &bones)?;
        let submeshes = decode_strips(&view, base, header.face_offset)?;

        if options.marker_bones {
            append_marker_bones(&mut bones);
        }

        let model = Self {
            name: name.to_string(),
            header: Some(header),
            bones,
            vertices,
            submeshes,
        };
        model.check_indices()?;
        Ok(model)
    }

    pub fn triangle_count(&self) -> usize {
        self.submeshes.iter().map(|s| s.indices.len() / 3).sum()
    }

    /// Every submesh index must name a decoded vertex.
    pub(crate) fn check_indices(&self) -> Result<()> {
        let count = self.vertices.len();
        for submesh in &self.submeshes {
            if let Some(&bad) = submesh.indices.iter().find(|&&i| usize::from(i) >= count) {
                return Err(Error::malformed(format!(
                    "submesh '{}' index {bad} exceeds vertex count {count}",
                    submesh.name
                )));
            }
        }
        Ok(())
    }
}
