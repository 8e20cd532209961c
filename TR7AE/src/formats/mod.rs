//! File format handlers for Tomb Raider Legend/Anniversary formats
//!
//! Each handler pairs a cheap type check with a decoder. Detection walks
//! [`HANDLERS`] in order and takes the first match, so the level check runs
//! before the generic DRM one.

pub mod common;
pub mod drm;
pub mod info;
pub mod mesh;
pub mod texture;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::scene::Scene;
use drm::{ContainerOptions, SectionContainer, SectionType};
use mesh::{DecodeOptions, MeshHeader, Model};

pub use common::{BeView, ByteView, LeView};
pub use drm::{Pointer, Relocation, Section};
pub use info::ContainerInfo;
pub use mesh::{Bone, Submesh, VertexBuffers};
pub use texture::{decode_texture, Material, PixelFormat, Texture, TextureKind};

/// Formats recognised by [`detect_format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FileFormat {
    /// DRM whose first section is a level structure.
    Level,
    /// DRM holding models and textures.
    Drm,
    /// Standalone `"SECT"` model (`.gnc`).
    Mesh,
    /// PC or PS3 `.pcd`.
    Pcd,
    /// PC or PS3 `.raw`.
    Raw,
}

impl FileFormat {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Level => "Level DRM",
            Self::Drm => "DRM",
            Self::Mesh => "Mesh (GNC)",
            Self::Pcd => "PCD texture",
            Self::Raw => "RAW texture",
        }
    }

    pub fn is_texture(self) -> bool {
        matches!(self, Self::Pcd | Self::Raw)
    }
}

/// A registered format: name, usual extension and type check.
pub struct FormatHandler {
    pub format: FileFormat,
    pub name: &'static str,
    pub extension: &'static str,
    pub type_check: fn(&[u8]) -> bool,
}

/// Registered handlers, checked in order.
pub static HANDLERS: &[FormatHandler] = &[
    FormatHandler {
        format: FileFormat::Level,
        name: "TR7AE BGObjects (PC)",
        extension: "drm",
        type_check: drm::is_level,
    },
    FormatHandler {
        format: FileFormat::Drm,
        name: "TR7AE DRM (PC)",
        extension: "drm",
        type_check: SectionContainer::is_drm,
    },
    FormatHandler {
        format: FileFormat::Mesh,
        name: "TR7AE Mesh (PC)",
        extension: "gnc",
        type_check: is_mesh,
    },
    FormatHandler {
        format: FileFormat::Pcd,
        name: "TR7AE Texture (PC/PS3)",
        extension: "pcd",
        type_check: texture::pcd::is_pcd,
    },
    FormatHandler {
        format: FileFormat::Raw,
        name: "TR7AE RAW (PC)",
        extension: "raw",
        type_check: texture::raw::is_raw,
    },
    FormatHandler {
        format: FileFormat::Raw,
        name: "TR7AE RAW (PS3)",
        extension: "raw",
        type_check: texture::raw::is_ps3_raw,
    },
];

/// Returns true for a standalone section whose payload is a model.
pub fn is_mesh(data: &[u8]) -> bool {
    SectionContainer::is_standalone(data)
        && SectionContainer::parse_standalone(data)
            .is_ok_and(|sect| MeshHeader::is_mesh_at(&sect.view(), sect.sections[0].payload_offset))
}

/// The first handler whose type check accepts `data`.
pub fn detect_handler(data: &[u8]) -> Option<&'static FormatHandler> {
    HANDLERS.iter().find(|h| (h.type_check)(data))
}

pub fn detect_format(data: &[u8]) -> Option<FileFormat> {
    detect_handler(data).map(|h| h.format)
}

/// Decode a model-bearing file with default options.
pub fn decode(data: &[u8]) -> Result<Scene> {
    decode_with_options(data, DecodeOptions::default())
}

/// Decode a level, DRM or standalone mesh into a [`Scene`].
pub fn decode_with_options(data: &[u8], options: DecodeOptions) -> Result<Scene> {
    let handler = detect_handler(data).ok_or_else(|| Error::TypeMismatch {
        expected: "DRM, level or GNC file",
        found: format!("unrecognised {}-byte file", data.len()),
    })?;
    debug!("decoding as {}", handler.name);

    let container_options = ContainerOptions {
        load_textures: options.load_textures,
    };
    match handler.format {
        FileFormat::Level => {
            let drm = SectionContainer::parse_drm(data, container_options)?;
            let models = drm::decode_level(&drm)?;
            info!("level: {} BG objects, {} textures", models.len(), drm.textures.len());
            Ok(Scene::from_models(&models, drm.textures, drm.materials))
        }
        FileFormat::Drm => {
            let drm = SectionContainer::parse_drm(data, container_options)?;
            let models = decode_drm_models(&drm, options)?;
            info!("DRM: {} models, {} textures", models.len(), drm.textures.len());
            Ok(Scene::from_models(&models, drm.textures, drm.materials))
        }
        FileFormat::Mesh => {
            let sect = SectionContainer::parse_standalone(data)?;
            let model = Model::decode(data, sect.sections[0].payload_offset, "Model", options)?;
            Ok(Scene::from_models(&[model], Vec::new(), Vec::new()))
        }
        FileFormat::Pcd | FileFormat::Raw => Err(Error::TypeMismatch {
            expected: "model container",
            found: handler.format.display_name().to_string(),
        }),
    }
}

/// Every generic section whose payload starts with the mesh version.
pub fn decode_drm_models(drm: &SectionContainer<'_>, options: DecodeOptions) -> Result<Vec<Model>> {
    let view = drm.view();
    let models = drm
        .sections
        .iter()
        .filter(|s| s.section_type == SectionType::Generic)
        .filter(|s| MeshHeader::is_mesh_at(&view, s.payload_offset))
        .map(|s| Model::decode(drm.data(), s.payload_offset, &format!("Model_{}", s.id), options))
        .collect::<Result<Vec<_>>>()?;

    if models.is_empty() {
        return Err(Error::TypeMismatch {
            expected: "DRM with at least one mesh section",
            found: format!("{} sections without meshes", drm.sections.len()),
        });
    }
    Ok(models)
}
