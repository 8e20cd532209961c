//! File summaries for `tr7ae inspect`

use serde::Serialize;
use tracing::warn;

use super::drm::{self, ContainerOptions, SectionContainer, SectionType};
use super::mesh::{DecodeOptions, Model};
use super::texture::{decode_texture, PixelFormat, Texture};
use super::{decode_drm_models, detect_handler, FileFormat};
use crate::error::{Error, Result};

/// What a file holds, without the geometry itself.
#[derive(Debug, Clone, Serialize)]
pub struct ContainerInfo {
    pub format: FileFormat,
    /// Name of the handler that recognised the file.
    pub handler: &'static str,
    pub file_size: usize,
    pub sections: Vec<SectionInfo>,
    pub models: Vec<ModelInfo>,
    pub textures: Vec<TextureInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionInfo {
    pub index: usize,
    pub section_type: SectionType,
    pub id: u32,
    pub size: u32,
    pub relocations: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub bones: usize,
    pub vertices: usize,
    pub submeshes: usize,
    pub triangles: usize,
    /// Bones carrying a hit-collision block.
    pub bones_with_hinfo: usize,
    pub hit_spheres: usize,
    pub hit_boxes: usize,
    pub hit_markers: usize,
    pub hit_capsules: usize,
    pub materials: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextureInfo {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub mip_count: u8,
    pub data_size: usize,
}

impl ContainerInfo {
    /// Summarise any recognised file.
    ///
    /// Model sections that fail to decode are logged and left out.
    pub fn inspect(data: &[u8]) -> Result<Self> {
        let handler = detect_handler(data).ok_or_else(|| Error::TypeMismatch {
            expected: "DRM, level, GNC, PCD or RAW file",
            found: format!("unrecognised {}-byte file", data.len()),
        })?;

        let mut info = Self {
            format: handler.format,
            handler: handler.name,
            file_size: data.len(),
            sections: Vec::new(),
            models: Vec::new(),
            textures: Vec::new(),
        };

        match handler.format {
            FileFormat::Level | FileFormat::Drm => {
                let container = SectionContainer::parse_drm(data, ContainerOptions { load_textures: true })?;
                info.sections = section_infos(&container);
                let models = if handler.format == FileFormat::Level {
                    drm::decode_level(&container)
                } else {
                    decode_drm_models(&container, DecodeOptions::default())
                };
                match models {
                    Ok(models) => info.models = models.iter().map(ModelInfo::from_model).collect(),
                    Err(err) => warn!("models not summarised: {err}"),
                }
                info.textures = container.textures.iter().map(TextureInfo::from_texture).collect();
            }
            FileFormat::Mesh => {
                let container = SectionContainer::parse_standalone(data)?;
                info.sections = section_infos(&container);
                let base = container.section(0)?.payload_offset;
                let model = Model::decode(data, base, "Model", DecodeOptions::default())?;
                info.models.push(ModelInfo::from_model(&model));
            }
            FileFormat::Pcd | FileFormat::Raw => {
                if SectionContainer::is_standalone(data) {
                    info.sections = section_infos(&SectionContainer::parse_standalone(data)?);
                }
                info.textures.push(TextureInfo::from_texture(&decode_texture(data)?));
            }
        }
        Ok(info)
    }
}

fn section_infos(container: &SectionContainer<'_>) -> Vec<SectionInfo> {
    container
        .sections
        .iter()
        .map(|s| SectionInfo {
            index: s.index,
            section_type: s.section_type,
            id: s.id,
            size: s.size,
            relocations: s.relocations.len(),
        })
        .collect()
}

impl ModelInfo {
    pub fn from_model(model: &Model) -> Self {
        let blocks: Vec<_> = model.bones.iter().filter_map(|b| b.hinfo.as_ref()).collect();
        let mut materials: Vec<String> = Vec::new();
        for submesh in &model.submeshes {
            if !materials.contains(&submesh.material) {
                materials.push(submesh.material.clone());
            }
        }
        Self {
            name: model.name.clone(),
            bones: model.bones.len(),
            vertices: model.vertices.len(),
            submeshes: model.submeshes.len(),
            triangles: model.triangle_count(),
            bones_with_hinfo: blocks.len(),
            hit_spheres: blocks.iter().map(|b| b.spheres.len()).sum(),
            hit_boxes: blocks.iter().map(|b| b.boxes.len()).sum(),
            hit_markers: blocks.iter().map(|b| b.markers.len()).sum(),
            hit_capsules: blocks.iter().map(|b| b.capsules.len()).sum(),
            materials,
        }
    }
}

impl TextureInfo {
    pub fn from_texture(texture: &Texture) -> Self {
        Self {
            name: texture.name.clone(),
            width: texture.width,
            height: texture.height,
            format: texture.format,
            mip_count: texture.mip_count,
            data_size: texture.data.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_unrecognised_file() {
        assert!(matches!(
            ContainerInfo::inspect(&[0u8; 64]),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_mesh_summary() {
        let data = fixtures::build_standalone(&[], &fixtures::MeshFixture::quad().build());
        let info = ContainerInfo::inspect(&data).unwrap();
        assert_eq!(info.format, FileFormat::Mesh);
        assert_eq!(info.sections.len(), 1);
        assert_eq!(info.sections[0].section_type, SectionType::Generic);

        let model = &info.models[0];
        assert_eq!((model.bones, model.vertices, model.submeshes, model.triangles), (1, 4, 1, 2));
        assert_eq!(model.bones_with_hinfo, 0);
        assert_eq!(model.materials, vec!["Material_1".to_string()]);
        assert!(info.textures.is_empty());
    }

    #[test]
    fn test_raw_summary() {
        let mut data = vec![0u8; 0x80];
        data[4..8].copy_from_slice(&0x80u32.to_le_bytes());
        data[8..12].copy_from_slice(&16u32.to_le_bytes());
        data[0x14..0x18].copy_from_slice(&2i32.to_le_bytes());
        data[0x18..0x1C].copy_from_slice(&2i32.to_le_bytes());
        data.extend_from_slice(&[0xFF; 16]);

        let info = ContainerInfo::inspect(&data).unwrap();
        assert_eq!(info.format, FileFormat::Raw);
        assert!(info.sections.is_empty());
        assert_eq!((info.textures[0].width, info.textures[0].height), (2, 2));
        assert_eq!(info.textures[0].format, PixelFormat::Rgba8);
    }
}
