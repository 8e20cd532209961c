//! GNC mesh writer.
//!
//! Writes a [`SceneModel`] as a standalone `"SECT"` mesh that can replace
//! `5_0.gnc` in `lara.drm`. The reference file supplies the hit-collision
//! block and the relocations of Lara's bone HInfo slots, so only that file
//! works as a template.

mod build_sections;
mod constants;
mod file_bytes;
mod hinfo;
mod section;
mod skeleton;
mod strip;
mod vertex;
mod weights;

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::scene::SceneModel;

pub use constants::{MAX_INDICES_PER_SUBMESH, MAX_SUBMESHES, MAX_VERTICES, MIN_BONES_FOR_HINFO};
pub use strip::MeshTag;

/// Attachments to hide in the exported mesh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Holstered pistols.
    pub remove_guns: bool,
    /// Holstered shotgun.
    pub remove_shotgun: bool,
    pub remove_gear: bool,
}

pub struct GncWriter<'a> {
    model: &'a SceneModel,
    template: &'a [u8],
    options: ExportOptions,
}

impl<'a> GncWriter<'a> {
    #[must_use]
    pub fn new(model: &'a SceneModel, template: &'a [u8], options: ExportOptions) -> Self {
        Self {
            model,
            template,
            options,
        }
    }

    /// Build the GNC file and return as bytes.
    ///
    /// # Errors
    /// Returns an error if the model breaks a format limit or the template
    /// is unusable. Nothing is produced in that case.
    pub fn build(&self) -> Result<Vec<u8>> {
        let section = self.build_section()?;
        self.build_file_bytes(&section)
    }

    /// Write the GNC file to disk.
    ///
    /// The file is only created once the whole mesh has been built.
    ///
    /// # Errors
    /// Returns an error if building or writing fails.
    pub fn write(&self, path: &Path) -> Result<()> {
        let data = self.build()?;
        fs::write(path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::constants::{
        HINFO_BLOB_SIZE, TEMPLATE_HINFO_OFFSET, TEMPLATE_RELOCATIONS_OFFSET,
        TEMPLATE_RELOCATIONS_SIZE,
    };
    use super::*;
    use crate::error::Error;
    use crate::formats::drm::{SectionContainer, SECT_MAGIC};
    use crate::formats::mesh::{DecodeOptions, Model};
    use crate::scene::{SceneBone, SceneMesh, VertexWeights};
    use glam::{Mat4, Vec3};

    /// Reference-shaped file: SECT magic, 11 relocations, room for the blob.
    pub(crate) fn template() -> Vec<u8> {
        let mut data = vec![0u8; TEMPLATE_HINFO_OFFSET + HINFO_BLOB_SIZE];
        data[0..4].copy_from_slice(&SECT_MAGIC.to_le_bytes());
        for i in 0..TEMPLATE_RELOCATIONS_SIZE / 8 {
            let at = TEMPLATE_RELOCATIONS_OFFSET + i * 8;
            data[at..at + 2].copy_from_slice(&40i16.to_le_bytes());
            data[at + 4..at + 8].copy_from_slice(&(540u32 + i as u32 * 128).to_le_bytes());
        }
        data
    }

    /// A chain of 110 bones spaced one unit apart on X, with one quad.
    fn model() -> SceneModel {
        let bones = (0..110)
            .map(|i| SceneBone {
                name: format!("bone{i:03}"),
                parent_index: i - 1,
                world: Mat4::from_translation(Vec3::new(i as f32, 0.0, 0.0)).to_cols_array_2d(),
            })
            .collect();
        let weights = |bones: Vec<u32>, weights: Vec<f32>| VertexWeights { bones, weights };
        SceneModel {
            name: "Model".to_string(),
            bones,
            meshes: vec![SceneMesh {
                name: "Mesh_0_tpageid_77_dg_2".to_string(),
                material: "Material_77".to_string(),
                positions: vec![[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [1.0, 1.0, 0.0], [2.0, 1.0, 0.0]],
                normals: vec![[0.0, 0.0, 1.0]; 4],
                uvs: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]],
                weights: vec![
                    weights(vec![1], vec![1.0]),
                    weights(vec![2], vec![1.0]),
                    weights(vec![1, 2], vec![0.5, 0.5]),
                    weights(vec![2], vec![1.0]),
                ],
                indices: vec![0, 1, 2, 2, 1, 3],
            }],
        }
    }

    #[test]
    fn test_relocation_count() {
        let model = model();
        let template = template();
        let data = GncWriter::new(&model, &template, ExportOptions::default()).build().unwrap();
        // 7 header + 11 template + 13 HInfo + 1 per submesh.
        assert_eq!(data[13], 32);
        let sect = SectionContainer::parse_standalone(&data).unwrap();
        assert_eq!(sect.sections[0].relocations.len(), 32);
        assert_eq!(sect.sections[0].relocations[7].offset, 540);
    }

    #[test]
    fn test_round_trip() {
        let model = model();
        let template = template();
        let data = GncWriter::new(&model, &template, ExportOptions::default()).build().unwrap();

        let sect = SectionContainer::parse_standalone(&data).unwrap();
        let decoded = Model::decode(&data, sect.sections[0].payload_offset, "Model", DecodeOptions::default()).unwrap();
        assert_eq!(decoded.bones.len(), 110);
        assert_eq!(decoded.vertices.len(), 4);
        assert_eq!(decoded.submeshes.len(), 1);
        assert_eq!(decoded.submeshes[0].name, "Mesh_0_tpageid_77_dg_2");
        assert_eq!(decoded.submeshes[0].indices, vec![0, 1, 2, 2, 1, 3]);

        for (decoded, expected) in decoded.vertices.positions.iter().zip(&model.meshes[0].positions) {
            let d = Vec3::from_array(*decoded) - Vec3::from_array(*expected);
            assert!(d.length() < 0.1, "{decoded:?} vs {expected:?}");
        }
        assert_eq!(decoded.vertices.bone_indices[2], [2, 1]);
        assert_eq!(decoded.vertices.bone_weights[2], [0.5, 0.5]);
    }

    /// The 16-byte vertex records of a written mesh.
    fn vertex_records(data: &[u8]) -> Vec<u8> {
        let sect = SectionContainer::parse_standalone(data).unwrap();
        let base = sect.sections[0].payload_offset;
        let decoded = Model::decode(data, base, "Model", DecodeOptions::default()).unwrap();
        let header = decoded.header.unwrap();
        let start = base + header.vertex_offset as usize;
        data[start..start + header.vertex_count as usize * 16].to_vec()
    }

    #[test]
    fn test_reencode_keeps_quantized_vertices() {
        let mut model = model();
        let weights = |bones: Vec<u32>, weights: Vec<f32>| VertexWeights { bones, weights };
        let mesh = &mut model.meshes[0];
        mesh.positions = vec![
            [0.3, -1.2, 0.5],
            [1.0, 0.0, 0.0],
            [2.5, 1.7, -0.4],
            [3.1, 0.2, 0.9],
            [-0.6, 2.2, 1.3],
            [4.4, -0.8, 0.1],
        ];
        mesh.normals = vec![
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, -1.0],
            [-1.0, 0.0, 0.0],
            [0.0, -1.0, 0.0],
        ];
        mesh.uvs = vec![[0.0, 0.0], [0.5, 0.25], [1.0, 0.75], [0.125, 1.0], [0.75, 0.5], [1.0, 1.0]];
        mesh.weights = vec![
            weights(vec![0], vec![1.0]),
            weights(vec![0, 1], vec![0.25, 0.75]),
            weights(vec![2], vec![1.0]),
            weights(vec![3, 2], vec![0.5, 0.5]),
            weights(vec![1], vec![1.0]),
            weights(vec![4, 5], vec![0.75, 0.25]),
        ];
        mesh.indices = vec![0, 1, 2, 3, 4, 5];

        let template = template();
        let first = GncWriter::new(&model, &template, ExportOptions::default()).build().unwrap();
        let scene = crate::formats::decode(&first).unwrap();
        let second = GncWriter::new(&scene.models[0], &template, ExportOptions::default()).build().unwrap();

        let (before, after) = (vertex_records(&first), vertex_records(&second));
        assert_eq!(before.len(), 6 * 16);
        pretty_assertions::assert_eq!(before, after);
    }

    #[test]
    fn test_too_few_bones_rejected() {
        let mut model = model();
        model.bones.truncate(50);
        model.meshes[0].weights.iter_mut().for_each(|w| w.bones.iter_mut().for_each(|b| *b = 0));
        let err = GncWriter::new(&model, &template(), ExportOptions::default()).build().unwrap_err();
        assert!(matches!(err, Error::InvalidModel { .. }));
    }

    #[test]
    fn test_bad_template_rejected() {
        let model = model();
        let err = GncWriter::new(&model, &[0u8; 64], ExportOptions::default()).build().unwrap_err();
        assert!(matches!(err, Error::InvalidTemplate { .. }));
    }

    #[test]
    fn test_write_leaves_no_file_on_error() {
        let mut model = model();
        model.meshes[0].name = "Body".to_string();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("5_0.gnc");
        let err = GncWriter::new(&model, &template(), ExportOptions::default()).write(&out).unwrap_err();
        assert!(matches!(err, Error::NamingConvention { .. }));
        assert!(!out.exists());
    }
}
