//! Host-side scene graph
//!
//! Decoders produce a [`Scene`]; the mesh exporter consumes a [`SceneModel`].
//! Unlike the file layout, each [`SceneMesh`] owns its vertices, and skin
//! weights are free-form influence lists (the exporter enforces the two-bone
//! limit). Scenes serialize to JSON for the `import`/`export` commands.

use std::collections::HashMap;

use glam::Mat4;
use serde::{Deserialize, Serialize};

use crate::formats::mesh::Model;
use crate::formats::texture::{Material, Texture};

/// Models, materials and decoded textures of one file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    pub models: Vec<SceneModel>,
    pub materials: Vec<Material>,
    /// Written as PNG files next to the JSON, not inline.
    #[serde(skip)]
    pub textures: Vec<Texture>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneModel {
    pub name: String,
    pub bones: Vec<SceneBone>,
    pub meshes: Vec<SceneMesh>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneBone {
    pub name: String,
    /// `-1` for roots.
    pub parent_index: i32,
    /// Object-space transform, column-major.
    pub world: [[f32; 4]; 4],
}

impl SceneBone {
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.world)
    }
}

/// One submesh with its own vertex streams.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneMesh {
    /// Exported meshes follow `Mesh_<n>_tpageid_<id>_dg_<group>`.
    pub name: String,
    pub material: String,
    pub positions: Vec<[f32; 3]>,
    /// Empty for level geometry.
    #[serde(default)]
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    /// One entry per vertex; empty for unskinned geometry.
    #[serde(default)]
    pub weights: Vec<VertexWeights>,
    pub indices: Vec<u32>,
}

/// Bone influences of one vertex.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VertexWeights {
    pub bones: Vec<u32>,
    pub weights: Vec<f32>,
}

impl Scene {
    /// Build a scene from decoded models plus container textures.
    ///
    /// Materials referenced by submeshes but absent from `materials` are
    /// added without a texture.
    pub fn from_models(models: &[Model], textures: Vec<Texture>, mut materials: Vec<Material>) -> Self {
        let models: Vec<SceneModel> = models.iter().map(SceneModel::from_model).collect();
        for mesh in models.iter().flat_map(|m| &m.meshes) {
            if !materials.iter().any(|m| m.name == mesh.material) {
                materials.push(Material {
                    name: mesh.material.clone(),
                    texture: None,
                });
            }
        }
        Self {
            models,
            materials,
            textures,
        }
    }
}

impl SceneModel {
    /// Split a decoded model into per-submesh vertex streams.
    ///
    /// Vertices are renumbered in order of first use; zero weights are
    /// dropped.
    pub fn from_model(model: &Model) -> Self {
        let bones = model
            .bones
            .iter()
            .map(|b| SceneBone {
                name: b.name.clone(),
                parent_index: b.parent_index,
                world: b.world.to_cols_array_2d(),
            })
            .collect();

        let v = &model.vertices;
        let skinned = !model.bones.is_empty() && v.bone_indices.len() == v.len();
        let has_normals = v.normals.len() == v.len();

        let meshes = model
            .submeshes
            .iter()
            .map(|submesh| {
                let mut remap: HashMap<u16, u32> = HashMap::new();
                let mut mesh = SceneMesh {
                    name: submesh.name.clone(),
                    material: submesh.material.clone(),
                    ..SceneMesh::default()
                };
                for &source in &submesh.indices {
                    let local = *remap.entry(source).or_insert_with(|| {
                        let i = usize::from(source);
                        mesh.positions.push(v.positions[i]);
                        mesh.uvs.push(v.uvs.get(i).copied().unwrap_or_default());
                        if has_normals {
                            mesh.normals.push(v.normals[i]);
                        }
                        if skinned {
                            mesh.weights.push(influences(v.bone_indices[i], v.bone_weights[i]));
                        }
                        (mesh.positions.len() - 1) as u32
                    });
                    mesh.indices.push(local);
                }
                mesh
            })
            .collect();

        Self {
            name: model.name.clone(),
            bones,
            meshes,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.positions.len()).sum()
    }
}

fn influences(indices: [u16; 2], weights: [f32; 2]) -> VertexWeights {
    let mut out = VertexWeights::default();
    for (bone, weight) in indices.into_iter().zip(weights) {
        if weight > 0.0 {
            out.bones.push(u32::from(bone));
            out.weights.push(weight);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::mesh::{Submesh, VertexBuffers};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_submesh_vertices_are_renumbered() {
        let model = Model {
            name: "m".to_string(),
            header: None,
            bones: Vec::new(),
            vertices: VertexBuffers {
                positions: vec![[0.0; 3], [1.0; 3], [2.0; 3], [3.0; 3]],
                uvs: vec![[0.0; 2]; 4],
                ..VertexBuffers::default()
            },
            submeshes: vec![Submesh {
                name: "s".to_string(),
                material: "Material_2".to_string(),
                indices: vec![3, 2, 3],
                record: None,
            }],
        };
        let scene = Scene::from_models(&[model], Vec::new(), Vec::new());
        let mesh = &scene.models[0].meshes[0];
        assert_eq!(mesh.positions, vec![[3.0; 3], [2.0; 3]]);
        assert_eq!(mesh.indices, vec![0, 1, 0]);
        assert!(mesh.weights.is_empty());
        assert_eq!(scene.materials[0].name, "Material_2");
        assert_eq!(scene.materials[0].texture, None);
    }

    #[test]
    fn test_zero_weights_dropped() {
        let w = influences([4, 0], [1.0, 0.0]);
        assert_eq!(w.bones, vec![4]);
        let w = influences([1, 2], [0.25, 0.75]);
        assert_eq!(w.bones, vec![1, 2]);
        assert_eq!(w.weights, vec![0.25, 0.75]);
    }
}
