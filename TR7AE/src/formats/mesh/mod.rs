//! Skinned mesh (`.gnc`) payload decoding
//!
//! A model payload starts with a [`MeshHeader`]; the bone table, VirtSegment
//! records, vertex list and draw-record chain follow at header offsets.

pub mod header;
pub mod hinfo;
pub mod model;
pub mod skeleton;
pub mod strip;
pub mod vertex;

pub use header::{MeshHeader, BONE_STRIDE, MESH_VERSION};
pub use hinfo::{HBox, HCapsule, HMarker, HSphere, HitCollisionBlock};
pub use model::{DecodeOptions, Model};
pub use skeleton::{Bone, ROOT_PARENT};
pub use strip::{DrawRecord, MaterialKey, Submesh};
pub use vertex::{PackedVertex, VertexBuffers};
