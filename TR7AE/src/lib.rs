//! # TR7AE
//!
//! A pure-Rust library for the Tomb Raider Legend and Anniversary file formats.
//!
//! ## Supported Formats
//!
//! - **DRM containers** - Multi-section files with relocation tables
//! - **GNC meshes** - Skinned models with skeleton and hit-collision data
//! - **Level DRMs** - Static BG-object geometry
//! - **PCD/RAW textures** - PC and PS3 variants, DXT or uncompressed
//!
//! ## Quick Start
//!
//! ### Importing a Model
//!
//! ```no_run
//! let data = std::fs::read("lara.drm")?;
//! let scene = tr7ae::formats::decode(&data)?;
//! println!("{} models, {} textures", scene.models.len(), scene.textures.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### Exporting a Mesh
//!
//! The game's own `5_0.gnc` serves as layout reference.
//!
//! ```no_run
//! use tr7ae::converter::{encode_file, ExportOptions};
//! use tr7ae::scene::Scene;
//!
//! let scene: Scene = serde_json::from_str(&std::fs::read_to_string("lara.json")?)?;
//! encode_file(&scene.models[0], "5_0.gnc", &ExportOptions::default(), "out.gnc")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `tr7ae` command-line binary

pub mod converter;
pub mod error;
pub mod formats;
pub mod scene;

#[cfg(test)]
mod fixtures;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::formats::drm::{ContainerOptions, SectionContainer};
    pub use crate::formats::mesh::{DecodeOptions, Model};
    pub use crate::formats::{
        decode, decode_texture, decode_with_options, detect_format, ContainerInfo, FileFormat,
        PixelFormat, Texture,
    };
    pub use crate::scene::{Scene, SceneBone, SceneMesh, SceneModel, VertexWeights};

    pub use crate::converter::{encode, encode_file, encode_texture, ExportOptions, GncWriter};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
