//! Format conversion utilities
//!
//! - Scene → GNC mesh, laid out over the reference `5_0.gnc`
//! - PCD/RAW ↔ PNG, re-encoded over an existing texture file

pub mod gnc_writer;
pub mod texture;

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{Error, Result};
use crate::scene::SceneModel;

pub use gnc_writer::{ExportOptions, GncWriter, MeshTag};
pub use texture::{
    convert_png_to_texture, convert_texture_to_png, encode_texture, mip_chain, texture_to_png_bytes,
};

/// Encode `model` as a standalone GNC file.
///
/// `template` must be the bytes of the game's `5_0.gnc`.
pub fn encode(model: &SceneModel, template: &[u8], options: &ExportOptions) -> Result<Vec<u8>> {
    let data = GncWriter::new(model, template, *options).build()?;
    info!(
        "encoded '{}': {} bones, {} submeshes, {} vertices, {} bytes",
        model.name,
        model.bones.len(),
        model.meshes.len(),
        model.vertex_count(),
        data.len()
    );
    Ok(data)
}

/// Encode `model` and write it to `output`.
///
/// Nothing is written unless encoding succeeds.
pub fn encode_file<P: AsRef<Path>, Q: AsRef<Path>>(
    model: &SceneModel,
    template_path: P,
    options: &ExportOptions,
    output: Q,
) -> Result<()> {
    let template_path = template_path.as_ref();
    if !template_path.is_file() {
        return Err(Error::MissingReferenceTemplate {
            path: template_path.to_path_buf(),
        });
    }
    let template = fs::read(template_path)?;
    let data = encode(model, &template, options)?;
    fs::write(output.as_ref(), data)?;
    info!("wrote {}", output.as_ref().display());
    Ok(())
}
