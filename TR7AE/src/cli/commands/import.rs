//! Model import to a JSON scene

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::Context;
use tracing::warn;

use crate::converter::texture_to_png_bytes;
use crate::formats::decode_with_options;
use crate::formats::mesh::DecodeOptions;
use crate::scene::SceneModel;

pub fn execute(source: &Path, output: &Path, marker_bones: bool, load_textures: bool) -> anyhow::Result<()> {
    let data = std::fs::read(source).with_context(|| format!("reading {}", source.display()))?;
    let options = DecodeOptions {
        load_textures,
        marker_bones,
    };
    let scene = decode_with_options(&data, options)?;

    let writer = BufWriter::new(File::create(output)?);
    serde_json::to_writer_pretty(writer, &scene)?;

    let dir = output.parent().unwrap_or_else(|| Path::new("."));
    let mut written = 0;
    for texture in &scene.textures {
        match texture_to_png_bytes(texture) {
            Ok(png) => {
                std::fs::write(dir.join(format!("{}.png", texture.name)), png)?;
                written += 1;
            }
            Err(e) => warn!("texture {} not written: {e}", texture.name),
        }
    }

    let vertices: usize = scene.models.iter().map(SceneModel::vertex_count).sum();
    println!(
        "{} -> {}: {} models, {vertices} vertices, {written} textures",
        source.display(),
        output.display(),
        scene.models.len()
    );
    Ok(())
}
