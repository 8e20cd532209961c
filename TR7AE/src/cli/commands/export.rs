//! GNC export from a JSON scene

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;

use crate::converter::{encode_file, ExportOptions};
use crate::scene::Scene;

pub fn execute(
    scene_path: &Path,
    template: &Path,
    output: &Path,
    model: Option<&str>,
    options: &ExportOptions,
) -> anyhow::Result<()> {
    let reader = BufReader::new(
        File::open(scene_path).with_context(|| format!("opening {}", scene_path.display()))?,
    );
    let scene: Scene = serde_json::from_reader(reader)?;

    let selected = match model {
        Some(name) => scene
            .models
            .iter()
            .find(|m| m.name == name)
            .with_context(|| format!("no model named '{name}' in {}", scene_path.display()))?,
        None => scene
            .models
            .first()
            .with_context(|| format!("{} holds no models", scene_path.display()))?,
    };

    encode_file(selected, template, options, output)?;
    println!(
        "{} -> {}: {} bones, {} submeshes, {} vertices",
        selected.name,
        output.display(),
        selected.bones.len(),
        selected.meshes.len(),
        selected.vertex_count()
    );
    Ok(())
}
