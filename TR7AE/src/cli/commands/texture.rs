//! CLI commands for texture operations

use std::path::Path;

use crate::converter::{convert_png_to_texture, convert_texture_to_png};

pub fn to_png(input: &Path, output: &Path) -> anyhow::Result<()> {
    convert_texture_to_png(input, output)?;
    println!("{} -> {}", input.display(), output.display());
    Ok(())
}

pub fn from_png(input: &Path, template: &Path, output: &Path) -> anyhow::Result<()> {
    convert_png_to_texture(input, template, output)?;
    println!("{} -> {}", input.display(), output.display());
    Ok(())
}
