//! Command execution implementations

use super::{export, import, inspect, texture, Commands, TextureCommands};
use crate::converter::ExportOptions;

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Inspect { path, json } => inspect::execute(path, *json),
            Commands::Import {
                source,
                output,
                marker_bones,
                no_textures,
            } => import::execute(source, output, *marker_bones, !*no_textures),
            Commands::Export {
                scene,
                template,
                output,
                model,
                no_guns,
                no_shotgun,
                no_gear,
            } => {
                let options = ExportOptions {
                    remove_guns: *no_guns,
                    remove_shotgun: *no_shotgun,
                    remove_gear: *no_gear,
                };
                export::execute(scene, template, output, model.as_deref(), &options)
            }
            Commands::Texture { command } => command.execute(),
        }
    }
}

impl TextureCommands {
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            TextureCommands::ToPng { input, output } => texture::to_png(input, output),
            TextureCommands::FromPng {
                input,
                template,
                output,
            } => texture::from_png(input, template, output),
        }
    }
}
