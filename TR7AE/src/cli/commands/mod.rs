//! Subcommand definitions

use clap::Subcommand;
use std::path::PathBuf;

pub mod execute;
pub mod export;
pub mod import;
pub mod inspect;
pub mod texture;

#[derive(Subcommand)]
pub enum Commands {
    /// Show the sections, models and textures of a file
    Inspect {
        /// DRM, GNC, PCD or RAW file
        path: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode a DRM, level or GNC file into a JSON scene
    Import {
        /// Source file
        source: PathBuf,

        /// Output scene JSON; textures are written as PNG next to it
        #[arg(short, long)]
        output: PathBuf,

        /// Add one bone per hit-collision marker
        #[arg(long)]
        marker_bones: bool,

        /// Skip texture sections
        #[arg(long)]
        no_textures: bool,
    },

    /// Encode a model of a JSON scene as a GNC mesh
    Export {
        /// Scene JSON produced by `import` or an external tool
        scene: PathBuf,

        /// The game's 5_0.gnc, used as layout reference
        #[arg(short, long)]
        template: PathBuf,

        /// Output GNC file
        #[arg(short, long)]
        output: PathBuf,

        /// Model to export (first model by default)
        #[arg(short, long)]
        model: Option<String>,

        /// Hide the holstered pistols
        #[arg(long)]
        no_guns: bool,

        /// Hide the holstered shotgun
        #[arg(long)]
        no_shotgun: bool,

        /// Hide the belt gear (experimental: slot position is inferred)
        #[arg(long)]
        no_gear: bool,
    },

    /// Texture conversion
    Texture {
        #[command(subcommand)]
        command: TextureCommands,
    },
}

/// PCD/RAW texture commands
#[derive(Subcommand)]
pub enum TextureCommands {
    /// Convert a PCD or RAW texture to PNG
    ToPng {
        /// Source .pcd or .raw file
        input: PathBuf,

        /// Output PNG file
        output: PathBuf,
    },

    /// Encode a PNG over an existing PCD or RAW texture
    FromPng {
        /// Source PNG file
        input: PathBuf,

        /// Texture whose header and format are kept
        #[arg(short, long)]
        template: PathBuf,

        /// Output texture file
        #[arg(short, long)]
        output: PathBuf,
    },
}
