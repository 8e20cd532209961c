//! Texture decoding: PCD (PC, PS3, DRM-embedded) and RAW (PC, PS3)

pub mod bc;
pub mod morton;
pub mod pcd;
pub mod raw;
pub mod types;

pub use types::{Material, PixelFormat, Texture};

/// Standalone texture file layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    Pcd,
    Ps3Pcd,
    Raw,
    Ps3Raw,
}

impl TextureKind {
    /// Identify a standalone texture file from its magic values.
    pub fn detect(data: &[u8]) -> Option<Self> {
        use crate::formats::common::LeView;

        let view = LeView::new(data);
        match view.peek_u32(pcd::STANDALONE_PCD_OFFSET) {
            Some(pcd::PCD_MAGIC) => return Some(Self::Pcd),
            Some(pcd::PS3_PCD_MAGIC) => return Some(Self::Ps3Pcd),
            _ => {}
        }
        if raw::is_raw(data) {
            Some(Self::Raw)
        } else if raw::is_ps3_raw(data) {
            Some(Self::Ps3Raw)
        } else {
            None
        }
    }
}

/// Decode any standalone texture file.
pub fn decode_texture(data: &[u8]) -> crate::error::Result<Texture> {
    match TextureKind::detect(data) {
        Some(TextureKind::Pcd | TextureKind::Ps3Pcd) => pcd::decode_pcd(data),
        Some(TextureKind::Raw) => raw::decode_raw(data),
        Some(TextureKind::Ps3Raw) => raw::decode_ps3_raw(data),
        None => Err(crate::error::Error::TypeMismatch {
            expected: "PCD or RAW texture",
            found: format!("{} bytes without a texture magic", data.len()),
        }),
    }
}
