//! Decoded texture and material records

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use super::bc::{decode_bc, BcFormat};
use crate::error::{Error, Result};

/// Pixel layout of [`Texture::data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    /// BC1 blocks, passed through as stored.
    Dxt1,
    /// BC3 blocks, passed through as stored.
    Dxt5,
    /// Linear RGBA8, already converted from the stored channel order.
    Rgba8,
}

impl PixelFormat {
    pub fn is_compressed(self) -> bool {
        matches!(self, Self::Dxt1 | Self::Dxt5)
    }
}

/// A texture as read from a container or texture file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Mip count from the header; 0 when the format has no such field.
    pub mip_count: u8,
    /// Pixel payload. Compressed formats keep the whole stored chain.
    pub data: Vec<u8>,
}

impl Texture {
    /// Decode the top mip level to linear RGBA8.
    pub fn to_rgba8(&self) -> Result<Vec<u8>> {
        let (width, height) = (self.width as usize, self.height as usize);
        match self.format {
            PixelFormat::Dxt1 => Ok(decode_bc(&self.data, width, height, BcFormat::Bc1)),
            PixelFormat::Dxt5 => Ok(decode_bc(&self.data, width, height, BcFormat::Bc3)),
            PixelFormat::Rgba8 => {
                let len = width * height * 4;
                self.data.get(..len).map(<[u8]>::to_vec).ok_or_else(|| {
                    Error::malformed(format!(
                        "texture '{}' holds {} bytes, {width}x{height} RGBA needs {len}",
                        self.name,
                        self.data.len()
                    ))
                })
            }
        }
    }

    pub fn to_image(&self) -> Result<RgbaImage> {
        let rgba = self.to_rgba8()?;
        RgbaImage::from_raw(self.width, self.height, rgba).ok_or_else(|| Error::Image {
            message: format!("cannot build a {}x{} image buffer", self.width, self.height),
        })
    }
}

/// A material binding, named after the texture page it samples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub texture: Option<String>,
}
