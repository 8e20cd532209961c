//! PCD textures
//!
//! PCD header (relative to its start):
//!
//! | Offset | Field |
//! |--------|-------|
//! | 0x00 | magic `"PCD9"` |
//! | 0x04 | format (`"DXT1"`, `"DXT5"` or `0x15`) |
//! | 0x08 | pixel data size |
//! | 0x10 | width `u16` |
//! | 0x12 | height `u16` |
//! | 0x14 | flags `u8` |
//! | 0x15 | mip count `u8` |
//! | 0x16 | secondary type `u16` |
//! | 0x18 | pixel data |
//!
//! Inside a DRM the header starts the texture section payload. A standalone
//! `.pcd` is a `"SECT"` file whose payload (at 0x18) is the same header.
//! The PS3 build replaces it with a big-endian `"PS3T"` header.

use tracing::debug;

use super::types::{PixelFormat, Texture};
use crate::error::{Error, Result};
use crate::formats::common::{fourcc, BeView, LeView};

/// `"PCD9"`
pub const PCD_MAGIC: u32 = 0x39444350;
/// `"PS3T"` read little-endian.
pub const PS3_PCD_MAGIC: u32 = 0x54335350;

pub const FORMAT_DXT1: u32 = 0x31545844;
pub const FORMAT_DXT5: u32 = 0x35545844;
/// `D3DFMT_A8R8G8B8`, stored as BGRA bytes.
pub const FORMAT_A8R8G8B8: u32 = 0x15;

/// Offset of the PCD header in a standalone file.
pub const STANDALONE_PCD_OFFSET: usize = 0x18;
pub const PCD_HEADER_SIZE: usize = 0x18;

// PS3 header fields, big-endian, absolute.
const PS3_DATA_SIZE: usize = 0x1C;
const PS3_FORMAT: usize = 0x24;
const PS3_WIDTH: usize = 0x2C;
const PS3_HEIGHT: usize = 0x2E;
const PS3_DATA: usize = 0x3C;

const GCM_DXT1: u8 = 0x86;
const GCM_DXT5: u8 = 0x88;
const GCM_A8R8G8B8: u8 = 0x15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcdHeader {
    pub magic: u32,
    pub format: u32,
    pub data_size: u32,
    pub width: u16,
    pub height: u16,
    pub flags: u8,
    pub mip_count: u8,
    pub secondary_type: u16,
}

impl PcdHeader {
    pub fn read(view: &LeView<'_>, at: usize) -> Result<Self> {
        Ok(Self {
            magic: view.u32_at(at)?,
            format: view.u32_at(at + 4)?,
            data_size: view.u32_at(at + 8)?,
            width: view.u16_at(at + 0x10)?,
            height: view.u16_at(at + 0x12)?,
            flags: view.u8_at(at + 0x14)?,
            mip_count: view.u8_at(at + 0x15)?,
            secondary_type: view.u16_at(at + 0x16)?,
        })
    }
}

/// Returns true for a standalone PC or PS3 `.pcd` file.
pub fn is_pcd(data: &[u8]) -> bool {
    matches!(
        LeView::new(data).peek_u32(STANDALONE_PCD_OFFSET),
        Some(PCD_MAGIC | PS3_PCD_MAGIC)
    )
}

/// Decode a PCD header and payload starting at `at`.
fn decode_at(view: &LeView<'_>, at: usize, name: &str) -> Result<Texture> {
    let header = PcdHeader::read(view, at)?;
    let data = view.bytes(at + PCD_HEADER_SIZE, header.data_size as usize)?;

    let (format, data) = match header.format {
        FORMAT_DXT1 => (PixelFormat::Dxt1, data.to_vec()),
        FORMAT_DXT5 => (PixelFormat::Dxt5, data.to_vec()),
        FORMAT_A8R8G8B8 => (PixelFormat::Rgba8, bgra_to_rgba(data)),
        code => return Err(Error::UnsupportedPixelFormat { code }),
    };
    debug!(
        "PCD '{name}' {} {}x{}, {} mips",
        fourcc(header.format),
        header.width,
        header.height,
        header.mip_count
    );

    Ok(Texture {
        name: name.to_string(),
        width: u32::from(header.width),
        height: u32::from(header.height),
        format,
        mip_count: header.mip_count,
        data,
    })
}

/// Decode a PCD header at the start of a DRM texture section payload.
///
/// The magic is not checked.
pub fn decode_embedded(payload: &[u8], name: &str) -> Result<Texture> {
    decode_at(&LeView::new(payload), 0, name)
}

/// Decode a standalone PC or PS3 `.pcd` file.
pub fn decode_pcd(data: &[u8]) -> Result<Texture> {
    let view = LeView::new(data);
    match view.u32_at(STANDALONE_PCD_OFFSET)? {
        PCD_MAGIC => decode_at(&view, STANDALONE_PCD_OFFSET, "Texture"),
        PS3_PCD_MAGIC => decode_ps3_pcd(data),
        other => Err(Error::TypeMismatch {
            expected: "PCD9 or PS3T magic at 0x18",
            found: fourcc(other),
        }),
    }
}

/// Decode a PS3 `.pcd` file (`"PS3T"` at 0x18, big-endian fields).
pub fn decode_ps3_pcd(data: &[u8]) -> Result<Texture> {
    let view = BeView::new(data);
    let size = view.u32_at(PS3_DATA_SIZE)? as usize;
    let code = view.u8_at(PS3_FORMAT)?;
    let width = view.u16_at(PS3_WIDTH)?;
    let height = view.u16_at(PS3_HEIGHT)?;
    let pixels = view.bytes(PS3_DATA, size)?;

    let (format, data) = match code {
        GCM_DXT1 => (PixelFormat::Dxt1, pixels.to_vec()),
        GCM_DXT5 => (PixelFormat::Dxt5, pixels.to_vec()),
        GCM_A8R8G8B8 => (PixelFormat::Rgba8, argb_to_rgba(pixels)),
        code => {
            return Err(Error::UnsupportedPixelFormat {
                code: u32::from(code),
            });
        }
    };
    debug!("PS3 PCD {width}x{height} format {code:#x}");

    Ok(Texture {
        name: "Texture".to_string(),
        width: u32::from(width),
        height: u32::from(height),
        format,
        mip_count: 0,
        data,
    })
}

pub(crate) fn bgra_to_rgba(data: &[u8]) -> Vec<u8> {
    let mut rgba = data.to_vec();
    for chunk in rgba.chunks_exact_mut(4) {
        chunk.swap(0, 2);
    }
    rgba
}

pub(crate) fn argb_to_rgba(data: &[u8]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(data.len());
    for chunk in data.chunks_exact(4) {
        rgba.extend_from_slice(&[chunk[1], chunk[2], chunk[3], chunk[0]]);
    }
    rgba
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pcd_header(format: u32, size: u32, width: u16, height: u16) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&PCD_MAGIC.to_le_bytes());
        out.extend_from_slice(&format.to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&[0; 4]);
        out.extend_from_slice(&width.to_le_bytes());
        out.extend_from_slice(&height.to_le_bytes());
        out.extend_from_slice(&[0, 1, 0, 0]);
        out
    }

    #[test]
    fn test_embedded_dxt1_passthrough() {
        let mut payload = pcd_header(FORMAT_DXT1, 8, 4, 4);
        payload.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let texture = decode_embedded(&payload, "Texture_3").unwrap();
        assert_eq!(texture.format, PixelFormat::Dxt1);
        assert_eq!(texture.data, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(texture.mip_count, 1);
    }

    #[test]
    fn test_raw_pcd_is_swizzled_to_rgba() {
        let mut payload = pcd_header(FORMAT_A8R8G8B8, 4, 1, 1);
        payload.extend_from_slice(&[10, 20, 30, 40]);
        let texture = decode_embedded(&payload, "t").unwrap();
        assert_eq!(texture.data, vec![30, 20, 10, 40]);
    }

    #[test]
    fn test_unknown_format() {
        let payload = pcd_header(0x1234, 0, 4, 4);
        assert!(matches!(
            decode_embedded(&payload, "t"),
            Err(Error::UnsupportedPixelFormat { code: 0x1234 })
        ));
    }

    #[test]
    fn test_ps3_pcd() {
        let mut data = vec![0u8; PS3_DATA];
        data[0x18..0x1C].copy_from_slice(&PS3_PCD_MAGIC.to_le_bytes());
        data[0x1C..0x20].copy_from_slice(&4u32.to_be_bytes());
        data[0x24] = GCM_A8R8G8B8;
        data[0x2C..0x2E].copy_from_slice(&1u16.to_be_bytes());
        data[0x2E..0x30].copy_from_slice(&1u16.to_be_bytes());
        data.extend_from_slice(&[0xFF, 1, 2, 3]);

        assert!(is_pcd(&data));
        let texture = decode_pcd(&data).unwrap();
        assert_eq!((texture.width, texture.height), (1, 1));
        assert_eq!(texture.data, vec![1, 2, 3, 0xFF]);
    }
}
