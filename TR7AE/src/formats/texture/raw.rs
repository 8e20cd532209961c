//! RAW textures
//!
//! A 128-byte header (`"!WAR"` magic, pixel-data offset `0x80` at +4, data
//! size at +8, width and height as `i32` at +0x14 and +0x18) followed by
//! uncompressed pixels. PC files store BGRA8 rows; PS3 files store the
//! header big-endian and ARGB8 pixels in Morton order.

use byteorder::ByteOrder;
use tracing::debug;

use super::morton::untwiddle;
use super::pcd::{argb_to_rgba, bgra_to_rgba};
use super::types::{PixelFormat, Texture};
use crate::error::{Error, Result};
use crate::formats::common::{BeView, ByteView, LeView};

pub const RAW_MAGIC: u32 = 0x52415721;
pub const RAW_HEADER_SIZE: usize = 0x80;

/// The pixel-data offset word at +4 as read little-endian on each platform.
const PC_DATA_OFFSET: u32 = 0x80;
const PS3_DATA_OFFSET: u32 = 0x8000_0000;

pub fn is_raw(data: &[u8]) -> bool {
    LeView::new(data).peek_u32(4) == Some(PC_DATA_OFFSET)
}

pub fn is_ps3_raw(data: &[u8]) -> bool {
    LeView::new(data).peek_u32(4) == Some(PS3_DATA_OFFSET)
}

/// `(width, height, pixel bytes)` of a RAW header in byte order `E`.
fn read_header<'a, E: ByteOrder>(view: &ByteView<'a, E>) -> Result<(u32, u32, &'a [u8])> {
    let size = view.u32_at(8)? as usize;
    let dimension = |at: usize| -> Result<u32> {
        let value = view.i32_at(at)?;
        u32::try_from(value)
            .map_err(|_| Error::malformed(format!("RAW texture has dimension {value}")))
    };
    let width = dimension(0x14)?;
    let height = dimension(0x18)?;
    Ok((width, height, view.bytes(RAW_HEADER_SIZE, size)?))
}

/// Decode a PC `.raw` texture (BGRA8).
pub fn decode_raw(data: &[u8]) -> Result<Texture> {
    if !is_raw(data) {
        return Err(Error::TypeMismatch {
            expected: "RAW pixel offset 0x80",
            found: format!("{:?}", LeView::new(data).peek_u32(4)),
        });
    }
    let (width, height, pixels) = read_header(&LeView::new(data))?;
    let top = top_level(pixels, width, height)?;
    debug!("RAW {width}x{height}");

    Ok(Texture {
        name: "Texture".to_string(),
        width,
        height,
        format: PixelFormat::Rgba8,
        mip_count: 0,
        data: bgra_to_rgba(top),
    })
}

/// Decode a PS3 `.raw` texture (big-endian header, twiddled ARGB8).
pub fn decode_ps3_raw(data: &[u8]) -> Result<Texture> {
    if !is_ps3_raw(data) {
        return Err(Error::TypeMismatch {
            expected: "PS3 RAW pixel offset 0x80 (big-endian)",
            found: format!("{:?}", LeView::new(data).peek_u32(4)),
        });
    }
    let (width, height, pixels) = read_header(&BeView::new(data))?;
    let linear = untwiddle(pixels, width, height, 4);
    debug!("PS3 RAW {width}x{height}, {} twiddled bytes", pixels.len());

    Ok(Texture {
        name: "Texture".to_string(),
        width,
        height,
        format: PixelFormat::Rgba8,
        mip_count: 0,
        data: argb_to_rgba(&linear),
    })
}

fn top_level(pixels: &[u8], width: u32, height: u32) -> Result<&[u8]> {
    let len = width as usize * height as usize * 4;
    pixels.get(..len).ok_or_else(|| {
        Error::malformed(format!(
            "RAW texture holds {} bytes, {width}x{height} needs {len}",
            pixels.len()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pc_raw(width: i32, height: i32, pixels: &[u8]) -> Vec<u8> {
        let mut data = vec![0u8; RAW_HEADER_SIZE];
        data[0..4].copy_from_slice(&RAW_MAGIC.to_le_bytes());
        data[4..8].copy_from_slice(&0x80u32.to_le_bytes());
        data[8..12].copy_from_slice(&(pixels.len() as u32).to_le_bytes());
        data[0x14..0x18].copy_from_slice(&width.to_le_bytes());
        data[0x18..0x1C].copy_from_slice(&height.to_le_bytes());
        data.extend_from_slice(pixels);
        data
    }

    #[test]
    fn test_pc_raw_bgra() {
        let data = pc_raw(1, 1, &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert!(is_raw(&data));
        assert!(!is_ps3_raw(&data));
        let texture = decode_raw(&data).unwrap();
        assert_eq!(texture.data, vec![3, 2, 1, 4]);
    }

    #[test]
    fn test_negative_dimension() {
        let data = pc_raw(-4, 1, &[0; 16]);
        assert!(matches!(
            decode_raw(&data),
            Err(Error::MalformedContainer { .. })
        ));
    }

    #[test]
    fn test_ps3_raw_2x2() {
        let mut data = vec![0u8; RAW_HEADER_SIZE];
        data[4..8].copy_from_slice(&0x80u32.to_be_bytes());
        data[8..12].copy_from_slice(&16u32.to_be_bytes());
        data[0x14..0x18].copy_from_slice(&2i32.to_be_bytes());
        data[0x18..0x1C].copy_from_slice(&2i32.to_be_bytes());
        // ARGB pixels in Morton order, red channel tags the linear index
        for tag in [0u8, 1, 2, 3] {
            data.extend_from_slice(&[255, tag, 0, 0]);
        }

        let texture = decode_ps3_raw(&data).unwrap();
        assert_eq!(texture.data.len(), 16);
        let reds: Vec<u8> = texture.data.chunks_exact(4).map(|p| p[0]).collect();
        assert_eq!(reds, vec![0, 1, 2, 3]);
        assert!(texture.data.chunks_exact(4).all(|p| p[3] == 255));
    }
}
