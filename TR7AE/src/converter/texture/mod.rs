//! Texture ↔ PNG conversion
//!
//! Decoding goes through [`decode_texture`]; encoding writes a new pixel
//! chain over an existing `.pcd` or `.raw` file, keeping its header and
//! patching size, dimensions and mip count.

mod encode;

use std::fs;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::formats::common::fourcc;
use crate::formats::texture::bc::BcFormat;
use crate::formats::texture::pcd::{FORMAT_DXT1, FORMAT_DXT5, PCD_HEADER_SIZE, STANDALONE_PCD_OFFSET};
use crate::formats::texture::raw::{RAW_HEADER_SIZE, RAW_MAGIC};
use crate::formats::texture::{decode_texture, Texture, TextureKind};

pub use encode::{encode_bc, rgb_to_565};

/// Header bytes kept from a `.pcd` template: `"SECT"` header plus PCD header.
const PCD_TEMPLATE_SIZE: usize = STANDALONE_PCD_OFFSET + PCD_HEADER_SIZE;

// Absolute offsets inside a standalone `.pcd`.
const PCD_SECTION_SIZE: usize = 0x04;
const PCD_DATA_SIZE: usize = 0x20;
const PCD_WIDTH: usize = 0x28;
const PCD_HEIGHT: usize = 0x2A;
const PCD_MIP_COUNT: usize = 0x2D;

const RAW_DATA_SIZE: usize = 0x08;
const RAW_WIDTH: usize = 0x14;
const RAW_HEIGHT: usize = 0x18;

/// Encode `image` over a PC `.pcd` or `.raw` template.
///
/// PCD keeps the template's DXT1/DXT5 format; RAW is written as BGRA8.
/// Both get a full mip chain down to 1x1.
pub fn encode_texture(image: &RgbaImage, template: &[u8]) -> Result<Vec<u8>> {
    if image.width() == 0 || image.height() == 0 {
        return Err(Error::Image {
            message: "cannot encode an empty image".to_string(),
        });
    }
    match TextureKind::detect(template) {
        Some(TextureKind::Pcd) => encode_pcd(image, template),
        Some(TextureKind::Raw) => encode_raw(image, template),
        Some(kind) => Err(Error::TypeMismatch {
            expected: "PC PCD or RAW template",
            found: format!("{kind:?}"),
        }),
        None => Err(Error::template("not a PCD or RAW texture")),
    }
}

/// Every level from full size down to 1x1, each resampled from `image`.
pub fn mip_chain(image: &RgbaImage) -> Vec<RgbaImage> {
    let (mut width, mut height) = image.dimensions();
    let mut levels = vec![image.clone()];
    while width > 1 || height > 1 {
        width = (width / 2).max(1);
        height = (height / 2).max(1);
        levels.push(imageops::resize(image, width, height, FilterType::Triangle));
    }
    levels
}

fn encode_pcd(image: &RgbaImage, template: &[u8]) -> Result<Vec<u8>> {
    let header = template
        .get(..PCD_TEMPLATE_SIZE)
        .ok_or_else(|| Error::template("PCD header is truncated"))?;
    let format = match LittleEndian::read_u32(&header[STANDALONE_PCD_OFFSET + 4..]) {
        FORMAT_DXT1 => BcFormat::Bc1,
        FORMAT_DXT5 => BcFormat::Bc3,
        code => return Err(Error::UnsupportedPixelFormat { code }),
    };
    let width = dimension_u16(image.width())?;
    let height = dimension_u16(image.height())?;

    let levels = mip_chain(image);
    let mut output = header.to_vec();
    for level in &levels {
        let (w, h) = level.dimensions();
        output.extend_from_slice(&encode_bc(level.as_raw(), w as usize, h as usize, format));
    }

    let data_size = (output.len() - PCD_TEMPLATE_SIZE) as u32;
    LittleEndian::write_u32(&mut output[PCD_DATA_SIZE..], data_size);
    LittleEndian::write_u16(&mut output[PCD_WIDTH..], width);
    LittleEndian::write_u16(&mut output[PCD_HEIGHT..], height);
    output[PCD_MIP_COUNT] = levels.len() as u8;
    LittleEndian::write_u32(&mut output[PCD_SECTION_SIZE..], data_size + PCD_HEADER_SIZE as u32);

    debug!(
        "PCD {} {width}x{height}, {} mips, {data_size} bytes",
        fourcc(LittleEndian::read_u32(&output[STANDALONE_PCD_OFFSET + 4..])),
        levels.len()
    );
    Ok(output)
}

fn encode_raw(image: &RgbaImage, template: &[u8]) -> Result<Vec<u8>> {
    let header = template
        .get(..RAW_HEADER_SIZE)
        .ok_or_else(|| Error::template("RAW header is truncated"))?;
    if LittleEndian::read_u32(header) != RAW_MAGIC {
        return Err(Error::template("RAW template does not start with \"!WAR\""));
    }

    let levels = mip_chain(image);
    let mut output = header.to_vec();
    for level in &levels {
        for pixel in level.pixels() {
            let [r, g, b, a] = pixel.0;
            output.extend_from_slice(&[b, g, r, a]);
        }
    }

    let data_size = output.len() - RAW_HEADER_SIZE;
    let as_i32 = |value: usize, what: &'static str| {
        i32::try_from(value).map_err(|_| Error::ExportLimitExceeded {
            limit: what,
            actual: value,
            max: i32::MAX as usize,
        })
    };
    LittleEndian::write_i32(&mut output[RAW_DATA_SIZE..], as_i32(data_size, "RAW data size")?);
    LittleEndian::write_i32(&mut output[RAW_WIDTH..], as_i32(image.width() as usize, "texture width")?);
    LittleEndian::write_i32(&mut output[RAW_HEIGHT..], as_i32(image.height() as usize, "texture height")?);

    debug!("RAW {}x{}, {} mips", image.width(), image.height(), levels.len());
    Ok(output)
}

fn dimension_u16(value: u32) -> Result<u16> {
    u16::try_from(value).map_err(|_| Error::ExportLimitExceeded {
        limit: "texture dimension",
        actual: value as usize,
        max: usize::from(u16::MAX),
    })
}

/// Encode a decoded texture's top level as PNG bytes.
pub fn texture_to_png_bytes(texture: &Texture) -> Result<Vec<u8>> {
    let img = texture.to_image()?;
    let mut png_data = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_data);
    img.write_with_encoder(encoder)?;
    Ok(png_data)
}

/// Convert a `.pcd` or `.raw` file to PNG.
pub fn convert_texture_to_png<P: AsRef<Path>, Q: AsRef<Path>>(input: P, png_path: Q) -> Result<()> {
    let data = fs::read(input.as_ref())?;
    let texture = decode_texture(&data)?;
    let png = texture_to_png_bytes(&texture)?;
    fs::write(png_path.as_ref(), png)?;
    info!(
        "{} -> {} ({}x{})",
        input.as_ref().display(),
        png_path.as_ref().display(),
        texture.width,
        texture.height
    );
    Ok(())
}

/// Convert a PNG to a `.pcd` or `.raw` laid out like `template_path`.
///
/// The output is written only after encoding succeeded.
pub fn convert_png_to_texture<P: AsRef<Path>, T: AsRef<Path>, Q: AsRef<Path>>(
    png_path: P,
    template_path: T,
    output: Q,
) -> Result<()> {
    let template_path = template_path.as_ref();
    if !template_path.is_file() {
        return Err(Error::MissingReferenceTemplate {
            path: template_path.to_path_buf(),
        });
    }
    let template = fs::read(template_path)?;
    let image = image::open(png_path.as_ref())?.to_rgba8();
    let data = encode_texture(&image, &template)?;
    fs::write(output.as_ref(), data)?;
    info!("{} -> {}", png_path.as_ref().display(), output.as_ref().display());
    Ok(())
}
