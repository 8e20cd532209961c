//! BC1/BC3 block compression

use crate::formats::texture::bc::{bc1_palette, BcFormat};

/// Compress RGBA8 pixels into BC1 or BC3 blocks.
pub fn encode_bc(pixels: &[u8], width: usize, height: usize, format: BcFormat) -> Vec<u8> {
    let blocks_x = width.div_ceil(4);
    let blocks_y = height.div_ceil(4);
    let block_size = format.block_size();
    let mut output = vec![0u8; blocks_x * blocks_y * block_size];

    for by in 0..blocks_y {
        for bx in 0..blocks_x {
            let block = extract_block(pixels, width, height, bx * 4, by * 4);
            let offset = (by * blocks_x + bx) * block_size;
            match format {
                BcFormat::Bc1 => output[offset..offset + 8].copy_from_slice(&encode_bc1_block(&block)),
                BcFormat::Bc3 => {
                    output[offset..offset + 8].copy_from_slice(&encode_bc3_alpha_block(&block));
                    output[offset + 8..offset + 16].copy_from_slice(&encode_bc1_block(&block));
                }
            }
        }
    }

    output
}

// ============================================================================
// BC1 (DXT1) Encoding
// ============================================================================

/// Encode a 4x4 block to BC1 (8 bytes), always in four-colour mode.
fn encode_bc1_block(block: &[[u8; 4]; 16]) -> [u8; 8] {
    let (c0, c1) = find_endpoint_colors(block);
    let (c0, c1) = if c0 >= c1 { (c0, c1) } else { (c1, c0) };

    let mut indices: u32 = 0;
    if c0 != c1 {
        let colors = bc1_palette(c0, c1);
        for (i, pixel) in block.iter().enumerate() {
            indices |= u32::from(find_closest_color(pixel, &colors)) << (i * 2);
        }
    }

    let mut output = [0u8; 8];
    output[0..2].copy_from_slice(&c0.to_le_bytes());
    output[2..4].copy_from_slice(&c1.to_le_bytes());
    output[4..8].copy_from_slice(&indices.to_le_bytes());
    output
}

/// Brightest and darkest pixel of the block as RGB565.
fn find_endpoint_colors(block: &[[u8; 4]; 16]) -> (u16, u16) {
    let luminance = |p: &[u8; 4]| u32::from(p[0]) + u32::from(p[1]) + u32::from(p[2]);
    let (mut min_pixel, mut max_pixel) = (block[0], block[0]);
    for pixel in block {
        if luminance(pixel) < luminance(&min_pixel) {
            min_pixel = *pixel;
        }
        if luminance(pixel) > luminance(&max_pixel) {
            max_pixel = *pixel;
        }
    }
    (
        rgb_to_565(max_pixel[0], max_pixel[1], max_pixel[2]),
        rgb_to_565(min_pixel[0], min_pixel[1], min_pixel[2]),
    )
}

pub fn rgb_to_565(r: u8, g: u8, b: u8) -> u16 {
    (u16::from(r >> 3) << 11) | (u16::from(g >> 2) << 5) | u16::from(b >> 3)
}

fn find_closest_color(pixel: &[u8; 4], palette: &[[u8; 4]; 4]) -> u8 {
    let distance = |color: &[u8; 4]| -> i32 {
        (0..3)
            .map(|c| {
                let d = i32::from(pixel[c]) - i32::from(color[c]);
                d * d
            })
            .sum()
    };
    palette
        .iter()
        .enumerate()
        .min_by_key(|(_, color)| distance(color))
        .map_or(0, |(i, _)| i as u8)
}

// ============================================================================
// BC3 (DXT5) Encoding
// ============================================================================

/// Encode the alpha half of a BC3 block (8 bytes), eight-value mode.
fn encode_bc3_alpha_block(block: &[[u8; 4]; 16]) -> [u8; 8] {
    let a0 = block.iter().map(|p| p[3]).max().unwrap_or(255);
    let a1 = block.iter().map(|p| p[3]).min().unwrap_or(255);

    let mut alphas = [a0, a1, 0, 0, 0, 0, 0, 0];
    if a0 > a1 {
        for (i, alpha) in alphas.iter_mut().enumerate().skip(2) {
            let w = i as u16 - 1;
            *alpha = (((7 - w) * u16::from(a0) + w * u16::from(a1)) / 7) as u8;
        }
    }

    let mut indices: u64 = 0;
    for (i, pixel) in block.iter().enumerate() {
        let best = alphas
            .iter()
            .enumerate()
            .min_by_key(|(_, a)| (i32::from(pixel[3]) - i32::from(**a)).abs())
            .map_or(0, |(j, _)| j as u64);
        indices |= best << (i * 3);
    }

    let mut output = [0u8; 8];
    output[0] = a0;
    output[1] = a1;
    output[2..8].copy_from_slice(&indices.to_le_bytes()[..6]);
    output
}

// ============================================================================
// Shared Helpers
// ============================================================================

/// Extract a 4x4 block of RGBA pixels, padding with edge pixels if needed
fn extract_block(pixels: &[u8], width: usize, height: usize, x: usize, y: usize) -> [[u8; 4]; 16] {
    let mut block = [[0u8; 4]; 16];
    for py in 0..4 {
        for px in 0..4 {
            let sx = (x + px).min(width - 1);
            let sy = (y + py).min(height - 1);
            let src = (sy * width + sx) * 4;
            block[py * 4 + px].copy_from_slice(&pixels[src..src + 4]);
        }
    }
    block
}
