//! Block-compressed (DXT) pixel decoding using `bcdec_rs`

/// Block-compressed layouts found in PCD textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BcFormat {
    Bc1, // DXT1 - 8 bytes per 4x4 block
    Bc3, // DXT5 - 16 bytes per 4x4 block
}

impl BcFormat {
    pub const fn block_size(self) -> usize {
        match self {
            Self::Bc1 => 8,
            Self::Bc3 => 16,
        }
    }

    /// Byte size of one mip level of `width` x `height`.
    pub fn level_size(self, width: usize, height: usize) -> usize {
        width.div_ceil(4) * height.div_ceil(4) * self.block_size()
    }
}

/// Decode the first `width` x `height` level of `data` to RGBA8.
///
/// Blocks missing from a short buffer are left transparent black.
pub fn decode_bc(data: &[u8], width: usize, height: usize, format: BcFormat) -> Vec<u8> {
    let mut rgba = vec![0u8; width * height * 4];
    let blocks_x = width.div_ceil(4);
    let blocks_y = height.div_ceil(4);
    let block_size = format.block_size();

    // One decoded 4x4 block, 16 bytes per row
    let mut block_rgba = [0u8; 64];
    let block_pitch = 16;

    for by in 0..blocks_y {
        for bx in 0..blocks_x {
            let block_idx = (by * blocks_x + bx) * block_size;
            let Some(block) = data.get(block_idx..block_idx + block_size) else {
                break;
            };

            match format {
                BcFormat::Bc1 => bcdec_rs::bc1(block, &mut block_rgba, block_pitch),
                BcFormat::Bc3 => bcdec_rs::bc3(block, &mut block_rgba, block_pitch),
            }

            for py in 0..4 {
                for px in 0..4 {
                    let fx = bx * 4 + px;
                    let fy = by * 4 + py;
                    if fx >= width || fy >= height {
                        continue;
                    }
                    let src_idx = (py * 4 + px) * 4;
                    let dst_idx = (fy * width + fx) * 4;
                    rgba[dst_idx..dst_idx + 4].copy_from_slice(&block_rgba[src_idx..src_idx + 4]);
                }
            }
        }
    }

    rgba
}

/// Four-entry BC1 palette for endpoints `c0`, `c1` (opaque mode when `c0 > c1`).
pub fn bc1_palette(c0: u16, c1: u16) -> [[u8; 4]; 4] {
    let expand = |c: u16| -> [u16; 3] {
        let r = (c >> 11) & 0x1F;
        let g = (c >> 5) & 0x3F;
        let b = c & 0x1F;
        [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2)]
    };
    let a = expand(c0);
    let b = expand(c1);
    let mix = |wa: u16, wb: u16, div: u16| -> [u8; 4] {
        [
            ((a[0] * wa + b[0] * wb) / div) as u8,
            ((a[1] * wa + b[1] * wb) / div) as u8,
            ((a[2] * wa + b[2] * wb) / div) as u8,
            255,
        ]
    };
    let solid = |c: [u16; 3]| [c[0] as u8, c[1] as u8, c[2] as u8, 255];

    if c0 > c1 {
        [solid(a), solid(b), mix(2, 1, 3), mix(1, 2, 3)]
    } else {
        [solid(a), solid(b), mix(1, 1, 2), [0, 0, 0, 0]]
    }
}
