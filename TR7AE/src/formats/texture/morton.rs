//! Z-order (Morton) pixel layout of PS3 textures

/// Morton index of pixel (`x`, `y`): `x` bits in even positions, `y` bits in odd.
pub fn morton_index(x: u32, y: u32) -> usize {
    (spread_bits(x) | (spread_bits(y) << 1)) as usize
}

/// Spread the low 32 bits of `v` into the even bits of a `u64`.
fn spread_bits(v: u32) -> u64 {
    let mut v = u64::from(v);
    v = (v | (v << 16)) & 0x0000_FFFF_0000_FFFF;
    v = (v | (v << 8)) & 0x00FF_00FF_00FF_00FF;
    v = (v | (v << 4)) & 0x0F0F_0F0F_0F0F_0F0F;
    v = (v | (v << 2)) & 0x3333_3333_3333_3333;
    v = (v | (v << 1)) & 0x5555_5555_5555_5555;
    v
}

/// Re-linearize a twiddled buffer of `bytes_per_pixel`-sized pixels.
///
/// The result is always `width * height * bytes_per_pixel` bytes, row-major.
/// Pixels whose Morton index falls outside `src` stay zero.
pub fn untwiddle(src: &[u8], width: u32, height: u32, bytes_per_pixel: usize) -> Vec<u8> {
    let mut out = vec![0u8; width as usize * height as usize * bytes_per_pixel];
    for row in 0..height {
        for col in 0..width {
            let from = morton_index(col, row) * bytes_per_pixel;
            let Some(pixel) = src.get(from..from + bytes_per_pixel) else {
                continue;
            };
            let to = (row as usize * width as usize + col as usize) * bytes_per_pixel;
            out[to..to + bytes_per_pixel].copy_from_slice(pixel);
        }
    }
    out
}
