pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Checked `width * height * 4` for tightly packed RGBA8 buffers.
pub(crate) fn rgba8_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
}

/// Map a normalized coordinate onto `[0, len - 1]` by flooring `n * len`.
///
/// `len` must be non-zero. NaN maps to index 0.
pub(crate) fn norm_to_index(n: f64, len: u32) -> usize {
    let max = i64::from(len) - 1;
    let idx = (n * f64::from(len)).floor() as i64;
    idx.clamp(0, max) as usize
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
