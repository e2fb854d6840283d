use std::sync::Arc;

use anyhow::Context;

use crate::{foundation::error::RevealResult, parallax::depth::DepthBuffer};

/// Decoded raster image in premultiplied RGBA8.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Tightly packed premultiplied RGBA8 bytes, shared between frames.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> RevealResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(prepare_image(dyn_img))
}

/// Convert an already decoded image to premultiplied RGBA8.
pub fn prepare_image(img: image::DynamicImage) -> PreparedImage {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    }
}

/// Decode a depth map from encoded bytes. Color inputs are reduced to luma.
pub fn decode_depth_map(bytes: &[u8]) -> RevealResult<DepthBuffer> {
    let dyn_img = image::load_from_memory(bytes).context("decode depth map from memory")?;
    prepare_depth_map(dyn_img)
}

/// Reduce a decoded image to a single-channel depth buffer.
pub fn prepare_depth_map(img: image::DynamicImage) -> RevealResult<DepthBuffer> {
    let luma = img.to_luma8();
    let (width, height) = luma.dimensions();
    DepthBuffer::new(width, height, luma.into_raw())
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

/// Inverse of premultiplication, used before writing PNG files.
pub fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u16 * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
