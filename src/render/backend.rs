use crate::{
    assets::decode::{PreparedImage, unpremultiply_rgba8_in_place},
    foundation::{core::Canvas, error::RevealResult},
    render::stroke::StrokeDab,
};

/// A rendered surface as RGBA8 pixels.
///
/// Surfaces are **premultiplied alpha** end to end; the flag makes that explicit at API
/// boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// `true` when every pixel is fully transparent.
    pub fn is_clear(&self) -> bool {
        self.data.chunks_exact(4).all(|px| px[3] == 0)
    }

    /// Number of pixels with non-zero alpha.
    pub fn covered_pixels(&self) -> usize {
        self.data.chunks_exact(4).filter(|px| px[3] != 0).count()
    }

    /// Pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.data.get(i..i + 4).map(|px| [px[0], px[1], px[2], px[3]])
    }

    /// Convert to straight alpha, e.g. before encoding to PNG.
    pub fn into_straight(mut self) -> Self {
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut self.data);
            self.premultiplied = false;
        }
        self
    }
}

/// Drawing primitives the reveal renderer needs from a raster backend.
///
/// The surface holds the painted trail after [`MaskBackend::paint_trail`] and the masked
/// image after [`MaskBackend::composite_in`].
pub trait MaskBackend {
    /// Reallocate the surface. The new surface is clear.
    fn resize(&mut self, canvas: Canvas) -> RevealResult<()>;

    /// Current surface size.
    fn canvas(&self) -> Canvas;

    /// Make every pixel transparent.
    fn clear(&mut self);

    /// Paint soft-edged stroke segments onto the surface.
    fn paint_trail(&mut self, dabs: &[StrokeDab]) -> RevealResult<()>;

    /// Replace the surface with `image` (cover-fitted) kept only where the surface has coverage.
    fn composite_in(&mut self, image: &PreparedImage) -> RevealResult<()>;

    /// Copy out the surface.
    fn readback(&self) -> FrameRGBA;
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
