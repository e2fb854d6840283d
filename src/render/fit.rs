use crate::foundation::core::{Affine, Vec2};

/// Placement of an image scaled to cover a surface while keeping its aspect ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverFit {
    /// Uniform scale applied to the image.
    pub scale: f64,
    /// Top-left corner of the scaled image in surface pixels.
    pub offset: Vec2,
    /// Scaled image size.
    pub size: Vec2,
}

impl CoverFit {
    /// Fit an `image_w × image_h` image over a `surface_w × surface_h` surface.
    ///
    /// The scale is the larger of the width and height ratios; the overflowing axis is centered.
    /// Returns `None` for empty inputs.
    pub fn compute(image_w: u32, image_h: u32, surface_w: u32, surface_h: u32) -> Option<Self> {
        if image_w == 0 || image_h == 0 || surface_w == 0 || surface_h == 0 {
            return None;
        }
        let (iw, ih) = (f64::from(image_w), f64::from(image_h));
        let (sw, sh) = (f64::from(surface_w), f64::from(surface_h));
        let scale = (sw / iw).max(sh / ih);
        let size = Vec2::new(iw * scale, ih * scale);
        Some(Self {
            scale,
            offset: Vec2::new((sw - size.x) / 2.0, (sh - size.y) / 2.0),
            size,
        })
    }

    /// Image-space to surface-space transform.
    pub fn to_affine(self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/fit.rs"]
mod tests;
