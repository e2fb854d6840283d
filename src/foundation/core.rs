use crate::foundation::error::{RevealError, RevealResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Drawing surface dimensions in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Canvas covering `bounds`, rounded to whole pixels.
    ///
    /// Negative or non-finite extents collapse to zero.
    pub fn from_bounds(bounds: Rect) -> Self {
        fn px(v: f64) -> u32 {
            if v.is_finite() && v > 0.0 {
                v.round().min(f64::from(u32::MAX)) as u32
            } else {
                0
            }
        }
        Self {
            width: px(bounds.width()),
            height: px(bounds.height()),
        }
    }

    /// `true` when either side is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Dimensions as `u16`, the limit of the CPU rasterizer.
    pub fn to_u16(self) -> RevealResult<(u16, u16)> {
        let w: u16 = self
            .width
            .try_into()
            .map_err(|_| RevealError::evaluation("surface width exceeds u16"))?;
        let h: u16 = self
            .height
            .try_into()
            .map_err(|_| RevealError::evaluation("surface height exceeds u16"))?;
        Ok((w, h))
    }
}

/// Pointer position normalized to `[0, 1]` per axis relative to a container.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NormPoint {
    /// Horizontal position, 0 at the left edge.
    pub x: f64,
    /// Vertical position, 0 at the top edge.
    pub y: f64,
}

impl NormPoint {
    /// The container center.
    pub const CENTER: Self = Self { x: 0.5, y: 0.5 };

    /// Construct from raw components.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Normalize a client-space point against container `bounds`.
    ///
    /// Results are clamped to `[0, 1]`. Degenerate bounds map to the center on that axis.
    pub fn from_client(client: Point, bounds: Rect) -> Self {
        fn axis(v: f64, lo: f64, extent: f64) -> f64 {
            if !(extent.is_finite() && extent > 0.0) {
                return 0.5;
            }
            ((v - lo) / extent).clamp(0.0, 1.0)
        }
        Self {
            x: axis(client.x, bounds.x0, bounds.width()),
            y: axis(client.y, bounds.y0, bounds.height()),
        }
    }

    /// Offset from the container center, `(x - 0.5, y - 0.5)`.
    pub fn centered(self) -> Vec2 {
        Vec2::new(self.x - 0.5, self.y - 0.5)
    }
}

/// Monotonic frame counter plus host timestamp handed to every frame callback.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTick {
    /// 0-based frame index since the host started.
    pub index: u64,
    /// Host timestamp in milliseconds.
    pub time_ms: f64,
}

impl FrameTick {
    /// Tick for frame `index` at a fixed refresh rate.
    pub fn at_rate(index: u64, hz: f64) -> Self {
        let hz = if hz.is_finite() && hz > 0.0 { hz } else { 60.0 };
        Self {
            index,
            time_ms: (index as f64) * 1000.0 / hz,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
