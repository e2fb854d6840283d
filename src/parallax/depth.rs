use std::sync::Arc;

use crate::{
    assets::{
        loader::ImageLoader,
        slot::{AssetSlot, SlotStatus},
    },
    foundation::{
        error::{RevealError, RevealResult},
        math::norm_to_index,
    },
};

/// Depth returned while no depth map is available.
pub const NEUTRAL_DEPTH: f64 = 0.5;

/// Decoded single-channel depth map; brighter pixels are closer to the viewer.
///
/// Immutable after construction, so a shared `Arc<DepthBuffer>` can be sampled freely.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepthBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl DepthBuffer {
    /// Wrap row-major luma samples.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> RevealResult<Self> {
        if width == 0 || height == 0 {
            return Err(RevealError::validation("depth map must be non-empty"));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| RevealError::validation("depth map size overflow"))?;
        if data.len() != expected {
            return Err(RevealError::validation(format!(
                "depth map expects {expected} samples, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw row-major samples.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Depth in `[0, 1]` of the pixel under normalized `(nx, ny)`.
    ///
    /// Coordinates outside `[0, 1]` clamp to the edge pixel.
    pub fn depth_at(&self, nx: f64, ny: f64) -> f64 {
        let px = norm_to_index(nx, self.width);
        let py = norm_to_index(ny, self.height);
        f64::from(self.data[py * self.width as usize + px]) / 255.0
    }
}

/// Depth lookups against a map that may still be decoding.
#[derive(Debug)]
pub struct DepthSampler {
    slot: AssetSlot<DepthBuffer>,
}

impl DepthSampler {
    /// Start decoding `url` in the background.
    pub fn load(loader: Arc<dyn ImageLoader>, url: impl Into<String>) -> Self {
        Self {
            slot: AssetSlot::load_depth(loader, url),
        }
    }

    /// Sample an already decoded buffer.
    pub fn from_buffer(url: impl Into<String>, buffer: DepthBuffer) -> Self {
        Self {
            slot: AssetSlot::ready(url, buffer),
        }
    }

    /// Source URL of the depth map.
    pub fn url(&self) -> &str {
        self.slot.url()
    }

    /// Decode status.
    pub fn status(&self) -> SlotStatus {
        self.slot.status()
    }

    /// Block until decoding settles. For offline drivers only.
    pub fn wait(&mut self) -> SlotStatus {
        self.slot.wait();
        self.slot.status()
    }

    /// Depth at `(nx, ny)`, or [`NEUTRAL_DEPTH`] until the map is decoded.
    pub fn depth_at(&mut self, nx: f64, ny: f64) -> f64 {
        match self.slot.poll() {
            Some(buffer) => buffer.depth_at(nx, ny),
            None => NEUTRAL_DEPTH,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/parallax/depth.rs"]
mod tests;
