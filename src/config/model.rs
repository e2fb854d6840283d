use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context as _;

use crate::{
    animation::{ease::Ease, layer::Transition},
    foundation::error::{RevealError, RevealResult},
};

/// Top-level effect configuration, usually read from a JSON file.
///
/// Every field has a default, so `{}` is a valid document.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EffectsConfig {
    /// Liquid reveal trail settings.
    pub reveal: RevealConfig,
    /// Depth parallax settings.
    pub parallax: ParallaxConfig,
}

impl EffectsConfig {
    /// Read and validate a JSON config file.
    pub fn from_json_path(path: &Path) -> RevealResult<Self> {
        let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| RevealError::serde(format!("parse config '{}': {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse and validate a JSON config string.
    pub fn from_json_str(s: &str) -> RevealResult<Self> {
        let cfg: Self =
            serde_json::from_str(s).map_err(|e| RevealError::serde(format!("parse config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check every section.
    pub fn validate(&self) -> RevealResult<()> {
        self.reveal.validate()?;
        self.parallax.validate()
    }
}

/// Settings for the pointer trail renderer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RevealConfig {
    /// Age removed from every trail point per frame. At 60 Hz, 0.015 keeps a point for ~1.1 s.
    pub decay_rate: f64,
    /// Stroke width in pixels for a point at full age.
    pub brush_base_width: f64,
    /// Gaussian radius in pixels of the glow that merges overlapping strokes.
    pub glow_radius: u32,
    /// Gaussian sigma of the glow.
    pub glow_sigma: f32,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            decay_rate: 0.015,
            brush_base_width: 80.0,
            glow_radius: 15,
            glow_sigma: 7.5,
        }
    }
}

impl RevealConfig {
    /// Check ranges.
    pub fn validate(&self) -> RevealResult<()> {
        if !(self.decay_rate.is_finite() && self.decay_rate > 0.0 && self.decay_rate <= 1.0) {
            return Err(RevealError::validation(
                "reveal.decay_rate must be in (0, 1]",
            ));
        }
        if !(self.brush_base_width.is_finite() && self.brush_base_width > 0.0) {
            return Err(RevealError::validation(
                "reveal.brush_base_width must be > 0",
            ));
        }
        if self.glow_radius > 0 && !(self.glow_sigma.is_finite() && self.glow_sigma > 0.0) {
            return Err(RevealError::validation(
                "reveal.glow_sigma must be > 0 when glow_radius is set",
            ));
        }
        Ok(())
    }

    /// Frames a freshly recorded point stays in the buffer.
    pub fn lifetime_frames(&self) -> u64 {
        (1.0 / self.decay_rate).ceil() as u64
    }
}

/// Settings for the depth-sampled parallax mapper.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParallaxConfig {
    /// When false the mapper decodes nothing, registers no listeners and never moves the layer.
    pub enabled: bool,
    /// Translation in pixels at maximum offset and full depth.
    pub intensity: f64,
    /// Duration of the pointer-tracking transition.
    pub track_ms: f64,
    /// Duration of the return-to-origin transition after the pointer leaves.
    pub settle_ms: f64,
    /// Curve of the tracking transition.
    pub track_ease: Ease,
    /// Curve of the settle transition.
    pub settle_ease: Ease,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            intensity: 20.0,
            track_ms: 100.0,
            settle_ms: 600.0,
            track_ease: Ease::OutQuad,
            settle_ease: Ease::OutCubic,
        }
    }
}

impl ParallaxConfig {
    /// Check ranges. The settle transition must be slower than tracking.
    pub fn validate(&self) -> RevealResult<()> {
        if !self.intensity.is_finite() {
            return Err(RevealError::validation("parallax.intensity must be finite"));
        }
        for (name, v) in [("track_ms", self.track_ms), ("settle_ms", self.settle_ms)] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(RevealError::validation(format!(
                    "parallax.{name} must be finite and >= 0"
                )));
            }
        }
        if self.settle_ms <= self.track_ms {
            return Err(RevealError::validation(
                "parallax.settle_ms must be greater than parallax.track_ms",
            ));
        }
        Ok(())
    }

    /// Transition used while the pointer moves.
    pub fn track_transition(&self) -> Transition {
        Transition {
            duration_ms: self.track_ms,
            ease: self.track_ease,
        }
    }

    /// Transition used when the pointer leaves.
    pub fn settle_transition(&self) -> Transition {
        Transition {
            duration_ms: self.settle_ms,
            ease: self.settle_ease,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/model.rs"]
mod tests;
