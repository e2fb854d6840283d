use std::sync::Arc;

use crate::{
    animation::layer::{LayerAnimator, Transition},
    assets::loader::ImageLoader,
    config::model::ParallaxConfig,
    foundation::{
        core::{FrameTick, NormPoint, Rect, Vec2},
        error::RevealResult,
    },
    host::{
        event::{FrameRequest, HostEvent, ListenerKind},
        mount::Effect,
    },
    parallax::depth::DepthSampler,
};

/// Translation for a pointer at `pos` over a layer of the given `depth`.
///
/// `(pos - center) * depth * intensity`: zero at the center, and for any fixed offset
/// strictly larger in magnitude for brighter depth.
pub fn parallax_offset(pos: NormPoint, depth: f64, intensity: f64) -> Vec2 {
    pos.centered() * (depth * intensity)
}

/// One offset computation.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ParallaxSample {
    /// Normalized pointer position.
    pub pos: NormPoint,
    /// Sampled depth in `[0, 1]`.
    pub depth: f64,
    /// Resulting layer translation in pixels.
    pub offset: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Intent {
    Track(NormPoint),
    Leave,
}

/// Moves a layer against the pointer, scaled by the depth under it.
///
/// Pointer events only store the latest intent; the offset is computed at most once per
/// animation frame. Leaving the container eases the layer back to the origin.
pub struct DepthParallax {
    cfg: ParallaxConfig,
    loader: Option<Arc<dyn ImageLoader>>,
    sampler: Option<DepthSampler>,
    pending: Option<Intent>,
    layer: LayerAnimator,
    now_ms: f64,
    last: Option<ParallaxSample>,
    computations: u64,
}

impl std::fmt::Debug for DepthParallax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DepthParallax")
            .field("enabled", &self.cfg.enabled)
            .field("sampler", &self.sampler)
            .field("now_ms", &self.now_ms)
            .field("computations", &self.computations)
            .finish_non_exhaustive()
    }
}

impl DepthParallax {
    /// Start decoding `depth_url` through `loader`. A disabled config decodes nothing.
    ///
    /// Fails if `cfg` is out of range.
    pub fn new(
        cfg: ParallaxConfig,
        loader: Arc<dyn ImageLoader>,
        depth_url: impl Into<String>,
    ) -> RevealResult<Self> {
        cfg.validate()?;
        let sampler = cfg
            .enabled
            .then(|| DepthSampler::load(loader.clone(), depth_url));
        Ok(Self::build(cfg, Some(loader), sampler))
    }

    /// Use an existing sampler. It is discarded when the config is disabled.
    pub fn with_sampler(cfg: ParallaxConfig, sampler: DepthSampler) -> RevealResult<Self> {
        cfg.validate()?;
        let sampler = cfg.enabled.then_some(sampler);
        Ok(Self::build(cfg, None, sampler))
    }

    fn build(
        cfg: ParallaxConfig,
        loader: Option<Arc<dyn ImageLoader>>,
        sampler: Option<DepthSampler>,
    ) -> Self {
        Self {
            cfg,
            loader,
            sampler,
            pending: None,
            layer: LayerAnimator::new(),
            now_ms: 0.0,
            last: None,
            computations: 0,
        }
    }

    /// Point the mapper at another depth map. Decodes again only if `url` differs from the
    /// current source; returns whether a decode started.
    pub fn set_depth_url(&mut self, url: &str) -> bool {
        if !self.cfg.enabled {
            return false;
        }
        if self.sampler.as_ref().is_some_and(|s| s.url() == url) {
            return false;
        }
        let Some(loader) = self.loader.clone() else {
            tracing::warn!(url, "no image loader attached; depth map unchanged");
            return false;
        };
        tracing::debug!(url, "depth map source changed");
        self.sampler = Some(DepthSampler::load(loader, url));
        true
    }

    /// Whether the mapper does anything at all.
    pub fn is_enabled(&self) -> bool {
        self.cfg.enabled
    }

    /// Settings in use.
    pub fn config(&self) -> &ParallaxConfig {
        &self.cfg
    }

    /// Depth sampler, absent when disabled.
    pub fn sampler(&self) -> Option<&DepthSampler> {
        self.sampler.as_ref()
    }

    /// Mutable depth sampler, e.g. to wait for decode in offline drivers.
    pub fn sampler_mut(&mut self) -> Option<&mut DepthSampler> {
        self.sampler.as_mut()
    }

    /// Sample depth at `pos` and compute the resulting offset.
    ///
    /// `pos` is clamped to the container first; NaN components map to the near edge.
    pub fn sample_at(&mut self, pos: NormPoint) -> ParallaxSample {
        let clamp = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        let pos = NormPoint::new(clamp(pos.x), clamp(pos.y));
        let depth = match self.sampler.as_mut() {
            Some(s) => s.depth_at(pos.x, pos.y),
            None => 0.0,
        };
        ParallaxSample {
            pos,
            depth,
            offset: parallax_offset(pos, depth, self.cfg.intensity),
        }
    }

    /// Displayed translation as of the last frame.
    pub fn translation(&self) -> Vec2 {
        self.layer.sample(self.now_ms)
    }

    /// Displayed translation at an arbitrary host time.
    pub fn translation_at(&self, now_ms: f64) -> Vec2 {
        self.layer.sample(now_ms)
    }

    /// Translation the layer is heading to.
    pub fn target(&self) -> Vec2 {
        self.layer.target()
    }

    /// Transition currently driving the layer.
    pub fn transition(&self) -> Transition {
        self.layer.transition()
    }

    /// Most recent offset computation.
    pub fn last_sample(&self) -> Option<ParallaxSample> {
        self.last
    }

    /// Offset computations so far.
    pub fn computations(&self) -> u64 {
        self.computations
    }
}

impl Effect for DepthParallax {
    fn listeners(&self) -> &'static [ListenerKind] {
        if !self.cfg.enabled {
            return &[];
        }
        &[
            ListenerKind::PointerMove,
            ListenerKind::TouchMove,
            ListenerKind::PointerLeave,
        ]
    }

    fn on_mount(&mut self, _bounds: Rect) -> FrameRequest {
        FrameRequest::Idle
    }

    fn on_event(&mut self, event: &HostEvent, bounds: Rect) -> FrameRequest {
        if !self.cfg.enabled {
            return FrameRequest::Idle;
        }
        let intent = match *event {
            HostEvent::PointerMove { client } | HostEvent::TouchMove { client } => {
                Intent::Track(NormPoint::from_client(client, bounds))
            }
            HostEvent::PointerLeave => Intent::Leave,
            HostEvent::Resize => return FrameRequest::Idle,
        };
        self.pending = Some(intent);
        FrameRequest::Next
    }

    fn on_frame(&mut self, tick: FrameTick) -> FrameRequest {
        self.now_ms = tick.time_ms;
        match self.pending.take() {
            Some(Intent::Track(pos)) => {
                let sample = self.sample_at(pos);
                self.computations += 1;
                self.last = Some(sample);
                self.layer
                    .retarget(sample.offset, self.cfg.track_transition(), self.now_ms);
                tracing::trace!(
                    x = pos.x,
                    y = pos.y,
                    depth = sample.depth,
                    "parallax offset updated"
                );
            }
            Some(Intent::Leave) => {
                self.layer
                    .retarget(Vec2::ZERO, self.cfg.settle_transition(), self.now_ms);
            }
            None => {}
        }
        if self.layer.is_settled(self.now_ms) {
            FrameRequest::Idle
        } else {
            FrameRequest::Next
        }
    }

    fn on_unmount(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/parallax/mapper.rs"]
mod tests;
