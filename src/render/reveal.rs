use crate::{
    assets::{decode::PreparedImage, slot::AssetSlot},
    config::model::RevealConfig,
    foundation::{
        core::{Canvas, FrameTick, Point, Rect},
        error::RevealResult,
    },
    host::{
        event::{FrameRequest, HostEvent, ListenerKind},
        mount::Effect,
    },
    render::{
        backend::{FrameRGBA, MaskBackend},
        cpu::{CpuMaskBackend, GlowOpts},
        stroke::trail_dabs,
    },
    trail::{buffer::TrailBuffer, recorder},
};

/// Per-instance work counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RevealStats {
    /// Frames rendered.
    pub frames: u64,
    /// Frames that painted a stroke.
    pub strokes: u64,
    /// Frames that composited the reveal image.
    pub composites: u64,
    /// Trail points removed by decay.
    pub pruned: u64,
    /// Frames that hit a backend error and fell back to a clear surface.
    pub errors: u64,
}

/// Result of one rendered frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The surface was cleared and nothing else drawn.
    Cleared,
    /// The trail was painted and the image revealed through it.
    Revealed {
        /// Live trail points drawn this frame.
        points: usize,
    },
}

/// Pointer-trail "liquid reveal": the reveal image shows through a soft blob that follows
/// the pointer and fades out behind it.
pub struct LiquidReveal<B: MaskBackend = CpuMaskBackend> {
    cfg: RevealConfig,
    trail: TrailBuffer,
    image: AssetSlot<PreparedImage>,
    backend: B,
    stats: RevealStats,
}

impl LiquidReveal<CpuMaskBackend> {
    /// Renderer on the CPU backend, glow taken from `cfg`. Fails if `cfg` is out of range.
    pub fn new(cfg: RevealConfig, image: AssetSlot<PreparedImage>) -> RevealResult<Self> {
        let glow = GlowOpts {
            radius: cfg.glow_radius,
            sigma: cfg.glow_sigma,
        };
        Self::with_backend(cfg, image, CpuMaskBackend::new(glow))
    }
}

impl<B: MaskBackend> LiquidReveal<B> {
    /// Renderer on a caller-provided backend. Fails if `cfg` is out of range.
    pub fn with_backend(
        cfg: RevealConfig,
        image: AssetSlot<PreparedImage>,
        backend: B,
    ) -> RevealResult<Self> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            trail: TrailBuffer::new(),
            image,
            backend,
            stats: RevealStats::default(),
        })
    }

    /// Swap the reveal image, e.g. after its URL changed.
    pub fn set_image(&mut self, image: AssetSlot<PreparedImage>) {
        self.image = image;
    }

    /// The reveal image slot.
    pub fn image(&self) -> &AssetSlot<PreparedImage> {
        &self.image
    }

    /// Live trail.
    pub fn trail(&self) -> &TrailBuffer {
        &self.trail
    }

    /// Counters so far.
    pub fn stats(&self) -> &RevealStats {
        &self.stats
    }

    /// Settings in use.
    pub fn config(&self) -> &RevealConfig {
        &self.cfg
    }

    /// The raster backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Copy of the current surface.
    pub fn frame(&self) -> FrameRGBA {
        self.backend.readback()
    }

    /// Record a pointer sample against the container `bounds`.
    pub fn record(&mut self, client: Point, bounds: Rect) {
        recorder::record(&mut self.trail, client, bounds);
    }

    /// Match the surface to the container size.
    pub fn resize(&mut self, bounds: Rect) {
        if let Err(err) = self.backend.resize(Canvas::from_bounds(bounds)) {
            tracing::warn!(error = %err, "reveal surface resize failed; drawing disabled");
            // A failed resize must not leave a stale surface behind.
            let _ = self.backend.resize(Canvas::default());
        }
    }

    /// Clear, decay and prune, then paint and reveal if there is anything to show.
    ///
    /// Never fails: an unready image, an empty trail or a backend error all leave a clear
    /// surface.
    pub fn render_frame(&mut self) -> FrameOutcome {
        self.stats.frames += 1;
        self.backend.clear();
        self.stats.pruned += self.trail.decay(self.cfg.decay_rate) as u64;

        if self.trail.is_empty() {
            return FrameOutcome::Cleared;
        }
        let Some(image) = self.image.poll().cloned() else {
            return FrameOutcome::Cleared;
        };

        match self.paint(&image) {
            Ok(()) => FrameOutcome::Revealed {
                points: self.trail.len(),
            },
            Err(err) => {
                self.stats.errors += 1;
                tracing::warn!(error = %err, "reveal frame failed; surface cleared");
                self.backend.clear();
                FrameOutcome::Cleared
            }
        }
    }

    fn paint(&mut self, image: &PreparedImage) -> RevealResult<()> {
        let dabs = trail_dabs(self.trail.points(), self.cfg.brush_base_width);
        self.backend.paint_trail(&dabs)?;
        self.backend.composite_in(image)?;
        self.stats.strokes += 1;
        self.stats.composites += 1;
        Ok(())
    }
}

impl<B: MaskBackend> Effect for LiquidReveal<B> {
    fn listeners(&self) -> &'static [ListenerKind] {
        &[
            ListenerKind::PointerMove,
            ListenerKind::TouchMove,
            ListenerKind::Resize,
        ]
    }

    fn on_mount(&mut self, bounds: Rect) -> FrameRequest {
        self.resize(bounds);
        FrameRequest::Next
    }

    fn on_event(&mut self, event: &HostEvent, bounds: Rect) -> FrameRequest {
        match *event {
            HostEvent::PointerMove { client } | HostEvent::TouchMove { client } => {
                self.record(client, bounds);
            }
            HostEvent::Resize => self.resize(bounds),
            HostEvent::PointerLeave => {}
        }
        // The frame loop is already running.
        FrameRequest::Idle
    }

    #[tracing::instrument(
        level = "trace",
        skip(self, tick),
        fields(frame = tick.index, points = self.trail.len())
    )]
    fn on_frame(&mut self, tick: FrameTick) -> FrameRequest {
        self.render_frame();
        FrameRequest::Next
    }

    fn on_unmount(&mut self) {
        self.trail.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/reveal.rs"]
mod tests;
