use crate::{animation::ease::Ease, foundation::core::Vec2};

/// Duration and curve used when a layer moves toward a new translation.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transition {
    /// Duration in milliseconds. Zero snaps immediately.
    pub duration_ms: f64,
    /// Progress curve.
    pub ease: Ease,
}

impl Transition {
    /// Jump straight to the target.
    pub const INSTANT: Self = Self {
        duration_ms: 0.0,
        ease: Ease::Linear,
    };
}

/// Eased translation of a single visual layer.
///
/// Retargeting mid-flight starts the new transition from the currently displayed value, so
/// the layer never jumps.
#[derive(Clone, Debug)]
pub struct LayerAnimator {
    from: Vec2,
    to: Vec2,
    start_ms: f64,
    transition: Transition,
}

impl Default for LayerAnimator {
    fn default() -> Self {
        Self {
            from: Vec2::ZERO,
            to: Vec2::ZERO,
            start_ms: 0.0,
            transition: Transition::INSTANT,
        }
    }
}

impl LayerAnimator {
    /// Layer at rest at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Translation the layer is heading to.
    pub fn target(&self) -> Vec2 {
        self.to
    }

    /// Transition currently in effect.
    pub fn transition(&self) -> Transition {
        self.transition
    }

    /// Start moving toward `to` at `now_ms`.
    pub fn retarget(&mut self, to: Vec2, transition: Transition, now_ms: f64) {
        self.from = self.sample(now_ms);
        self.to = to;
        self.start_ms = now_ms;
        self.transition = transition;
    }

    /// Displayed translation at `now_ms`.
    pub fn sample(&self, now_ms: f64) -> Vec2 {
        let t = self.progress(now_ms);
        if t >= 1.0 {
            return self.to;
        }
        let e = self.transition.ease.apply(t);
        self.from + (self.to - self.from) * e
    }

    /// `true` once the current transition has finished.
    pub fn is_settled(&self, now_ms: f64) -> bool {
        self.progress(now_ms) >= 1.0
    }

    fn progress(&self, now_ms: f64) -> f64 {
        let d = self.transition.duration_ms;
        if !(d.is_finite() && d > 0.0) {
            return 1.0;
        }
        ((now_ms - self.start_ms) / d).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/layer.rs"]
mod tests;
