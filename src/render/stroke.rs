use kurbo::{Circle, Shape as _};

use crate::{
    foundation::core::{BezPath, Point},
    trail::buffer::TrailPoint,
};

const FLATTEN_TOLERANCE: f64 = 0.1;

/// One round-capped stroke segment of the trail.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeDab {
    /// Segment start (the older sample).
    pub from: Point,
    /// Segment end (the newer sample).
    pub to: Point,
    /// Full stroke width in pixels.
    pub width: f64,
    /// Stroke opacity in `[0, 1]`.
    pub opacity: f32,
}

impl StrokeDab {
    /// Filled outline pieces: both round caps and, for non-degenerate segments, the body.
    ///
    /// The pieces overlap; they are meant to be filled opaque inside one opacity layer.
    pub fn outline(&self) -> Vec<BezPath> {
        let r = self.width / 2.0;
        if r <= 0.0 {
            return Vec::new();
        }
        let mut out = vec![Circle::new(self.from, r).to_path(FLATTEN_TOLERANCE)];

        let d = self.to - self.from;
        let len = d.hypot();
        if len <= f64::EPSILON {
            return out;
        }
        out.push(Circle::new(self.to, r).to_path(FLATTEN_TOLERANCE));

        let n = kurbo::Vec2::new(-d.y, d.x) * (r / len);
        let mut body = BezPath::new();
        body.move_to(self.from + n);
        body.line_to(self.to + n);
        body.line_to(self.to - n);
        body.line_to(self.from - n);
        body.close_path();
        out.push(body);
        out
    }
}

/// Break a trail into consecutive-pair segments, oldest first.
///
/// Width and opacity follow the age of each segment's newer sample, so the tail thins and
/// fades. A lone sample becomes a single round dab.
pub fn trail_dabs(points: &[TrailPoint], base_width: f64) -> Vec<StrokeDab> {
    let dab = |from: &TrailPoint, to: &TrailPoint| StrokeDab {
        from: from.pos(),
        to: to.pos(),
        width: base_width * to.age,
        opacity: to.age.clamp(0.0, 1.0) as f32,
    };
    match points {
        [] => Vec::new(),
        [only] => vec![dab(only, only)],
        _ => points.windows(2).map(|w| dab(&w[0], &w[1])).collect(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/stroke.rs"]
mod tests;
