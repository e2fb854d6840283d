use crate::foundation::core::Point;

/// Age of a freshly recorded sample.
pub const FULL_AGE: f64 = 1.0;

/// One aged pointer sample in surface pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailPoint {
    /// Horizontal position in surface pixels.
    pub x: f64,
    /// Vertical position in surface pixels.
    pub y: f64,
    /// Remaining strength in `(0, 1]`.
    pub age: f64,
}

impl TrailPoint {
    /// Fresh sample at full age.
    pub fn fresh(at: Point) -> Self {
        Self {
            x: at.x,
            y: at.y,
            age: FULL_AGE,
        }
    }

    /// Position as a point.
    pub fn pos(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Ordered pointer trail, oldest sample first.
///
/// After [`TrailBuffer::decay`] every retained point has `age > 0`.
#[derive(Clone, Debug, Default)]
pub struct TrailBuffer {
    points: Vec<TrailPoint>,
}

impl TrailBuffer {
    /// Empty trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a full-age sample.
    pub fn push(&mut self, at: Point) {
        self.points.push(TrailPoint::fresh(at));
    }

    /// Age every point by `rate` and drop the ones that reached zero.
    ///
    /// Returns the number of pruned points.
    pub fn decay(&mut self, rate: f64) -> usize {
        let before = self.points.len();
        for p in &mut self.points {
            p.age = (p.age - rate).max(0.0);
        }
        self.points.retain(|p| p.age > 0.0);
        before - self.points.len()
    }

    /// Number of live points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// `true` when no points are left.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points, oldest first.
    pub fn points(&self) -> &[TrailPoint] {
        &self.points
    }

    /// Drop every point.
    pub fn clear(&mut self) {
        self.points.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/trail/buffer.rs"]
mod tests;
