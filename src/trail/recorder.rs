use crate::{
    foundation::core::{Point, Rect},
    trail::buffer::TrailBuffer,
};

/// Convert a client-space pointer position into surface pixels.
pub fn surface_point(client: Point, bounds: Rect) -> Point {
    Point::new(client.x - bounds.x0, client.y - bounds.y0)
}

/// Append the pointer sample to the trail. Growth is bounded only by decay.
pub fn record(trail: &mut TrailBuffer, client: Point, bounds: Rect) -> Point {
    let at = surface_point(client, bounds);
    trail.push(at);
    at
}

#[cfg(test)]
#[path = "../../tests/unit/trail/recorder.rs"]
mod tests;
