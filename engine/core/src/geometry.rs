//! Screen Geometry
//!
//! Points and rectangles in absolute screen coordinates. Everything the
//! engine hit-tests against is expressed in these units (device pixels as
//! reported by the platform's layout pass).

use serde::{Deserialize, Serialize};

/// A point in absolute screen coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position
    pub x: f32,
    /// Vertical position
    pub y: f32,
}

impl Point {
    /// Create a new point
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Displacement from `origin` to this point
    #[must_use]
    pub fn delta_from(self, origin: Point) -> (f32, f32) {
        (self.x - origin.x, self.y - origin.y)
    }

    /// Straight-line distance to another point
    #[must_use]
    pub fn distance_to(self, other: Point) -> f32 {
        let (dx, dy) = other.delta_from(self);
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis-aligned rectangle in absolute screen coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub w: f32,
    /// Height
    pub h: f32,
}

impl Rect {
    /// Create a new rectangle
    #[must_use]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Whether the layout pass has not settled yet (zero or negative extent).
    ///
    /// Degenerate rectangles are never stored in the registry and never
    /// match a hit-test.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.w > 0.0 && self.h > 0.0)
    }

    /// Right edge
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Bottom edge
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Inclusive containment test, with the rectangle widened by `padding`
    /// in every direction.
    #[must_use]
    pub fn contains(&self, point: Point, padding: f32) -> bool {
        if self.is_degenerate() {
            return false;
        }
        point.x >= self.x - padding
            && point.x <= self.right() + padding
            && point.y >= self.y - padding
            && point.y <= self.bottom() + padding
    }

    /// The same rectangle moved vertically by `dy`
    #[must_use]
    pub fn translated(&self, dy: f32) -> Self {
        Self {
            y: self.y + dy,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_inclusive() {
        let rect = Rect::new(10.0, 10.0, 100.0, 50.0);
        assert!(rect.contains(Point::new(10.0, 10.0), 0.0));
        assert!(rect.contains(Point::new(110.0, 60.0), 0.0));
        assert!(!rect.contains(Point::new(110.1, 60.0), 0.0));
        assert!(!rect.contains(Point::new(9.9, 30.0), 0.0));
    }

    #[test]
    fn test_padding_widens_hit_box() {
        let rect = Rect::new(100.0, 100.0, 50.0, 50.0);
        let near_miss = Point::new(90.0, 120.0);
        assert!(!rect.contains(near_miss, 0.0));
        assert!(rect.contains(near_miss, 25.0));
    }

    #[test]
    fn test_degenerate_rect_never_contains() {
        let zero_width = Rect::new(0.0, 0.0, 0.0, 100.0);
        let zero_height = Rect::new(0.0, 0.0, 100.0, 0.0);
        assert!(zero_width.is_degenerate());
        assert!(zero_height.is_degenerate());
        assert!(!zero_width.contains(Point::new(0.0, 50.0), 10.0));
        assert!(!zero_height.contains(Point::new(50.0, 0.0), 10.0));
    }

    #[test]
    fn test_delta_and_distance() {
        let origin = Point::new(0.0, 0.0);
        let p = Point::new(3.0, 4.0);
        assert_eq!(p.delta_from(origin), (3.0, 4.0));
        assert!((origin.distance_to(p) - 5.0).abs() < f32::EPSILON);
    }
}
