//! Geometry primitives for diagram layout
//!
//! Coordinates arriving from external sources (interaction events, loaded
//! diagrams) can be NaN or infinite. `sanitize` substitutes a finite
//! fallback so positions stay finite at every read boundary.

use serde::{Deserialize, Serialize};

/// Substitute a non-finite value with a finite fallback
///
/// Falls back to 0.0 when the fallback itself is non-finite.
pub fn sanitize(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else if fallback.is_finite() {
        fallback
    } else {
        0.0
    }
}

/// A 2D position (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Sanitize both coordinates against a prior valid point
    pub fn sanitized_or(&self, prior: Point) -> Point {
        Point {
            x: sanitize(self.x, prior.x),
            y: sanitize(self.y, prior.y),
        }
    }

    /// Sanitize both coordinates, substituting zero
    pub fn sanitized(&self) -> Point {
        self.sanitized_or(Point::default())
    }

    /// Whether both coordinates are finite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Measured width and height of a rendered element
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Create a new size
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Sanitize both dimensions against a prior valid size
    pub fn sanitized_or(&self, prior: Size) -> Size {
        Size {
            width: sanitize(self.width, prior.width),
            height: sanitize(self.height, prior.height),
        }
    }
}

/// An axis-aligned rectangle (top-left corner plus size)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Assemble a rectangle from a position and a size
    pub fn from_parts(position: Point, size: Size) -> Self {
        Self {
            x: position.x,
            y: position.y,
            width: size.width,
            height: size.height,
        }
    }

    /// True when the two rectangles overlap with positive area
    ///
    /// Both horizontal and vertical projections must intersect with
    /// non-zero measure. A shared boundary alone does not count.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_substitutes_non_finite() {
        assert_eq!(sanitize(3.5, 0.0), 3.5);
        assert_eq!(sanitize(f64::NAN, 7.0), 7.0);
        assert_eq!(sanitize(f64::INFINITY, 7.0), 7.0);
        assert_eq!(sanitize(f64::NAN, f64::NAN), 0.0);
    }

    #[test]
    fn test_point_sanitized() {
        let p = Point::new(f64::NAN, 5.0).sanitized();
        assert_eq!(p, Point::new(0.0, 5.0));

        let p = Point::new(f64::NEG_INFINITY, f64::NAN).sanitized_or(Point::new(10.0, 20.0));
        assert_eq!(p, Point::new(10.0, 20.0));
    }

    #[test]
    fn test_rects_overlapping() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_shared_boundary_does_not_overlap() {
        // A: x in [0, 10], B: x in [10, 20], same y range
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
    }

    #[test]
    fn test_disjoint_rects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(50.0, 50.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_contained_rect_overlaps() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(25.0, 25.0, 10.0, 10.0);
        assert!(outer.intersects(&inner));
        assert!(inner.intersects(&outer));
    }
}
