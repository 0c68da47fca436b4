#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! Coordinates are host pixels (origin at top-left). Centers are computed in
//! doubled coordinates so that odd widths and heights keep an exact integer
//! center; distance comparisons built on them never round.

use serde::{Deserialize, Serialize};

/// A pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset this point by a delta, saturating at the `i32` bounds.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Manhattan distance to another point.
    #[inline]
    pub const fn manhattan(self, other: Point) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }

    /// Squared distance from this point to the center of `rect`, in doubled
    /// coordinates (i.e. four times the true squared distance).
    #[inline]
    pub fn distance_sq_doubled(self, rect: &Rect) -> u64 {
        let (cx, cy) = rect.center_doubled();
        let dx = (i64::from(self.x) * 2).abs_diff(cx);
        let dy = (i64::from(self.y) * 2).abs_diff(cy);
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }
}

/// A rectangle used for drop surfaces and hit testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: i32,
    /// Top edge (inclusive).
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top-left corner.
    #[inline]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add_unsigned(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add_unsigned(self.height)
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Center in doubled coordinates: `(2x + width, 2y + height)`.
    #[inline]
    pub const fn center_doubled(&self) -> (i64, i64) {
        (
            self.x as i64 * 2 + self.width as i64,
            self.y as i64 * 2 + self.height as i64,
        )
    }

    /// Center rounded toward the top-left.
    #[inline]
    pub const fn center(&self) -> Point {
        Point::new(
            self.x.saturating_add_unsigned(self.width / 2),
            self.y.saturating_add_unsigned(self.height / 2),
        )
    }

    /// Translate the rectangle so its origin sits at `origin`.
    #[inline]
    #[must_use]
    pub const fn with_origin(self, origin: Point) -> Self {
        Self::new(origin.x, origin.y, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::{Point, Rect};

    #[test]
    fn rect_contains_edges() {
        let rect = Rect::new(2, 3, 4, 5);
        assert!(rect.contains(Point::new(2, 3)));
        assert!(rect.contains(Point::new(5, 7)));
        assert!(!rect.contains(Point::new(6, 3)));
        assert!(!rect.contains(Point::new(2, 8)));
    }

    #[test]
    fn empty_rect_contains_nothing() {
        let rect = Rect::new(0, 0, 0, 10);
        assert!(rect.is_empty());
        assert!(!rect.contains(Point::new(0, 0)));
    }

    #[test]
    fn center_doubled_is_exact_for_odd_extents() {
        let rect = Rect::new(10, 20, 5, 3);
        assert_eq!(rect.center_doubled(), (25, 43));
        assert_eq!(rect.center(), Point::new(12, 21));
    }

    #[test]
    fn distance_to_center_is_zero_at_center() {
        let rect = Rect::new(0, 0, 10, 10);
        assert_eq!(Point::new(5, 5).distance_sq_doubled(&rect), 0);
        // One pixel off on x: doubled dx = 2, squared = 4.
        assert_eq!(Point::new(6, 5).distance_sq_doubled(&rect), 4);
    }

    #[test]
    fn negative_coordinates_are_supported() {
        let rect = Rect::new(-10, -10, 4, 4);
        assert!(rect.contains(Point::new(-8, -7)));
        assert_eq!(rect.center(), Point::new(-8, -8));
        assert_eq!(Point::new(-8, -8).distance_sq_doubled(&rect), 0);
    }

    #[test]
    fn manhattan_distance() {
        assert_eq!(Point::new(0, 0).manhattan(Point::new(3, -4)), 7);
        assert_eq!(Point::new(1, 1).offset(2, -1), Point::new(3, 0));
    }
}
