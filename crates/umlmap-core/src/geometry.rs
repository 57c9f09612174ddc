//! Geometric primitives for diagram layout.
//!
//! - [`Point`] - A 2D coordinate, also used as a velocity vector by the simulation
//! - [`Size`] - Width and height of a rendered node
//! - [`Bounds`] - An axis-aligned rectangle
//! - [`Insets`] - Margins on four sides
//!
//! # Coordinate System
//!
//! Coordinates follow SVG conventions:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! Node positions are the *center* of the node's rectangle.

use serde::{Deserialize, Serialize};

/// A 2D point in diagram coordinate space.
///
/// # Examples
///
/// ```
/// # use umlmap_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 15.0);
/// assert_eq!(sum.y(), 25.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Checks if both x and y coordinates are zero
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Adds another point to this point, returning a new point.
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Calculates the Euclidean distance from the origin
    pub fn hypot(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Multiplies both coordinates by the given factor.
    pub fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns true if both width and height are zero
    pub fn is_zero(self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }
}

/// An axis-aligned rectangle with minimum and maximum coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates a new bounds from a center point and a size
    pub fn new_from_center(center: Point, size: Size) -> Self {
        let half_width = size.width / 2.0;
        let half_height = size.height / 2.0;
        Self {
            min_x: center.x - half_width,
            min_y: center.y - half_height,
            max_x: center.x + half_width,
            max_y: center.y + half_height,
        }
    }

    /// Creates a new bounds from a top-left point and a size
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    pub fn min_x(self) -> f32 {
        self.min_x
    }

    pub fn min_y(self) -> f32 {
        self.min_y
    }

    pub fn max_x(self) -> f32 {
        self.max_x
    }

    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the center point of the bounds
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Merges two bounds into the smallest bounds containing both.
    ///
    /// # Examples
    ///
    /// ```
    /// # use umlmap_core::geometry::{Bounds, Point, Size};
    /// let a = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(100.0, 30.0));
    /// let b = Bounds::new_from_top_left(Point::new(10.0, 40.0), Size::new(120.0, 80.0));
    ///
    /// let combined = a.merge(&b);
    /// assert_eq!(combined.width(), 130.0);
    /// assert_eq!(combined.height(), 120.0);
    /// ```
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Returns a new bounds grown outward by the given insets
    pub fn add_padding(&self, insets: Insets) -> Self {
        Self {
            min_x: self.min_x - insets.left,
            min_y: self.min_y - insets.top,
            max_x: self.max_x + insets.right,
            max_y: self.max_y + insets.bottom,
        }
    }

    /// Returns the overlap extents along each axis, or `None` when the
    /// rectangles are disjoint or only touch.
    ///
    /// # Examples
    ///
    /// ```
    /// # use umlmap_core::geometry::{Bounds, Point, Size};
    /// let a = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(10.0, 10.0));
    /// let b = Bounds::new_from_top_left(Point::new(6.0, 8.0), Size::new(10.0, 10.0));
    /// assert_eq!(a.overlap(&b), Some((4.0, 2.0)));
    ///
    /// let c = Bounds::new_from_top_left(Point::new(10.0, 0.0), Size::new(10.0, 10.0));
    /// assert_eq!(a.overlap(&c), None);
    /// ```
    pub fn overlap(&self, other: &Self) -> Option<(f32, f32)> {
        let dx = self.max_x.min(other.max_x) - self.min_x.max(other.min_x);
        let dy = self.max_y.min(other.max_y) - self.min_y.max(other.min_y);
        (dx > 0.0 && dy > 0.0).then_some((dx, dy))
    }

    /// Returns the area shared by two rectangles (zero when disjoint).
    pub fn intersection_area(&self, other: &Self) -> f32 {
        self.overlap(other).map_or(0.0, |(dx, dy)| dx * dy)
    }

    /// Checks whether the point lies inside or on the edge of the bounds
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }
}

/// Margin values for the four sides of a rectangle
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Insets {
    top: f32,
    right: f32,
    bottom: f32,
    left: f32,
}

impl Insets {
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Creates insets with the same value on every side
    pub fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }
}


#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    fn bounds_strategy() -> impl Strategy<Value = Bounds> {
        (
            -1000.0f32..1000.0,
            -1000.0f32..1000.0,
            1.0f32..500.0,
            1.0f32..500.0,
        )
            .prop_map(|(x, y, w, h)| Bounds::new_from_top_left(Point::new(x, y), Size::new(w, h)))
    }

    /// Overlap area is symmetric and never exceeds the smaller rectangle.
    fn check_intersection_area_is_bounded(b1: Bounds, b2: Bounds) -> Result<(), TestCaseError> {
        let area = b1.intersection_area(&b2);
        let smaller = (b1.width() * b1.height()).min(b2.width() * b2.height());

        prop_assert!(approx_eq!(
            f32,
            area,
            b2.intersection_area(&b1),
            epsilon = 0.01
        ));
        prop_assert!(area >= 0.0);
        prop_assert!(area <= smaller + 0.01);
        Ok(())
    }

    /// Merged bounds contain both centers.
    fn check_merge_contains_centers(b1: Bounds, b2: Bounds) -> Result<(), TestCaseError> {
        let merged = b1.merge(&b2);
        prop_assert!(merged.contains(b1.center()));
        prop_assert!(merged.contains(b2.center()));
        Ok(())
    }

    proptest! {
        #[test]
        fn intersection_area_is_bounded(b1 in bounds_strategy(), b2 in bounds_strategy()) {
            check_intersection_area_is_bounded(b1, b2)?;
        }

        #[test]
        fn merge_contains_centers(b1 in bounds_strategy(), b2 in bounds_strategy()) {
            check_merge_contains_centers(b1, b2)?;
        }
    }
}
