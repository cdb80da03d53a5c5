//! Float geometry for render targets and texture sampling.

use core::ops::Div;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns `true` if either dimension is zero or negative.
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Axis aligned rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rectangle {
    pub location: Point,
    pub size: Size,
}

impl Rectangle {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            location: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// The unit rectangle `(0, 0, 1, 1)`.
    pub const fn unit() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }

    /// Rectangle spanned by two corner points in any order.
    pub fn from_points(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self::new(x, y, libm::fabsf(a.x - b.x), libm::fabsf(a.y - b.y))
    }

    /// Smallest rectangle containing all given rectangles.
    ///
    /// Returns an empty rectangle at the origin for an empty input.
    pub fn bounding<I: IntoIterator<Item = Self>>(rectangles: I) -> Self {
        rectangles
            .into_iter()
            .reduce(Self::union)
            .unwrap_or_default()
    }

    pub fn right(self) -> f32 {
        self.location.x + self.size.width
    }

    pub fn bottom(self) -> f32 {
        self.location.y + self.size.height
    }

    pub fn center(self) -> Point {
        Point::new(
            self.location.x + (self.size.width / 2.0),
            self.location.y + (self.size.height / 2.0),
        )
    }

    pub fn is_empty(self) -> bool {
        self.size.is_empty()
    }

    pub fn contains(self, point: Point) -> bool {
        point.x >= self.location.x
            && point.y >= self.location.y
            && point.x < self.right()
            && point.y < self.bottom()
    }

    #[must_use]
    pub fn union(self, other: Self) -> Self {
        let x = self.location.x.min(other.location.x);
        let y = self.location.y.min(other.location.y);
        Self::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }

    /// Express `self` in coordinates normalized to `bounds`.
    ///
    /// A rectangle equal to `bounds` maps to the unit rectangle. Empty bounds
    /// map everything to an empty rectangle at the origin.
    #[must_use]
    pub fn normalized_to(self, bounds: Self) -> Self {
        if bounds.is_empty() {
            return Self::default();
        }
        Self::new(
            (self.location.x - bounds.location.x) / bounds.size.width,
            (self.location.y - bounds.location.y) / bounds.size.height,
            self.size.width / bounds.size.width,
            self.size.height / bounds.size.height,
        )
    }
}

impl Div for Rectangle {
    type Output = Self;

    fn div(self, bounds: Self) -> Self::Output {
        self.normalized_to(bounds)
    }
}
