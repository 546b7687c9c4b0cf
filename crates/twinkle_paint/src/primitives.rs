//! Geometric primitives

pub use twinkle_core::{Point, Rect};

use twinkle_core::Path;

/// An axis-aligned ellipse
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Ellipse {
    pub center: Point,
    pub radius_x: f32,
    pub radius_y: f32,
}

impl Ellipse {
    pub const fn new(center: Point, radius_x: f32, radius_y: f32) -> Self {
        Self {
            center,
            radius_x,
            radius_y,
        }
    }

    /// True if either radius is non-positive
    pub fn is_degenerate(&self) -> bool {
        !(self.radius_x > 0.0 && self.radius_y > 0.0)
    }

    pub fn contains(&self, point: Point) -> bool {
        if self.is_degenerate() {
            return false;
        }
        let dx = (point.x - self.center.x) / self.radius_x;
        let dy = (point.y - self.center.y) / self.radius_y;
        dx * dx + dy * dy <= 1.0
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.center.x - self.radius_x,
            self.center.y - self.radius_y,
            self.radius_x * 2.0,
            self.radius_y * 2.0,
        )
    }

    pub fn to_path(&self) -> Path {
        Path::ellipse(self.center, self.radius_x, self.radius_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ellipse_contains() {
        let leaf = Ellipse::new(Point::ZERO, 10.0, 5.0);
        assert!(leaf.contains(Point::new(9.0, 0.0)));
        assert!(!leaf.contains(Point::new(0.0, 6.0)));
        assert_eq!(leaf.bounds(), Rect::new(-10.0, -5.0, 20.0, 10.0));
    }
}
