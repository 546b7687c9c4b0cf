//! Path building
//!
//! PathBuilder provides a fluent API for path construction plus the polygon
//! outlines several particle shapes are made of.

pub use twinkle_core::{Path, PathCommand, Point};

use std::f32::consts::PI;

/// Builder for constructing paths with fluent API
///
/// Tracks the cursor so callers can continue from the last point.
pub struct PathBuilder {
    path: Path,
    current: Point,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self {
            path: Path::new(),
            current: Point::ZERO,
        }
    }

    pub fn move_to(mut self, x: f32, y: f32) -> Self {
        self.path = self.path.move_to(x, y);
        self.current = Point::new(x, y);
        self
    }

    pub fn line_to(mut self, x: f32, y: f32) -> Self {
        self.path = self.path.line_to(x, y);
        self.current = Point::new(x, y);
        self
    }

    pub fn quad_to(mut self, cx: f32, cy: f32, x: f32, y: f32) -> Self {
        self.path = self.path.quad_to(cx, cy, x, y);
        self.current = Point::new(x, y);
        self
    }

    pub fn close(mut self) -> Self {
        self.path = self.path.close();
        self
    }

    pub fn build(self) -> Path {
        self.path
    }

    /// Get the current cursor position
    pub fn current_position(&self) -> Point {
        self.current
    }

    /// Closed polygon through `points`; fewer than two points yields an empty path
    pub fn polygon(points: impl IntoIterator<Item = Point>) -> Path {
        let mut points = points.into_iter();
        let Some(first) = points.next() else {
            return Path::new();
        };
        let mut builder = PathBuilder::new().move_to(first.x, first.y);
        let mut count = 1;
        for p in points {
            builder = builder.line_to(p.x, p.y);
            count += 1;
        }
        if count < 2 {
            return Path::new();
        }
        builder.close().build()
    }

    /// Star centered on the origin, first spike pointing up
    ///
    /// Vertices alternate between `outer` and `inner` radii.
    pub fn star(spikes: usize, outer: f32, inner: f32) -> Path {
        let spikes = spikes.max(2);
        let step = PI / spikes as f32;
        Self::polygon((0..spikes * 2).map(|i| {
            let radius = if i % 2 == 0 { outer } else { inner };
            let angle = -PI / 2.0 + step * i as f32;
            Point::new(angle.cos() * radius, angle.sin() * radius)
        }))
    }
}

impl Default for PathBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_tracks_cursor() {
        let builder = PathBuilder::new().move_to(1.0, 2.0).quad_to(3.0, 4.0, 5.0, 6.0);
        assert_eq!(builder.current_position(), Point::new(5.0, 6.0));
        assert_eq!(builder.build().commands().len(), 2);
    }

    #[test]
    fn test_star_vertices() {
        let star = PathBuilder::star(5, 6.0, 3.0);
        // 10 vertices + close
        assert_eq!(star.commands().len(), 11);
        match star.commands()[0] {
            PathCommand::MoveTo(p) => {
                assert!(p.x.abs() < 1e-4);
                assert!((p.y + 6.0).abs() < 1e-4);
            }
            other => panic!("unexpected first command {other:?}"),
        }
    }

    #[test]
    fn test_polygon_degenerate() {
        assert!(PathBuilder::polygon(std::iter::empty()).is_empty());
        assert!(PathBuilder::polygon([Point::ZERO]).is_empty());
    }
}
