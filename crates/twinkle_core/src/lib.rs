//! Twinkle Core
//!
//! Foundational types shared by every Twinkle crate:
//!
//! - **Geometry**: points, sizes, rects, vectors and 2D affine transforms
//! - **Visuals**: colors, gradients, brushes and blend modes
//! - **Draw Context**: the drawing trait particles render through, plus a
//!   recording implementation that captures commands for the host
//!
//! # Example
//!
//! ```rust
//! use twinkle_core::{Color, DrawContext, Point, RecordingContext, Size};
//!
//! let mut ctx = RecordingContext::new(Size::new(800.0, 600.0));
//! ctx.fill_circle(Point::new(40.0, 40.0), 6.0, Color::WHITE.into());
//! assert_eq!(ctx.commands().len(), 1);
//! ```

pub mod draw;
pub mod geometry;
pub mod visual;

pub use draw::{
    DrawCommand, DrawContext, LineCap, Path, PathCommand, RecordingContext, Stroke,
    Transform,
};
pub use geometry::{Affine2D, Point, Rect, Size, Vec2};
pub use visual::{BlendMode, Brush, Color, Gradient, GradientStop, GradientStops};
