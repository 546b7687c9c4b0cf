//! Twinkle Paint API
//!
//! A canvas-style drawing API for particle shapes, modelled on the HTML
//! Canvas state machine (save/restore, translate/rotate, global alpha).
//! All core types are shared with `twinkle_core`.
//!
//! # Example
//!
//! ```rust
//! use twinkle_paint::{Color, PaintContext};
//!
//! let mut ctx = PaintContext::new(800.0, 600.0);
//!
//! ctx.save();
//! ctx.translate(50.0, 50.0);
//! ctx.rotate(0.5);
//! ctx.set_global_alpha(0.6);
//! ctx.fill_circle_xyr(0.0, 0.0, 3.0, Color::WHITE);
//! ctx.restore();
//!
//! assert_eq!(ctx.paint_count(), 1);
//! ```

pub mod context;
pub mod gradient;
pub mod path;
pub mod primitives;

// ─────────────────────────────────────────────────────────────────────────────
// Core type re-exports from twinkle_core (unified type system)
// ─────────────────────────────────────────────────────────────────────────────

pub use twinkle_core::{
    // Brushes and fills
    BlendMode,
    Brush,
    // Colors
    Color,
    // Draw context
    DrawCommand,
    DrawContext,
    // Gradients
    Gradient,
    GradientStop,
    // Strokes
    LineCap,
    // Paths
    Path,
    PathCommand,
    // Geometry
    Point,
    Rect,
    Size,
    Stroke,
    // Transforms
    Transform,
};

// ─────────────────────────────────────────────────────────────────────────────
// twinkle_paint specific exports
// ─────────────────────────────────────────────────────────────────────────────

pub use context::PaintContext;
pub use path::PathBuilder;
pub use primitives::Ellipse;
