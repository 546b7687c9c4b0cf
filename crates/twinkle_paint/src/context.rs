//! Paint context - Canvas-like drawing API implementing DrawContext
//!
//! PaintContext layers the familiar canvas state machine on top of the
//! push/pop stacks of [`DrawContext`]: every `translate`, `rotate`, `scale`,
//! `set_global_alpha` and `set_blend_mode` issued after a `save()` is undone by
//! the matching `restore()`.

use smallvec::SmallVec;
use twinkle_core::{
    BlendMode, Brush, DrawCommand, DrawContext, Path, Point, Rect, RecordingContext, Size, Stroke,
    Transform,
};

use crate::primitives::Ellipse;

/// Pushes issued since the matching `save()`
#[derive(Clone, Copy, Debug, Default)]
struct SavedState {
    transforms: u16,
    opacities: u16,
    blend_modes: u16,
}

/// The paint context particle shapes draw into
///
/// PaintContext wraps a RecordingContext to record draw commands,
/// while providing a Canvas-like API for convenience.
pub struct PaintContext {
    recording: RecordingContext,
    saved: SmallVec<[SavedState; 4]>,
}

impl PaintContext {
    /// Create a new paint context with the given viewport size
    pub fn new(width: f32, height: f32) -> Self {
        Self::from_size(Size::new(width, height))
    }

    /// Create from a Size
    pub fn from_size(size: Size) -> Self {
        Self {
            recording: RecordingContext::new(size),
            saved: SmallVec::new(),
        }
    }

    /// Get all recorded commands
    pub fn commands(&self) -> &[DrawCommand] {
        self.recording.commands()
    }

    /// Take ownership of recorded commands
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        self.recording.take_commands()
    }

    /// Number of recorded commands that paint pixels
    pub fn paint_count(&self) -> usize {
        self.recording.paint_count()
    }

    /// Wipe the frame: drops recorded commands and any unbalanced saves
    pub fn clear(&mut self) {
        if !self.saved.is_empty() {
            tracing::trace!(depth = self.saved.len(), "clearing with unbalanced save()");
        }
        self.saved.clear();
        self.recording.clear();
    }

    /// Resize the drawing target
    pub fn resize(&mut self, size: Size) {
        self.recording.set_viewport(size);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Canvas state
    // ═══════════════════════════════════════════════════════════════════════════

    /// Open a state frame
    pub fn save(&mut self) {
        self.saved.push(SavedState::default());
    }

    /// Undo every state push made since the matching `save()`
    pub fn restore(&mut self) {
        let Some(state) = self.saved.pop() else {
            tracing::trace!("restore() without save()");
            return;
        };
        for _ in 0..state.blend_modes {
            self.recording.pop_blend_mode();
        }
        for _ in 0..state.opacities {
            self.recording.pop_opacity();
        }
        for _ in 0..state.transforms {
            self.recording.pop_transform();
        }
    }

    /// Save, run `f`, restore
    pub fn with_saved<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.save();
        let out = f(self);
        self.restore();
        out
    }

    fn note(&mut self, f: impl FnOnce(&mut SavedState)) {
        if let Some(state) = self.saved.last_mut() {
            f(state);
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Transform convenience methods
    // ═══════════════════════════════════════════════════════════════════════════

    /// Push a translation transform
    pub fn translate(&mut self, x: f32, y: f32) {
        self.push_transform(Transform::translate(x, y));
    }

    /// Push a scale transform
    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.push_transform(Transform::scale(sx, sy));
    }

    /// Push a rotation transform (angle in radians)
    pub fn rotate(&mut self, angle: f32) {
        self.push_transform(Transform::rotate(angle));
    }

    /// Multiply subsequent draws by `alpha` until the next `restore()`
    pub fn set_global_alpha(&mut self, alpha: f32) {
        self.push_opacity(alpha);
    }

    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.push_blend_mode(mode);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Canvas-like convenience API
    // ═══════════════════════════════════════════════════════════════════════════

    /// Fill a rectangle at (x, y) with width/height and a brush
    pub fn fill_rect_xywh(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        brush: impl Into<Brush>,
    ) {
        self.fill_rect(Rect::new(x, y, width, height), brush.into());
    }

    /// Fill a circle at (cx, cy) with radius
    ///
    /// Non-positive radii draw nothing.
    pub fn fill_circle_xyr(&mut self, cx: f32, cy: f32, radius: f32, brush: impl Into<Brush>) {
        if radius > 0.0 {
            self.fill_circle(Point::new(cx, cy), radius, brush.into());
        }
    }

    /// Fill an axis-aligned ellipse
    pub fn fill_ellipse(&mut self, ellipse: Ellipse, brush: impl Into<Brush>) {
        if !ellipse.is_degenerate() {
            self.fill_path(&ellipse.to_path(), brush.into());
        }
    }

    /// Stroke a straight segment
    pub fn stroke_line(
        &mut self,
        from: Point,
        to: Point,
        stroke: &Stroke,
        brush: impl Into<Brush>,
    ) {
        self.stroke_path(&Path::line(from, to), stroke, brush.into());
    }
}

impl Default for PaintContext {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DrawContext Implementation - delegates to RecordingContext
// ═══════════════════════════════════════════════════════════════════════════════

impl DrawContext for PaintContext {
    fn push_transform(&mut self, transform: Transform) {
        self.note(|s| s.transforms += 1);
        self.recording.push_transform(transform);
    }

    fn pop_transform(&mut self) {
        self.recording.pop_transform();
    }

    fn current_transform(&self) -> Transform {
        self.recording.current_transform()
    }

    fn push_opacity(&mut self, opacity: f32) {
        self.note(|s| s.opacities += 1);
        self.recording.push_opacity(opacity);
    }

    fn pop_opacity(&mut self) {
        self.recording.pop_opacity();
    }

    fn current_opacity(&self) -> f32 {
        self.recording.current_opacity()
    }

    fn push_blend_mode(&mut self, mode: BlendMode) {
        self.note(|s| s.blend_modes += 1);
        self.recording.push_blend_mode(mode);
    }

    fn pop_blend_mode(&mut self) {
        self.recording.pop_blend_mode();
    }

    fn fill_path(&mut self, path: &Path, brush: Brush) {
        self.recording.fill_path(path, brush);
    }

    fn stroke_path(&mut self, path: &Path, stroke: &Stroke, brush: Brush) {
        self.recording.stroke_path(path, stroke, brush);
    }

    fn fill_rect(&mut self, rect: Rect, brush: Brush) {
        self.recording.fill_rect(rect, brush);
    }

    fn fill_circle(&mut self, center: Point, radius: f32, brush: Brush) {
        self.recording.fill_circle(center, radius, brush);
    }

    fn viewport_size(&self) -> Size {
        self.recording.viewport_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twinkle_core::Color;

    #[test]
    fn test_paint_context_creation() {
        let ctx = PaintContext::new(800.0, 600.0);
        assert_eq!(ctx.viewport_size(), Size::new(800.0, 600.0));
    }

    #[test]
    fn test_fill_rect() {
        let mut ctx = PaintContext::new(800.0, 600.0);
        ctx.fill_rect_xywh(10.0, 20.0, 100.0, 50.0, Color::WHITE);
        assert_eq!(ctx.commands().len(), 1);
    }

    #[test]
    fn test_save_restore_balances_stacks() {
        let mut ctx = PaintContext::new(800.0, 600.0);
        ctx.save();
        ctx.translate(10.0, 20.0);
        ctx.rotate(1.2);
        ctx.set_global_alpha(0.5);
        ctx.fill_circle_xyr(0.0, 0.0, 2.0, Color::WHITE);
        assert_eq!(ctx.current_opacity(), 0.5);
        ctx.restore();

        assert_eq!(ctx.current_opacity(), 1.0);
        assert_eq!(ctx.current_transform(), Transform::identity());

        let pops = ctx
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::PopTransform | DrawCommand::PopOpacity))
            .count();
        assert_eq!(pops, 3);
    }

    #[test]
    fn test_nested_save() {
        let mut ctx = PaintContext::new(100.0, 100.0);
        ctx.save();
        ctx.set_global_alpha(0.5);
        ctx.with_saved(|ctx| {
            ctx.set_global_alpha(0.5);
            assert_eq!(ctx.current_opacity(), 0.25);
        });
        assert_eq!(ctx.current_opacity(), 0.5);
        ctx.restore();
        // Unmatched restore is ignored
        ctx.restore();
        assert_eq!(ctx.current_opacity(), 1.0);
    }

    #[test]
    fn test_degenerate_shapes_are_skipped() {
        let mut ctx = PaintContext::new(100.0, 100.0);
        ctx.fill_circle_xyr(0.0, 0.0, 0.0, Color::WHITE);
        ctx.fill_circle_xyr(0.0, 0.0, -1.0, Color::WHITE);
        ctx.fill_ellipse(Ellipse::new(Point::ZERO, 0.0, 2.0), Color::WHITE);
        assert_eq!(ctx.paint_count(), 0);
    }

    #[test]
    fn test_implements_draw_context() {
        fn use_draw_context(ctx: &mut dyn DrawContext) {
            ctx.fill_rect(Rect::new(0.0, 0.0, 100.0, 50.0), Color::WHITE.into());
        }

        let mut ctx = PaintContext::new(800.0, 600.0);
        use_draw_context(&mut ctx);
        assert_eq!(ctx.commands().len(), 1);

        ctx.clear();
        assert!(ctx.commands().is_empty());
    }
}
