//! Drawing surface bound to a host container
//!
//! The host decides the surface size (the container's client size) and the
//! device pixel ratio; the engine only reads them. A resize notification marks
//! the surface dirty and the size is re-read on the next frame.

use std::cell::Cell;
use std::rc::Rc;

use twinkle_core::{DrawCommand, Size};
use twinkle_paint::PaintContext;

use crate::error::{EngineError, Result};

/// The container a [`Surface`] is mounted in
pub trait SurfaceHost {
    /// Client size in CSS pixels; `None` while unmounted
    fn client_size(&self) -> Option<Size>;

    fn device_pixel_ratio(&self) -> f32 {
        1.0
    }

    /// Whether the host can provide 2D drawing at all
    fn supports_2d(&self) -> bool {
        true
    }
}

/// In-memory host with a settable size, used headless and in tests
#[derive(Debug)]
pub struct StaticContainer {
    size: Cell<Option<Size>>,
    dpr: Cell<f32>,
    supports_2d: bool,
}

impl StaticContainer {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Cell::new(Some(Size::new(width, height))),
            dpr: Cell::new(1.0),
            supports_2d: true,
        }
    }

    pub fn unmounted() -> Self {
        Self {
            size: Cell::new(None),
            ..Self::new(0.0, 0.0)
        }
    }

    /// A host without 2D drawing
    pub fn without_2d(width: f32, height: f32) -> Self {
        Self {
            supports_2d: false,
            ..Self::new(width, height)
        }
    }

    pub fn set_size(&self, width: f32, height: f32) {
        self.size.set(Some(Size::new(width, height)));
    }

    pub fn unmount(&self) {
        self.size.set(None);
    }

    pub fn set_device_pixel_ratio(&self, dpr: f32) {
        self.dpr.set(dpr);
    }
}

impl SurfaceHost for StaticContainer {
    fn client_size(&self) -> Option<Size> {
        self.size.get()
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.dpr.get()
    }

    fn supports_2d(&self) -> bool {
        self.supports_2d
    }
}

/// Valid size reported by `host`
fn measure(host: &dyn SurfaceHost) -> Result<Size> {
    match host.client_size() {
        Some(size) if !size.is_empty() && size.width.is_finite() && size.height.is_finite() => {
            Ok(size)
        }
        _ => Err(EngineError::SurfaceUnavailable),
    }
}

fn sanitize_dpr(dpr: f32) -> f32 {
    if dpr.is_finite() && dpr > 0.0 {
        dpr
    } else {
        1.0
    }
}

/// Engine-owned drawing target sized to the host container
pub struct Surface {
    host: Rc<dyn SurfaceHost>,
    size: Size,
    dpr: f32,
    paint: PaintContext,
    dirty: bool,
}

impl Surface {
    /// Bind to `host`
    ///
    /// Fails with [`EngineError::Unsupported`] when the host has no 2D drawing
    /// and [`EngineError::SurfaceUnavailable`] while it is unmounted or empty.
    pub fn from_host(host: Rc<dyn SurfaceHost>) -> Result<Self> {
        if !host.supports_2d() {
            return Err(EngineError::Unsupported("2D drawing unavailable".into()));
        }
        let size = measure(host.as_ref())?;
        let dpr = sanitize_dpr(host.device_pixel_ratio());
        Ok(Self {
            paint: PaintContext::from_size(size.scaled(dpr)),
            host,
            size,
            dpr,
            dirty: false,
        })
    }

    /// Logical size in CSS pixels
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn device_pixel_ratio(&self) -> f32 {
        self.dpr
    }

    /// Flag the size for re-reading on the next [`Surface::sync`]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Check the host before a frame
    ///
    /// The size is only re-read after [`Surface::mark_dirty`] or after the
    /// host was unavailable. Returns `Ok(true)` when the size changed.
    pub fn sync(&mut self) -> Result<bool> {
        let size = match measure(self.host.as_ref()) {
            Ok(size) => size,
            Err(err) => {
                self.dirty = true;
                return Err(err);
            }
        };
        if !self.dirty {
            return Ok(false);
        }
        self.dirty = false;
        let dpr = sanitize_dpr(self.host.device_pixel_ratio());
        if size == self.size && dpr == self.dpr {
            return Ok(false);
        }
        tracing::debug!(
            width = size.width,
            height = size.height,
            dpr,
            "surface resized"
        );
        self.size = size;
        self.dpr = dpr;
        self.paint.resize(size.scaled(dpr));
        Ok(true)
    }

    /// Clear the previous frame and open a new one in logical pixels
    pub fn begin_frame(&mut self) -> &mut PaintContext {
        self.paint.clear();
        self.paint.save();
        if self.dpr != 1.0 {
            self.paint.scale(self.dpr, self.dpr);
        }
        &mut self.paint
    }

    pub fn end_frame(&mut self) {
        self.paint.restore();
    }

    /// Commands recorded for the last frame
    pub fn commands(&self) -> &[DrawCommand] {
        self.paint.commands()
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        self.paint.take_commands()
    }

    /// Drop the last frame's commands
    pub fn clear(&mut self) {
        self.paint.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twinkle_core::DrawContext;

    #[test]
    fn test_from_host() {
        let host = Rc::new(StaticContainer::new(800.0, 600.0));
        let surface = Surface::from_host(host).unwrap();
        assert_eq!(surface.size(), Size::new(800.0, 600.0));
    }

    #[test]
    fn test_unavailable_and_unsupported() {
        assert_eq!(
            Surface::from_host(Rc::new(StaticContainer::unmounted())).err(),
            Some(EngineError::SurfaceUnavailable)
        );
        assert_eq!(
            Surface::from_host(Rc::new(StaticContainer::new(0.0, 300.0))).err(),
            Some(EngineError::SurfaceUnavailable)
        );
        assert!(matches!(
            Surface::from_host(Rc::new(StaticContainer::without_2d(10.0, 10.0))),
            Err(EngineError::Unsupported(_))
        ));
    }

    #[test]
    fn test_sync_tracks_resize_and_unmount() {
        let host = Rc::new(StaticContainer::new(800.0, 600.0));
        let mut surface = Surface::from_host(host.clone()).unwrap();
        assert_eq!(surface.sync(), Ok(false));

        // Size changes wait for a resize notification
        host.set_size(400.0, 300.0);
        assert_eq!(surface.sync(), Ok(false));
        assert_eq!(surface.size(), Size::new(800.0, 600.0));
        surface.mark_dirty();
        assert_eq!(surface.sync(), Ok(true));
        assert_eq!(surface.size(), Size::new(400.0, 300.0));

        // Remounting re-reads the size
        host.unmount();
        assert_eq!(surface.sync(), Err(EngineError::SurfaceUnavailable));
        host.set_size(640.0, 480.0);
        assert_eq!(surface.sync(), Ok(true));
        assert_eq!(surface.size(), Size::new(640.0, 480.0));
    }

    #[test]
    fn test_dirty_rereads_pixel_ratio() {
        let host = Rc::new(StaticContainer::new(100.0, 100.0));
        let mut surface = Surface::from_host(host.clone()).unwrap();
        host.set_device_pixel_ratio(2.0);
        assert_eq!(surface.sync(), Ok(false));

        surface.mark_dirty();
        assert_eq!(surface.sync(), Ok(true));
        assert_eq!(surface.device_pixel_ratio(), 2.0);

        let ctx = surface.begin_frame();
        assert_eq!(ctx.viewport_size(), Size::new(200.0, 200.0));
        ctx.fill_circle_xyr(10.0, 10.0, 2.0, twinkle_core::Color::WHITE);
        surface.end_frame();
        assert_eq!(surface.take_commands().len(), 3);
    }
}
