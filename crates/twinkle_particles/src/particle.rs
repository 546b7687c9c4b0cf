//! Particle state and per-frame integration

use twinkle_core::{Point, Rect, Size, Vec2};
use twinkle_paint::PaintContext;

use crate::color::Rgb;
use crate::shape::Shape;

/// Nominal frame length the physics constants are tuned for
pub const FRAME_MS: f32 = 16.67;

/// Frame deltas above this are clamped (tab switches, debugger pauses)
pub const MAX_FRAME_MS: f32 = 50.0;

/// Per-axis velocity limit
pub const MAX_VELOCITY: f32 = 2.0;

const FLICKER_STEP: f32 = 0.1;

/// Convert a frame delta into a multiple of the nominal frame
///
/// Negative and non-finite deltas count as zero.
pub fn time_scale(delta_ms: f32) -> f32 {
    if !delta_ms.is_finite() {
        return 0.0;
    }
    delta_ms.clamp(0.0, MAX_FRAME_MS) / FRAME_MS
}

/// How a particle behaves at the surface boundary
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Motion {
    /// Emitted from an anchor in every direction; culled when it dies or
    /// leaves the surface
    #[default]
    Dock,
    /// Emitted upward from the anchor's bottom edge; a top exit respawns it
    /// there, any other exit culls it
    Upward,
    /// Part of a full-surface field; wraps and respawns forever
    Ambient { rising: bool },
}

/// One live particle
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Particle {
    pub position: Point,
    pub velocity: Vec2,
    /// Radius in pixels, never negative
    pub size: f32,
    /// Always within [0, 1]
    pub opacity: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    /// Vertical acceleration per frame; negative pulls up
    pub gravity: f32,
    /// Horizontal acceleration per frame
    pub wind: f32,
    pub fade_speed: f32,
    pub size_decay: f32,
    pub color: Rgb,
    pub shape: Shape,
    pub age_ms: f32,
    /// `None` for particles that never age out
    pub lifetime_ms: Option<f32>,
    pub motion: Motion,
    /// Flicker phase; when set, opacity follows a sine instead of fading
    pub flicker: Option<f32>,
}

impl Particle {
    /// Advance one step of `scale` nominal frames
    pub fn integrate(&mut self, scale: f32, speed: f32) {
        self.velocity.y += self.gravity * scale;
        self.velocity.x += self.wind * scale;
        self.velocity.x = self.velocity.x.clamp(-MAX_VELOCITY, MAX_VELOCITY);
        self.velocity.y = self.velocity.y.clamp(-MAX_VELOCITY, MAX_VELOCITY);

        self.position.x += self.velocity.x * speed * scale;
        self.position.y += self.velocity.y * speed * scale;

        self.size = (self.size - self.size_decay * scale).max(0.0);
        self.opacity = match self.flicker.as_mut() {
            Some(phase) => {
                *phase += FLICKER_STEP * scale;
                0.5 + phase.sin() * 0.3
            }
            None => self.opacity - self.fade_speed * scale,
        }
        .clamp(0.0, 1.0);
        self.rotation += self.rotation_speed * scale;

        if self.lifetime_ms.is_some() {
            self.age_ms += scale * FRAME_MS;
        }
    }

    pub fn is_dead(&self) -> bool {
        self.size <= 0.0
            || self.opacity <= 0.0
            || self.lifetime_ms.is_some_and(|lifetime| self.age_ms >= lifetime)
    }

    /// True once the particle is further than its own size outside `bounds`
    pub fn is_outside(&self, bounds: Size) -> bool {
        let margin = self.size;
        self.position.x < -margin
            || self.position.x > bounds.width + margin
            || self.position.y < -margin
            || self.position.y > bounds.height + margin
    }

    /// Apply the boundary rule for this particle's motion
    ///
    /// Upward particles that rise past the top move back to the bottom edge of
    /// `origin` with a fresh lateral position inside it. Ambient particles wrap
    /// horizontally and respawn at the origin edge of the surface. Returns
    /// `false` when the particle should be culled.
    pub fn apply_boundary(
        &mut self,
        bounds: Size,
        origin: Rect,
        rng: &mut fastrand::Rng,
    ) -> bool {
        let rising = match self.motion {
            Motion::Dock => return !self.is_outside(bounds),
            Motion::Upward => {
                if self.position.y < -self.size {
                    self.position = Point::new(
                        origin.center().x + (rng.f32() - 0.5) * origin.width() * 0.8,
                        origin.bottom(),
                    );
                }
                return !self.is_outside(bounds);
            }
            Motion::Ambient { rising } => rising,
        };

        let margin = self.size;
        if self.position.x < -margin {
            self.position.x = bounds.width + margin;
        } else if self.position.x > bounds.width + margin {
            self.position.x = -margin;
        }

        if !rising && self.position.y > bounds.height + margin {
            self.position.y = -margin;
            self.position.x = rng.f32() * bounds.width;
        } else if rising && self.position.y < -margin {
            self.position.y = bounds.height + margin;
            self.position.x = rng.f32() * bounds.width;
        }
        true
    }

    /// Draw with the global alpha multiplier `alpha_scale`
    pub fn draw(&self, ctx: &mut PaintContext, alpha_scale: f32) {
        if self.size <= 0.0 || self.opacity <= 0.0 {
            return;
        }
        self.shape.draw(self, ctx, alpha_scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> fastrand::Rng {
        fastrand::Rng::with_seed(42)
    }

    fn dock_particle() -> Particle {
        Particle {
            position: Point::new(100.0, 100.0),
            size: 3.0,
            opacity: 1.0,
            fade_speed: 0.008,
            size_decay: 0.02,
            lifetime_ms: Some(3000.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_time_scale() {
        assert!((time_scale(16.67) - 1.0).abs() < 1e-6);
        assert_eq!(time_scale(500.0), MAX_FRAME_MS / FRAME_MS);
        assert_eq!(time_scale(-3.0), 0.0);
        assert_eq!(time_scale(f32::NAN), 0.0);
    }

    #[test]
    fn test_integrate_applies_gravity_then_moves() {
        let mut p = dock_particle();
        p.velocity = Vec2::new(0.5, -1.0);
        p.gravity = -0.02;
        p.integrate(1.0, 2.0);

        assert!((p.velocity.y + 1.02).abs() < 1e-6);
        assert!((p.position.x - 101.0).abs() < 1e-4);
        assert!((p.position.y - (100.0 - 2.04)).abs() < 1e-4);
        assert!((p.size - 2.98).abs() < 1e-6);
        assert!((p.opacity - 0.992).abs() < 1e-6);
    }

    #[test]
    fn test_velocity_is_clamped() {
        let mut p = dock_particle();
        p.velocity = Vec2::new(1.99, -1.99);
        p.wind = 1.0;
        p.gravity = -1.0;
        p.integrate(3.0, 1.0);
        assert_eq!(p.velocity, Vec2::new(MAX_VELOCITY, -MAX_VELOCITY));
    }

    #[test]
    fn test_opacity_and_size_never_go_negative() {
        let mut p = dock_particle();
        p.opacity = 0.001;
        p.size = 0.001;
        p.integrate(MAX_FRAME_MS / FRAME_MS, 1.0);
        assert_eq!(p.opacity, 0.0);
        assert_eq!(p.size, 0.0);
        assert!(p.is_dead());
    }

    #[test]
    fn test_flicker_stays_in_band() {
        let mut p = dock_particle();
        p.fade_speed = 0.0;
        p.flicker = Some(0.0);
        for _ in 0..200 {
            p.integrate(1.0, 1.0);
            assert!(p.opacity >= 0.2 - 1e-6 && p.opacity <= 0.8 + 1e-6);
        }
    }

    #[test]
    fn test_lifetime_ends_particle() {
        let mut p = dock_particle();
        p.fade_speed = 0.0;
        p.size_decay = 0.0;
        p.lifetime_ms = Some(100.0);
        for _ in 0..5 {
            p.integrate(1.0, 1.0);
        }
        assert!(!p.is_dead());
        p.integrate(1.0, 1.0);
        assert!(p.is_dead());
    }

    #[test]
    fn test_dock_particle_culled_outside() {
        let bounds = Size::new(200.0, 200.0);
        let origin = bounds.to_rect();
        let mut p = dock_particle();
        assert!(p.apply_boundary(bounds, origin, &mut rng()));
        p.position.y = -3.5;
        assert!(!p.apply_boundary(bounds, origin, &mut rng()));
    }

    #[test]
    fn test_upward_particle_respawns_on_anchor_base() {
        let bounds = Size::new(400.0, 300.0);
        let anchor = Rect::new(100.0, 200.0, 200.0, 50.0);
        let mut p = Particle {
            motion: Motion::Upward,
            age_ms: 900.0,
            ..dock_particle()
        };

        // Just inside the margin nothing moves
        p.position = Point::new(150.0, -2.5);
        assert!(p.apply_boundary(bounds, anchor, &mut rng()));
        assert_eq!(p.position, Point::new(150.0, -2.5));

        p.position = Point::new(150.0, -3.5);
        assert!(p.apply_boundary(bounds, anchor, &mut rng()));
        assert_eq!(p.position.y, 250.0);
        assert!((120.0..=280.0).contains(&p.position.x));
        assert_eq!(p.age_ms, 900.0);
        assert_eq!(p.size, 3.0);

        // Side and bottom exits still cull
        p.position = Point::new(403.5, 100.0);
        assert!(!p.apply_boundary(bounds, anchor, &mut rng()));
        p.position = Point::new(100.0, 303.5);
        assert!(!p.apply_boundary(bounds, anchor, &mut rng()));
    }

    #[test]
    fn test_ambient_wraps_and_respawns() {
        let bounds = Size::new(400.0, 300.0);
        let origin = bounds.to_rect();
        let mut p = Particle {
            size: 2.0,
            opacity: 0.6,
            motion: Motion::Ambient { rising: false },
            position: Point::new(-2.5, 10.0),
            ..Default::default()
        };
        assert!(p.apply_boundary(bounds, origin, &mut rng()));
        assert_eq!(p.position.x, 402.0);

        p.position = Point::new(50.0, 302.5);
        assert!(p.apply_boundary(bounds, origin, &mut rng()));
        assert_eq!(p.position.y, -2.0);
        assert!((0.0..=400.0).contains(&p.position.x));

        p.motion = Motion::Ambient { rising: true };
        p.position = Point::new(50.0, -2.5);
        p.apply_boundary(bounds, origin, &mut rng());
        assert_eq!(p.position.y, 302.0);
    }
}
