//! Spawn cadence and initial particle state

use std::f32::consts::{PI, TAU};

use twinkle_core::{Point, Rect, Size, Vec2};

use crate::color::ColorResolver;
use crate::config::{Direction, EffectSettings, EffectType};
use crate::particle::{Motion, Particle};
use crate::presets::AmbientPreset;
use crate::shape::Shape;

/// Half-width of the upward heading cone
const UPWARD_SPREAD: f32 = PI / 6.0;

/// Where and how often particles are emitted
#[derive(Clone, Debug, PartialEq)]
pub struct EmitterProfile {
    pub effect: EffectType,
    pub direction: Direction,
    /// Spawn events per second
    pub spawn_rate: f32,
    /// Particles per spawn event
    pub particle_count: usize,
    pub clip_path_follow: bool,
    /// Region particles emit from; the whole surface when unset
    pub anchor: Option<Rect>,
}

impl EmitterProfile {
    pub fn from_settings(settings: &EffectSettings) -> Self {
        Self {
            effect: settings.effect,
            direction: settings.direction,
            spawn_rate: settings.spawn_rate,
            particle_count: settings.particle_count,
            clip_path_follow: settings.clip_path_follow,
            anchor: None,
        }
    }

    pub fn with_anchor(mut self, anchor: Rect) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn spawn_interval_ms(&self) -> f32 {
        1000.0 / self.spawn_rate
    }

    /// Anchor region clipped to the surface
    pub fn anchor_in(&self, surface: Size) -> Rect {
        let bounds = surface.to_rect();
        self.anchor
            .and_then(|anchor| anchor.intersection(&bounds))
            .unwrap_or(bounds)
    }

    /// Initial state of one dock particle
    pub fn emit(
        &self,
        settings: &EffectSettings,
        colors: &ColorResolver,
        surface: Size,
        rng: &mut fastrand::Rng,
    ) -> Particle {
        let anchor = self.anchor_in(surface);
        let center = anchor.center();
        let magnitude = 1.0 + rng.f32();

        let (origin, velocity) = match self.direction {
            Direction::All => {
                let origin = Point::new(
                    center.x + (rng.f32() - 0.5) * anchor.width() * 0.5,
                    center.y + (rng.f32() - 0.5) * anchor.height() * 0.5,
                );
                (origin, Vec2::from_angle(rng.f32() * TAU).scale(magnitude))
            }
            // Ambient fields never reach here; emit like upward if asked
            Direction::Upward | Direction::AmbientField => {
                let origin = Point::new(
                    center.x + (rng.f32() - 0.5) * anchor.width() * 0.8,
                    anchor.bottom(),
                );
                let heading = PI + (rng.f32() - 0.5) * UPWARD_SPREAD * 2.0;
                let velocity =
                    Vec2::new(heading.sin() * magnitude * 0.3, heading.cos() * magnitude);
                (origin, velocity)
            }
        };
        let origin = if self.clip_path_follow {
            anchor.perimeter_point(rng.f32())
        } else {
            origin
        };

        let shape = Shape::for_effect(self.effect, self.clip_path_follow, rng);
        Particle {
            position: surface.to_rect().clamp_point(origin),
            velocity,
            size: settings.size * (0.8 + rng.f32() * 0.4),
            opacity: 1.0,
            rotation: if shape.spins() { rng.f32() * TAU } else { 0.0 },
            rotation_speed: (rng.f32() - 0.5) * 2.0 * settings.rotation_speed,
            gravity: -settings.gravity,
            wind: settings.wind,
            fade_speed: settings.fade_speed,
            size_decay: settings.size_decay,
            color: colors.pick(rng),
            shape,
            age_ms: 0.0,
            lifetime_ms: Some(settings.lifetime_ms),
            motion: match self.direction {
                Direction::All => Motion::Dock,
                Direction::Upward | Direction::AmbientField => Motion::Upward,
            },
            flicker: None,
        }
    }
}

/// Initial state of one ambient field particle, anywhere on the surface
pub fn emit_ambient(
    settings: &EffectSettings,
    preset: &AmbientPreset,
    colors: &ColorResolver,
    surface: Size,
    rng: &mut fastrand::Rng,
) -> Particle {
    let direction = if preset.rising { -1.0 } else { 1.0 };
    let shape = Shape::for_effect(settings.effect, false, rng);
    Particle {
        position: Point::new(rng.f32() * surface.width, rng.f32() * surface.height),
        velocity: Vec2::new((rng.f32() - 0.5) * 0.5, (rng.f32() * 0.5 + 0.5) * direction),
        size: preset.min_size + rng.f32() * (preset.max_size - preset.min_size),
        opacity: rng.f32() * 0.5 + 0.5,
        rotation: if shape.spins() { rng.f32() * TAU } else { 0.0 },
        rotation_speed: if shape.spins() {
            (rng.f32() - 0.5) * 0.02
        } else {
            0.0
        },
        gravity: settings.gravity * direction,
        wind: settings.wind,
        fade_speed: 0.0,
        size_decay: 0.0,
        color: colors.pick(rng),
        shape,
        age_ms: 0.0,
        lifetime_ms: None,
        motion: Motion::Ambient {
            rising: preset.rising,
        },
        flicker: preset.flicker.then(|| rng.f32() * TAU),
    }
}

/// Spawn cadence accumulator
///
/// Fires at most once per tick, and on the very first tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnGate {
    interval_ms: f32,
    elapsed_ms: f32,
}

impl SpawnGate {
    pub fn new(interval_ms: f32) -> Self {
        Self {
            interval_ms,
            elapsed_ms: interval_ms,
        }
    }

    /// Change the cadence without losing accumulated time
    pub fn set_interval(&mut self, interval_ms: f32) {
        self.interval_ms = interval_ms;
    }

    /// Accumulate `delta_ms`; true when a spawn event is due
    pub fn advance(&mut self, delta_ms: f32) -> bool {
        if delta_ms.is_finite() && delta_ms > 0.0 {
            self.elapsed_ms += delta_ms;
        }
        if self.elapsed_ms >= self.interval_ms {
            self.elapsed_ms = 0.0;
            true
        } else {
            false
        }
    }
}
