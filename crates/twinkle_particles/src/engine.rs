//! Particle engine
//!
//! [`ParticleEngine`] is the host-facing facade. Mutable state lives in
//! `EngineCore` behind `Rc<RefCell<..>>` so the frame task can reach it
//! through a weak reference; the facade owns the task handle.
//!
//! Each tick runs: surface check, spawn, update and boundary, cull, cap, draw.
//!
//! Stopping bumps a run id the frame task compares on every dispatch, so a
//! callback registered by an earlier `start()` can never run after `stop()`
//! even if the scheduler has already snapshotted it for the current frame.

use std::cell::RefCell;
use std::num::NonZeroUsize;
use std::rc::{Rc, Weak};

use twinkle_animation::{FrameTaskHandle, SchedulerHandle, TaskControl};
use twinkle_core::{DrawCommand, Rect, Size};

use crate::color::ColorResolver;
use crate::config::{EffectSettings, EngineConfig};
use crate::emitter::{emit_ambient, EmitterProfile, SpawnGate};
use crate::error::EngineError;
use crate::particle::{time_scale, Particle};
use crate::pool::{Pool, PoolStats};
use crate::presets::{self, AmbientPreset};
use crate::surface::{Surface, SurfaceHost};

/// Cap used when the host cannot report its core count
pub const DEFAULT_MAX_PARTICLES: usize = 150;
pub const MIN_MAX_PARTICLES: usize = 50;
pub const MAX_MAX_PARTICLES: usize = 200;

/// Resize notifications closer together than this collapse into one
pub const RESIZE_DEBOUNCE_MS: f32 = 100.0;

/// Device-capability particle cap
///
/// Ten particles per logical core, clamped to [50, 200].
pub fn max_particles(hardware_concurrency: Option<usize>) -> usize {
    hardware_concurrency
        .map(|cores| cores.saturating_mul(10).clamp(MIN_MAX_PARTICLES, MAX_MAX_PARTICLES))
        .unwrap_or(DEFAULT_MAX_PARTICLES)
}

fn detected_concurrency() -> Option<usize> {
    std::thread::available_parallelism()
        .ok()
        .map(NonZeroUsize::get)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EngineState {
    #[default]
    Idle,
    Running,
    /// The host cannot draw; every later start is a no-op
    Unsupported,
}

/// Running counters since the engine was created
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub ticks: u64,
    /// Ticks skipped because the surface was unavailable
    pub skipped: u64,
    pub spawn_events: u64,
    pub spawned: u64,
    pub culled: u64,
    /// Particles dropped by the cap
    pub trimmed: u64,
}

struct EngineCore {
    host: Rc<dyn SurfaceHost>,
    surface: Option<Surface>,
    surface_lost: bool,
    settings: EffectSettings,
    emitter: EmitterProfile,
    colors: ColorResolver,
    ambient: Option<AmbientPreset>,
    gate: SpawnGate,
    pool: Pool,
    rng: fastrand::Rng,
    max_particles: usize,
    state: EngineState,
    run_id: u64,
    /// Fill the ambient field before the next update
    needs_seed: bool,
    resize_countdown: Option<f32>,
    stats: EngineStats,
}

impl EngineCore {
    fn new(host: Rc<dyn SurfaceHost>) -> Self {
        let settings = EffectSettings::default();
        let mut rng = fastrand::Rng::new();
        let colors = ColorResolver::new(&settings.color, &mut rng);
        Self {
            host,
            surface: None,
            surface_lost: false,
            emitter: EmitterProfile::from_settings(&settings),
            gate: SpawnGate::new(settings.spawn_interval_ms()),
            ambient: None,
            colors,
            settings,
            pool: Pool::new(),
            rng,
            max_particles: max_particles(detected_concurrency()),
            state: EngineState::Idle,
            run_id: 0,
            needs_seed: false,
            resize_countdown: None,
            stats: EngineStats::default(),
        }
    }

    /// Install new settings; existing particles keep their look
    fn apply(&mut self, settings: EffectSettings) {
        let mode_changed = settings.direction.is_ambient() != self.settings.direction.is_ambient()
            || (settings.direction.is_ambient() && settings.effect != self.settings.effect);

        let anchor = self.emitter.anchor;
        self.emitter = EmitterProfile::from_settings(&settings);
        self.emitter.anchor = anchor;
        self.colors = ColorResolver::new(&settings.color, &mut self.rng);
        self.gate.set_interval(settings.spawn_interval_ms());
        self.ambient = settings
            .direction
            .is_ambient()
            .then(|| presets::ambient(settings.effect));
        self.settings = settings;

        if mode_changed {
            self.pool.release_all();
            self.pool.enforce_free_bound();
        }
        if mode_changed || self.pool.is_empty() {
            self.needs_seed = self.ambient.is_some();
        }
    }

    fn start(&mut self, settings: EffectSettings) {
        match self.state {
            EngineState::Running => {
                tracing::debug!("engine already running");
                return;
            }
            EngineState::Unsupported => {
                tracing::debug!("engine disabled on this host");
                return;
            }
            EngineState::Idle => {}
        }
        if !settings.enabled {
            tracing::debug!("start ignored: effect disabled");
            self.apply(settings);
            return;
        }

        match Surface::from_host(self.host.clone()) {
            Ok(surface) => self.surface = Some(surface),
            Err(EngineError::Unsupported(reason)) => {
                self.disable(&reason);
                return;
            }
            Err(err) => {
                tracing::debug!(%err, "starting without a surface");
                self.surface = None;
            }
        }

        self.apply(settings);
        self.gate = SpawnGate::new(self.settings.spawn_interval_ms());
        self.needs_seed = self.ambient.is_some();
        self.state = EngineState::Running;
        self.run_id += 1;
        tracing::debug!(
            effect = %self.settings.effect,
            direction = %self.settings.direction,
            max_particles = self.max_particles,
            "particle engine started"
        );
    }

    fn stop(&mut self) {
        if self.state != EngineState::Running {
            return;
        }
        self.state = EngineState::Idle;
        self.run_id += 1;
        let released = self.pool.release_all();
        self.pool.enforce_free_bound();
        self.surface = None;
        self.resize_countdown = None;
        tracing::debug!(released, "particle engine stopped");
    }

    fn disable(&mut self, reason: &str) {
        tracing::warn!(reason, "particle engine disabled");
        self.pool.release_all();
        self.surface = None;
        self.state = EngineState::Unsupported;
        self.run_id += 1;
    }

    /// Current surface size, or `None` when this tick must be skipped
    fn prepare_surface(&mut self, delta_ms: f32) -> Option<Size> {
        if let Some(remaining) = self.resize_countdown.as_mut() {
            *remaining -= delta_ms.max(0.0);
            if *remaining <= 0.0 {
                self.resize_countdown = None;
                if let Some(surface) = self.surface.as_mut() {
                    surface.mark_dirty();
                }
            }
        }

        if self.surface.is_none() {
            match Surface::from_host(self.host.clone()) {
                Ok(surface) => {
                    self.surface = Some(surface);
                    self.needs_seed = self.ambient.is_some();
                }
                Err(EngineError::Unsupported(reason)) => {
                    self.disable(&reason);
                    return None;
                }
                Err(err) => {
                    self.note_surface_lost(&err);
                    return None;
                }
            }
        }

        let surface = self.surface.as_mut()?;
        match surface.sync().map(|resized| (resized, surface.size())) {
            Ok((resized, size)) => {
                if resized && self.ambient.is_some() {
                    self.needs_seed = true;
                }
                if self.surface_lost {
                    self.surface_lost = false;
                    tracing::debug!("surface available again");
                }
                Some(size)
            }
            Err(err) => {
                self.note_surface_lost(&err);
                None
            }
        }
    }

    fn note_surface_lost(&mut self, err: &EngineError) {
        if !self.surface_lost {
            self.surface_lost = true;
            tracing::debug!(%err, "skipping frames until the surface returns");
        }
        self.stats.skipped += 1;
    }

    fn tick(&mut self, delta_ms: f32) {
        if self.state != EngineState::Running {
            return;
        }
        self.stats.ticks += 1;
        let Some(size) = self.prepare_surface(delta_ms) else {
            return;
        };

        self.spawn(delta_ms, size);

        let scale = time_scale(delta_ms);
        let speed = self.settings.speed;
        let origin = self.emitter.anchor_in(size);
        let rng = &mut self.rng;
        let culled = self.pool.retain(|particle| {
            particle.integrate(scale, speed);
            particle.apply_boundary(size, origin, rng) && !particle.is_dead()
        });
        let trimmed = self.pool.trim_oldest(self.max_particles);
        self.pool.enforce_free_bound();
        self.stats.culled += culled as u64;
        self.stats.trimmed += trimmed as u64;

        self.draw();

        tracing::trace!(
            active = self.pool.len(),
            culled,
            trimmed,
            "tick"
        );
    }

    fn spawn(&mut self, delta_ms: f32, size: Size) {
        if let Some(preset) = self.ambient {
            let population = preset.population.min(self.max_particles);
            if self.needs_seed {
                self.needs_seed = false;
                self.pool.release_all();
                self.spawn_ambient(&preset, population, size);
                return;
            }
            if self.gate.advance(delta_ms) {
                let deficit = population.saturating_sub(self.pool.len());
                self.spawn_ambient(&preset, deficit, size);
            }
            return;
        }

        if !self.gate.advance(delta_ms) {
            return;
        }
        self.stats.spawn_events += 1;
        for _ in 0..self.settings.particle_count {
            let particle = self
                .emitter
                .emit(&self.settings, &self.colors, size, &mut self.rng);
            self.pool.spawn(particle);
        }
        self.stats.spawned += self.settings.particle_count as u64;
    }

    fn spawn_ambient(&mut self, preset: &AmbientPreset, count: usize, size: Size) {
        if count == 0 {
            return;
        }
        self.stats.spawn_events += 1;
        for _ in 0..count {
            let particle = emit_ambient(&self.settings, preset, &self.colors, size, &mut self.rng);
            self.pool.spawn(particle);
        }
        self.stats.spawned += count as u64;
    }

    fn draw(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let alpha = self.settings.alpha_scale();
        let ctx = surface.begin_frame();
        for particle in self.pool.iter() {
            particle.draw(ctx, alpha);
        }
        surface.end_frame();
    }
}

/// Host-facing particle engine
///
/// Dropping the engine stops it.
pub struct ParticleEngine {
    core: Rc<RefCell<EngineCore>>,
    scheduler: SchedulerHandle,
    task: Option<FrameTaskHandle>,
}

impl ParticleEngine {
    pub fn new(host: Rc<dyn SurfaceHost>, scheduler: SchedulerHandle) -> Self {
        Self {
            core: Rc::new(RefCell::new(EngineCore::new(host))),
            scheduler,
            task: None,
        }
    }

    /// Use a fixed random seed
    pub fn with_seed(self, seed: u64) -> Self {
        self.core.borrow_mut().rng = fastrand::Rng::with_seed(seed);
        self
    }

    /// Override the detected core count used for the particle cap
    pub fn with_hardware_concurrency(self, cores: Option<usize>) -> Self {
        self.core.borrow_mut().max_particles = max_particles(cores);
        self
    }

    /// Begin animating `config`
    ///
    /// No-op while running, when `config.enabled` is false, or after the
    /// host proved unable to draw.
    pub fn start(&mut self, config: &EngineConfig) {
        let run_id = {
            let mut core = self.core.borrow_mut();
            core.start(config.sanitize());
            if core.state != EngineState::Running {
                return;
            }
            core.run_id
        };
        if self.task.as_ref().is_some_and(FrameTaskHandle::is_active) {
            return;
        }

        let weak: Weak<RefCell<EngineCore>> = Rc::downgrade(&self.core);
        self.task = self.scheduler.register(move |time| {
            let Some(shared) = weak.upgrade() else {
                return TaskControl::Stop;
            };
            let Ok(mut core) = shared.try_borrow_mut() else {
                return TaskControl::Continue;
            };
            if core.run_id != run_id || core.state != EngineState::Running {
                return TaskControl::Stop;
            }
            core.tick(time.delta_ms);
            if core.state == EngineState::Running {
                TaskControl::Continue
            } else {
                TaskControl::Stop
            }
        });
        if self.task.is_none() {
            tracing::debug!("scheduler gone; drive the engine with tick()");
        }
    }

    /// Stop animating and release every particle; idempotent
    pub fn stop(&mut self) {
        self.core.borrow_mut().stop();
        if let Some(mut task) = self.task.take() {
            task.cancel();
        }
    }

    /// Apply a changed configuration without tearing down the pool
    ///
    /// Toggling `enabled` starts or stops the engine.
    pub fn reconfigure(&mut self, config: &EngineConfig) {
        let settings = config.sanitize();
        let state = self.state();
        match (state, settings.enabled) {
            (EngineState::Running, false) => {
                self.stop();
                self.core.borrow_mut().apply(settings);
            }
            (EngineState::Running, true) => {
                tracing::debug!(effect = %settings.effect, "reconfigured");
                self.core.borrow_mut().apply(settings);
            }
            (EngineState::Idle, true) => self.start(config),
            _ => self.core.borrow_mut().apply(settings),
        }
    }

    /// Advance one frame of `delta_ms` milliseconds
    ///
    /// The scheduler calls this every frame; hosts without a scheduler may
    /// call it directly.
    pub fn tick(&mut self, delta_ms: f32) {
        self.core.borrow_mut().tick(delta_ms);
    }

    /// Notify that the container may have changed size
    ///
    /// The size is re-read once notifications stop for the debounce window.
    pub fn request_resize(&mut self) {
        self.core.borrow_mut().resize_countdown = Some(RESIZE_DEBOUNCE_MS);
    }

    /// Region dock particles emit from; `None` for the whole surface
    pub fn set_anchor(&mut self, anchor: Option<Rect>) {
        self.core.borrow_mut().emitter.anchor = anchor;
    }

    pub fn state(&self) -> EngineState {
        self.core.borrow().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == EngineState::Running
    }

    pub fn active_count(&self) -> usize {
        self.core.borrow().pool.len()
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.core.borrow().pool.stats()
    }

    pub fn max_particles(&self) -> usize {
        self.core.borrow().max_particles
    }

    pub fn stats(&self) -> EngineStats {
        self.core.borrow().stats
    }

    pub fn settings(&self) -> EffectSettings {
        self.core.borrow().settings.clone()
    }

    /// Logical surface size, if a surface is bound
    pub fn surface_size(&self) -> Option<Size> {
        self.core.borrow().surface.as_ref().map(Surface::size)
    }

    /// Visit active particles, oldest first
    pub fn visit_particles(&self, mut f: impl FnMut(&Particle)) {
        for particle in self.core.borrow().pool.iter() {
            f(particle);
        }
    }

    /// Run `f` over the commands recorded by the last drawn frame
    pub fn with_commands<R>(&self, f: impl FnOnce(&[DrawCommand]) -> R) -> R {
        let core = self.core.borrow();
        f(core.surface.as_ref().map(Surface::commands).unwrap_or(&[]))
    }

    /// Take the commands recorded by the last drawn frame
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        self.core
            .borrow_mut()
            .surface
            .as_mut()
            .map(Surface::take_commands)
            .unwrap_or_default()
    }
}

impl Drop for ParticleEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for ParticleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticleEngine")
            .field("state", &self.state())
            .field("active", &self.active_count())
            .field("task", &self.task)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_particles() {
        assert_eq!(max_particles(Some(4)), 50);
        assert_eq!(max_particles(Some(8)), 80);
        assert_eq!(max_particles(Some(64)), 200);
        assert_eq!(max_particles(Some(0)), 50);
        assert_eq!(max_particles(None), 150);
    }
}
