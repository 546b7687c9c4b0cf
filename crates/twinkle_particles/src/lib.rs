//! Twinkle Particles
//!
//! Real-time 2D particle engine for dock ornaments and ambient weather
//! overlays. The host supplies an [`EngineConfig`] and a [`SurfaceHost`]
//! container; the engine animates on a [`twinkle_animation::FrameScheduler`]
//! and records each frame as draw commands.
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use twinkle_animation::FrameScheduler;
//! use twinkle_particles::{EffectType, EngineConfig, ParticleEngine, StaticContainer};
//!
//! let scheduler = FrameScheduler::new();
//! let host = Rc::new(StaticContainer::new(800.0, 600.0));
//! let mut engine = ParticleEngine::new(host, scheduler.handle())
//!     .with_seed(1)
//!     .with_hardware_concurrency(Some(8));
//!
//! engine.start(&EngineConfig::ambient(EffectType::Snow));
//! for frame in 0..10 {
//!     scheduler.tick(frame as f64 * 16.67);
//! }
//!
//! assert_eq!(engine.active_count(), 80);
//! engine.stop();
//! assert_eq!(engine.active_count(), 0);
//! ```

pub mod color;
pub mod config;
pub mod emitter;
pub mod engine;
pub mod error;
pub mod particle;
pub mod pool;
pub mod presets;
pub mod shape;
pub mod surface;


pub use color::{ColorResolver, ColorSpec, Rgb, DEFAULT_ADAPTIVE_BASE};
pub use config::{ColorConfig, Direction, EffectSettings, EffectType, EngineConfig, PhysicsConfig};
pub use emitter::{EmitterProfile, SpawnGate};
pub use engine::{max_particles, EngineState, EngineStats, ParticleEngine};
pub use error::{EngineError, Result};
pub use particle::{Motion, Particle};
pub use pool::{Pool, PoolStats, POOL_CAPACITY};
pub use presets::{AmbientPreset, PaletteId};
pub use shape::Shape;
pub use surface::{StaticContainer, Surface, SurfaceHost};
