use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::rc::Rc;

use twinkle_animation::FrameScheduler;
use twinkle_particles::{Direction, EffectType, EngineConfig, ParticleEngine, StaticContainer};

/// Engine warmed up until the cap is saturated
fn saturated(scheduler: &FrameScheduler, config: &EngineConfig) -> ParticleEngine {
    let host = Rc::new(StaticContainer::new(1920.0, 1080.0));
    let mut engine = ParticleEngine::new(host, scheduler.handle())
        .with_seed(0x5eed)
        .with_hardware_concurrency(Some(20));
    engine.start(config);
    for _ in 0..240 {
        engine.tick(16.67);
    }
    engine
}

fn tick_benchmark(c: &mut Criterion) {
    let scheduler = FrameScheduler::new();

    let dock = EngineConfig {
        effect_type: EffectType::Stars,
        particle_count: 10.0,
        ..Default::default()
    };
    let mut engine = saturated(&scheduler, &dock);
    c.bench_function("dock_tick_at_cap", |b| {
        b.iter(|| {
            engine.tick(black_box(16.67));
            black_box(engine.active_count());
        })
    });

    let omni = EngineConfig {
        effect_type: EffectType::Fireflies,
        direction: Direction::All,
        particle_count: 10.0,
        ..Default::default()
    };
    let mut engine = saturated(&scheduler, &omni);
    c.bench_function("glow_tick_at_cap", |b| {
        b.iter(|| {
            engine.tick(black_box(16.67));
            black_box(engine.take_commands());
        })
    });

    let mut engine = saturated(&scheduler, &EngineConfig::ambient(EffectType::Rain));
    c.bench_function("ambient_rain_tick", |b| {
        b.iter(|| {
            engine.tick(black_box(16.67));
            black_box(engine.active_count());
        })
    });
}

criterion_group!(benches, tick_benchmark);
criterion_main!(benches);
