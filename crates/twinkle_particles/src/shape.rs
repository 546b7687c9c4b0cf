//! Shape routines
//!
//! Every shape draws centered on the particle position, rotated by the
//! particle rotation and faded by its opacity. Drawing never mutates the
//! particle: anything random about a shape (the dust mote spread) is fixed at
//! spawn and stored in the [`Shape`] value.

use std::f32::consts::TAU;

use twinkle_core::{BlendMode, Color, DrawContext, LineCap, Point, Stroke};
use twinkle_paint::gradient::{linear_fade, radial_glow};
use twinkle_paint::{Ellipse, PaintContext, PathBuilder};

use crate::config::EffectType;
use crate::particle::Particle;

/// Radial falloff of the firefly halo
const FIREFLY_GLOW: &[(f32, f32)] = &[(0.0, 0.8), (0.5, 0.3), (1.0, 0.0)];
const ENERGY_GLOW: &[(f32, f32)] = &[(0.0, 0.9), (0.4, 0.4), (1.0, 0.0)];

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Shape {
    #[default]
    Circle,
    Star,
    Paw,
    WaterDrop,
    Sparkle,
    MagicSwirl,
    Firefly,
    /// Distance factors of the three motes, each in [0, 2)
    Dust { motes: [f32; 3] },
    /// Comet whose tail trails behind the velocity
    ClipPathFollow,
    EnergyOrb,
    Fire,
    Leaf,
    RainStreak,
}

impl Shape {
    /// Shape for a freshly spawned particle of `effect`
    pub fn for_effect(effect: EffectType, clip_path_follow: bool, rng: &mut fastrand::Rng) -> Self {
        match effect {
            EffectType::Normal if clip_path_follow => Shape::ClipPathFollow,
            EffectType::Normal | EffectType::Snow => Shape::Circle,
            EffectType::Stars => Shape::Star,
            EffectType::Paws => Shape::Paw,
            EffectType::WaterDrops => Shape::WaterDrop,
            EffectType::Sparkles => Shape::Sparkle,
            EffectType::Magic => Shape::MagicSwirl,
            EffectType::Fireflies => Shape::Firefly,
            EffectType::Dust => Shape::Dust {
                motes: [rng.f32() * 2.0, rng.f32() * 2.0, rng.f32() * 2.0],
            },
            EffectType::Energy => Shape::EnergyOrb,
            EffectType::Fire => Shape::Fire,
            EffectType::Leaves => Shape::Leaf,
            EffectType::Rain => Shape::RainStreak,
        }
    }

    /// Whether the shape is drawn rotated
    ///
    /// Comets orient by velocity instead.
    pub fn spins(self) -> bool {
        !matches!(self, Shape::ClipPathFollow)
    }

    fn blend_mode(self) -> BlendMode {
        match self {
            Shape::Firefly | Shape::EnergyOrb => BlendMode::Add,
            _ => BlendMode::Normal,
        }
    }

    /// Draw `particle` with global alpha multiplier `alpha_scale`
    pub fn draw(&self, particle: &Particle, ctx: &mut PaintContext, alpha_scale: f32) {
        let s = particle.size;
        let color = particle.color.to_color();

        ctx.save();
        ctx.translate(particle.position.x, particle.position.y);
        if self.spins() {
            ctx.rotate(particle.rotation);
        }
        ctx.set_global_alpha(particle.opacity * alpha_scale);
        let blend = self.blend_mode();
        if blend != BlendMode::Normal {
            ctx.set_blend_mode(blend);
        }

        match *self {
            Shape::Circle => ctx.fill_circle_xyr(0.0, 0.0, s, color),
            Shape::Star => ctx.fill_path(&PathBuilder::star(5, s * 2.0, s), color.into()),
            Shape::Paw => draw_paw(ctx, s, color),
            Shape::WaterDrop => {
                ctx.fill_circle_xyr(0.0, s / 2.0, s, color);
                let tip = PathBuilder::polygon([
                    Point::new(0.0, s / 2.0),
                    Point::new(s, -s),
                    Point::new(-s, -s),
                ]);
                ctx.fill_path(&tip, color.into());
            }
            Shape::Sparkle => {
                let stroke = Stroke::new(2.0);
                for i in 0..4 {
                    let angle = i as f32 / 4.0 * TAU;
                    let (sin, cos) = angle.sin_cos();
                    ctx.stroke_line(
                        Point::new(cos * s, sin * s),
                        Point::new(cos * s * 2.0, sin * s * 2.0),
                        &stroke,
                        color,
                    );
                }
            }
            Shape::MagicSwirl => {
                let stroke = Stroke::new(3.0);
                for i in 0..3 {
                    let angle = i as f32 / 3.0 * TAU + particle.rotation;
                    let (sin, cos) = angle.sin_cos();
                    let tip = Point::new(cos * s * 3.0, sin * s * 3.0);
                    ctx.stroke_line(Point::ZERO, tip, &stroke, color);
                }
                ctx.fill_circle_xyr(0.0, 0.0, s, color);
            }
            Shape::Firefly => {
                // Glow pulses with rotation so it needs no extra state
                let glow = ((particle.rotation * 4.0).sin() + 1.0) / 2.0;
                let glow_size = s * (1.0 + glow * 0.5);
                let halo = radial_glow(Point::ZERO, glow_size, color, FIREFLY_GLOW);
                ctx.fill_circle(Point::ZERO, glow_size, halo.into());
                ctx.fill_circle_xyr(0.0, 0.0, s, color);
            }
            Shape::Dust { motes } => {
                let mote = color.with_alpha(0.6);
                for (i, distance) in motes.iter().enumerate() {
                    let angle = i as f32 / 3.0 * TAU + particle.rotation;
                    let (sin, cos) = angle.sin_cos();
                    let d = distance * s;
                    ctx.fill_circle_xyr(cos * d, sin * d, s * 0.3, mote);
                }
            }
            Shape::ClipPathFollow => draw_comet(ctx, particle, color),
            Shape::EnergyOrb => {
                let radius = s * 2.5;
                let glow = radial_glow(Point::ZERO, radius, color, ENERGY_GLOW);
                ctx.fill_circle(Point::ZERO, radius, glow.into());
                ctx.fill_circle_xyr(0.0, 0.0, s * 0.6, Color::lerp(&color, &Color::WHITE, 0.5));
            }
            Shape::Fire => {
                let flame = PathBuilder::new()
                    .move_to(0.0, -s * 2.0)
                    .quad_to(s, -s * 0.5, s * 0.6, s * 0.4)
                    .quad_to(0.0, s * 1.2, -s * 0.6, s * 0.4)
                    .quad_to(-s, -s * 0.5, 0.0, -s * 2.0)
                    .close()
                    .build();
                ctx.fill_path(&flame, color.into());
                let core = Color::lerp(&color, &Color::WHITE, 0.6).with_alpha(0.8);
                ctx.fill_circle_xyr(0.0, s * 0.3, s * 0.4, core);
            }
            Shape::Leaf => {
                ctx.fill_ellipse(Ellipse::new(Point::ZERO, s, s / 2.0), color);
                let rib = Color::lerp(&color, &Color::BLACK, 0.3);
                ctx.stroke_line(
                    Point::new(-s, 0.0),
                    Point::new(s, 0.0),
                    &Stroke::new(1.0),
                    rib,
                );
            }
            Shape::RainStreak => ctx.fill_rect_xywh(-s / 2.0, -s * 2.0, s, s * 4.0, color),
        }

        ctx.restore();
    }
}

fn draw_paw(ctx: &mut PaintContext, pad: f32, color: Color) {
    let toe = pad / 2.0;
    ctx.fill_circle_xyr(0.0, 0.0, pad, color);
    ctx.fill_circle_xyr(-pad * 0.7, -pad * 0.7, toe, color);
    ctx.fill_circle_xyr(0.0, -pad * 0.9, toe, color);
    ctx.fill_circle_xyr(pad * 0.7, -pad * 0.7, toe, color);
}

/// Head plus a fading tail opposite the direction of travel
fn draw_comet(ctx: &mut PaintContext, particle: &Particle, color: Color) {
    let s = particle.size;
    let heading = particle.velocity.normalize();
    if heading.length() > 0.0 {
        let tail = Point::new(-heading.x * s * 4.0, -heading.y * s * 4.0);
        let stroke = Stroke::new(s).with_cap(LineCap::Round);
        ctx.stroke_line(Point::ZERO, tail, &stroke, linear_fade(Point::ZERO, tail, color));
    }
    ctx.fill_circle_xyr(0.0, 0.0, s, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use twinkle_core::{DrawCommand, Vec2};

    const ALL_SHAPES: [Shape; 13] = [
        Shape::Circle,
        Shape::Star,
        Shape::Paw,
        Shape::WaterDrop,
        Shape::Sparkle,
        Shape::MagicSwirl,
        Shape::Firefly,
        Shape::Dust {
            motes: [0.5, 1.0, 1.5],
        },
        Shape::ClipPathFollow,
        Shape::EnergyOrb,
        Shape::Fire,
        Shape::Leaf,
        Shape::RainStreak,
    ];

    fn particle(shape: Shape) -> Particle {
        Particle {
            position: Point::new(40.0, 30.0),
            velocity: Vec2::new(0.3, -1.0),
            size: 3.0,
            opacity: 0.8,
            rotation: 0.7,
            color: Rgb::hex(0xffcc00),
            shape,
            ..Default::default()
        }
    }

    #[test]
    fn test_every_shape_paints_and_balances_state() {
        for shape in ALL_SHAPES {
            let mut ctx = PaintContext::new(100.0, 100.0);
            particle(shape).draw(&mut ctx, 1.0);

            assert!(ctx.paint_count() > 0, "{shape:?}");
            assert_eq!(ctx.current_opacity(), 1.0, "{shape:?}");
            assert_eq!(ctx.current_transform(), twinkle_core::Transform::identity());
        }
    }

    #[test]
    fn test_alpha_combines_opacity_and_intensity() {
        let mut ctx = PaintContext::new(100.0, 100.0);
        particle(Shape::Circle).draw(&mut ctx, 0.5);
        let pushed = ctx.commands().iter().find_map(|c| match c {
            DrawCommand::PushOpacity(alpha) => Some(*alpha),
            _ => None,
        });
        assert!((pushed.unwrap() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_only_comets_skip_rotation() {
        let transforms = |shape| {
            let mut ctx = PaintContext::new(100.0, 100.0);
            particle(shape).draw(&mut ctx, 1.0);
            ctx.commands()
                .iter()
                .filter(|c| matches!(c, DrawCommand::PushTransform(_)))
                .count()
        };
        assert_eq!(transforms(Shape::Star), 2);
        assert_eq!(transforms(Shape::RainStreak), 2);
        assert_eq!(transforms(Shape::ClipPathFollow), 1);
    }

    #[test]
    fn test_glow_shapes_use_additive_blend() {
        let mut ctx = PaintContext::new(100.0, 100.0);
        particle(Shape::EnergyOrb).draw(&mut ctx, 1.0);
        assert!(ctx
            .commands()
            .iter()
            .any(|c| matches!(c, DrawCommand::PushBlendMode(BlendMode::Add))));
    }

    #[test]
    fn test_dead_particle_draws_nothing() {
        let mut ctx = PaintContext::new(100.0, 100.0);
        let mut p = particle(Shape::Paw);
        p.opacity = 0.0;
        p.draw(&mut ctx, 1.0);
        assert!(ctx.commands().is_empty());
    }

    #[test]
    fn test_shape_selection() {
        let mut rng = fastrand::Rng::with_seed(1);
        assert_eq!(Shape::for_effect(EffectType::Normal, true, &mut rng), Shape::ClipPathFollow);
        assert_eq!(Shape::for_effect(EffectType::Normal, false, &mut rng), Shape::Circle);
        assert_eq!(Shape::for_effect(EffectType::Rain, false, &mut rng), Shape::RainStreak);
        match Shape::for_effect(EffectType::Dust, false, &mut rng) {
            Shape::Dust { motes } => assert!(motes.iter().all(|d| (0.0..2.0).contains(d))),
            other => panic!("unexpected shape {other:?}"),
        }
    }
}
