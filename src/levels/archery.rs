//! Forest archery
//!
//! Aim, hold to draw the bow, release to shoot. Arrows drop under gravity and
//! drift with the wind. Hitting every target starts the next wave with extra
//! bonus targets and fresh wind.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use rand::{Rng, RngCore};
use rand_pcg::Pcg32;

use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::engine::{GameEvent, Level, LevelKind};
use crate::input::{Action, TickInput};
use crate::math::{from_angle, random_between, random_sign, seeded_rng};
use crate::renderer::{Color, DrawList, GradientDir, TextStyle};
use crate::settings::Settings;
use crate::sim::{Body, Envelope, Particle, ParticleSystem, Rect, Trail, rect_overlap};
use crate::tuning::ArcheryTuning;

use super::hud_style;

/// (size, points, colour) for the regular target kinds
const TARGET_KINDS: [(f32, u32, Color); 5] = [
    (50.0, 100, Color::hex(0xFFD700)),
    (40.0, 75, Color::hex(0xC0C0C0)),
    (35.0, 50, Color::hex(0xCD7F32)),
    (30.0, 25, Color::hex(0xFF6B6B)),
    (25.0, 10, Color::hex(0x4ECDC4)),
];
const BONUS_COLOR: Color = Color::hex(0xFF1493);
const ARROW_TRAIL: usize = 6;
/// Arrows this far past the right or bottom edge are dropped
const OFFSCREEN_MARGIN: f32 = 50.0;
const LEAF_COUNT: usize = 20;

const SHOT_BURST: Envelope = Envelope::boxed(10, 30, (-2.0, 2.0), (-2.0, 2.0)).sized(1.0, 4.0);
const HIT_BURST: Envelope = Envelope::boxed(15, 40, (-4.0, 4.0), (-4.0, 4.0)).sized(1.0, 5.0);

#[derive(Debug, Clone)]
struct Arrow {
    body: Body,
    angle: f32,
    trail: Trail,
    /// Ticks since it stuck in a target
    stuck: Option<u32>,
}

#[derive(Debug, Clone)]
struct Target {
    /// Top-left at full size
    pos: Vec2,
    full_size: f32,
    points: u32,
    color: Color,
    pulse: f32,
    /// Ticks since it was hit
    hit: Option<u32>,
}

impl Target {
    fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.full_size, self.full_size)
    }

    fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.full_size / 2.0)
    }

    /// Current drawn size; shrinks to nothing over the hit animation
    fn size(&self, anim_ticks: u32) -> f32 {
        match self.hit {
            None => self.full_size,
            Some(t) if t >= anim_ticks => 0.0,
            Some(t) => self.full_size * (1.0 - t as f32 / anim_ticks.max(1) as f32),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wind {
    pub strength: f32,
    /// +1 blows right, -1 blows left
    pub direction: f32,
}

impl Wind {
    /// Horizontal acceleration per tick
    fn push(&self, factor: f32) -> f32 {
        self.strength * self.direction * factor
    }
}

#[derive(Debug, Clone, Copy)]
struct Leaf {
    body: Body,
    size: f32,
    color: Color,
    rotation: f32,
    spin: f32,
}

pub struct Archery {
    tuning: ArcheryTuning,
    settings: Settings,
    rng: Pcg32,
    aim: f32,
    /// Draw power while the bow is held
    charge: Option<f32>,
    arrows: Vec<Arrow>,
    targets: Vec<Target>,
    wind: Wind,
    score: u32,
    wave: u32,
    particles: ParticleSystem,
    leaves: Vec<Leaf>,
    tree_heights: Vec<f32>,
    clock_ms: f64,
    events: Vec<GameEvent>,
}

impl Archery {
    pub fn new(tuning: ArcheryTuning, settings: &Settings, seed: u64) -> Self {
        let mut rng = seeded_rng(seed);
        let leaves = (0..LEAF_COUNT).map(|_| Self::spawn_leaf(&mut rng, None)).collect();
        let tree_heights = (0..15).map(|_| random_between(&mut rng, 80.0, 120.0)).collect();

        let mut archery = Self {
            settings: settings.clone(),
            rng,
            aim: 0.0,
            charge: None,
            arrows: Vec::new(),
            targets: Vec::new(),
            wind: Wind {
                strength: 0.0,
                direction: 1.0,
            },
            score: 0,
            wave: 1,
            particles: ParticleSystem::new(settings.max_particles()),
            leaves,
            tree_heights,
            clock_ms: 0.0,
            events: Vec::new(),
            tuning,
        };
        archery.build_wave();
        archery
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    pub fn wind(&self) -> Wind {
        self.wind
    }

    /// Current draw power (0 when not drawing)
    pub fn charge(&self) -> f32 {
        self.charge.unwrap_or(0.0)
    }

    pub fn arrows_in_flight(&self) -> usize {
        self.arrows.iter().filter(|a| a.stuck.is_none()).count()
    }

    fn targets_hit(&self) -> usize {
        self.targets.iter().filter(|t| t.hit.is_some()).count()
    }

    fn archer_rect(&self) -> Rect {
        let (x, y) = self.tuning.archer_pos;
        let (w, h) = self.tuning.archer_size;
        Rect::new(x, y, w, h)
    }

    /// Where arrows leave the bow
    fn nock(&self) -> Vec2 {
        let archer = self.archer_rect();
        Vec2::new(archer.right(), archer.y + archer.h / 2.0)
    }

    fn spawn_leaf(rng: &mut Pcg32, y: Option<f32>) -> Leaf {
        let green = Color::hex(0xD9D926).mix(Color::hex(0x26D926), random_between(rng, 0.0, 1.0));
        Leaf {
            body: Body::new(
                Vec2::new(
                    random_between(rng, 0.0, CANVAS_WIDTH),
                    y.unwrap_or_else(|| random_between(rng, 0.0, CANVAS_HEIGHT)),
                ),
                Vec2::new(random_between(rng, -1.0, 1.0), random_between(rng, 0.5, 1.5)),
            ),
            size: random_between(rng, 1.0, 4.0),
            color: green.with_alpha(0.6),
            rotation: random_between(rng, 0.0, TAU),
            spin: random_between(rng, -0.05, 0.05),
        }
    }

    /// Lay out the targets for the current wave and roll new wind
    fn build_wave(&mut self) {
        let t = &self.tuning;
        let rng = &mut self.rng;

        self.arrows.clear();
        self.targets = (0..t.target_count)
            .map(|i| {
                let (size, points, color) = TARGET_KINDS[rng.random_range(0..TARGET_KINDS.len())];
                let x = 250.0 + i as f32 * 100.0 + random_between(rng, 0.0, 50.0);
                Target {
                    pos: Vec2::new(
                        x.min(CANVAS_WIDTH - size - 10.0),
                        random_between(rng, 100.0, 300.0),
                    ),
                    full_size: size,
                    points,
                    color,
                    pulse: 0.0,
                    hit: None,
                }
            })
            .collect();

        // The opening wave has no bonus targets
        let bonus = if self.wave > 1 { self.wave } else { 0 };
        for _ in 0..bonus {
            self.targets.push(Target {
                pos: Vec2::new(random_between(rng, 300.0, 700.0), random_between(rng, 50.0, 300.0)),
                full_size: random_between(rng, 20.0, 50.0),
                points: t.bonus_points,
                color: BONUS_COLOR,
                pulse: 0.0,
                hit: None,
            });
        }

        self.roll_wind();
    }

    fn roll_wind(&mut self) {
        let (lo, hi) = self.tuning.wind_strength;
        self.wind = Wind {
            strength: random_between(&mut self.rng, lo, hi),
            direction: random_sign(&mut self.rng),
        };

        // Streaks enter from the upwind edge
        let start_x = if self.wind.direction > 0.0 { -10.0 } else { CANVAS_WIDTH + 10.0 };
        for _ in 0..10 {
            let y = random_between(&mut self.rng, 0.0, CANVAS_HEIGHT);
            let vy = random_between(&mut self.rng, -1.0, 1.0);
            let size = random_between(&mut self.rng, 1.0, 3.0);
            self.particles.emit(Particle {
                pos: Vec2::new(start_x, y),
                vel: Vec2::new(self.wind.push(2.0), vy),
                size,
                color: Color::rgba(200, 200, 255, 0.4),
                life: 100,
                max_life: 100,
            });
        }
        log::debug!("Wind {:.1} x {}", self.wind.strength, self.wind.direction);
    }

    // === Simulation ===

    fn update_aim(&mut self, input: &TickInput) {
        let t = &self.tuning;
        if input.pressed(Action::Up) {
            self.aim = (self.aim - t.aim_step).max(t.aim_min);
        }
        if input.pressed(Action::Down) {
            self.aim = (self.aim + t.aim_step).min(t.aim_max);
        }
    }

    /// Hold to draw, release to shoot
    fn update_bow(&mut self, input: &TickInput) {
        let held = input.pressed(Action::Boost) || input.pressed(Action::Action);
        match (held, self.charge) {
            (true, None) => self.charge = Some(0.0),
            (true, Some(power)) => {
                self.charge = Some((power + self.tuning.charge_rate).min(self.tuning.max_power));
            }
            (false, Some(power)) => {
                self.charge = None;
                self.shoot(power);
            }
            (false, None) => {}
        }
    }

    fn shoot(&mut self, power: f32) {
        let t = &self.tuning;
        if power <= t.min_power || self.arrows_in_flight() >= t.max_arrows_in_flight {
            return;
        }
        let speed = power / t.max_power * 15.0 + 5.0;
        let nock = self.nock();
        self.arrows.push(Arrow {
            body: Body::new(nock, from_angle(self.aim) * speed),
            angle: self.aim,
            trail: Trail::new(self.settings.trail_len(ARROW_TRAIL)),
            stuck: None,
        });
        self.particles
            .burst(&mut self.rng, nock, &SHOT_BURST, Color::hex(0xE0A050));
        self.events.push(GameEvent::ArrowFired);
    }

    fn update_arrows(&mut self) {
        let t = &self.tuning;
        let push = self.wind.push(t.wind_factor);

        for arrow in &mut self.arrows {
            if let Some(ticks) = arrow.stuck.as_mut() {
                *ticks += 1;
                continue;
            }

            arrow.body.vel.y += t.gravity;
            arrow.body.vel.x += push;
            arrow.body.integrate(1);
            arrow.angle = arrow.body.vel.y.atan2(arrow.body.vel.x);
            arrow.trail.push(arrow.body.pos);

            let hitbox = Rect::centered(arrow.body.pos, t.arrow_size.into());
            let struck = self
                .targets
                .iter_mut()
                .find(|target| target.hit.is_none() && rect_overlap(&hitbox, &target.rect().inflate(t.hit_margin)));
            if let Some(target) = struck {
                target.hit = Some(0);
                arrow.stuck = Some(0);
                self.score += target.points;
                self.particles
                    .burst(&mut self.rng, target.center(), &HIT_BURST, target.color);
                self.events.push(GameEvent::TargetHit {
                    points: target.points,
                });
            }
        }

        let stuck_ticks = t.stuck_ticks;
        self.arrows.retain(|a| match a.stuck {
            Some(ticks) => ticks < stuck_ticks,
            None => {
                let p = a.body.pos;
                p.x <= CANVAS_WIDTH + OFFSCREEN_MARGIN
                    && p.y <= CANVAS_HEIGHT + OFFSCREEN_MARGIN
                    && p.x >= -OFFSCREEN_MARGIN
            }
        });
    }

    fn update_targets(&mut self) {
        for target in &mut self.targets {
            match target.hit.as_mut() {
                Some(ticks) => *ticks += 1,
                None => target.pulse += 0.1,
            }
        }
    }

    fn update_leaves(&mut self) {
        if !self.settings.ambient_motion() {
            return;
        }
        for i in 0..self.leaves.len() {
            let leaf = &mut self.leaves[i];
            leaf.body.integrate(1);
            leaf.body.vel.y = (leaf.body.vel.y + 0.01).min(2.0);
            leaf.rotation += leaf.spin;
            if leaf.body.pos.y > CANVAS_HEIGHT + 10.0 {
                self.leaves[i] = Self::spawn_leaf(&mut self.rng, Some(-10.0));
            }
        }
    }

    fn check_wave_cleared(&mut self) {
        let anim = self.tuning.hit_anim_ticks;
        let done = self
            .targets
            .iter()
            .all(|t| matches!(t.hit, Some(ticks) if ticks >= anim));
        if !done {
            return;
        }
        self.events.push(GameEvent::WaveCleared);
        log::info!("Archery wave {} cleared, score {}", self.wave, self.score);
        self.wave += 1;
        self.build_wave();
    }

    // === Rendering ===

    fn render_scenery(&self, out: &mut DrawList) {
        let horizon = CANVAS_HEIGHT * 0.3;
        out.gradient_rect(
            Rect::new(0.0, 0.0, CANVAS_WIDTH, horizon),
            Color::hex(0x87CEEB),
            Color::hex(0xE0F6FF),
            GradientDir::Vertical,
        );

        let mut ridge = vec![Vec2::new(0.0, horizon)];
        ridge.extend((0..=CANVAS_WIDTH as u32).step_by(50).map(|i| {
            let x = i as f32;
            Vec2::new(x, (x * 0.01).sin() * 50.0 + CANVAS_HEIGHT * 0.2)
        }));
        ridge.push(Vec2::new(CANVAS_WIDTH, horizon));
        out.polygon(ridge, Color::hex(0x696969));

        out.gradient_rect(
            Rect::new(0.0, horizon, CANVAS_WIDTH, CANVAS_HEIGHT - horizon),
            Color::hex(0x228B22),
            Color::hex(0x32CD32),
            GradientDir::Vertical,
        );

        let t = self.clock_ms as f32;
        for (i, height) in self.tree_heights.iter().enumerate() {
            let fi = i as f32;
            let x = 120.0 + fi * 45.0 + (i % 3) as f32 * 20.0;
            let y = CANVAS_HEIGHT * 0.6 + (fi * 0.5).sin() * 30.0;
            out.gradient_rect(
                Rect::new(x, y, 15.0, *height),
                Color::hex(0x8B4513),
                Color::hex(0x654321),
                GradientDir::Horizontal,
            );
            let shade = ((t * 0.001 + fi).sin() + 1.0) / 2.0;
            let foliage = Color::hex(0x1F7A1F).mix(Color::hex(0x4D9926), shade);
            out.circle(Vec2::new(x + 7.5, y - 10.0), 25.0 + (t * 0.002 + fi).sin() * 5.0, foliage);
            out.circle(Vec2::new(x + 10.0, y - 7.0), 20.0, Color::BLACK.with_alpha(0.1));
        }

        for leaf in &self.leaves {
            let s = leaf.size;
            out.with_transform(leaf.body.pos, leaf.rotation, |l| {
                l.fill_rect(Rect::new(-s / 2.0, -s / 4.0, s, s / 2.0), leaf.color);
            });
        }
        out.particles(&self.particles);
    }

    fn render_archer(&self, out: &mut DrawList) {
        let archer = self.archer_rect();
        let (x, y) = (archer.x, archer.y);

        out.gradient_rect(
            Rect::new(x + 5.0, y + 20.0, 15.0, 30.0),
            Color::hex(0xD2691E),
            Color::hex(0x8B4513),
            GradientDir::Vertical,
        );
        out.circle(Vec2::new(x + 12.0, y + 15.0), 8.0, Color::hex(0xFDBCB4));
        out.pie(Vec2::new(x + 12.0, y + 10.0), 10.0, PI, TAU, Color::hex(0x8B4513));

        // Bow limb and string
        let bow = Vec2::new(x + 25.0, y + 25.0);
        let radius = 20.0;
        let limb = (0..=8)
            .map(|i| bow + from_angle(-PI / 4.0 + i as f32 * PI / 16.0) * radius)
            .collect();
        out.polyline(limb, Color::hex(0x654321), 4.0);

        let top = bow + from_angle(-PI / 4.0) * radius;
        let bottom = bow + from_angle(PI / 4.0) * radius;
        let string = match self.charge {
            Some(power) => {
                let pull = power / self.tuning.max_power * 15.0;
                vec![top, bow - Vec2::new(pull, 0.0), bottom]
            }
            None => vec![top, bottom],
        };
        out.polyline(string, Color::hex(0xDDDDDD), 2.0);

        if self.charge.is_some() {
            out.line(bow, bow + from_angle(self.aim) * 200.0, Color::rgba(255, 0, 0, 0.5), 2.0);
        }
    }

    fn render_targets(&self, out: &mut DrawList) {
        let anim = self.tuning.hit_anim_ticks;
        for target in &self.targets {
            let size = target.size(anim);
            if size <= 0.0 {
                continue;
            }
            let center = target.center();
            let pulse = target.pulse.sin() * 0.1 + 1.0;

            out.circle(center + Vec2::splat(3.0), size * pulse / 2.0, Color::BLACK.with_alpha(0.3));
            for ring in 0..3 {
                let ring_size = size * (1.0 - ring as f32 * 0.25);
                let alpha = 0.8 - ring as f32 * 0.2;
                out.circle(center, ring_size * pulse / 2.0, target.color.with_alpha(alpha));
            }
            out.circle(center, 3.0 * pulse, Color::hex(0xFFFF00));
            out.text(
                format!("+{}", target.points),
                Vec2::new(center.x, target.pos.y - 10.0),
                &TextStyle::new("14px Arial", target.color).centered().shadowed(),
            );
        }
    }

    fn render_arrows(&self, out: &mut DrawList) {
        for arrow in &self.arrows {
            let trail: Vec<Vec2> = arrow.trail.iter_faded().map(|(p, _)| p).collect();
            out.polyline(trail, Color::rgba(139, 69, 19, 0.6), 2.0);

            out.with_transform(arrow.body.pos, arrow.angle, |l| {
                l.gradient_rect(
                    Rect::new(-10.0, -1.0, 20.0, 2.0),
                    Color::hex(0x8B4513),
                    Color::hex(0x654321),
                    GradientDir::Horizontal,
                );
                l.polygon(
                    vec![Vec2::new(10.0, 0.0), Vec2::new(15.0, -2.0), Vec2::new(15.0, 2.0)],
                    Color::hex(0xC0C0C0),
                );
                l.polygon(
                    vec![
                        Vec2::new(-10.0, -2.0),
                        Vec2::new(-15.0, -4.0),
                        Vec2::new(-15.0, 4.0),
                        Vec2::new(-10.0, 2.0),
                    ],
                    Color::hex(0xFFD700),
                );
            });
        }
    }

    fn render_hud(&self, out: &mut DrawList) {
        out.rounded_rect(Rect::new(20.0, 20.0, 200.0, 100.0), 10.0, Color::BLACK.with_alpha(0.8));
        out.text(
            format!("Score: {}", self.score),
            Vec2::new(40.0, 32.0),
            &TextStyle::new("20px Arial", Color::hex(0xFFD700)).shadowed(),
        );
        out.text(
            format!("Wave: {}", self.wave),
            Vec2::new(40.0, 58.0),
            &TextStyle::new("16px Arial", Color::hex(0x87CEEB)).shadowed(),
        );
        out.text(
            format!("Targets: {}/{}", self.targets_hit(), self.targets.len()),
            Vec2::new(40.0, 80.0),
            &TextStyle::new("16px Arial", Color::hex(0x98FB98)).shadowed(),
        );

        if let Some(power) = self.charge {
            let bar = Rect::new(CANVAS_WIDTH / 2.0 - 100.0, CANVAS_HEIGHT - 60.0, 200.0, 20.0);
            out.rounded_rect(bar, 10.0, Color::BLACK.with_alpha(0.5));
            let fill = power / self.tuning.max_power * (bar.w - 4.0);
            let color = if power < 30.0 {
                Color::hex(0xFF6B6B)
            } else if power < 70.0 {
                Color::hex(0xFFD93D)
            } else {
                Color::hex(0x6BCF7F)
            };
            out.rounded_rect(Rect::new(bar.x + 2.0, bar.y + 2.0, fill, bar.h - 4.0), 8.0, color);
            out.text("POWER", Vec2::new(bar.center().x, bar.y - 10.0), &hud_style(14).centered());
        }

        out.text(
            "Up/Down: aim | Hold Shift or Space: draw | Release: shoot",
            Vec2::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT - 20.0),
            &TextStyle::new("14px Arial", Color::hex(0xDDDDDD)).centered().shadowed(),
        );

        // Wind gauge
        let panel = Rect::new(CANVAS_WIDTH - 150.0, 30.0, 120.0, 60.0);
        out.rounded_rect(panel, 10.0, Color::BLACK.with_alpha(0.7));
        out.text(
            "WIND",
            Vec2::new(panel.x + 60.0, panel.y + 15.0),
            &TextStyle::new("14px Arial", Color::hex(0x87CEEB)).centered().shadowed(),
        );
        let d = self.wind.direction;
        let tip = Vec2::new(panel.x + 30.0, panel.y + 40.0);
        out.polygon(
            vec![
                tip + Vec2::new(0.0, -5.0),
                tip + Vec2::new(15.0 * d, 0.0),
                tip + Vec2::new(0.0, 5.0),
                tip + Vec2::new(5.0 * d, 0.0),
            ],
            Color::hex(0xFFD700),
        );
        let bars = self.wind.strength.ceil() as usize;
        for i in 0..5 {
            let color = if i < bars {
                Color::hex(0xFF6B6B)
            } else {
                Color::WHITE.with_alpha(0.3)
            };
            let fi = i as f32;
            out.rounded_rect(
                Rect::new(panel.x + 70.0 + fi * 8.0, panel.y + 35.0 - fi * 2.0, 6.0, 10.0 + fi * 2.0),
                3.0,
                color,
            );
        }
    }
}

impl Level for Archery {
    fn kind(&self) -> LevelKind {
        LevelKind::Archery
    }

    fn update(&mut self, dt_ms: f64, input: &TickInput) {
        self.clock_ms += dt_ms;
        self.update_aim(input);
        self.update_arrows();
        self.update_bow(input);
        self.update_targets();
        self.particles.update();
        self.update_leaves();
        self.check_wave_cleared();
    }

    fn render(&self, out: &mut DrawList) {
        self.render_scenery(out);
        self.render_archer(out);
        self.render_targets(out);
        self.render_arrows(out);
        self.render_hud(out);
    }

    fn controls_description(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("Up / Down", "Aim"),
            ("Hold Shift or Space", "Draw the bow"),
            ("Release", "Shoot"),
            ("R", "Restart"),
        ]
    }

    fn restart(&mut self) {
        let seed = self.rng.next_u64();
        *self = Self::new(self.tuning.clone(), &self.settings, seed);
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn summary(&self) -> String {
        format!("score {} wave {}", self.score, self.wave)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::tests::input_from_bits;
    use proptest::prelude::*;

    const DT: f64 = 1000.0 / 60.0;

    fn archery() -> Archery {
        Archery::new(ArcheryTuning::default(), &Settings::default(), 9)
    }

    fn draw_for(game: &mut Archery, ticks: usize) {
        for _ in 0..ticks {
            game.update(DT, &TickInput::with(&[Action::Boost]));
        }
    }

    #[test]
    fn test_charge_starts_at_zero_and_grows() {
        let mut game = archery();
        draw_for(&mut game, 1);
        assert_eq!(game.charge(), 0.0);
        draw_for(&mut game, 10);
        assert_eq!(game.charge(), 30.0);
        draw_for(&mut game, 100);
        assert_eq!(game.charge(), 100.0);
    }

    #[test]
    fn test_release_fires_exactly_one_arrow() {
        let mut game = archery();
        draw_for(&mut game, 11);
        game.update(DT, &TickInput::default());

        assert_eq!(game.arrows.len(), 1);
        assert_eq!(game.charge(), 0.0);
        let speed = game.arrows[0].body.speed();
        assert!((speed - (30.0 / 100.0 * 15.0 + 5.0)).abs() < 1e-4);
        assert!(game.drain_events().contains(&GameEvent::ArrowFired));
    }

    #[test]
    fn test_arrow_speed_grows_with_charge() {
        let speed_after = |ticks| {
            let mut game = archery();
            draw_for(&mut game, ticks);
            game.update(DT, &TickInput::default());
            game.arrows[0].body.speed()
        };
        assert!(speed_after(30) > speed_after(10));
    }

    #[test]
    fn test_weak_release_fires_nothing() {
        let mut game = archery();
        draw_for(&mut game, 4);
        game.update(DT, &TickInput::default());
        assert!(game.arrows.is_empty());
        assert_eq!(game.charge(), 0.0);
    }

    #[test]
    fn test_arrows_in_flight_capped() {
        let mut game = archery();
        for _ in 0..8 {
            draw_for(&mut game, 20);
            game.update(DT, &TickInput::default());
        }
        assert!(game.arrows_in_flight() <= 5);
    }

    #[test]
    fn test_aim_clamped() {
        let mut game = archery();
        for _ in 0..100 {
            game.update(DT, &TickInput::with(&[Action::Up]));
        }
        assert_eq!(game.aim, -PI / 4.0);
        for _ in 0..100 {
            game.update(DT, &TickInput::with(&[Action::Down]));
        }
        assert_eq!(game.aim, PI / 6.0);
    }

    #[test]
    fn test_arrow_hits_target() {
        let mut game = archery();
        game.targets.truncate(1);
        game.targets[0].pos = Vec2::new(400.0, 300.0);
        game.targets[0].full_size = 50.0;
        game.targets[0].points = 100;
        game.wind.strength = 0.0;
        game.arrows.push(Arrow {
            body: Body::new(Vec2::new(380.0, 320.0), Vec2::new(5.0, 0.0)),
            angle: 0.0,
            trail: Trail::new(6),
            stuck: None,
        });
        game.update(DT, &TickInput::default());

        assert_eq!(game.score(), 100);
        assert_eq!(game.targets[0].hit, Some(1));
        assert_eq!(game.arrows[0].stuck, Some(0));
        assert!(game.drain_events().contains(&GameEvent::TargetHit { points: 100 }));
    }

    #[test]
    fn test_stuck_arrow_retires() {
        let mut game = archery();
        game.arrows.push(Arrow {
            body: Body::at(Vec2::new(400.0, 300.0)),
            angle: 0.0,
            trail: Trail::new(6),
            stuck: Some(58),
        });
        game.update(DT, &TickInput::default());
        assert_eq!(game.arrows.len(), 1);
        game.update(DT, &TickInput::default());
        assert!(game.arrows.is_empty());
    }

    #[test]
    fn test_cleared_wave_adds_bonus_targets() {
        let mut game = archery();
        for target in &mut game.targets {
            target.hit = Some(29);
        }
        game.update(DT, &TickInput::default());

        assert_eq!(game.wave(), 2);
        assert_eq!(game.targets.len(), 8);
        assert_eq!(game.targets.iter().filter(|t| t.points == 150).count(), 2);
        assert!((1.0..5.0).contains(&game.wind().strength));
        assert!(game.drain_events().contains(&GameEvent::WaveCleared));
    }

    #[test]
    fn test_bonus_targets_match_wave_number() {
        let mut game = archery();
        for _ in 0..4 {
            for target in &mut game.targets {
                target.hit = Some(29);
            }
            game.update(DT, &TickInput::default());

            let bonus = game.targets.iter().filter(|t| t.points == 150).count();
            assert_eq!(bonus, game.wave() as usize);
            assert_eq!(game.targets.len(), 6 + bonus);
        }
        assert_eq!(game.wave(), 5);
    }

    #[test]
    fn test_particles_off_means_no_wind_streaks() {
        let settings = Settings {
            particles: false,
            ..Settings::default()
        };
        let mut game = Archery::new(ArcheryTuning::default(), &settings, 9);
        for target in &mut game.targets {
            target.hit = Some(29);
        }
        game.update(DT, &TickInput::default());

        assert_eq!(game.wave(), 2);
        assert!(game.particles.is_empty());
        assert!(!archery().particles.is_empty());
    }

    #[test]
    fn test_targets_start_on_screen() {
        let game = archery();
        assert_eq!(game.targets.len(), 6);
        for target in &game.targets {
            assert!(target.rect().right() <= CANVAS_WIDTH);
            assert!((100.0..300.0).contains(&target.pos.y));
        }
    }

    proptest! {
        #[test]
        fn prop_bow_state_in_range(seed in any::<u64>(), inputs in prop::collection::vec(any::<u8>(), 1..300)) {
            let mut game = Archery::new(ArcheryTuning::default(), &Settings::default(), seed);
            for bits in inputs {
                game.update(DT, &input_from_bits(bits));
                prop_assert!(game.aim >= -PI / 4.0 && game.aim <= PI / 6.0);
                prop_assert!((0.0..=100.0).contains(&game.charge()));
                prop_assert!(game.arrows_in_flight() <= 5);
                for arrow in game.arrows.iter().filter(|a| a.stuck.is_none()) {
                    prop_assert!(arrow.body.pos.x <= CANVAS_WIDTH + 50.0);
                    prop_assert!(arrow.body.pos.y <= CANVAS_HEIGHT + 50.0);
                }
            }
        }
    }
}
