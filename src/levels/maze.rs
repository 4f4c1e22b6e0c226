//! Campfire maze chase
//!
//! Collect every marshmallow while four ghosts roam the clearing. A power
//! pellet turns the tables for a while; clearing the field starts a faster
//! round with a new layout.

use glam::Vec2;
use rand::{Rng, RngCore};
use rand_pcg::Pcg32;

use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::engine::{GameEvent, Level, LevelKind};
use crate::input::TickInput;
use crate::math::{angle_to, from_angle, random_between, seeded_rng};
use crate::renderer::{Color, DrawList, GradientDir, SpriteKind, TextStyle};
use crate::settings::Settings;
use crate::sim::{
    Body, EffectKind, Envelope, Particle, ParticleSystem, Rect, StatusEffects, Trail, distance,
};
use crate::tuning::MazeTuning;

use super::{hud_style, move_dir};

const PELLETS: [Vec2; 4] = [
    Vec2::new(100.0, 100.0),
    Vec2::new(700.0, 100.0),
    Vec2::new(100.0, 500.0),
    Vec2::new(700.0, 500.0),
];
const GHOST_COLORS: [Color; 4] = [
    Color::hex(0xFF6B6B),
    Color::hex(0x4ECDC4),
    Color::hex(0xFFE66D),
    Color::hex(0xA8E6CF),
];
const GHOST_RADIUS: f32 = 20.0;
const GHOST_TRAIL: usize = 5;
/// Ghosts bounce inside this box
const GHOST_MIN: Vec2 = Vec2::new(25.0, 25.0);
const GHOST_MAX: Vec2 = Vec2::new(775.0, 575.0);

const CAMPFIRE: Vec2 = Vec2::new(400.0, 300.0);
const FLAME_COUNT: usize = 15;

const DOT_COLOR: Color = Color::hex(0xFFE4E1);
const GOLD: Color = Color::hex(0xFFD700);

const COLLECT_BURST: Envelope = Envelope::boxed(6, 20, (-2.0, 2.0), (-2.0, 2.0)).sized(2.0, 2.0);
const POWER_BURST: Envelope = Envelope::boxed(15, 30, (-3.0, 3.0), (-3.0, 3.0)).sized(4.0, 4.0);
const EAT_BURST: Envelope = Envelope::boxed(10, 25, (-4.0, 4.0), (-4.0, 4.0)).sized(3.0, 3.0);

#[derive(Debug, Clone)]
struct Runner {
    body: Body,
    facing: f32,
}

#[derive(Debug, Clone, Copy)]
struct Dot {
    pos: Vec2,
    size: f32,
    glow: f32,
    collected: bool,
}

#[derive(Debug, Clone, Copy)]
struct Pellet {
    pos: Vec2,
    pulse: f32,
    collected: bool,
}

#[derive(Debug, Clone)]
struct Ghost {
    body: Body,
    color: Color,
    scared: bool,
    trail: Trail,
}

pub struct Maze {
    tuning: MazeTuning,
    settings: Settings,
    rng: Pcg32,
    player: Runner,
    effects: StatusEffects,
    score: u32,
    round: u32,
    dots: Vec<Dot>,
    pellets: Vec<Pellet>,
    ghosts: Vec<Ghost>,
    ai_timer_ms: f64,
    particles: ParticleSystem,
    flames: ParticleSystem,
    clock_ms: f64,
    events: Vec<GameEvent>,
}

impl Maze {
    pub fn new(tuning: MazeTuning, settings: &Settings, seed: u64) -> Self {
        let particles = ParticleSystem::new(settings.max_particles()).with_drag(tuning.particle_drag);
        let mut maze = Self {
            player: Runner {
                body: Body::at(tuning.player_start.into()),
                facing: 0.0,
            },
            settings: settings.clone(),
            rng: seeded_rng(seed),
            effects: StatusEffects::new(),
            score: 0,
            round: 1,
            dots: Vec::new(),
            pellets: Vec::new(),
            ghosts: Vec::new(),
            ai_timer_ms: 0.0,
            particles,
            flames: ParticleSystem::new(FLAME_COUNT),
            clock_ms: 0.0,
            events: Vec::new(),
            tuning,
        };
        maze.build_round();
        maze.refill_flames();
        maze
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn is_powered(&self) -> bool {
        self.effects.is_active(EffectKind::Power)
    }

    pub fn dots_left(&self) -> usize {
        self.dots.iter().filter(|d| !d.collected).count()
    }

    /// Ghost speed multiplier for the current round
    fn ghost_speed_scale(&self) -> f32 {
        1.0 + self.tuning.level_speedup * (self.round - 1) as f32
    }

    /// Fresh dots, pellets and ghosts for the current round
    fn build_round(&mut self) {
        let t = &self.tuning;
        let rng = &mut self.rng;

        self.dots.clear();
        let spacing = t.dot_spacing.max(1.0);
        let mut x = 80.0;
        while x < CANVAS_WIDTH - 80.0 {
            let mut y = 80.0;
            while y < CANVAS_HEIGHT - 80.0 {
                if rng.random_bool(t.dot_chance.clamp(0.0, 1.0)) {
                    self.dots.push(Dot {
                        pos: Vec2::new(x, y),
                        size: random_between(rng, 3.0, 5.0),
                        glow: random_between(rng, 0.0, std::f32::consts::TAU),
                        collected: false,
                    });
                }
                y += spacing;
            }
            x += spacing;
        }
        // A round always has something to collect
        if self.dots.is_empty() {
            self.dots.push(Dot {
                pos: Vec2::new(80.0, 80.0),
                size: 4.0,
                glow: 0.0,
                collected: false,
            });
        }

        self.pellets = PELLETS
            .iter()
            .map(|&pos| Pellet {
                pos,
                pulse: 0.0,
                collected: false,
            })
            .collect();

        let scale = self.ghost_speed_scale();
        let trail_len = self.settings.trail_len(GHOST_TRAIL);
        let rng = &mut self.rng;
        self.ghosts = GHOST_COLORS
            .iter()
            .enumerate()
            .map(|(i, &color)| {
                let pos = Vec2::new(200.0 + i as f32 * 120.0, 200.0 + random_between(rng, 0.0, 200.0));
                let vel = Vec2::new(random_between(rng, -1.5, 1.5), random_between(rng, -1.5, 1.5));
                Ghost {
                    body: Body::new(pos, vel * scale),
                    color,
                    scared: false,
                    trail: Trail::new(trail_len),
                }
            })
            .collect();
        self.ai_timer_ms = 0.0;
    }

    fn unscare_all(&mut self) {
        for ghost in &mut self.ghosts {
            ghost.scared = false;
        }
    }

    // === Simulation ===

    fn move_player(&mut self, input: &TickInput) {
        let t = &self.tuning;
        let p = &mut self.player;
        let dir = move_dir(input);
        if dir != Vec2::ZERO {
            p.body.vel = dir * t.player_speed;
            p.body.integrate(1);
            p.facing = dir.y.atan2(dir.x);
        }
        p.body.vel = Vec2::ZERO;

        // Wrap horizontally, clamp vertically
        let r = t.player_radius;
        if p.body.pos.x < -r {
            p.body.pos.x = CANVAS_WIDTH;
        } else if p.body.pos.x > CANVAS_WIDTH + r {
            p.body.pos.x = 0.0;
        }
        p.body.pos.y = p.body.pos.y.clamp(r, CANVAS_HEIGHT - r);
    }

    fn update_power(&mut self) {
        if self.effects.tick().contains(&EffectKind::Power) {
            self.unscare_all();
            self.events.push(GameEvent::PowerEnded);
        }
    }

    fn update_ghosts(&mut self, dt_ms: f64) {
        let t = &self.tuning;
        let target = self.player.body.pos;
        let scale = self.ghost_speed_scale();

        self.ai_timer_ms += dt_ms;
        let decide = self.ai_timer_ms >= t.ai_decision_ms;
        if decide {
            self.ai_timer_ms = 0.0;
        }

        for ghost in &mut self.ghosts {
            if decide {
                let to_player = target - ghost.body.pos;
                let dist = to_player.length();
                if dist > 0.0 {
                    if ghost.scared {
                        ghost.body.vel = -to_player / dist * t.ghost_flee_speed * scale;
                    } else if dist < t.chase_range {
                        ghost.body.vel = to_player / dist * t.ghost_chase_speed * scale;
                    }
                }
            }

            ghost.body.integrate(1);
            let pos = &mut ghost.body.pos;
            let vel = &mut ghost.body.vel;
            if pos.x < GHOST_MIN.x || pos.x > GHOST_MAX.x {
                vel.x = -vel.x;
                pos.x = pos.x.clamp(GHOST_MIN.x, GHOST_MAX.x);
            }
            if pos.y < GHOST_MIN.y || pos.y > GHOST_MAX.y {
                vel.y = -vel.y;
                pos.y = pos.y.clamp(GHOST_MIN.y, GHOST_MAX.y);
            }
            ghost.trail.push(ghost.body.pos);
        }
    }

    fn collect_dots(&mut self) {
        let reach = self.tuning.dot_reach;
        let player = self.player.body.pos;
        for dot in &mut self.dots {
            if !dot.collected && distance(player, dot.pos) < reach {
                dot.collected = true;
                self.score += self.tuning.dot_points;
                self.particles
                    .burst(&mut self.rng, dot.pos, &COLLECT_BURST, DOT_COLOR);
                self.events.push(GameEvent::DotEaten);
            }
        }
    }

    fn collect_pellets(&mut self) {
        let reach = self.tuning.pellet_reach;
        let player = self.player.body.pos;
        let mut powered = false;
        for pellet in &mut self.pellets {
            if !pellet.collected && distance(player, pellet.pos) < reach {
                pellet.collected = true;
                self.score += self.tuning.pellet_points;
                self.particles
                    .burst(&mut self.rng, pellet.pos, &POWER_BURST, GOLD);
                self.events.push(GameEvent::PowerPellet);
                powered = true;
            }
        }
        if powered {
            self.effects.apply(EffectKind::Power, self.tuning.power_ticks);
            for ghost in &mut self.ghosts {
                ghost.scared = true;
            }
        }
    }

    fn check_ghosts(&mut self) {
        let t = &self.tuning;
        let player = self.player.body.pos;
        let powered = self.effects.is_active(EffectKind::Power);
        let mut caught = false;

        for ghost in &mut self.ghosts {
            if distance(player, ghost.body.pos) >= t.ghost_reach {
                continue;
            }
            if powered && ghost.scared {
                self.score += t.ghost_points;
                self.particles
                    .burst(&mut self.rng, ghost.body.pos, &EAT_BURST, GHOST_COLORS[0]);
                ghost.body.pos = t.ghost_respawn.into();
                ghost.scared = false;
                ghost.trail.clear();
                self.events.push(GameEvent::GhostEaten);
            } else if !ghost.scared {
                caught = true;
                break;
            }
        }

        if caught {
            self.player.body = Body::at(t.player_start.into());
            self.score = self.score.saturating_sub(t.caught_penalty);
            self.effects.clear(EffectKind::Power);
            self.unscare_all();
            self.events.push(GameEvent::PlayerCaught);
            log::debug!("Caught by a ghost, score {}", self.score);
        }
    }

    fn check_cleared(&mut self) {
        if self.dots.iter().any(|d| !d.collected) {
            return;
        }
        self.round += 1;
        self.events.push(GameEvent::MazeCleared);
        log::info!("Maze cleared with {} points, starting round {}", self.score, self.round);

        self.player.body = Body::at(self.tuning.player_start.into());
        self.effects.clear(EffectKind::Power);
        self.build_round();
    }

    fn animate(&mut self, dt_ms: f64) {
        if !self.settings.ambient_motion() {
            return;
        }
        self.clock_ms += dt_ms;
        for dot in self.dots.iter_mut().filter(|d| !d.collected) {
            dot.glow += 0.1;
        }
        for pellet in self.pellets.iter_mut().filter(|p| !p.collected) {
            pellet.pulse += 0.15;
        }
        self.flames.update();
        self.refill_flames();
    }

    /// Replace expired flames so the fire never dies down
    fn refill_flames(&mut self) {
        while self.flames.len() < FLAME_COUNT {
            let life = random_between(&mut self.rng, 30.0, 90.0) as u32;
            let color = if self.rng.random_bool(0.5) {
                Color::hex(0xFF6B6B)
            } else {
                Color::hex(0xFFE66D)
            };
            self.flames.emit(Particle {
                pos: CAMPFIRE + Vec2::new(random_between(&mut self.rng, -20.0, 20.0), 0.0),
                vel: Vec2::new(random_between(&mut self.rng, -0.3, 0.3), -2.0),
                // Flame height
                size: random_between(&mut self.rng, 20.0, 50.0),
                color,
                life: life.max(1),
                max_life: 60,
            });
        }
    }

    // === Rendering ===

    fn render_backdrop(&self, out: &mut DrawList) {
        out.gradient_rect(
            Rect::new(0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT),
            Color::hex(0x2C5F2D),
            Color::hex(0x0F3460),
            GradientDir::Vertical,
        );

        let twinkle = (self.clock_ms * 0.001) as f32;
        for i in 0..100 {
            let pos = Vec2::new(((i * 13) % 800) as f32, ((i * 17) % 300) as f32);
            let alpha = (0.3 + (i as f32 + twinkle).sin() * 0.3).max(0.0);
            out.circle(pos, 1.0, Color::WHITE.with_alpha(alpha));
        }

        // Campfire
        out.fill_rect(
            Rect::new(CAMPFIRE.x - 20.0, CAMPFIRE.y, 40.0, 20.0),
            Color::hex(0x8B4513),
        );
        for flame in self.flames.iter() {
            let alpha = (flame.life as f32 / 60.0).min(1.0);
            out.fill_rect(
                Rect::new(flame.pos.x - 3.0, flame.pos.y - flame.size, 6.0, flame.size),
                flame.color.with_alpha(alpha),
            );
        }
        out.circle(CAMPFIRE - Vec2::new(0.0, 20.0), 100.0, Color::rgba(255, 100, 0, 0.12));

        for i in 0..8 {
            let x = i as f32 * 120.0 + 50.0;
            let y = 100.0 + (i as f32).sin() * 30.0;
            out.fill_rect(Rect::new(x, y, 15.0, 80.0), Color::hex(0x4A2C2A));
            out.circle(Vec2::new(x + 7.0, y), 25.0, Color::hex(0x1E3A1E));
        }
    }

    fn render_pickups(&self, out: &mut DrawList) {
        for dot in self.dots.iter().filter(|d| !d.collected) {
            let glow = dot.size + dot.glow.sin() * 2.0;
            out.circle(dot.pos, glow + 5.0, DOT_COLOR.with_alpha(0.3));
            out.sprite(SpriteKind::Dot, dot.pos, dot.size * 2.0, 0.0);
        }
        for pellet in self.pellets.iter().filter(|p| !p.collected) {
            let size = 8.0 + pellet.pulse.sin() * 4.0;
            out.sprite(SpriteKind::PowerPellet, pellet.pos, size * 2.0, 0.0);
        }
    }

    fn render_ghosts(&self, out: &mut DrawList) {
        let remaining = self.effects.remaining(EffectKind::Power);
        for ghost in &self.ghosts {
            for (point, fade) in ghost.trail.iter_faded() {
                out.circle(point, GHOST_RADIUS * fade * 0.5, ghost.color.with_alpha(fade * 0.3));
            }

            let pos = ghost.body.pos;
            if ghost.scared {
                // Blue while frightened, flashing white every ten ticks
                let color = if remaining % 20 < 10 {
                    Color::hex(0x000080)
                } else {
                    Color::WHITE
                };
                out.circle(pos, GHOST_RADIUS, color);
            } else {
                out.circle(pos, GHOST_RADIUS + 4.0, ghost.color.with_alpha(0.35));
                out.sprite(SpriteKind::Ghost, pos, GHOST_RADIUS * 2.0, 0.0);
            }

            // Eyes follow the player
            let look = from_angle(angle_to(pos, self.player.body.pos)) * 3.0;
            for dx in [-6.0, 2.0] {
                let eye = pos + Vec2::new(dx, -6.0) + look;
                out.fill_rect(Rect::new(eye.x, eye.y, 4.0, 4.0), Color::WHITE);
                out.fill_rect(Rect::new(eye.x + 1.0, eye.y + 1.0, 2.0, 2.0), Color::BLACK);
            }
        }
    }

    fn render_player(&self, out: &mut DrawList) {
        let p = &self.player;
        let r = self.tuning.player_radius;
        let glow = if self.is_powered() {
            5.0 + ((self.clock_ms * 0.01) as f32).sin() * 3.0
        } else {
            0.0
        };
        if self.is_powered() {
            out.circle(p.body.pos, r + glow + 10.0, GOLD.with_alpha(0.4));
        }
        out.sprite(SpriteKind::Pacman, p.body.pos, (r + glow) * 2.0, p.facing);
    }

    fn render_hud(&self, out: &mut DrawList) {
        out.rounded_rect(
            Rect::new(10.0, 10.0, 200.0, 60.0),
            10.0,
            Color::rgba(139, 69, 19, 0.8),
        );
        out.text(
            format!("Score: {}", self.score),
            Vec2::new(20.0, 18.0),
            &TextStyle::new("bold 20px Arial", DOT_COLOR).shadowed(),
        );
        out.text(
            format!("Marshmallows: {}  Round {}", self.dots_left(), self.round),
            Vec2::new(20.0, 44.0),
            &TextStyle::new("14px Arial", DOT_COLOR),
        );

        if self.is_powered() {
            out.text(
                "POWER MODE!",
                Vec2::new(CANVAS_WIDTH / 2.0, 30.0),
                &TextStyle::new("bold 24px Arial", GOLD).centered().shadowed(),
            );
        }
        out.text(
            "Move: arrows / WASD | Collect every marshmallow!",
            Vec2::new(CANVAS_WIDTH / 2.0, 570.0),
            &hud_style(14).centered(),
        );
    }
}

impl Level for Maze {
    fn kind(&self) -> LevelKind {
        LevelKind::Maze
    }

    fn update(&mut self, dt_ms: f64, input: &TickInput) {
        self.move_player(input);
        self.update_power();
        self.update_ghosts(dt_ms);

        self.collect_dots();
        self.collect_pellets();
        self.check_ghosts();

        self.particles.update();
        self.animate(dt_ms);
        self.check_cleared();
    }

    fn render(&self, out: &mut DrawList) {
        self.render_backdrop(out);
        self.render_pickups(out);
        self.render_ghosts(out);
        self.render_player(out);
        out.particles(&self.particles);
        self.render_hud(out);
    }

    fn controls_description(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("Arrows / WASD / ZQSD", "Move"),
            ("Touch", "Swipe or joystick to steer"),
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

    fn sprites(&self) -> &'static [SpriteKind] {
        &SpriteKind::ALL
    }

    fn summary(&self) -> String {
        format!("score {} round {}", self.score, self.round)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Action;
    use crate::levels::tests::input_from_bits;
    use proptest::prelude::*;

    const DT: f64 = 1000.0 / 60.0;

    fn maze_with(tuning: MazeTuning) -> Maze {
        Maze::new(tuning, &Settings::default(), 5)
    }

    /// Park every ghost in the far corner, away from the player
    fn park_ghosts(maze: &mut Maze) {
        for (i, ghost) in maze.ghosts.iter_mut().enumerate() {
            ghost.body = Body::at(Vec2::new(700.0 + i as f32 * 15.0, 520.0));
        }
    }

    #[test]
    fn test_power_pellet_scares_for_exact_duration() {
        let mut maze = maze_with(MazeTuning {
            power_ticks: 30,
            ..MazeTuning::default()
        });
        park_ghosts(&mut maze);
        maze.player.body = Body::at(Vec2::new(100.0, 100.0));
        maze.update(DT, &TickInput::default());

        assert!(maze.is_powered());
        assert!(maze.ghosts.iter().all(|g| g.scared));
        assert!(maze.drain_events().contains(&GameEvent::PowerPellet));

        for _ in 0..29 {
            maze.update(DT, &TickInput::default());
        }
        assert!(maze.is_powered());
        assert!(maze.ghosts.iter().all(|g| g.scared));

        maze.update(DT, &TickInput::default());
        assert!(!maze.is_powered());
        assert!(maze.ghosts.iter().all(|g| !g.scared));
        assert!(maze.drain_events().contains(&GameEvent::PowerEnded));
    }

    #[test]
    fn test_dot_collection_scores() {
        let mut maze = maze_with(MazeTuning {
            dot_chance: 1.0,
            ..MazeTuning::default()
        });
        park_ghosts(&mut maze);
        maze.player.body = Body::at(Vec2::new(260.0, 260.0));
        let before = maze.dots_left();
        maze.update(DT, &TickInput::default());
        assert_eq!(maze.dots_left(), before - 1);
        assert_eq!(maze.score(), 10);
    }

    #[test]
    fn test_caught_resets_player_with_penalty() {
        let mut maze = maze_with(MazeTuning::default());
        park_ghosts(&mut maze);
        maze.score = 30;
        maze.player.body = Body::at(Vec2::new(400.0, 40.0));
        maze.ghosts[0].body = Body::at(Vec2::new(410.0, 40.0));
        maze.update(DT, &TickInput::default());

        assert_eq!(maze.player.body.pos, Vec2::new(50.0, 50.0));
        assert_eq!(maze.score(), 0);
        assert!(maze.drain_events().contains(&GameEvent::PlayerCaught));
    }

    #[test]
    fn test_powered_player_eats_ghost() {
        let mut maze = maze_with(MazeTuning::default());
        park_ghosts(&mut maze);
        maze.effects.apply(EffectKind::Power, 100);
        for ghost in &mut maze.ghosts {
            ghost.scared = true;
        }
        maze.player.body = Body::at(Vec2::new(400.0, 40.0));
        maze.ghosts[0].body = Body::at(Vec2::new(410.0, 40.0));
        maze.update(DT, &TickInput::default());

        assert_eq!(maze.score(), 200);
        assert_eq!(maze.ghosts[0].body.pos, Vec2::new(400.0, 300.0));
        assert!(!maze.ghosts[0].scared);
        assert!(maze.ghosts[1].scared);
    }

    #[test]
    fn test_horizontal_wrap() {
        let mut maze = maze_with(MazeTuning::default());
        park_ghosts(&mut maze);
        maze.player.body = Body::at(Vec2::new(-24.0, 300.0));
        maze.update(DT, &TickInput::with(&[Action::Left]));
        assert_eq!(maze.player.body.pos.x, 800.0);
    }

    #[test]
    fn test_clearing_dots_starts_faster_round() {
        let mut maze = maze_with(MazeTuning::default());
        park_ghosts(&mut maze);
        for dot in &mut maze.dots {
            dot.collected = true;
        }
        maze.update(DT, &TickInput::default());
        assert_eq!(maze.round(), 2);
        assert!(maze.dots_left() > 0);
        assert!((maze.ghost_speed_scale() - 1.1).abs() < 1e-6);
        assert!(maze.drain_events().contains(&GameEvent::MazeCleared));
    }

    #[test]
    fn test_empty_layout_still_has_a_dot() {
        let maze = maze_with(MazeTuning {
            dot_chance: 0.0,
            ..MazeTuning::default()
        });
        assert_eq!(maze.dots_left(), 1);
    }

    #[test]
    fn test_flames_recycle() {
        let mut maze = maze_with(MazeTuning::default());
        for _ in 0..200 {
            maze.update(DT, &TickInput::default());
        }
        assert_eq!(maze.flames.len(), FLAME_COUNT);
    }

    #[test]
    fn test_declares_its_sprites() {
        let maze = maze_with(MazeTuning::default());
        assert_eq!(maze.sprites().len(), 4);
        let mut out = DrawList::new();
        maze.render(&mut out);
        assert!(!out.is_empty());
    }

    proptest! {
        #[test]
        fn prop_actors_stay_in_bounds(seed in any::<u64>(), inputs in prop::collection::vec(any::<u8>(), 1..400)) {
            let mut maze = Maze::new(MazeTuning::default(), &Settings::default(), seed);
            for bits in inputs {
                maze.update(DT, &input_from_bits(bits));
                let p = maze.player.body.pos;
                prop_assert!((-25.0..=825.0).contains(&p.x));
                prop_assert!((25.0..=575.0).contains(&p.y));
                for ghost in &maze.ghosts {
                    let g = ghost.body.pos;
                    prop_assert!((25.0..=775.0).contains(&g.x));
                    prop_assert!((25.0..=575.0).contains(&g.y));
                }
            }
        }
    }
}
