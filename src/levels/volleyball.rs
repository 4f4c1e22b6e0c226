//! Beach volleyball
//!
//! The human plays the left court against a simple AI on the right. A point
//! is scored when the ball lands; the side it lands on loses the rally.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::RngCore;
use rand_pcg::Pcg32;

use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::engine::{GameEvent, Level, LevelKind};
use crate::input::{Action, TickInput};
use crate::math::{random_between, random_sign, seeded_rng, step_towards};
use crate::renderer::{Color, DrawList, GradientDir, TextAlign};
use crate::settings::Settings;
use crate::sim::{Body, Envelope, ParticleSystem, Rect, Trail, distance};
use crate::tuning::VolleyballTuning;

use super::{banner, hud_style, move_dir};

const PLAYER_SIZE: Vec2 = Vec2::new(40.0, 60.0);
const LEFT_START: Vec2 = Vec2::new(100.0, 500.0);
const RIGHT_START: Vec2 = Vec2::new(640.0, 500.0);

const LEFT_COLOR: Color = Color::hex(0xFF6B6B);
const RIGHT_COLOR: Color = Color::hex(0x4ECDC4);
const SAND: Color = Color::hex(0xF4D03F);
const WATER: Color = Color::hex(0x3498DB);
const BALL_COLOR: Color = Color::hex(0xFFE66D);

const SAND_PUFF: Envelope = Envelope::boxed(8, 30, (-2.0, 2.0), (-4.0, -1.0)).sized(1.0, 4.0);
const SAND_EXPLOSION: Envelope =
    Envelope::boxed(15, 40, (-4.0, 4.0), (-10.0, -2.0)).sized(2.0, 6.0);
const WATER_SPLASH: Envelope = Envelope::boxed(10, 25, (-3.0, 3.0), (-7.0, -1.0)).sized(1.0, 4.0);
const HIT_SPARK: Envelope = Envelope::boxed(6, 20, (-2.0, 2.0), (-5.0, -1.0)).sized(1.0, 3.0);

const PALMS: [Vec2; 2] = [Vec2::new(50.0, 250.0), Vec2::new(700.0, 280.0)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Horizontal direction a hit from this side sends the ball
    fn direction(self) -> f32 {
        match self {
            Side::Left => 1.0,
            Side::Right => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    Won(Side),
}

#[derive(Debug, Clone, Copy)]
struct Jump {
    power: f32,
    /// Row the jump started from; the player lands back on it
    ground_y: f32,
}

#[derive(Debug, Clone)]
struct Player {
    /// `pos` is the top-left of the player box
    body: Body,
    score: u32,
    color: Color,
    jump: Option<Jump>,
}

impl Player {
    fn new(pos: Vec2, color: Color) -> Self {
        Self {
            body: Body::at(pos),
            score: 0,
            color,
            jump: None,
        }
    }

    fn center(&self) -> Vec2 {
        self.body.pos + PLAYER_SIZE / 2.0
    }

    fn is_jumping(&self) -> bool {
        self.jump.is_some()
    }

    fn start_jump(&mut self, power: f32) {
        if self.jump.is_none() {
            self.jump = Some(Jump {
                power,
                ground_y: self.body.pos.y,
            });
        }
    }

    /// Advance an active jump. Returns true on the tick the player lands.
    fn update_jump(&mut self, ceiling: f32) -> bool {
        let Some(jump) = self.jump.as_mut() else {
            return false;
        };
        self.body.pos.y = (self.body.pos.y - jump.power).max(ceiling);
        jump.power -= 1.0;
        if jump.power < 0.0 && self.body.pos.y >= jump.ground_y {
            self.body.pos.y = jump.ground_y;
            self.jump = None;
            return true;
        }
        false
    }
}

#[derive(Debug, Clone)]
struct Ball {
    body: Body,
    rotation: f32,
    trail: Trail,
}

#[derive(Debug, Clone, Copy)]
struct Wave {
    x: f32,
    offset: f32,
    amplitude: f32,
}

pub struct Volleyball {
    tuning: VolleyballTuning,
    settings: Settings,
    rng: Pcg32,
    ball: Ball,
    left: Player,
    right: Player,
    phase: Phase,
    ai_timer_ms: f64,
    ai_target: Vec2,
    action_held: bool,
    particles: ParticleSystem,
    waves: Vec<Wave>,
    sand: Vec<Vec2>,
    palm_sway: f32,
    events: Vec<GameEvent>,
}

impl Volleyball {
    pub fn new(tuning: VolleyballTuning, settings: &Settings, seed: u64) -> Self {
        let mut rng = seeded_rng(seed);

        let waves = (0..5)
            .map(|i| Wave {
                x: i as f32 * 200.0,
                offset: random_between(&mut rng, 0.0, TAU),
                amplitude: random_between(&mut rng, 10.0, 15.0),
            })
            .collect();
        // Sand speckle is fixed per match so render stays pure
        let sand = (0..50)
            .map(|_| {
                Vec2::new(
                    random_between(&mut rng, 0.0, CANVAS_WIDTH),
                    random_between(&mut rng, tuning.court_y.0, CANVAS_HEIGHT),
                )
            })
            .collect();

        let ball = Ball {
            body: Body::new(tuning.ball_spawn.into(), tuning.opening_velocity.into()),
            rotation: 0.0,
            trail: Trail::new(settings.trail_len(tuning.trail_len)),
        };
        let particles =
            ParticleSystem::new(settings.max_particles()).with_gravity(tuning.particle_gravity);

        Self {
            ai_target: RIGHT_START + PLAYER_SIZE / 2.0,
            settings: settings.clone(),
            rng,
            ball,
            left: Player::new(LEFT_START, LEFT_COLOR),
            right: Player::new(RIGHT_START, RIGHT_COLOR),
            phase: Phase::Playing,
            ai_timer_ms: 0.0,
            action_held: false,
            particles,
            waves,
            sand,
            palm_sway: 0.0,
            events: Vec::new(),
            tuning,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn scores(&self) -> (u32, u32) {
        (self.left.score, self.right.score)
    }

    fn player(&self, side: Side) -> &Player {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    fn player_mut(&mut self, side: Side) -> &mut Player {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    // === Simulation ===

    fn update_player(&mut self, input: &TickInput) {
        let t = &self.tuning;
        let dir = move_dir(input);
        let p = &mut self.left;

        // Vertical input only walks the court; it does not steer a jump
        let vy = if p.is_jumping() { 0.0 } else { dir.y };
        p.body.vel = Vec2::new(dir.x, vy) * t.player_speed;
        p.body.integrate(1);
        p.body.pos.x = p.body.pos.x.clamp(t.left_x.0, t.left_x.1);
        if !p.is_jumping() {
            p.body.pos.y = p.body.pos.y.clamp(t.court_y.0, t.court_y.1);
        }

        if input.pressed(Action::Jump) || input.pressed(Action::Action) {
            p.start_jump(t.jump_power);
        }
    }

    fn update_ai(&mut self, dt_ms: f64) {
        let t = &self.tuning;
        let ball = self.ball.body.pos;
        let ball_on_side = ball.x > t.net_x;

        // Re-target on a coarse timer
        self.ai_timer_ms += dt_ms;
        if self.ai_timer_ms >= t.ai_decision_ms {
            self.ai_timer_ms = 0.0;
            self.ai_target = if ball_on_side {
                ball
            } else {
                RIGHT_START + PLAYER_SIZE / 2.0
            };
        }

        let p = &mut self.right;
        let center = p.center();
        let next = step_towards(center, self.ai_target, t.ai_speed);
        let mut step = next - center;
        if p.is_jumping() {
            step.y = 0.0;
        }
        p.body.pos += step;

        if ball_on_side && (ball.x - center.x).abs() < t.ai_jump_range && ball.y < p.body.pos.y {
            p.start_jump(t.ai_jump_power);
        }

        p.body.pos.x = p.body.pos.x.clamp(t.right_x.0, t.right_x.1);
        if !p.is_jumping() {
            p.body.pos.y = p.body.pos.y.clamp(t.court_y.0, t.court_y.1);
        }
    }

    fn update_jumps(&mut self) {
        let ceiling = self.tuning.air_ceiling;
        for side in [Side::Left, Side::Right] {
            let player = self.player_mut(side);
            if player.update_jump(ceiling) {
                let feet = Vec2::new(player.center().x, player.body.pos.y + PLAYER_SIZE.y);
                self.particles.burst(&mut self.rng, feet, &SAND_PUFF, SAND);
            }
        }
    }

    fn update_ball(&mut self) {
        let ball = &mut self.ball;
        ball.trail.push(ball.body.pos);
        ball.body.integrate(1);
        ball.body.vel.y += self.tuning.gravity;
        ball.rotation += self.tuning.spin_per_tick;

        // Landed: the side it fell on loses the rally
        if ball.body.pos.y > self.tuning.ground_y {
            let landed = Vec2::new(ball.body.pos.x, self.tuning.ground_y);
            let scorer = if landed.x < self.tuning.net_x {
                Side::Right
            } else {
                Side::Left
            };
            self.particles
                .burst(&mut self.rng, landed, &SAND_EXPLOSION, SAND);
            self.award_point(scorer);
            self.reset_ball();
            return;
        }

        self.resolve_walls();
        self.resolve_net();
        for side in [Side::Left, Side::Right] {
            self.resolve_player_hit(side);
        }
    }

    fn resolve_walls(&mut self) {
        let t = &self.tuning;
        let body = &mut self.ball.body;
        let (min_x, max_x) = (t.wall_margin, CANVAS_WIDTH - t.wall_margin);

        if body.pos.x < min_x || body.pos.x > max_x {
            body.pos.x = body.pos.x.clamp(min_x, max_x);
            body.vel.x *= -t.wall_damping;
            let at = body.pos;
            self.particles.burst(&mut self.rng, at, &WATER_SPLASH, WATER);
            self.events.push(GameEvent::Bounce);
        }
        if body.pos.y < t.wall_margin {
            body.pos.y = t.wall_margin;
            body.vel.y *= -t.ceiling_damping;
        }
    }

    fn resolve_net(&mut self) {
        let t = &self.tuning;
        let body = &mut self.ball.body;
        let (net_left, net_right) = (t.net_x - t.net_half_width, t.net_x + t.net_half_width);

        if body.pos.x > net_left && body.pos.x < net_right && body.pos.y > t.net_top {
            // Horizontal velocity is untouched by gravity, so this is last tick's x
            let came_from_left = body.pos.x - body.vel.x < t.net_x;
            body.vel.x *= -t.net_damping_x;
            body.vel.y *= t.net_damping_y;
            body.pos.x = if came_from_left { net_left } else { net_right };
            self.events.push(GameEvent::Bounce);
        }
    }

    fn resolve_player_hit(&mut self, side: Side) {
        let t = &self.tuning;
        let player = self.player(side);
        let reach = t.ball_radius + t.player_radius;
        if distance(self.ball.body.pos, player.center()) >= reach {
            return;
        }

        let (power, lift) = if player.is_jumping() {
            (t.jump_hit_power, t.jump_hit_lift)
        } else {
            (t.hit_power, t.hit_lift)
        };
        let color = player.color;

        let vx = power * side.direction() + random_between(&mut self.rng, -0.3, 0.3);
        let vy = -lift - random_between(&mut self.rng, 0.0, 2.0);
        self.ball.body.vel = Vec2::new(vx, vy);

        let at = self.ball.body.pos;
        self.particles.burst(&mut self.rng, at, &HIT_SPARK, color);
        self.events.push(GameEvent::BallHit);
    }

    fn award_point(&mut self, scorer: Side) {
        let target = self.tuning.points_to_win;
        let player = self.player_mut(scorer);
        player.score += 1;
        let score = player.score;
        self.events.push(GameEvent::PointScored);
        log::debug!("Point to {:?} ({})", scorer, score);

        if score >= target {
            self.phase = Phase::Won(scorer);
            self.events.push(GameEvent::MatchWon);
            log::info!("Volleyball match won by {:?} {}-{}", scorer, self.left.score, self.right.score);
        }
    }

    fn reset_ball(&mut self) {
        let t = &self.tuning;
        let ball = &mut self.ball;
        ball.body = Body::new(
            t.ball_spawn.into(),
            Vec2::new(random_sign(&mut self.rng) * t.serve_velocity.0, t.serve_velocity.1),
        );
        ball.trail.clear();
        ball.rotation = 0.0;
    }

    fn animate_scenery(&mut self) {
        if !self.settings.ambient_motion() {
            return;
        }
        for wave in &mut self.waves {
            wave.offset += 0.05;
        }
        self.palm_sway += 0.02;
    }

    // === Rendering ===

    fn render_scenery(&self, out: &mut DrawList) {
        let w = CANVAS_WIDTH;
        out.clear(Color::hex(0x87CEEB));
        out.gradient_rect(
            Rect::new(0.0, 0.0, w, 300.0),
            Color::hex(0x87CEEB),
            Color::hex(0xFFE4B5),
            GradientDir::Vertical,
        );
        out.gradient_rect(
            Rect::new(0.0, 300.0, w, 120.0),
            Color::hex(0x3498DB),
            Color::hex(0x2980B9),
            GradientDir::Vertical,
        );
        for wave in &self.waves {
            let points = (0..w as u32)
                .step_by(5)
                .map(|x| {
                    let x = x as f32;
                    let phase = (x + wave.x + wave.offset * 100.0) * 0.01;
                    Vec2::new(x, 350.0 + phase.sin() * wave.amplitude)
                })
                .collect();
            out.polyline(points, Color::hex(0x1ABC9C), 2.0);
        }

        out.gradient_rect(
            Rect::new(0.0, 420.0, w, 180.0),
            SAND,
            Color::hex(0xF1C40F),
            GradientDir::Vertical,
        );
        for speck in &self.sand {
            out.circle(*speck, 1.0, Color::rgba(241, 196, 15, 0.3));
        }

        let sway = self.palm_sway.sin() * 10.0;
        for palm in PALMS {
            out.fill_rect(Rect::new(palm.x, palm.y, 15.0, 100.0), Color::hex(0x8B4513));
            out.with_transform(palm + Vec2::new(7.0, 0.0), sway * 0.1, |l| {
                l.fill_rect(Rect::new(-20.0, -30.0, 40.0, 30.0), Color::hex(0x228B22));
            });
        }
    }

    fn render_net(&self, out: &mut DrawList) {
        let t = &self.tuning;
        let x = t.net_x - t.net_half_width;
        let width = t.net_half_width * 2.0;
        let height = CANVAS_HEIGHT - t.net_top;
        out.rounded_rect(Rect::new(x, t.net_top, width, height), 5.0, Color::hex(0x654321));
        for i in 0..8 {
            let y = t.net_top + i as f32 * 20.0;
            out.line(Vec2::new(x, y), Vec2::new(x + width, y), Color::WHITE, 2.0);
        }
        for i in 0..3 {
            let lx = x + i as f32 * 15.0;
            out.line(Vec2::new(lx, t.net_top), Vec2::new(lx, CANVAS_HEIGHT), Color::WHITE, 2.0);
        }
    }

    fn render_player(&self, out: &mut DrawList, player: &Player) {
        let pos = player.body.pos;
        out.fill_rect(
            Rect::new(pos.x, 560.0, PLAYER_SIZE.x, 8.0),
            Color::BLACK.with_alpha(0.2),
        );
        out.rounded_rect(Rect::new(pos.x, pos.y, PLAYER_SIZE.x, PLAYER_SIZE.y), 8.0, player.color);

        let detail = Color::hex(0x2C3E50);
        out.fill_rect(Rect::new(pos.x + 15.0, pos.y + 10.0, 10.0, 10.0), detail);
        if player.is_jumping() {
            out.fill_rect(Rect::new(pos.x - 5.0, pos.y + 20.0, 8.0, 15.0), detail);
            out.fill_rect(Rect::new(pos.x + 37.0, pos.y + 20.0, 8.0, 15.0), detail);
        }
    }

    fn render_ball(&self, out: &mut DrawList) {
        let r = self.tuning.ball_radius;
        for (point, fade) in self.ball.trail.iter_faded() {
            out.circle(point, r * fade * 0.8, BALL_COLOR.with_alpha(fade));
        }
        out.with_transform(self.ball.body.pos, self.ball.rotation, |l| {
            l.circle(Vec2::ZERO, r, BALL_COLOR);
            l.line(Vec2::new(-r, 0.0), Vec2::new(r, 0.0), Color::WHITE, 2.0);
            l.line(Vec2::new(0.0, -r), Vec2::new(0.0, r), Color::WHITE, 2.0);
        });
    }

    fn render_hud(&self, out: &mut DrawList) {
        out.text(
            format!("Player: {}", self.left.score),
            Vec2::new(20.0, 20.0),
            &hud_style(24),
        );
        out.text(
            format!("CPU: {}", self.right.score),
            Vec2::new(CANVAS_WIDTH - 20.0, 20.0),
            &hud_style(24).aligned(TextAlign::Right),
        );
        out.text(
            format!("First to {}", self.tuning.points_to_win),
            Vec2::new(CANVAS_WIDTH / 2.0, 30.0),
            &hud_style(16).centered(),
        );

        if let Phase::Won(side) = self.phase {
            let title = match side {
                Side::Left => "You win!",
                Side::Right => "CPU wins!",
            };
            banner(out, title, Some("Press Space to play again"));
        }
    }
}

impl Level for Volleyball {
    fn kind(&self) -> LevelKind {
        LevelKind::Volleyball
    }

    fn update(&mut self, dt_ms: f64, input: &TickInput) {
        let action = input.pressed(Action::Action) || input.pressed(Action::Jump);
        let fresh_action = action && !self.action_held;
        self.action_held = action;

        match self.phase {
            Phase::Won(_) => {
                if fresh_action {
                    self.restart();
                    return;
                }
            }
            Phase::Playing => {
                self.update_player(input);
                self.update_ai(dt_ms);
                self.update_jumps();
                self.update_ball();
            }
        }

        self.particles.update();
        self.animate_scenery();
    }

    fn render(&self, out: &mut DrawList) {
        self.render_scenery(out);
        self.render_net(out);
        self.render_player(out, &self.left);
        self.render_player(out, &self.right);
        self.render_ball(out);
        out.particles(&self.particles);
        self.render_hud(out);
    }

    fn controls_description(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("Arrows / WASD / ZQSD", "Move"),
            ("Space", "Jump and hit"),
            ("Touch", "Green button to jump"),
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
        format!("{} - {}", self.left.score, self.right.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::tests::input_from_bits;
    use proptest::prelude::*;

    fn game() -> Volleyball {
        Volleyball::new(VolleyballTuning::default(), &Settings::default(), 7)
    }

    const DT: f64 = 1000.0 / 60.0;

    #[test]
    fn test_ball_landing_left_scores_right() {
        let mut game = game();
        game.ball.body = Body::new(Vec2::new(200.0, 575.0), Vec2::ZERO);
        game.update(DT, &TickInput::default());

        assert_eq!(game.scores(), (0, 1));
        assert_eq!(game.ball.body.pos, Vec2::new(400.0, 300.0));
        assert_eq!(game.ball.body.vel.x.abs(), 1.0);
        assert_eq!(game.ball.body.vel.y, -2.0);
        assert!(game.drain_events().contains(&GameEvent::PointScored));
    }

    #[test]
    fn test_ball_landing_right_scores_left() {
        let mut game = game();
        game.ball.body = Body::new(Vec2::new(600.0, 575.0), Vec2::ZERO);
        game.update(DT, &TickInput::default());
        assert_eq!(game.scores(), (1, 0));
    }

    #[test]
    fn test_serve_direction_is_randomised() {
        let mut game = game();
        let mut seen = (false, false);
        for _ in 0..50 {
            game.reset_ball();
            if game.ball.body.vel.x > 0.0 {
                seen.0 = true;
            } else {
                seen.1 = true;
            }
        }
        assert_eq!(seen, (true, true));
    }

    #[test]
    fn test_left_player_hits_toward_right() {
        let mut game = game();
        let center = game.left.center();
        game.ball.body = Body::at(center);
        game.update(DT, &TickInput::default());

        assert!(game.ball.body.vel.x > 6.0);
        assert!(game.ball.body.vel.y <= -4.0);
        assert!(game.drain_events().contains(&GameEvent::BallHit));
    }

    #[test]
    fn test_net_bounces_ball_back() {
        let mut game = game();
        game.ball.body = Body::new(Vec2::new(378.0, 500.0), Vec2::new(5.0, 0.0));
        game.update(DT, &TickInput::default());

        let ball = game.ball.body;
        assert!(ball.vel.x < 0.0);
        assert!(ball.pos.x <= 380.0);
    }

    #[test]
    fn test_jump_lands_where_it_started() {
        let mut game = game();
        let start_y = game.left.body.pos.y;
        game.update(DT, &TickInput::with(&[Action::Jump]));
        assert!(game.left.is_jumping());
        assert!(game.left.body.pos.y < start_y);

        let mut ticks = 0;
        while game.left.is_jumping() && ticks < 100 {
            game.update(DT, &TickInput::default());
            ticks += 1;
        }
        assert!(!game.left.is_jumping());
        assert_eq!(game.left.body.pos.y, start_y);
    }

    #[test]
    fn test_match_point_enters_won_then_resets() {
        let mut game = game();
        game.right.score = 10;
        game.ball.body = Body::new(Vec2::new(100.0, 575.0), Vec2::ZERO);
        game.update(DT, &TickInput::default());
        assert_eq!(game.phase(), Phase::Won(Side::Right));
        assert!(game.drain_events().contains(&GameEvent::MatchWon));

        // Play freezes until a fresh press
        let frozen = game.ball.body;
        game.update(DT, &TickInput::default());
        assert_eq!(game.ball.body, frozen);

        game.update(DT, &TickInput::with(&[Action::Action]));
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.scores(), (0, 0));
    }

    #[test]
    fn test_reduced_motion_freezes_scenery() {
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        let mut game = Volleyball::new(VolleyballTuning::default(), &settings, 1);
        let before = game.waves[0].offset;
        game.update(DT, &TickInput::default());
        assert_eq!(game.waves[0].offset, before);
    }

    #[test]
    fn test_render_and_controls() {
        let game = game();
        let mut out = DrawList::new();
        game.render(&mut out);
        assert!(!out.is_empty());
        assert!(!game.controls_description().is_empty());
    }

    proptest! {
        #[test]
        fn prop_actors_stay_in_bounds(seed in any::<u64>(), inputs in prop::collection::vec(any::<u8>(), 1..400)) {
            let mut game = Volleyball::new(VolleyballTuning::default(), &Settings::default(), seed);
            for bits in inputs {
                game.update(DT, &input_from_bits(bits));
                let ball = game.ball.body.pos;
                prop_assert!((15.0..=785.0).contains(&ball.x));
                prop_assert!((15.0..=570.0).contains(&ball.y));

                let left = game.left.body.pos;
                prop_assert!((0.0..=340.0).contains(&left.x));
                prop_assert!((300.0..=540.0).contains(&left.y));
                let right = game.right.body.pos;
                prop_assert!((420.0..=760.0).contains(&right.x));
                prop_assert!((300.0..=540.0).contains(&right.y));
            }
        }
    }
}
