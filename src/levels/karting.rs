//! Kart circuit
//!
//! Three laps around an elliptical circuit against three AI drivers. The
//! world is larger than the canvas; a lagging camera follows the player.
//!
//! Lap counting relies on ordered checkpoints: each kart only reacts to the
//! checkpoint it expects next, and crossing checkpoint 0 while it is
//! expected completes a lap.

use std::cmp::Ordering;
use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, RngCore};
use rand_pcg::Pcg32;

use crate::engine::{GameEvent, Level, LevelKind};
use crate::input::{Action, TickInput};
use crate::math::{angle_delta, angle_to, format_race_time, from_angle, random_between, seeded_rng};
use crate::renderer::{Color, DrawList, GradientDir, TextAlign, TextStyle};
use crate::settings::Settings;
use crate::sim::{
    Body, EffectKind, Envelope, Particle, ParticleSystem, Rect, StatusEffects, Trail, distance,
    rect_overlap,
};
use crate::tuning::KartTuning;

use super::{banner, move_dir};

const KART_SIZE: Vec2 = Vec2::new(28.0, 16.0);
const ITEM_SIZE: f32 = 20.0;
/// Karts never get closer than this to the world edge
const WORLD_MARGIN: f32 = 10.0;
/// (angle along the circuit, radial offset) for each grid slot
const GRID: [(f32, f32); 4] = [(-0.35, -35.0), (-0.35, 35.0), (-0.47, -35.0), (-0.47, 35.0)];
const KART_TRAIL: usize = 10;
const BARREL_FRICTION: f32 = 0.95;

const CRASH_BURST: Envelope = Envelope::boxed(6, 25, (-4.0, 4.0), (-4.0, 4.0)).sized(1.0, 4.0);
const PICKUP_BURST: Envelope = Envelope::boxed(12, 40, (-5.0, 5.0), (-5.0, 5.0)).sized(2.0, 7.0);
const CHECKPOINT_BURST: Envelope =
    Envelope::boxed(15, 35, (-3.0, 3.0), (-3.0, 3.0)).sized(1.0, 5.0);

const GRASS_TOP: Color = Color::hex(0x2F4F2F);
const GRASS_BOTTOM: Color = Color::hex(0x1C3A1C);
const ASPHALT: Color = Color::hex(0x696969);
const WALL: Color = Color::hex(0x8B4513);
const BOOST_GOLD: Color = Color::hex(0xFFD700);
const SHIELD_CYAN: Color = Color::hex(0x00CED1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RacePhase {
    /// Seconds left before the start
    Countdown(u32),
    Racing,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AiStyle {
    Aggressive,
    Balanced,
    Defensive,
}

impl AiStyle {
    const ALL: [AiStyle; 3] = [AiStyle::Aggressive, AiStyle::Balanced, AiStyle::Defensive];

    fn max_speed_factor(self) -> f32 {
        match self {
            AiStyle::Aggressive => 0.9,
            AiStyle::Balanced => 1.0,
            AiStyle::Defensive => 1.1,
        }
    }

    fn target_speed_factor(self) -> f32 {
        match self {
            AiStyle::Aggressive => 1.1,
            AiStyle::Balanced => 1.0,
            AiStyle::Defensive => 0.9,
        }
    }

    fn driver(self) -> (&'static str, Color) {
        match self {
            AiStyle::Aggressive => ("BRUISER", Color::hex(0x8B4513)),
            AiStyle::Balanced => ("PETAL", Color::hex(0xFFB6C1)),
            AiStyle::Defensive => ("GECKO", Color::hex(0x32CD32)),
        }
    }
}

#[derive(Debug, Clone)]
struct AiState {
    style: AiStyle,
    target: Vec2,
    decision_ms: f64,
    stuck_ms: f64,
    last_pos: Vec2,
}

#[derive(Debug, Clone)]
enum Driver {
    Player,
    Ai(AiState),
}

/// What the driver asks of the kart this tick
#[derive(Debug, Clone, Copy, Default)]
struct DriveInput {
    throttle: bool,
    brake: bool,
    /// -1 full left, +1 full right
    steer: f32,
}

#[derive(Debug, Clone)]
struct Kart {
    name: &'static str,
    color: Color,
    /// Centre of the kart
    body: Body,
    angle: f32,
    speed: f32,
    max_speed: f32,
    accel: f32,
    boost_charges: u32,
    effects: StatusEffects,
    lap: u32,
    next_checkpoint: usize,
    lap_start_ms: f64,
    best_lap_ms: Option<f64>,
    /// Finishing place, 1-based
    finished: Option<usize>,
    obstacle_cooldown: u32,
    trail: Trail,
    driver: Driver,
}

impl Kart {
    fn hitbox(&self, size: f32) -> Rect {
        Rect::centered(self.body.pos, Vec2::splat(size))
    }

    fn is_player(&self) -> bool {
        matches!(self.driver, Driver::Player)
    }

    fn speed_cap(&self, boost_multiplier: f32) -> f32 {
        if self.effects.is_active(EffectKind::Boost) {
            self.max_speed * boost_multiplier
        } else {
            self.max_speed
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObstacleKind {
    Barrel,
    Cone,
    Oil,
}

#[derive(Debug, Clone)]
struct Obstacle {
    kind: ObstacleKind,
    /// Barrels roll once pushed; everything else stays put
    body: Body,
}

impl Obstacle {
    fn rect(&self) -> Rect {
        Rect::centered(self.body.pos, Vec2::splat(ITEM_SIZE))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PowerUpKind {
    SpeedBoost,
    Shield,
}

#[derive(Debug, Clone)]
struct PowerUp {
    kind: PowerUpKind,
    pos: Vec2,
    pulse: f32,
    /// Ticks until it reappears; `None` while available
    respawn_in: Option<u32>,
}

impl PowerUp {
    fn rect(&self) -> Rect {
        Rect::centered(self.pos, Vec2::splat(ITEM_SIZE))
    }

    fn color(&self) -> Color {
        match self.kind {
            PowerUpKind::SpeedBoost => BOOST_GOLD,
            PowerUpKind::Shield => SHIELD_CYAN,
        }
    }
}

/// Circuit geometry: an ellipse centre line with wall blocks and gates
#[derive(Debug, Clone)]
struct Track {
    center: Vec2,
    radii: Vec2,
    half_width: f32,
    waypoints: Vec<f32>,
    walls: Vec<Rect>,
    checkpoints: Vec<Rect>,
}

impl Track {
    fn new(t: &KartTuning) -> Self {
        let mut track = Self {
            center: t.track_center.into(),
            radii: t.track_radii.into(),
            half_width: t.track_half_width,
            waypoints: (0..t.waypoint_count)
                .map(|i| i as f32 / t.waypoint_count as f32 * TAU)
                .collect(),
            walls: Vec::new(),
            checkpoints: Vec::new(),
        };

        let block = Vec2::splat(t.wall_block);
        track.walls = track
            .waypoints
            .iter()
            .flat_map(|&theta| {
                [
                    Rect::centered(track.offset_point(theta, -track.half_width), block),
                    Rect::centered(track.offset_point(theta, track.half_width), block),
                ]
            })
            .collect();
        track.checkpoints = (0..t.checkpoint_count)
            .map(|j| {
                let theta = j as f32 / t.checkpoint_count as f32 * TAU;
                Rect::centered(track.point(theta), Vec2::splat(t.checkpoint_size))
            })
            .collect();
        track
    }

    fn point(&self, theta: f32) -> Vec2 {
        self.offset_point(theta, 0.0)
    }

    /// Point on the ellipse grown outward by `offset`
    fn offset_point(&self, theta: f32, offset: f32) -> Vec2 {
        self.center
            + Vec2::new(
                (self.radii.x + offset) * theta.cos(),
                (self.radii.y + offset) * theta.sin(),
            )
    }

    /// Direction of travel at `theta`
    fn heading(&self, theta: f32) -> f32 {
        (self.radii.y * theta.cos()).atan2(-self.radii.x * theta.sin())
    }

    fn ring(&self, offset: f32, segments: usize) -> Vec<Vec2> {
        (0..segments)
            .map(|i| self.offset_point(i as f32 / segments as f32 * TAU, offset))
            .collect()
    }
}

pub struct Karting {
    tuning: KartTuning,
    settings: Settings,
    rng: Pcg32,
    track: Track,
    karts: Vec<Kart>,
    obstacles: Vec<Obstacle>,
    powerups: Vec<PowerUp>,
    phase: RacePhase,
    countdown_ms: f64,
    race_ms: f64,
    /// Kart indices in the order they crossed the line
    finish_order: Vec<usize>,
    boost_held: bool,
    camera: Vec2,
    particles: ParticleSystem,
    events: Vec<GameEvent>,
}

impl Karting {
    pub fn new(tuning: KartTuning, settings: &Settings, seed: u64) -> Self {
        let mut rng = seeded_rng(seed);
        let track = Track::new(&tuning);

        let first_gate = track.checkpoints[1 % track.checkpoints.len()].center();
        let karts = GRID
            .iter()
            .enumerate()
            .map(|(slot, &(theta, offset))| {
                let pos = track.offset_point(theta, offset);
                let (name, color, max_speed, accel, driver) = match slot {
                    0 => ("PLAYER", Color::hex(0xFF4444), tuning.max_speed, tuning.accel, Driver::Player),
                    n => {
                        let style = AiStyle::ALL[(n - 1) % AiStyle::ALL.len()];
                        let (name, color) = style.driver();
                        let ai = AiState {
                            style,
                            target: first_gate,
                            decision_ms: 0.0,
                            stuck_ms: 0.0,
                            last_pos: pos,
                        };
                        (
                            name,
                            color,
                            tuning.ai_base_speed * style.max_speed_factor(),
                            tuning.ai_accel,
                            Driver::Ai(ai),
                        )
                    }
                };
                Kart {
                    name,
                    color,
                    body: Body::at(pos),
                    angle: track.heading(theta),
                    speed: 0.0,
                    max_speed,
                    accel,
                    boost_charges: 0,
                    effects: StatusEffects::new(),
                    lap: 1,
                    next_checkpoint: 1 % track.checkpoints.len(),
                    lap_start_ms: 0.0,
                    best_lap_ms: None,
                    finished: None,
                    obstacle_cooldown: 0,
                    trail: Trail::new(settings.trail_len(KART_TRAIL)),
                    driver,
                }
            })
            .collect();

        let obstacles = (0..tuning.obstacle_count)
            .map(|i| {
                let theta = Self::spread_theta(&track, i, tuning.obstacle_count);
                let kind = match rng.random_range(0..3) {
                    0 => ObstacleKind::Barrel,
                    1 => ObstacleKind::Cone,
                    _ => ObstacleKind::Oil,
                };
                let jitter = Vec2::new(
                    random_between(&mut rng, -20.0, 20.0),
                    random_between(&mut rng, -20.0, 20.0),
                );
                Obstacle {
                    kind,
                    body: Body::at(track.point(theta) + jitter),
                }
            })
            .collect();

        let powerups = (0..tuning.powerup_count)
            .map(|i| {
                let theta = Self::spread_theta(&track, i, tuning.powerup_count);
                let kind = if rng.random_bool(0.5) {
                    PowerUpKind::SpeedBoost
                } else {
                    PowerUpKind::Shield
                };
                let jitter = Vec2::new(
                    random_between(&mut rng, -30.0, 30.0),
                    random_between(&mut rng, -30.0, 30.0),
                );
                PowerUp {
                    kind,
                    pos: track.point(theta) + jitter,
                    pulse: 0.0,
                    respawn_in: None,
                }
            })
            .collect();

        let mut karting = Self {
            settings: settings.clone(),
            rng,
            track,
            karts,
            obstacles,
            powerups,
            phase: RacePhase::Countdown(tuning.countdown_from),
            countdown_ms: 0.0,
            race_ms: 0.0,
            finish_order: Vec::new(),
            boost_held: false,
            camera: Vec2::ZERO,
            particles: ParticleSystem::new(settings.max_particles()).with_drag(0.96),
            events: Vec::new(),
            tuning,
        };
        karting.camera = karting.camera_target();
        karting
    }

    /// Waypoint angle for the `i`-th of `count` items spread around the loop
    fn spread_theta(track: &Track, i: usize, count: usize) -> f32 {
        let n = track.waypoints.len();
        track.waypoints[(i * n / count.max(1)).min(n - 1)]
    }

    pub fn phase(&self) -> RacePhase {
        self.phase
    }

    pub fn race_time_ms(&self) -> f64 {
        self.race_ms
    }

    pub fn player_lap(&self) -> u32 {
        self.karts[0].lap
    }

    pub fn best_lap_ms(&self) -> Option<f64> {
        self.karts[0].best_lap_ms
    }

    /// Kart indices from first to last
    pub fn standings(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.karts.len()).collect();
        order.sort_by(|&a, &b| self.compare_karts(&self.karts[a], &self.karts[b]));
        order
    }

    /// The player's current race position, 1-based
    pub fn player_position(&self) -> usize {
        self.standings()
            .iter()
            .position(|&i| i == 0)
            .map_or(self.karts.len(), |p| p + 1)
    }

    fn progress(&self, kart: &Kart) -> usize {
        let n = self.track.checkpoints.len();
        kart.lap as usize * n + (kart.next_checkpoint + n - 1) % n
    }

    fn gap(&self, kart: &Kart) -> f32 {
        distance(kart.body.pos, self.track.checkpoints[kart.next_checkpoint].center())
    }

    fn compare_karts(&self, a: &Kart, b: &Kart) -> Ordering {
        match (a.finished, b.finished) {
            (Some(pa), Some(pb)) => pa.cmp(&pb),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self
                .progress(b)
                .cmp(&self.progress(a))
                .then_with(|| self.gap(a).total_cmp(&self.gap(b))),
        }
    }

    fn camera_target(&self) -> Vec2 {
        let viewport: Vec2 = self.tuning.viewport.into();
        let world: Vec2 = self.tuning.world.into();
        (self.karts[0].body.pos - viewport / 2.0).clamp(Vec2::ZERO, (world - viewport).max(Vec2::ZERO))
    }

    // === Simulation ===

    fn update_countdown(&mut self, dt_ms: f64, remaining: u32) {
        self.countdown_ms += dt_ms;
        if self.countdown_ms < self.tuning.countdown_step_ms {
            return;
        }
        self.countdown_ms = 0.0;
        let remaining = remaining.saturating_sub(1);
        if remaining == 0 {
            self.phase = RacePhase::Racing;
            self.race_ms = 0.0;
            self.events.push(GameEvent::RaceStarted);
            log::info!("Race started");
        } else {
            self.phase = RacePhase::Countdown(remaining);
            self.events.push(GameEvent::CountdownTick(remaining));
        }
    }

    fn update_race(&mut self, dt_ms: f64, input: &TickInput) {
        self.race_ms += dt_ms;

        let boost_pressed = input.pressed(Action::Boost) || input.pressed(Action::Action);
        let boost_edge = boost_pressed && !self.boost_held;
        self.boost_held = boost_pressed;

        let dir = move_dir(input);
        let player_control = DriveInput {
            throttle: dir.y < -0.3,
            brake: dir.y > 0.3 || input.pressed(Action::Brake),
            steer: dir.x,
        };

        for i in 0..self.karts.len() {
            self.drive_kart(i, dt_ms, player_control, boost_edge);
            self.move_kart(i);
            self.hit_obstacles(i);
            self.collect_powerups(i);
            self.check_checkpoint(i);

            let kart = &mut self.karts[i];
            kart.effects.tick();
            kart.obstacle_cooldown = kart.obstacle_cooldown.saturating_sub(1);
            kart.trail.push(kart.body.pos);
        }

        self.roll_barrels();
        self.respawn_powerups();
    }

    fn drive_kart(&mut self, i: usize, dt_ms: f64, player: DriveInput, boost_edge: bool) {
        let t = &self.tuning;
        let kart = &mut self.karts[i];
        if kart.is_player() {
            if boost_edge && kart.boost_charges > 0 {
                kart.boost_charges -= 1;
                kart.effects.apply(EffectKind::Boost, t.boost_ticks);
                Self::boost_exhaust(&mut self.particles, &mut self.rng, kart);
            }
            drive(kart, t, player);
            return;
        }
        let Driver::Ai(ai) = &mut kart.driver else {
            return;
        };

        ai.decision_ms += dt_ms;
        if ai.decision_ms > t.ai_decision_ms {
            ai.decision_ms = 0.0;
            let gate = self.track.checkpoints[kart.next_checkpoint].center();
            ai.target = gate
                + Vec2::new(
                    random_between(&mut self.rng, -t.ai_jitter, t.ai_jitter),
                    random_between(&mut self.rng, -t.ai_jitter, t.ai_jitter),
                );
        }

        let diff = angle_delta(kart.angle, angle_to(kart.body.pos, ai.target));
        if diff.abs() > 0.1 {
            kart.angle += t.ai_turn_rate * diff.signum();
        }

        let mut target_speed = kart.max_speed * ai.style.target_speed_factor();
        if distance(kart.body.pos, ai.target) < 50.0 {
            target_speed *= 0.7;
        }
        if kart.effects.is_active(EffectKind::Boost) {
            target_speed *= t.boost_multiplier;
        }
        kart.speed = if kart.speed < target_speed {
            (kart.speed + kart.accel).min(target_speed)
        } else {
            (kart.speed - kart.accel).max(target_speed)
        };

        let moved = distance(kart.body.pos, ai.last_pos);
        if moved < 2.0 && kart.speed > 2.0 {
            ai.stuck_ms += dt_ms;
            if ai.stuck_ms > t.stuck_ms {
                kart.speed = -kart.max_speed * 0.3;
                kart.angle += random_between(&mut self.rng, -0.25, 0.25);
                ai.stuck_ms = 0.0;
                log::debug!("{} stuck, backing out", kart.name);
            }
        } else {
            ai.stuck_ms = 0.0;
        }
        ai.last_pos = kart.body.pos;

        if kart.boost_charges > 0 && self.rng.random_bool(t.ai_boost_chance) {
            kart.boost_charges -= 1;
            kart.effects.apply(EffectKind::Boost, t.boost_ticks);
            Self::boost_exhaust(&mut self.particles, &mut self.rng, kart);
        }
    }

    /// Integrate, then resolve world bounds and walls
    fn move_kart(&mut self, i: usize) {
        let t = &self.tuning;
        let kart = &mut self.karts[i];
        let previous = kart.body.pos;
        kart.body.vel = from_angle(kart.angle) * kart.speed;
        kart.body.integrate(1);

        let min = Vec2::splat(WORLD_MARGIN);
        let max = Vec2::from(t.world) - Vec2::splat(WORLD_MARGIN);
        let clamped = kart.body.pos.clamp(min, max);
        if clamped != kart.body.pos {
            kart.body.pos = clamped;
            kart.speed *= -t.bounds_bounce;
        }

        let hitbox = kart.hitbox(t.kart_hitbox);
        if self.track.walls.iter().any(|w| rect_overlap(&hitbox, w)) {
            kart.body.pos = previous;
            kart.speed *= -t.wall_bounce;
            self.particles
                .burst(&mut self.rng, previous, &CRASH_BURST, Color::hex(0xFF6B6B));
            if kart.is_player() {
                self.events.push(GameEvent::Crash);
            }
        }
    }

    fn hit_obstacles(&mut self, i: usize) {
        let t = &self.tuning;
        let kart = &mut self.karts[i];
        if kart.obstacle_cooldown > 0 {
            return;
        }
        let hitbox = kart.hitbox(t.kart_hitbox);
        let Some(obstacle) = self
            .obstacles
            .iter_mut()
            .find(|o| rect_overlap(&hitbox, &o.rect()))
        else {
            return;
        };

        kart.obstacle_cooldown = t.obstacle_cooldown_ticks;
        if obstacle.kind == ObstacleKind::Barrel {
            obstacle.body.vel += from_angle(kart.angle) * kart.speed * 0.5;
        }
        if kart.effects.is_active(EffectKind::Shield) {
            return;
        }
        match obstacle.kind {
            ObstacleKind::Barrel => kart.speed *= 0.8,
            ObstacleKind::Cone => {
                kart.speed *= 0.7;
                self.particles
                    .burst(&mut self.rng, obstacle.body.pos, &CRASH_BURST, Color::hex(0xFF8C00));
            }
            ObstacleKind::Oil => {
                kart.speed *= 0.5;
                kart.angle += random_between(&mut self.rng, -0.15, 0.15);
            }
        }
        if kart.is_player() {
            self.events.push(GameEvent::Crash);
        }
    }

    fn collect_powerups(&mut self, i: usize) {
        let t = &self.tuning;
        let kart = &mut self.karts[i];
        let hitbox = kart.hitbox(t.kart_hitbox);
        for powerup in &mut self.powerups {
            if powerup.respawn_in.is_some() || !rect_overlap(&hitbox, &powerup.rect()) {
                continue;
            }
            powerup.respawn_in = Some(t.powerup_respawn_ticks);
            match powerup.kind {
                PowerUpKind::SpeedBoost => {
                    kart.boost_charges += 1;
                    kart.effects.apply(EffectKind::Boost, t.boost_ticks);
                }
                PowerUpKind::Shield => kart.effects.apply(EffectKind::Shield, t.shield_ticks),
            }
            self.particles
                .burst(&mut self.rng, powerup.pos, &PICKUP_BURST, powerup.color());
            if kart.is_player() {
                self.events.push(GameEvent::PowerUpCollected);
            }
        }
    }

    fn check_checkpoint(&mut self, i: usize) {
        let n = self.track.checkpoints.len();
        let total_laps = self.tuning.total_laps;
        let kart = &mut self.karts[i];
        if kart.finished.is_some() {
            return;
        }
        let gate = self.track.checkpoints[kart.next_checkpoint];
        if !rect_overlap(&kart.hitbox(self.tuning.kart_hitbox), &gate) {
            return;
        }

        let is_player = kart.is_player();
        if kart.next_checkpoint == 0 {
            let lap_ms = self.race_ms - kart.lap_start_ms;
            kart.best_lap_ms = Some(kart.best_lap_ms.map_or(lap_ms, |best| best.min(lap_ms)));
            kart.lap_start_ms = self.race_ms;
            if is_player {
                self.events.push(GameEvent::LapCompleted {
                    lap: kart.lap,
                    time_ms: lap_ms,
                });
                log::info!("Lap {} in {}", kart.lap, format_race_time(lap_ms));
            }
            kart.lap += 1;

            if kart.lap > total_laps {
                self.finish_order.push(i);
                let place = self.finish_order.len();
                kart.finished = Some(place);
                log::debug!("{} finished in place {}", kart.name, place);
                if is_player {
                    self.phase = RacePhase::Finished;
                    self.events.push(GameEvent::RaceFinished { position: place });
                    log::info!(
                        "Race over in {}, best lap {}",
                        format_race_time(self.race_ms),
                        format_race_time(kart.best_lap_ms.unwrap_or(0.0))
                    );
                }
            }
        } else if is_player {
            self.events.push(GameEvent::CheckpointPassed);
        }
        kart.next_checkpoint = (kart.next_checkpoint + 1) % n;
        if is_player {
            self.particles
                .burst(&mut self.rng, gate.center(), &CHECKPOINT_BURST, Color::hex(0x00FF00));
        }
    }

    fn roll_barrels(&mut self) {
        let max = Vec2::from(self.tuning.world) - Vec2::splat(WORLD_MARGIN);
        for barrel in self.obstacles.iter_mut().filter(|o| o.kind == ObstacleKind::Barrel) {
            barrel.body.integrate(1);
            barrel.body.vel *= BARREL_FRICTION;
            barrel.body.clamp_to(Vec2::splat(WORLD_MARGIN), max);
        }
    }

    fn respawn_powerups(&mut self) {
        for powerup in &mut self.powerups {
            match powerup.respawn_in {
                Some(0) | Some(1) => powerup.respawn_in = None,
                Some(n) => powerup.respawn_in = Some(n - 1),
                None => powerup.pulse += 0.1,
            }
        }
    }

    fn boost_exhaust(particles: &mut ParticleSystem, rng: &mut Pcg32, kart: &Kart) {
        let back = from_angle(kart.angle);
        for _ in 0..8 {
            let jitter = Vec2::new(random_between(rng, -2.0, 2.0), random_between(rng, -2.0, 2.0));
            let size = random_between(rng, 2.0, 6.0);
            let heat = random_between(rng, 0.0, 1.0);
            particles.emit(Particle {
                pos: kart.body.pos - back * 20.0,
                vel: -back * 5.0 + jitter,
                size,
                color: Color::hex(0xFF8C00).mix(BOOST_GOLD, heat),
                life: 30,
                max_life: 30,
            });
        }
    }

    fn update_camera(&mut self) {
        let target = self.camera_target();
        self.camera += (target - self.camera) * self.tuning.camera_lerp;
    }

    // === Rendering ===

    fn render_world(&self, out: &mut DrawList) {
        let track = &self.track;
        out.polygon(track.ring(track.half_width, 72), ASPHALT);
        out.polygon(track.ring(-track.half_width, 72), GRASS_TOP);

        // Dashed centre line
        let centre = track.ring(0.0, 72);
        for pair in centre.chunks(2) {
            if let [a, b] = pair {
                out.line(*a, *b, Color::WHITE.with_alpha(0.7), 2.0);
            }
        }

        // Start line: checkered across checkpoint 0
        let start = track.checkpoints[0];
        for row in 0..12 {
            for col in 0..2 {
                let color = if (row + col) % 2 == 0 { Color::WHITE } else { Color::BLACK };
                out.fill_rect(
                    Rect::new(start.center().x - 8.0 + col as f32 * 8.0, start.y + row as f32 * 15.0, 8.0, 15.0),
                    color,
                );
            }
        }

        for wall in &track.walls {
            out.shadow_rect_with(*wall, WALL, Color::BLACK.with_alpha(0.4), 3.0);
        }

        let expected = self.karts[0].next_checkpoint;
        for (i, gate) in track.checkpoints.iter().enumerate() {
            let color = if i == expected { Color::hex(0xFF0000) } else { Color::WHITE };
            out.fill_rect(*gate, color.with_alpha(0.08));
            out.stroke_rect(*gate, color.with_alpha(0.5), 3.0);
            out.text(
                (i + 1).to_string(),
                gate.center(),
                &TextStyle::new("16px Arial", color).centered().shadowed(),
            );
        }

        for obstacle in &self.obstacles {
            let p = obstacle.body.pos;
            let half = ITEM_SIZE / 2.0;
            match obstacle.kind {
                ObstacleKind::Barrel => {
                    out.circle(p + Vec2::splat(2.0), half, Color::BLACK.with_alpha(0.3));
                    out.circle(p, half, WALL);
                    out.stroke_circle(p, half * 0.6, Color::hex(0x654321), 2.0);
                }
                ObstacleKind::Cone => {
                    out.polygon(
                        vec![p + Vec2::new(0.0, -half), p + Vec2::new(-half, half), p + Vec2::new(half, half)],
                        Color::hex(0xFF8C00),
                    );
                    out.fill_rect(Rect::new(p.x - 5.0, p.y + half - 5.0, 10.0, 3.0), Color::WHITE);
                }
                ObstacleKind::Oil => {
                    out.circle(p, half, Color::hex(0x1A1A1A).with_alpha(0.85));
                    out.circle(p - Vec2::splat(half / 3.0), 4.0, Color::WHITE.with_alpha(0.3));
                }
            }
        }

        for powerup in self.powerups.iter().filter(|p| p.respawn_in.is_none()) {
            let size = 10.0 * (powerup.pulse.sin() * 0.2 + 1.0);
            out.circle(powerup.pos + Vec2::splat(2.0), size, Color::BLACK.with_alpha(0.3));
            out.circle(powerup.pos, size, powerup.color());
            out.circle(powerup.pos, size * 0.5, Color::WHITE.with_alpha(0.6));
            let icon = match powerup.kind {
                PowerUpKind::SpeedBoost => "⚡",
                PowerUpKind::Shield => "🛡",
            };
            out.text(icon, powerup.pos, &TextStyle::new("12px Arial", Color::WHITE).centered());
        }

        out.particles(&self.particles);

        // Player last so it sits on top
        for kart in self.karts.iter().skip(1).chain(self.karts.iter().take(1)) {
            self.render_kart(out, kart);
        }
    }

    fn render_kart(&self, out: &mut DrawList, kart: &Kart) {
        for (pos, fade) in kart.trail.iter_faded() {
            out.circle(pos, 2.0, Color::rgba(139, 69, 19, fade * 0.5));
        }

        let half = KART_SIZE / 2.0;
        out.with_transform(kart.body.pos, kart.angle, |l| {
            if kart.effects.is_active(EffectKind::Boost) {
                l.circle(Vec2::ZERO, 20.0, BOOST_GOLD.with_alpha(0.35));
            }
            l.fill_rect(Rect::new(-half.x, -half.y, KART_SIZE.x, KART_SIZE.y), kart.color);
            l.fill_rect(Rect::new(-5.0, -3.0, 10.0, 6.0), Color::hex(0x2C3E50));
            for (x, y) in [(-12.0, -8.0), (-12.0, 5.0), (8.0, -8.0), (8.0, 5.0)] {
                l.fill_rect(Rect::new(x, y, 4.0, 3.0), Color::BLACK);
            }
            if kart.effects.is_active(EffectKind::Shield) {
                l.stroke_circle(Vec2::ZERO, 25.0, SHIELD_CYAN, 3.0);
            }
        });
        out.text(
            kart.name,
            kart.body.pos - Vec2::new(0.0, 22.0),
            &TextStyle::new("10px Arial", Color::WHITE).centered().shadowed(),
        );
    }

    fn render_hud(&self, out: &mut DrawList) {
        let player = &self.karts[0];
        let viewport: Vec2 = self.tuning.viewport.into();

        out.rounded_rect(Rect::new(20.0, 20.0, 300.0, 120.0), 10.0, Color::BLACK.with_alpha(0.8));
        out.text(
            format!(
                "Lap: {}/{}   Pos: {}/{}",
                player.lap.min(self.tuning.total_laps),
                self.tuning.total_laps,
                self.player_position(),
                self.karts.len()
            ),
            Vec2::new(40.0, 32.0),
            &TextStyle::new("18px Arial", BOOST_GOLD).shadowed(),
        );
        out.text(
            format!("Time: {}", format_race_time(self.race_ms)),
            Vec2::new(40.0, 57.0),
            &TextStyle::new("16px Arial", Color::hex(0x87CEEB)).shadowed(),
        );
        if let Some(best) = player.best_lap_ms {
            out.text(
                format!("Best: {}", format_race_time(best)),
                Vec2::new(40.0, 82.0),
                &TextStyle::new("16px Arial", Color::hex(0x98FB98)).shadowed(),
            );
        }
        out.text(
            format!("Speed: {:.1}", player.speed.abs()),
            Vec2::new(40.0, 107.0),
            &TextStyle::new("16px Arial", Color::hex(0xFFA500)).shadowed(),
        );

        let right = viewport.x - 120.0;
        if player.boost_charges > 0 || player.effects.is_active(EffectKind::Boost) {
            out.rounded_rect(Rect::new(right, 20.0, 100.0, 30.0), 5.0, BOOST_GOLD.with_alpha(0.8));
            out.text(
                format!("⚡ x{}", player.boost_charges),
                Vec2::new(right + 50.0, 35.0),
                &TextStyle::new("14px Arial", Color::BLACK).centered(),
            );
        }
        let shield = player.effects.remaining(EffectKind::Shield);
        if shield > 0 {
            out.rounded_rect(Rect::new(right, 60.0, 100.0, 30.0), 5.0, SHIELD_CYAN.with_alpha(0.8));
            out.text(
                format!("🛡 {}s", (shield as f32 / 60.0).ceil()),
                Vec2::new(right + 50.0, 75.0),
                &TextStyle::new("14px Arial", Color::BLACK).centered(),
            );
        }

        self.render_minimap(out, viewport);

        out.text(
            "Arrows / WASD: drive | Shift: boost",
            Vec2::new(viewport.x / 2.0, viewport.y - 20.0),
            &TextStyle::new("14px Arial", Color::hex(0xDDDDDD)).centered().shadowed(),
        );

        match self.phase {
            RacePhase::Countdown(n) => banner(out, &n.to_string(), Some("Get ready!")),
            RacePhase::Racing if self.race_ms < 800.0 => banner(out, "GO!", None),
            RacePhase::Racing => {}
            RacePhase::Finished => {
                let place = player.finished.unwrap_or(self.karts.len());
                banner(out, &format!("Finished {}/{}", place, self.karts.len()), Some("Press R to race again"));
            }
        }
    }

    fn render_minimap(&self, out: &mut DrawList, viewport: Vec2) {
        let world: Vec2 = self.tuning.world.into();
        let panel = Rect::new(viewport.x - 160.0, viewport.y - 120.0, 140.0, 100.0);
        out.rounded_rect(panel, 5.0, Color::BLACK.with_alpha(0.8));

        let scale = (panel.w / world.x).min(panel.h / world.y);
        let origin = Vec2::new(panel.x, panel.y);
        let to_map = |p: Vec2| origin + p * scale;

        let ring: Vec<Vec2> = self.track.ring(0.0, 36).into_iter().map(to_map).collect();
        let mut closed = ring.clone();
        closed.extend(ring.first().copied());
        out.polyline(closed, ASPHALT, 4.0);
        for kart in &self.karts {
            let radius = if kart.is_player() { 4.0 } else { 3.0 };
            out.circle(to_map(kart.body.pos), radius, kart.color);
        }
        out.text(
            "MAP",
            Vec2::new(panel.right() - 6.0, panel.y + 4.0),
            &TextStyle::new("10px Arial", Color::WHITE).aligned(TextAlign::Right),
        );
    }
}

/// Throttle, brake and steering for a player-driven kart
fn drive(kart: &mut Kart, t: &KartTuning, control: DriveInput) {
    let cap = kart.speed_cap(t.boost_multiplier);
    if control.throttle {
        kart.speed = (kart.speed + kart.accel).min(cap);
    } else if control.brake {
        kart.speed = (kart.speed - t.brake).max(-kart.max_speed * 0.5);
    } else {
        kart.speed *= t.friction;
    }

    if kart.speed.abs() > 0.5 {
        let steer = control.steer.clamp(-1.0, 1.0);
        kart.angle += steer * t.steering * (kart.speed.abs() / kart.max_speed);
    }
}

impl Level for Karting {
    fn kind(&self) -> LevelKind {
        LevelKind::Karting
    }

    fn update(&mut self, dt_ms: f64, input: &TickInput) {
        match self.phase {
            RacePhase::Countdown(remaining) => self.update_countdown(dt_ms, remaining),
            RacePhase::Racing => self.update_race(dt_ms, input),
            RacePhase::Finished => {}
        }
        self.particles.update();
        self.update_camera();
    }

    fn render(&self, out: &mut DrawList) {
        let viewport: Vec2 = self.tuning.viewport.into();
        out.gradient_rect(
            Rect::new(0.0, 0.0, viewport.x, viewport.y),
            GRASS_TOP,
            GRASS_BOTTOM,
            GradientDir::Vertical,
        );
        out.with_transform(-self.camera, 0.0, |l| self.render_world(l));
        self.render_hud(out);
    }

    fn controls_description(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("Up / W", "Accelerate"),
            ("Down / Ctrl", "Brake"),
            ("Left / Right", "Steer"),
            ("Shift", "Use boost"),
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
        format!(
            "lap {}/{} position {} time {}",
            self.karts[0].lap.min(self.tuning.total_laps),
            self.tuning.total_laps,
            self.player_position(),
            format_race_time(self.race_ms)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::tests::input_from_bits;
    use proptest::prelude::*;

    const DT: f64 = 1000.0 / 60.0;

    fn racing() -> Karting {
        let mut game = Karting::new(KartTuning::default(), &Settings::default(), 5);
        game.phase = RacePhase::Racing;
        // Keep AI and pickups out of the way
        game.obstacles.clear();
        game.powerups.clear();
        game
    }

    fn park_player_at(game: &mut Karting, pos: Vec2) {
        let player = &mut game.karts[0];
        player.body.pos = pos;
        player.speed = 0.0;
    }

    #[test]
    fn test_countdown_then_race() {
        let mut game = Karting::new(KartTuning::default(), &Settings::default(), 1);
        assert_eq!(game.phase(), RacePhase::Countdown(3));
        let start = game.karts[0].body.pos;

        game.update(1000.0, &TickInput::with(&[Action::Up]));
        assert_eq!(game.phase(), RacePhase::Countdown(2));
        assert_eq!(game.drain_events(), vec![GameEvent::CountdownTick(2)]);
        game.update(1000.0, &TickInput::default());
        assert_eq!(game.drain_events(), vec![GameEvent::CountdownTick(1)]);
        game.update(1000.0, &TickInput::default());
        assert_eq!(game.phase(), RacePhase::Racing);
        assert_eq!(game.drain_events(), vec![GameEvent::RaceStarted]);
        // Nobody moves before the start
        assert_eq!(game.karts[0].body.pos, start);
    }

    #[test]
    fn test_only_expected_checkpoint_counts() {
        let mut game = racing();
        assert_eq!(game.karts[0].next_checkpoint, 1);

        let wrong = game.track.checkpoints[3].center();
        park_player_at(&mut game, wrong);
        game.update(DT, &TickInput::default());
        assert_eq!(game.karts[0].next_checkpoint, 1);

        let right = game.track.checkpoints[1].center();
        park_player_at(&mut game, right);
        game.update(DT, &TickInput::default());
        assert_eq!(game.karts[0].next_checkpoint, 2);
        assert!(game.drain_events().contains(&GameEvent::CheckpointPassed));
    }

    #[test]
    fn test_expected_zero_completes_lap() {
        let mut game = racing();
        game.karts[0].next_checkpoint = 0;
        let line = game.track.checkpoints[0].center();
        park_player_at(&mut game, line);
        game.update(DT, &TickInput::default());

        let player = &game.karts[0];
        assert_eq!(player.lap, 2);
        assert_eq!(player.next_checkpoint, 1);
        assert!(player.best_lap_ms.is_some());
        assert!(game
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::LapCompleted { lap: 1, .. })));
    }

    #[test]
    fn test_final_lap_finishes_race() {
        let mut game = racing();
        game.karts[0].lap = 3;
        game.karts[0].next_checkpoint = 0;
        let line = game.track.checkpoints[0].center();
        park_player_at(&mut game, line);
        game.update(DT, &TickInput::default());

        assert_eq!(game.phase(), RacePhase::Finished);
        assert_eq!(game.karts[0].finished, Some(1));
        assert!(game
            .drain_events()
            .contains(&GameEvent::RaceFinished { position: 1 }));

        // Frozen after the flag
        let time = game.race_time_ms();
        game.update(DT, &TickInput::with(&[Action::Up]));
        assert_eq!(game.race_time_ms(), time);
    }

    #[test]
    fn test_throttle_caps_at_max_speed() {
        let t = KartTuning::default();
        let mut game = racing();
        let kart = &mut game.karts[0];
        let full = DriveInput {
            throttle: true,
            ..DriveInput::default()
        };
        for _ in 0..100 {
            drive(kart, &t, full);
        }
        assert_eq!(kart.speed, 12.0);

        kart.effects.apply(EffectKind::Boost, 60);
        for _ in 0..100 {
            drive(kart, &t, full);
        }
        assert!((kart.speed - 12.0 * 1.4).abs() < 1e-4);

        let brake = DriveInput {
            brake: true,
            ..DriveInput::default()
        };
        for _ in 0..100 {
            drive(kart, &t, brake);
        }
        assert_eq!(kart.speed, -6.0);
    }

    #[test]
    fn test_no_steering_when_crawling() {
        let t = KartTuning::default();
        let mut game = racing();
        let kart = &mut game.karts[0];
        kart.speed = 0.4;
        let angle = kart.angle;
        drive(
            kart,
            &t,
            DriveInput {
                steer: 1.0,
                ..DriveInput::default()
            },
        );
        assert_eq!(kart.angle, angle);
    }

    #[test]
    fn test_wall_hit_reverts_and_bounces() {
        let mut game = racing();
        let wall = game.track.walls[0].center();
        let start = wall - Vec2::new(20.0, 0.0);
        let player = &mut game.karts[0];
        player.body.pos = start;
        player.angle = 0.0;
        player.speed = 10.0;
        game.update(DT, &TickInput::default());

        let player = &game.karts[0];
        assert_eq!(player.body.pos, start);
        assert!(player.speed < 0.0);
        assert!(game.drain_events().contains(&GameEvent::Crash));
    }

    #[test]
    fn test_speed_boost_pickup_and_respawn() {
        let mut game = racing();
        let spot = game.karts[0].body.pos;
        game.powerups.push(PowerUp {
            kind: PowerUpKind::SpeedBoost,
            pos: spot,
            pulse: 0.0,
            respawn_in: None,
        });
        game.update(DT, &TickInput::default());

        let player = &game.karts[0];
        assert_eq!(player.boost_charges, 1);
        assert!(player.effects.is_active(EffectKind::Boost));
        // Already counted down once at the end of the pickup tick
        assert_eq!(game.powerups[0].respawn_in, Some(299));
        assert!(game.drain_events().contains(&GameEvent::PowerUpCollected));

        // Park it where nobody drives, then wait it out
        game.powerups[0].pos = Vec2::new(30.0, 30.0);
        for _ in 0..298 {
            game.update(DT, &TickInput::default());
        }
        assert_eq!(game.powerups[0].respawn_in, Some(1));
        game.update(DT, &TickInput::default());
        assert_eq!(game.powerups[0].respawn_in, None);
    }

    #[test]
    fn test_boost_charge_used_on_press() {
        let mut game = racing();
        game.karts[0].boost_charges = 2;
        let boost = TickInput::with(&[Action::Boost]);
        game.update(DT, &boost);
        game.update(DT, &boost);
        assert_eq!(game.karts[0].boost_charges, 1);
        assert!(game.karts[0].effects.is_active(EffectKind::Boost));
    }

    #[test]
    fn test_shield_ignores_cone() {
        let mut game = racing();
        let spot = game.karts[0].body.pos;
        game.obstacles.push(Obstacle {
            kind: ObstacleKind::Cone,
            body: Body::at(spot),
        });
        game.karts[0].effects.apply(EffectKind::Shield, 120);
        game.karts[0].speed = 5.0;
        game.update(DT, &TickInput::with(&[Action::Up]));
        assert!((game.karts[0].speed - 5.4).abs() < 1e-4);
    }

    #[test]
    fn test_standings_rank_progress() {
        let mut game = racing();
        game.karts[2].lap = 2;
        game.karts[1].next_checkpoint = 3;
        let order = game.standings();
        assert_eq!(order[0], 2);
        assert_eq!(order[1], 1);

        game.karts[3].finished = Some(1);
        assert_eq!(game.standings()[0], 3);
    }

    #[test]
    fn test_camera_stays_in_world() {
        let mut game = racing();
        park_player_at(&mut game, Vec2::new(15.0, 15.0));
        for _ in 0..120 {
            game.update(DT, &TickInput::default());
        }
        assert!(game.camera.x >= 0.0 && game.camera.y >= 0.0);
        assert!(game.camera.x < 1.0 && game.camera.y < 1.0);
    }

    proptest! {
        #[test]
        fn prop_karts_stay_in_world(seed in any::<u64>(), inputs in prop::collection::vec(any::<u8>(), 1..300)) {
            let mut game = Karting::new(KartTuning::default(), &Settings::default(), seed);
            for bits in inputs {
                game.update(250.0, &input_from_bits(bits));
                for kart in &game.karts {
                    let p = kart.body.pos;
                    prop_assert!(p.x >= 10.0 && p.x <= 1390.0);
                    prop_assert!(p.y >= 10.0 && p.y <= 990.0);
                }
                prop_assert!(game.camera.x >= 0.0 && game.camera.x <= 600.0);
                prop_assert!(game.camera.y >= 0.0 && game.camera.y <= 400.0);
            }
        }
    }
}
