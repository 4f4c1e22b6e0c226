//! Data-driven game balance
//!
//! Every level reads its constants from here. `Default` holds the canonical
//! values; a JSON document may override any subset of them. Velocities and
//! accelerations are per simulation tick, timers in ms unless named `_ticks`.

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub volleyball: VolleyballTuning,
    pub maze: MazeTuning,
    pub archery: ArcheryTuning,
    pub karting: KartTuning,
}

impl Tuning {
    /// Overlay JSON onto the canonical values
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolleyballTuning {
    pub ball_radius: f32,
    pub ball_spawn: (f32, f32),
    /// Velocity of the very first serve
    pub opening_velocity: (f32, f32),
    /// Horizontal speed (random side) and vertical speed after a point
    pub serve_velocity: (f32, f32),
    pub gravity: f32,
    pub spin_per_tick: f32,
    pub trail_len: usize,

    pub ground_y: f32,
    pub wall_margin: f32,
    pub wall_damping: f32,
    pub ceiling_damping: f32,

    pub net_x: f32,
    pub net_half_width: f32,
    pub net_top: f32,
    pub net_damping_x: f32,
    pub net_damping_y: f32,

    pub player_radius: f32,
    pub player_speed: f32,
    pub ai_speed: f32,
    pub jump_power: f32,
    pub ai_jump_power: f32,
    pub ai_jump_range: f32,
    pub ai_decision_ms: f64,
    /// Walkable band shared by both players
    pub court_y: (f32, f32),
    /// Highest point a jump may reach
    pub air_ceiling: f32,
    pub left_x: (f32, f32),
    pub right_x: (f32, f32),

    pub hit_power: f32,
    pub jump_hit_power: f32,
    pub hit_lift: f32,
    pub jump_hit_lift: f32,

    pub particle_gravity: f32,
    pub points_to_win: u32,
}

impl Default for VolleyballTuning {
    fn default() -> Self {
        Self {
            ball_radius: 15.0,
            ball_spawn: (400.0, 300.0),
            opening_velocity: (1.0, -0.8),
            serve_velocity: (1.0, -2.0),
            gravity: 0.15,
            spin_per_tick: 0.15,
            trail_len: 8,

            ground_y: 570.0,
            wall_margin: 15.0,
            wall_damping: 0.5,
            ceiling_damping: 0.4,

            net_x: 400.0,
            net_half_width: 20.0,
            net_top: 420.0,
            net_damping_x: 0.6,
            net_damping_y: 0.7,

            player_radius: 25.0,
            player_speed: 4.0,
            ai_speed: 3.0,
            jump_power: 15.0,
            ai_jump_power: 12.0,
            ai_jump_range: 50.0,
            ai_decision_ms: 150.0,
            court_y: (420.0, 540.0),
            air_ceiling: 300.0,
            left_x: (0.0, 340.0),
            right_x: (420.0, 760.0),

            hit_power: 7.0,
            jump_hit_power: 10.0,
            hit_lift: 4.0,
            jump_hit_lift: 6.0,

            particle_gravity: 0.2,
            points_to_win: 11,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeTuning {
    pub player_start: (f32, f32),
    pub player_radius: f32,
    pub player_speed: f32,

    pub dot_spacing: f32,
    pub dot_chance: f64,
    pub dot_reach: f32,
    pub pellet_reach: f32,
    pub ghost_reach: f32,

    pub power_ticks: u32,
    pub ghost_chase_speed: f32,
    pub ghost_flee_speed: f32,
    pub chase_range: f32,
    pub ghost_respawn: (f32, f32),
    pub ai_decision_ms: f64,
    /// Ghost speed gained per cleared maze (fraction)
    pub level_speedup: f32,

    pub dot_points: u32,
    pub pellet_points: u32,
    pub ghost_points: u32,
    pub caught_penalty: u32,

    pub particle_drag: f32,
}

impl Default for MazeTuning {
    fn default() -> Self {
        Self {
            player_start: (50.0, 50.0),
            player_radius: 25.0,
            player_speed: 3.0,

            dot_spacing: 60.0,
            dot_chance: 0.8,
            dot_reach: 25.0,
            pellet_reach: 30.0,
            ghost_reach: 35.0,

            power_ticks: 300,
            ghost_chase_speed: 1.5,
            ghost_flee_speed: 2.0,
            chase_range: 150.0,
            ghost_respawn: (400.0, 300.0),
            ai_decision_ms: 150.0,
            level_speedup: 0.1,

            dot_points: 10,
            pellet_points: 50,
            ghost_points: 200,
            caught_penalty: 50,

            particle_drag: 0.98,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcheryTuning {
    /// Top-left of the archer sprite box
    pub archer_pos: (f32, f32),
    pub archer_size: (f32, f32),
    pub aim_step: f32,
    pub aim_min: f32,
    pub aim_max: f32,

    pub charge_rate: f32,
    pub max_power: f32,
    pub min_power: f32,
    pub max_arrows_in_flight: usize,
    pub arrow_size: (f32, f32),

    pub gravity: f32,
    pub wind_factor: f32,
    pub wind_strength: (f32, f32),

    pub hit_margin: f32,
    pub target_count: usize,
    pub hit_anim_ticks: u32,
    pub stuck_ticks: u32,
    pub bonus_points: u32,
}

impl Default for ArcheryTuning {
    fn default() -> Self {
        use std::f32::consts::PI;
        Self {
            archer_pos: (80.0, 450.0),
            archer_size: (40.0, 60.0),
            aim_step: 0.03,
            aim_min: -PI / 4.0,
            aim_max: PI / 6.0,

            charge_rate: 3.0,
            max_power: 100.0,
            min_power: 10.0,
            max_arrows_in_flight: 5,
            arrow_size: (20.0, 3.0),

            gravity: 0.15,
            wind_factor: 0.01,
            wind_strength: (1.0, 5.0),

            hit_margin: 15.0,
            target_count: 6,
            hit_anim_ticks: 30,
            stuck_ticks: 60,
            bonus_points: 150,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KartTuning {
    pub world: (f32, f32),
    pub viewport: (f32, f32),
    pub track_center: (f32, f32),
    /// Radii of the circuit's centre line
    pub track_radii: (f32, f32),
    pub track_half_width: f32,
    pub waypoint_count: usize,
    pub checkpoint_count: usize,
    pub checkpoint_size: f32,
    pub wall_block: f32,
    pub kart_hitbox: f32,

    pub max_speed: f32,
    pub accel: f32,
    pub brake: f32,
    pub friction: f32,
    pub steering: f32,
    pub boost_multiplier: f32,
    pub wall_bounce: f32,
    pub bounds_bounce: f32,

    pub ai_accel: f32,
    pub ai_base_speed: f32,
    pub ai_turn_rate: f32,
    pub ai_decision_ms: f64,
    pub ai_jitter: f32,
    pub ai_boost_chance: f64,
    pub stuck_ms: f64,

    pub total_laps: u32,
    pub countdown_from: u32,
    pub countdown_step_ms: f64,

    pub powerup_count: usize,
    pub powerup_respawn_ticks: u32,
    pub boost_ticks: u32,
    pub shield_ticks: u32,
    pub obstacle_count: usize,
    pub obstacle_cooldown_ticks: u32,

    pub camera_lerp: f32,
}

impl Default for KartTuning {
    fn default() -> Self {
        Self {
            world: (1400.0, 1000.0),
            viewport: (800.0, 600.0),
            track_center: (700.0, 500.0),
            track_radii: (520.0, 340.0),
            track_half_width: 90.0,
            waypoint_count: 10,
            checkpoint_count: 8,
            checkpoint_size: 180.0,
            wall_block: 15.0,
            kart_hitbox: 20.0,

            max_speed: 12.0,
            accel: 0.4,
            brake: 0.6,
            friction: 0.92,
            steering: 0.08,
            boost_multiplier: 1.4,
            wall_bounce: 0.5,
            bounds_bounce: 0.3,

            ai_accel: 0.35,
            ai_base_speed: 11.0,
            ai_turn_rate: 0.06,
            ai_decision_ms: 200.0,
            ai_jitter: 15.0,
            ai_boost_chance: 0.001,
            stuck_ms: 1000.0,

            total_laps: 3,
            countdown_from: 3,
            countdown_step_ms: 1000.0,

            powerup_count: 12,
            powerup_respawn_ticks: 300,
            boost_ticks: 60,
            shield_ticks: 120,
            obstacle_count: 6,
            obstacle_cooldown_ticks: 30,

            camera_lerp: 0.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override() {
        let tuning =
            Tuning::from_json(r#"{"maze": {"power_ticks": 120}, "karting": {"total_laps": 5}}"#)
                .unwrap();
        assert_eq!(tuning.maze.power_ticks, 120);
        assert_eq!(tuning.maze.ghost_chase_speed, 1.5);
        assert_eq!(tuning.karting.total_laps, 5);
        assert_eq!(tuning.volleyball, VolleyballTuning::default());
    }

    #[test]
    fn test_defaults_round_trip() {
        let json = serde_json::to_string(&Tuning::default()).unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), Tuning::default());
    }

    #[test]
    fn test_bad_json_is_config_error() {
        assert!(matches!(
            Tuning::from_json(r#"{"maze": {"power_ticks": "lots"}}"#),
            Err(crate::ArcadeError::Config(_))
        ));
    }
}
