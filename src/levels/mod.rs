//! The minigames
//!
//! Each level owns its entities, a seeded RNG and a particle pool, and
//! implements [`Level`]. Construction builds a complete playable state.

pub mod archery;
pub mod karting;
pub mod maze;
pub mod volleyball;

pub use archery::Archery;
pub use karting::Karting;
pub use maze::Maze;
pub use volleyball::Volleyball;

use glam::Vec2;

use crate::engine::{Level, LevelKind};
use crate::input::{Action, TickInput};
use crate::renderer::{Color, DrawList, TextStyle};
use crate::settings::Settings;
use crate::tuning::Tuning;

pub fn create(kind: LevelKind, tuning: &Tuning, settings: &Settings, seed: u64) -> Box<dyn Level> {
    match kind {
        LevelKind::Volleyball => Box::new(Volleyball::new(tuning.volleyball.clone(), settings, seed)),
        LevelKind::Maze => Box::new(Maze::new(tuning.maze.clone(), settings, seed)),
        LevelKind::Archery => Box::new(Archery::new(tuning.archery.clone(), settings, seed)),
        LevelKind::Karting => Box::new(Karting::new(tuning.karting.clone(), settings, seed)),
    }
}

/// Movement direction for this tick: the analog stick when it is deflected,
/// otherwise the digital directions. Components in [-1, 1].
pub(crate) fn move_dir(input: &TickInput) -> Vec2 {
    if input.stick != Vec2::ZERO {
        return input.stick.clamp(Vec2::splat(-1.0), Vec2::ONE);
    }
    Vec2::new(
        input.digital_axis(Action::Left, Action::Right),
        input.digital_axis(Action::Up, Action::Down),
    )
}

/// Bold white HUD text with a drop shadow
pub(crate) fn hud_style(size: u32) -> TextStyle {
    TextStyle::new(format!("bold {}px Arial", size), Color::WHITE).shadowed()
}

/// Large centred banner (countdowns, win messages)
pub(crate) fn banner(out: &mut DrawList, text: &str, sub: Option<&str>) {
    let center = Vec2::new(
        crate::consts::CANVAS_WIDTH / 2.0,
        crate::consts::CANVAS_HEIGHT / 2.0,
    );
    out.text(text, center, &hud_style(48).centered());
    if let Some(sub) = sub {
        out.text(sub, center + Vec2::new(0.0, 50.0), &hud_style(20).centered());
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Input holding every action whose bit is set (bit i = `Action::ALL[i]`)
    pub(crate) fn input_from_bits(bits: u8) -> TickInput {
        let held: Vec<Action> = Action::ALL
            .iter()
            .enumerate()
            .filter(|(i, _)| bits & (1 << i) != 0)
            .map(|(_, a)| *a)
            .collect();
        TickInput::with(&held)
    }

    #[test]
    fn test_create_builds_requested_kind() {
        let tuning = Tuning::default();
        let settings = Settings::default();
        for kind in LevelKind::ALL {
            let level = create(kind, &tuning, &settings, 3);
            assert_eq!(level.kind(), kind);
        }
    }

    #[test]
    fn test_move_dir_prefers_stick() {
        let mut input = TickInput::with(&[Action::Left, Action::Down]);
        assert_eq!(move_dir(&input), Vec2::new(-1.0, 1.0));
        input.stick = Vec2::new(0.5, 0.0);
        assert_eq!(move_dir(&input), Vec2::new(0.5, 0.0));
    }

    #[test]
    fn test_every_level_renders_its_first_frame() {
        let tuning = Tuning::default();
        let settings = Settings::default();
        for kind in LevelKind::ALL {
            let mut level = create(kind, &tuning, &settings, 11);
            let mut out = DrawList::new();
            level.render(&mut out);
            assert!(!out.is_empty(), "{} drew nothing", kind);
            level.update(16.0, &TickInput::default());
            level.restart();
            assert!(level.drain_events().is_empty());
        }
    }
}
