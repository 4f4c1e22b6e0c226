//! The contract every minigame implements

use std::fmt;
use std::str::FromStr;

use crate::audio::SoundCue;
use crate::error::ArcadeError;
use crate::input::TickInput;
use crate::renderer::{DrawList, SpriteKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelKind {
    Volleyball,
    Maze,
    Archery,
    Karting,
}

impl LevelKind {
    pub const ALL: [LevelKind; 4] = [
        LevelKind::Volleyball,
        LevelKind::Maze,
        LevelKind::Archery,
        LevelKind::Karting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LevelKind::Volleyball => "volleyball",
            LevelKind::Maze => "pacman",
            LevelKind::Archery => "archery",
            LevelKind::Karting => "karting",
        }
    }

    /// Title shown above the canvas
    pub fn title(&self) -> &'static str {
        match self {
            LevelKind::Volleyball => "Beach Volleyball",
            LevelKind::Maze => "Campfire Maze",
            LevelKind::Archery => "Forest Archery",
            LevelKind::Karting => "Kart Circuit",
        }
    }
}

impl fmt::Display for LevelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LevelKind {
    type Err = ArcadeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "volleyball" => Ok(LevelKind::Volleyball),
            "pacman" | "maze" => Ok(LevelKind::Maze),
            "archery" => Ok(LevelKind::Archery),
            "karting" | "kart" => Ok(LevelKind::Karting),
            other => Err(ArcadeError::UnknownLevel(other.to_string())),
        }
    }
}

/// Something noteworthy that happened during an update
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    // Volleyball
    BallHit,
    Bounce,
    PointScored,
    MatchWon,
    // Maze
    DotEaten,
    PowerPellet,
    PowerEnded,
    GhostEaten,
    PlayerCaught,
    MazeCleared,
    // Archery
    ArrowFired,
    TargetHit { points: u32 },
    WaveCleared,
    // Karting
    CountdownTick(u32),
    RaceStarted,
    CheckpointPassed,
    LapCompleted { lap: u32, time_ms: f64 },
    RaceFinished { position: usize },
    PowerUpCollected,
    Crash,
}

impl GameEvent {
    pub fn cue(&self) -> Option<SoundCue> {
        use GameEvent::*;
        match self {
            BallHit => Some(SoundCue::Hit),
            Bounce | Crash => Some(SoundCue::Bounce),
            PointScored | LapCompleted { .. } => Some(SoundCue::Score),
            MatchWon | MazeCleared | WaveCleared | RaceFinished { .. } => Some(SoundCue::Fanfare),
            DotEaten | CheckpointPassed => Some(SoundCue::Collect),
            PowerPellet | PowerUpCollected => Some(SoundCue::PowerUp),
            PowerEnded => None,
            GhostEaten | TargetHit { .. } => Some(SoundCue::Chomp),
            PlayerCaught => Some(SoundCue::Hurt),
            ArrowFired => Some(SoundCue::Shoot),
            CountdownTick(_) => Some(SoundCue::Beep),
            RaceStarted => Some(SoundCue::Go),
        }
    }
}

/// A playable minigame
///
/// `update` advances exactly one simulation step; per-tick constants are
/// applied once regardless of `dt_ms`, which only drives timers (AI decision
/// cadence, countdowns, race clock).
pub trait Level {
    fn kind(&self) -> LevelKind;

    fn update(&mut self, dt_ms: f64, input: &TickInput);

    /// Rebuild the frame from current state. Never mutates the simulation.
    fn render(&self, out: &mut DrawList);

    /// (keys, what they do) pairs for the help overlay
    fn controls_description(&self) -> &'static [(&'static str, &'static str)];

    /// Fresh internal state, as if torn down and started again
    fn restart(&mut self);

    /// Events produced since the last call
    fn drain_events(&mut self) -> Vec<GameEvent>;

    /// Sprites this level draws
    fn sprites(&self) -> &'static [SpriteKind] {
        &[]
    }

    /// One-line score summary for logs
    fn summary(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_names() {
        for kind in LevelKind::ALL {
            assert_eq!(kind.as_str().parse::<LevelKind>().unwrap(), kind);
        }
        assert_eq!("Maze".parse::<LevelKind>().unwrap(), LevelKind::Maze);
        assert!(matches!(
            "pong".parse::<LevelKind>(),
            Err(ArcadeError::UnknownLevel(_))
        ));
    }

    #[test]
    fn test_event_cues() {
        assert_eq!(GameEvent::BallHit.cue(), Some(SoundCue::Hit));
        assert_eq!(GameEvent::PowerEnded.cue(), None);
        assert_eq!(
            GameEvent::TargetHit { points: 100 }.cue(),
            Some(SoundCue::Chomp)
        );
    }
}
