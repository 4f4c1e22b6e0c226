//! Level scaffold: the `Level` trait, shared context and the game loop

pub mod context;
pub mod game_loop;
pub mod level;

pub use context::GameContext;
pub use game_loop::{
    FrameHandle, FrameOutcome, FrameScheduler, FrameThrottle, GameLoop, LoopConfig, LoopState,
};
pub use level::{GameEvent, Level, LevelKind};
