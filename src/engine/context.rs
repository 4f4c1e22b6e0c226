//! Shared services handed to the running level
//!
//! Built once by the platform entry point and lent to the loop each frame.
//! There are no global singletons: tests and the headless runner build their
//! own context.

use crate::audio::{NullAudio, SoundSink};
use crate::input::Controls;
use crate::levels;
use crate::settings::Settings;
use crate::tuning::Tuning;

use super::game_loop::{GameLoop, LoopConfig};
use super::level::{Level, LevelKind};

pub struct GameContext {
    pub settings: Settings,
    pub tuning: Tuning,
    pub controls: Controls,
    pub audio: Box<dyn SoundSink>,
    seed: u64,
}

impl GameContext {
    pub fn new(
        settings: Settings,
        tuning: Tuning,
        controls: Controls,
        audio: Box<dyn SoundSink>,
        seed: u64,
    ) -> Self {
        Self {
            settings,
            tuning,
            controls,
            audio,
            seed,
        }
    }

    /// Default settings, keyboard-only controls, silent audio
    pub fn headless(seed: u64) -> Self {
        let settings = Settings::default();
        let controls = Controls::headless(&settings);
        Self::new(settings, Tuning::default(), controls, Box::new(NullAudio), seed)
    }

    /// Next per-level seed (splitmix64 step)
    fn next_seed(&mut self) -> u64 {
        self.seed = self.seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.seed;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    pub fn build_level(&mut self, kind: LevelKind) -> Box<dyn Level> {
        let seed = self.next_seed();
        log::info!("Building {} (seed {})", kind, seed);
        levels::create(kind, &self.tuning, &self.settings, seed)
    }

    /// Swap in new settings; input and mute take effect immediately, the
    /// rest with the next level built
    pub fn apply_settings(&mut self, settings: Settings) {
        self.controls.apply_settings(&settings);
        self.audio.set_muted(settings.muted);
        self.settings = settings;
    }

    pub fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            target_fps: self.settings.target_fps,
            ..LoopConfig::default()
        }
    }

    /// Fresh idle loop around a newly built level
    pub fn new_loop(&mut self, kind: LevelKind) -> GameLoop {
        self.controls.release_all();
        let level = self.build_level(kind);
        GameLoop::new(level, self.loop_config())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::audio::SoundCue;

    #[test]
    fn test_builds_every_level() {
        let mut ctx = GameContext::headless(42);
        for kind in LevelKind::ALL {
            let level = ctx.build_level(kind);
            assert_eq!(level.kind(), kind);
            assert!(!level.controls_description().is_empty());
        }
    }

    /// Shares its mute flag with the test after being boxed
    struct MuteSpy(Rc<Cell<bool>>);

    impl SoundSink for MuteSpy {
        fn play(&mut self, _cue: SoundCue) {}

        fn set_muted(&mut self, muted: bool) {
            self.0.set(muted);
        }
    }

    #[test]
    fn test_apply_settings_reaches_audio_and_loop() {
        let muted = Rc::new(Cell::new(false));
        let settings = Settings::default();
        let controls = Controls::headless(&settings);
        let mut ctx = GameContext::new(
            settings,
            Tuning::default(),
            controls,
            Box::new(MuteSpy(Rc::clone(&muted))),
            5,
        );

        ctx.apply_settings(Settings {
            muted: true,
            target_fps: 30.0,
            ..Settings::default()
        });

        assert!(muted.get());
        assert!(ctx.settings.muted);
        assert_eq!(ctx.loop_config().target_fps, 30.0);
    }

    #[test]
    fn test_seeds_differ_between_levels() {
        let mut ctx = GameContext::headless(1);
        assert_ne!(ctx.next_seed(), ctx.next_seed());
    }
}
