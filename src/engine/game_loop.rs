//! Frame-driven game loop
//!
//! `Idle → Running → Stopped`. Each animation frame the loop decides whether
//! enough time has passed to step the level; either way it asks for another
//! frame until stopped. Stopping cancels the outstanding frame request and
//! makes any stale callback a no-op.

use crate::audio::SoundSink;
use crate::consts::{MAX_FRAME_MS, TARGET_FPS};
use crate::input::Controls;
use crate::renderer::DrawList;

use super::level::{GameEvent, Level};

/// Opaque id of a pending frame request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHandle(pub i32);

/// Requests "call me on the next frame". On the web this wraps
/// `requestAnimationFrame` / `cancelAnimationFrame`.
pub trait FrameScheduler {
    fn request(&mut self) -> Option<FrameHandle>;
    fn cancel(&mut self, handle: FrameHandle);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Not enough time since the last step; nothing simulated
    Skipped,
    /// Level updated and draw list rebuilt
    Stepped,
    /// Loop not running; no further frame requested
    Halted,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopConfig {
    pub target_fps: f32,
    /// Elapsed time handed to `update` is capped here
    pub max_frame_ms: f64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_fps: TARGET_FPS,
            max_frame_ms: MAX_FRAME_MS,
        }
    }
}

/// Runs a step only when at least one frame interval has elapsed since the
/// previous executed step.
#[derive(Debug, Clone)]
pub struct FrameThrottle {
    interval_ms: f64,
    max_frame_ms: f64,
    last_step_ms: Option<f64>,
}

impl FrameThrottle {
    pub fn new(config: &LoopConfig) -> Self {
        Self {
            interval_ms: 1000.0 / config.target_fps.max(1.0) as f64,
            max_frame_ms: config.max_frame_ms,
            last_step_ms: None,
        }
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    pub fn reset(&mut self, now_ms: f64) {
        self.last_step_ms = Some(now_ms);
    }

    /// `Some(elapsed)` (capped) if a step is due
    pub fn poll(&mut self, now_ms: f64) -> Option<f64> {
        let Some(last) = self.last_step_ms else {
            self.last_step_ms = Some(now_ms);
            return None;
        };
        let elapsed = now_ms - last;
        if elapsed >= self.interval_ms {
            self.last_step_ms = Some(now_ms);
            Some(elapsed.min(self.max_frame_ms))
        } else {
            None
        }
    }
}

pub struct GameLoop {
    state: LoopState,
    level: Box<dyn Level>,
    throttle: FrameThrottle,
    pending: Option<FrameHandle>,
    frame: DrawList,
    steps: u64,
}

impl GameLoop {
    pub fn new(level: Box<dyn Level>, config: LoopConfig) -> Self {
        Self {
            state: LoopState::Idle,
            level,
            throttle: FrameThrottle::new(&config),
            pending: None,
            frame: DrawList::new(),
            steps: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn level(&self) -> &dyn Level {
        self.level.as_ref()
    }

    pub fn level_mut(&mut self) -> &mut dyn Level {
        self.level.as_mut()
    }

    /// Draw list from the most recent step
    pub fn frame(&self) -> &DrawList {
        &self.frame
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn has_pending_frame(&self) -> bool {
        self.pending.is_some()
    }

    /// Begin running. Only valid from `Idle`; returns whether it started.
    pub fn start(&mut self, now_ms: f64, scheduler: &mut dyn FrameScheduler) -> bool {
        if self.state != LoopState::Idle {
            log::warn!("{} loop start ignored in {:?}", self.level.kind(), self.state);
            return false;
        }
        self.throttle.reset(now_ms);
        self.frame.reset();
        self.level.render(&mut self.frame);
        self.state = LoopState::Running;
        self.pending = scheduler.request();
        log::info!("{} started", self.level.kind().title());
        true
    }

    /// Handle one animation-frame callback
    pub fn on_frame(
        &mut self,
        now_ms: f64,
        controls: &mut Controls,
        audio: &mut dyn SoundSink,
        scheduler: &mut dyn FrameScheduler,
    ) -> FrameOutcome {
        // The callback that got us here is no longer pending
        self.pending = None;
        if self.state != LoopState::Running {
            return FrameOutcome::Halted;
        }

        controls.advance_clock(now_ms);
        let outcome = match self.throttle.poll(now_ms) {
            Some(dt) => {
                self.step(dt, controls, audio);
                FrameOutcome::Stepped
            }
            None => FrameOutcome::Skipped,
        };

        self.pending = scheduler.request();
        outcome
    }

    fn step(&mut self, dt_ms: f64, controls: &mut Controls, audio: &mut dyn SoundSink) {
        controls.poll_gamepad();
        let input = controls.snapshot();
        if input.restart {
            log::info!("{} restarted", self.level.kind().title());
            self.level.restart();
        }

        self.level.update(dt_ms, &input);
        self.steps += 1;

        for event in self.level.drain_events() {
            if let GameEvent::RaceFinished { position } = event {
                log::info!("Race finished in position {}", position);
            }
            if let Some(cue) = event.cue() {
                audio.play(cue);
            }
        }

        self.frame.reset();
        self.level.render(&mut self.frame);
    }

    /// Stop and cancel the pending frame. Idempotent: returns false if the
    /// loop was already stopped.
    pub fn stop(&mut self, scheduler: &mut dyn FrameScheduler) -> bool {
        if self.state == LoopState::Stopped {
            return false;
        }
        if let Some(handle) = self.pending.take() {
            scheduler.cancel(handle);
        }
        self.state = LoopState::Stopped;
        log::info!(
            "{} stopped after {} steps ({})",
            self.level.kind().title(),
            self.steps,
            self.level.summary()
        );
        true
    }
}
