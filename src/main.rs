//! Retro Arcade entry point
//!
//! The browser build starts from `platform::init` in the library. Natively
//! this runs each level headless for a while with scripted input and logs
//! how it went:
//!
//! ```text
//! RUST_LOG=info retro-arcade [level] [seconds]
//! ```

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use retro_arcade::engine::{FrameHandle, FrameOutcome, FrameScheduler, GameContext, LevelKind};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const DEFAULT_SECONDS: f64 = 30.0;

    /// Hands out ids; frames are driven by the caller's clock
    #[derive(Default)]
    struct SimulatedFrames {
        next_id: i32,
        pending: Option<FrameHandle>,
    }

    impl FrameScheduler for SimulatedFrames {
        fn request(&mut self) -> Option<FrameHandle> {
            self.next_id += 1;
            let handle = FrameHandle(self.next_id);
            self.pending = Some(handle);
            Some(handle)
        }

        fn cancel(&mut self, handle: FrameHandle) {
            if self.pending == Some(handle) {
                self.pending = None;
            }
        }
    }

    /// Scripted key presses for frame `n`: (key, down)
    fn autopilot(kind: LevelKind, n: u64) -> Vec<(&'static str, bool)> {
        match kind {
            LevelKind::Volleyball => {
                let dir = if (n / 90) % 2 == 0 { "ArrowLeft" } else { "ArrowRight" };
                let other = if dir == "ArrowLeft" { "ArrowRight" } else { "ArrowLeft" };
                vec![(dir, true), (other, false), (" ", n % 45 < 3)]
            }
            LevelKind::Maze => {
                const TURNS: [&str; 4] = ["ArrowRight", "ArrowDown", "ArrowLeft", "ArrowUp"];
                let held = TURNS[((n / 60) % 4) as usize];
                TURNS.iter().map(|k| (*k, *k == held)).collect()
            }
            LevelKind::Archery => {
                // Charge for a second, release, nudge the aim between shots
                let phase = n % 80;
                vec![
                    (" ", phase < 60),
                    ("ArrowUp", (60..64).contains(&phase)),
                    ("ArrowDown", (64..68).contains(&phase)),
                ]
            }
            LevelKind::Karting => {
                let steer = if (n / 40) % 3 == 0 { "ArrowRight" } else { "ArrowLeft" };
                let other = if steer == "ArrowRight" { "ArrowLeft" } else { "ArrowRight" };
                vec![
                    ("ArrowUp", true),
                    (steer, n % 40 < 12),
                    (other, false),
                    ("Shift", n % 300 < 2),
                ]
            }
        }
    }

    fn code_for(key: &str) -> &str {
        match key {
            " " => "Space",
            "Shift" => "ShiftLeft",
            other => other,
        }
    }

    fn run_level(ctx: &mut GameContext, kind: LevelKind, seconds: f64) {
        let mut frames = SimulatedFrames::default();
        let mut game = ctx.new_loop(kind);
        let mut now = 0.0;
        game.start(now, &mut frames);

        let total = (seconds * 1000.0 / FRAME_MS) as u64;
        let mut stepped = 0u64;
        for n in 0..total {
            for (key, down) in autopilot(kind, n) {
                if down {
                    ctx.controls.key_down(key, code_for(key));
                } else {
                    ctx.controls.key_up(key, code_for(key));
                }
            }

            now += FRAME_MS;
            match game.on_frame(now, &mut ctx.controls, ctx.audio.as_mut(), &mut frames) {
                FrameOutcome::Stepped => stepped += 1,
                FrameOutcome::Skipped => {}
                FrameOutcome::Halted => break,
            }
        }

        log::info!(
            "{}: {} frames, {} draw commands in last frame",
            kind.title(),
            stepped,
            game.frame().len()
        );
        game.stop(&mut frames);
        println!("{:<18} {}", kind.title(), game.level().summary());
    }

    pub fn run() -> retro_arcade::Result<()> {
        let mut args = std::env::args().skip(1);
        let kinds = match args.next() {
            Some(name) => vec![name.parse::<LevelKind>()?],
            None => LevelKind::ALL.to_vec(),
        };
        let seconds = args
            .next()
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(DEFAULT_SECONDS);

        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        log::info!("Retro Arcade (native) seed {}, {}s per level", seed, seconds);

        let mut ctx = GameContext::headless(seed);
        for kind in kinds {
            run_level(&mut ctx, kind, seconds);
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(e) = native::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser entry point is retro_arcade::platform::init
}
