//! Sound cues
//!
//! Levels never touch audio directly: they emit gameplay events, the loop
//! maps them to [`SoundCue`]s and hands them to a [`SoundSink`]. On the web
//! the sink is [`AudioManager`], which synthesises every cue with Web Audio
//! oscillators - no external files needed.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Ball struck by a player
    Hit,
    /// Ball off a wall, net or ceiling
    Bounce,
    /// A point scored
    Score,
    /// Dot or small pickup
    Collect,
    /// Power pellet / kart power-up
    PowerUp,
    /// Ghost eaten, target hit
    Chomp,
    /// Player caught or crashed
    Hurt,
    /// Round, wave or race won
    Fanfare,
    /// Arrow released
    Shoot,
    /// Countdown tick
    Beep,
    /// Race start
    Go,
}

pub trait SoundSink {
    fn play(&mut self, cue: SoundCue);

    /// Unlock output after a user gesture (browsers start audio suspended)
    fn resume(&mut self) {}

    fn set_muted(&mut self, _muted: bool) {}
}

/// Discards every cue (native builds, tests, muted start)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl SoundSink for NullAudio {
    fn play(&mut self, _cue: SoundCue) {}
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{SoundCue, SoundSink};

    /// Audio manager for the arcade
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        master_volume: f32,
        sfx_volume: f32,
        muted: bool,
    }

    impl AudioManager {
        pub fn new(master_volume: f32, sfx_volume: f32, muted: bool) -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                master_volume: master_volume.clamp(0.0, 1.0),
                sfx_volume: sfx_volume.clamp(0.0, 1.0),
                muted,
            }
        }

        fn effective_volume(&self) -> f32 {
            if self.muted {
                0.0
            } else {
                self.master_volume * self.sfx_volume
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Single tone, optionally sliding to `end_freq`
        fn tone(
            &self,
            ctx: &AudioContext,
            vol: f32,
            freq: f32,
            end_freq: Option<f32>,
            osc_type: OscillatorType,
            delay: f64,
            length: f64,
        ) {
            let Some((osc, gain)) = self.create_osc(ctx, freq, osc_type) else {
                return;
            };
            let t = ctx.current_time() + delay;

            gain.gain().set_value_at_time(vol, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + length)
                .ok();
            if let Some(end) = end_freq {
                osc.frequency().set_value_at_time(freq, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(end, t + length)
                    .ok();
            }

            osc.start_with_when(t).ok();
            osc.stop_with_when(t + length + 0.05).ok();
        }

        /// Notes played one after another
        fn arpeggio(
            &self,
            ctx: &AudioContext,
            vol: f32,
            notes: &[f32],
            step: f64,
            length: f64,
            osc_type: OscillatorType,
        ) {
            for (i, freq) in notes.iter().enumerate() {
                self.tone(ctx, vol, *freq, None, osc_type, i as f64 * step, length);
            }
        }
    }

    impl SoundSink for AudioManager {
        fn play(&mut self, cue: SoundCue) {
            let vol = self.effective_volume();
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Browsers keep the context suspended until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match cue {
                SoundCue::Hit => {
                    self.tone(ctx, vol * 0.6, 150.0, Some(60.0), OscillatorType::Sine, 0.0, 0.1)
                }
                SoundCue::Bounce => {
                    self.tone(ctx, vol * 0.3, 400.0, None, OscillatorType::Sine, 0.0, 0.08)
                }
                SoundCue::Score => self.arpeggio(
                    ctx,
                    vol * 0.3,
                    &[500.0, 750.0],
                    0.1,
                    0.2,
                    OscillatorType::Triangle,
                ),
                SoundCue::Collect => {
                    self.tone(ctx, vol * 0.2, 900.0, None, OscillatorType::Square, 0.0, 0.05)
                }
                SoundCue::PowerUp => self.arpeggio(
                    ctx,
                    vol * 0.25,
                    &[600.0, 800.0, 1000.0],
                    0.08,
                    0.15,
                    OscillatorType::Sine,
                ),
                SoundCue::Chomp => {
                    self.tone(ctx, vol * 0.35, 400.0, Some(800.0), OscillatorType::Square, 0.0, 0.12)
                }
                SoundCue::Hurt => {
                    self.tone(ctx, vol * 0.4, 300.0, Some(40.0), OscillatorType::Sawtooth, 0.0, 0.5)
                }
                SoundCue::Fanfare => self.arpeggio(
                    ctx,
                    vol * 0.3,
                    &[400.0, 500.0, 600.0, 800.0],
                    0.1,
                    0.4,
                    OscillatorType::Triangle,
                ),
                SoundCue::Shoot => {
                    self.tone(ctx, vol * 0.3, 200.0, Some(600.0), OscillatorType::Triangle, 0.0, 0.15)
                }
                SoundCue::Beep => {
                    self.tone(ctx, vol * 0.3, 440.0, None, OscillatorType::Square, 0.0, 0.15)
                }
                SoundCue::Go => {
                    self.tone(ctx, vol * 0.35, 880.0, None, OscillatorType::Square, 0.0, 0.4)
                }
            }
        }

        fn resume(&mut self) {
            let Some(ctx) = &self.ctx else { return };
            if ctx.state() == web_sys::AudioContextState::Suspended && ctx.resume().is_err() {
                log::warn!("AudioContext refused to resume");
            }
        }

        fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Collects cues for assertions
    #[derive(Debug, Default)]
    pub(crate) struct RecordingSink(pub Vec<SoundCue>);

    impl SoundSink for RecordingSink {
        fn play(&mut self, cue: SoundCue) {
            self.0.push(cue);
        }
    }

    #[test]
    fn test_null_audio_accepts_everything() {
        let mut sink = NullAudio;
        sink.play(SoundCue::Fanfare);
        let mut rec = RecordingSink::default();
        rec.play(SoundCue::Beep);
        assert_eq!(rec.0, vec![SoundCue::Beep]);
    }
}
