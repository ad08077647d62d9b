//! Web Audio backend
//!
//! Procedurally generated blips, no asset files needed.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use super::{AudioSink, SoundEffect};
use crate::settings::Settings;

/// One oscillator note: start pitch, end pitch, start offset and length in seconds
struct Note {
    freq: f32,
    end_freq: f32,
    at: f64,
    len: f64,
    level: f32,
    wave: OscillatorType,
}

impl Note {
    const fn flat(freq: f32, at: f64, len: f64, level: f32, wave: OscillatorType) -> Self {
        Self {
            freq,
            end_freq: freq,
            at,
            len,
            level,
            wave,
        }
    }
}

fn notes_for(effect: SoundEffect) -> Vec<Note> {
    use OscillatorType::{Sine, Square, Triangle};
    match effect {
        SoundEffect::Move => vec![Note::flat(440.0, 0.0, 0.05, 0.15, Square)],
        SoundEffect::Absorb => vec![Note {
            freq: 500.0,
            end_freq: 1000.0,
            at: 0.0,
            len: 0.12,
            level: 0.3,
            wave: Triangle,
        }],
        SoundEffect::Miss => vec![Note {
            freq: 300.0,
            end_freq: 60.0,
            at: 0.0,
            len: 0.4,
            level: 0.4,
            wave: Sine,
        }],
        SoundEffect::LevelUp => [400.0, 500.0, 600.0, 800.0]
            .iter()
            .enumerate()
            .map(|(i, f)| Note::flat(*f, i as f64 * 0.1, 0.4, 0.3, Triangle))
            .collect(),
        SoundEffect::Extend => [600.0, 800.0, 1000.0]
            .iter()
            .enumerate()
            .map(|(i, f)| Note::flat(*f, i as f64 * 0.08, 0.15, 0.25, Sine))
            .collect(),
        SoundEffect::GameOver => [400.0, 350.0, 300.0, 200.0]
            .iter()
            .enumerate()
            .map(|(i, f)| Note::flat(*f, i as f64 * 0.2, 0.3, 0.3, Sine))
            .collect(),
        SoundEffect::HighScore => [500.0, 600.0, 700.0, 800.0, 1000.0]
            .iter()
            .enumerate()
            .map(|(i, f)| Note::flat(*f, i as f64 * 0.08, 0.25, 0.25, Triangle))
            .collect(),
        SoundEffect::Ui => vec![Note::flat(660.0, 0.0, 0.08, 0.2, Sine)],
    }
}

pub struct WebAudio {
    ctx: Option<AudioContext>,
    volume: f32,
}

impl WebAudio {
    pub fn new() -> Self {
        // Fails outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self { ctx, volume: 1.0 }
    }

    fn create_osc(ctx: &AudioContext, wave: OscillatorType) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;
        osc.set_type(wave);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;
        Some((osc, gain))
    }

    fn play_note(ctx: &AudioContext, note: &Note, volume: f32) {
        let Some((osc, gain)) = Self::create_osc(ctx, note.wave) else {
            return;
        };
        let t = ctx.current_time() + note.at;
        gain.gain().set_value_at_time(volume * note.level, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + note.len)
            .ok();
        osc.frequency().set_value_at_time(note.freq, t).ok();
        if note.end_freq != note.freq {
            osc.frequency()
                .exponential_ramp_to_value_at_time(note.end_freq, t + note.len)
                .ok();
        }
        osc.start_with_when(t).ok();
        osc.stop_with_when(t + note.len + 0.05).ok();
    }
}

impl Default for WebAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSink for WebAudio {
    fn play(&mut self, effect: SoundEffect) {
        if self.volume <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };
        // Browsers keep the context suspended until a user gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }
        for note in notes_for(effect) {
            Self::play_note(ctx, &note, self.volume);
        }
    }

    fn configure(&mut self, settings: &Settings) {
        self.volume = settings.effective_sfx_volume();
    }
}
