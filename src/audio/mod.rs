//! Sound effects
//!
//! The session never plays sounds itself. The shell maps drained events to
//! `SoundEffect`s and hands them to an `AudioSink`.

use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::sim::GameEvent;

#[cfg(target_arch = "wasm32")]
mod web;
#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Target absorbed
    Absorb,
    /// Player stepped to another cell
    Move,
    /// Wrong cell or projectile hit
    Miss,
    /// Grid cleared
    LevelUp,
    /// Extra life
    Extend,
    GameOver,
    /// Game over with a new record
    HighScore,
    /// Menu confirm
    Ui,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 8] = [
        SoundEffect::Absorb,
        SoundEffect::Move,
        SoundEffect::Miss,
        SoundEffect::LevelUp,
        SoundEffect::Extend,
        SoundEffect::GameOver,
        SoundEffect::HighScore,
        SoundEffect::Ui,
    ];

    /// Asset id, for sinks that play sampled audio
    pub fn id(self) -> &'static str {
        match self {
            SoundEffect::Absorb => "absorb",
            SoundEffect::Move => "move",
            SoundEffect::Miss => "miss",
            SoundEffect::LevelUp => "levelUp",
            SoundEffect::Extend => "extend",
            SoundEffect::GameOver => "gameOver",
            SoundEffect::HighScore => "highScore",
            SoundEffect::Ui => "ui",
        }
    }

    /// Sound for a session event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Moved { .. } => Some(SoundEffect::Move),
            GameEvent::Absorbed { .. } => Some(SoundEffect::Absorb),
            GameEvent::Missed { .. } => Some(SoundEffect::Miss),
            GameEvent::LevelUp { .. } => Some(SoundEffect::LevelUp),
            GameEvent::Extend { .. } => Some(SoundEffect::Extend),
            GameEvent::GameOver(report) if report.outcome.any() => Some(SoundEffect::HighScore),
            GameEvent::GameOver(_) => Some(SoundEffect::GameOver),
            GameEvent::PhaseChanged(_) | GameEvent::GridRegenerated => None,
        }
    }
}

/// Fire-and-forget sound output
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);

    /// Apply mute and volume preferences
    fn configure(&mut self, _settings: &Settings) {}
}

/// Sink that drops every sound (headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn play(&mut self, _effect: SoundEffect) {}
}

/// Sink that remembers what it was asked to play
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub played: Vec<SoundEffect>,
    pub muted: bool,
}

impl AudioSink for RecordingSink {
    fn play(&mut self, effect: SoundEffect) {
        if !self.muted {
            self.played.push(effect);
        }
    }

    fn configure(&mut self, settings: &Settings) {
        self.muted = settings.effective_sfx_volume() <= 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::HighScoreOutcome;
    use crate::sim::{GameOverReport, GamePhase};

    fn report(new_high_score: bool) -> GameOverReport {
        GameOverReport {
            score: 40,
            level: 2,
            high_score: 40,
            high_level: 5,
            outcome: HighScoreOutcome {
                new_high_score,
                new_high_level: false,
            },
        }
    }

    #[test]
    fn test_event_mapping() {
        assert_eq!(
            SoundEffect::for_event(&GameEvent::Missed { lives: 2 }),
            Some(SoundEffect::Miss)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::PhaseChanged(GamePhase::Ready)),
            None
        );
        assert_eq!(SoundEffect::for_event(&GameEvent::GridRegenerated), None);
        assert_eq!(
            SoundEffect::for_event(&GameEvent::GameOver(report(true))),
            Some(SoundEffect::HighScore)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::GameOver(report(false))),
            Some(SoundEffect::GameOver)
        );
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<_> = SoundEffect::ALL.iter().map(|s| s.id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), SoundEffect::ALL.len());
    }

    #[test]
    fn test_recording_sink_respects_mute() {
        let mut sink = RecordingSink::default();
        sink.play(SoundEffect::Ui);
        sink.configure(&Settings {
            muted: true,
            ..Settings::default()
        });
        sink.play(SoundEffect::Absorb);
        assert_eq!(sink.played, vec![SoundEffect::Ui]);
    }
}
