//! High score record
//!
//! Two scalars under `INSQ-highScore` and `INSQ-highLevel`. Missing or
//! malformed values are replaced by the first-run defaults.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_HIGH_LEVEL, DEFAULT_HIGH_SCORE};
use crate::persistence::{self, KeyValueStore};
use crate::storage_key;

const HIGH_SCORE_KEY: &str = "highScore";
const HIGH_LEVEL_KEY: &str = "highLevel";

/// Which records a finished session beat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HighScoreOutcome {
    pub new_high_score: bool,
    pub new_high_level: bool,
}

impl HighScoreOutcome {
    pub fn any(&self) -> bool {
        self.new_high_score || self.new_high_level
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreRecord {
    pub high_score: u64,
    pub high_level: u32,
}

impl Default for HighScoreRecord {
    fn default() -> Self {
        Self {
            high_score: DEFAULT_HIGH_SCORE,
            high_level: DEFAULT_HIGH_LEVEL,
        }
    }
}

impl HighScoreRecord {
    /// Read both values, writing defaults back for any that are unset
    pub fn load(store: &mut dyn KeyValueStore) -> Self {
        let defaults = Self::default();
        let high_score = read_or_init(store, HIGH_SCORE_KEY, defaults.high_score);
        let high_level = read_or_init(store, HIGH_LEVEL_KEY, defaults.high_level);
        log::info!("High score {high_score}, high level {high_level}");
        Self {
            high_score,
            high_level,
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> persistence::Result<()> {
        store.set_item(&storage_key(HIGH_SCORE_KEY), &self.high_score.to_string())?;
        store.set_item(&storage_key(HIGH_LEVEL_KEY), &self.high_level.to_string())?;
        log::info!(
            "High scores saved ({} / level {})",
            self.high_score,
            self.high_level
        );
        Ok(())
    }

    /// Compare a finished session against the record, raising it where beaten
    pub fn submit(&mut self, score: u64, level: u32) -> HighScoreOutcome {
        let outcome = HighScoreOutcome {
            new_high_score: score > self.high_score,
            new_high_level: level > self.high_level,
        };
        if outcome.new_high_score {
            self.high_score = score;
        }
        if outcome.new_high_level {
            self.high_level = level;
        }
        outcome
    }
}

fn read_or_init<T>(store: &mut dyn KeyValueStore, name: &str, default: T) -> T
where
    T: std::str::FromStr + ToString + Copy,
{
    let key = storage_key(name);
    if let Some(value) = store.get_item(&key).and_then(|raw| raw.trim().parse().ok()) {
        return value;
    }
    if let Err(e) = store.set_item(&key, &default.to_string()) {
        log::warn!("Could not initialize {key}: {e}");
    }
    default
}
