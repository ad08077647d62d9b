//! Game settings and preferences
//!
//! Persisted separately from the high scores, as one JSON document under
//! `INSQ-settings`.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, KeyValueStore};
use crate::storage_key;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    pub muted: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,

    // === Behavior ===
    /// Stop the clock while the page is hidden
    pub pause_when_hidden: bool,
    /// Seconds on the title screen before the demo starts
    pub demo_after: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            muted: false,
            master_volume: 0.8,
            sfx_volume: 1.0,
            pause_when_hidden: true,
            demo_after: 10.0,
        }
    }
}

impl Settings {
    const STORAGE_NAME: &'static str = "settings";

    /// Volume actually applied to sound effects
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Load settings, falling back to defaults when absent or unreadable
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let key = storage_key(Self::STORAGE_NAME);
        match store.get_item(&key).map(|json| serde_json::from_str::<Settings>(&json)) {
            Some(Ok(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Some(Err(e)) => {
                log::warn!("Ignoring malformed settings: {e}");
                Self::default()
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> persistence::Result<()> {
        let json = serde_json::to_string(self).map_err(|e| persistence::StorageError::WriteFailed {
            key: storage_key(Self::STORAGE_NAME),
            reason: e.to_string(),
        })?;
        store.set_item(&storage_key(Self::STORAGE_NAME), &json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
