//! INSQ - a grid arcade game about absorbing numbers
//!
//! Core modules:
//! - `sim`: Deterministic game core (criteria, grid generation, progression, combo, session)
//! - `tuning`: Data-driven game balance
//! - `highscores`: The two persisted high-score scalars
//! - `persistence`: Key/value storage backends
//! - `settings`: Player preferences
//! - `audio`: Sound effect triggers
//! - `platform`: Collaborator traits for sprites and scene transitions

pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::HighScoreRecord;
pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Grid dimensions (cells)
    pub const GRID_WIDTH: usize = 5;
    pub const GRID_HEIGHT: usize = 6;
    /// Player spawn cell
    pub const PLAYER_START: (usize, usize) = (2, 2);

    /// Cell layout in screen pixels
    pub const CELL_DIMS: f32 = 64.0;
    pub const PADDING: f32 = 2.0;
    pub const INIT_X: f32 = 108.0;
    pub const INIT_Y: f32 = 160.0;

    /// Session start values
    pub const STARTING_LIVES: u32 = 3;
    pub const STARTING_MAX_NUMBER: i32 = 50;
    pub const STARTING_DEVIATION: i32 = 5;

    /// Minimum fraction of target cells after any regeneration
    pub const MIN_GRID_THRESHOLD: f64 = 0.20;
    /// Per-cell chance a non-target is rerolled during a density pass
    pub const REROLL_PERCENT: f64 = 0.5;
    /// Cap on forced-target redraws for a single cell
    pub const MAX_RESAMPLE_ATTEMPTS: u32 = 1000;
    /// Cap on full density sweeps per regeneration
    pub const MAX_THRESHOLD_PASSES: u32 = 100;

    /// Points per absorbed target, multiplied by the combo count
    pub const BASE_SCORE: u64 = 10;
    /// An extra life is granted every this many points
    pub const EXTEND_EVERY: u64 = 1000;

    /// Seconds a combo survives without another hit
    pub const COMBO_TIMER_MAX: f32 = 3.0;
    /// Seconds between combo decay steps once the timer runs out
    pub const COMBO_DECAY_INTERVAL: f32 = 0.5;

    /// Phase pauses (seconds)
    pub const READY_DELAY: f32 = 1.0;
    pub const LOSING_DELAY: f32 = 1.0;

    /// Difficulty escalation per level-up
    pub const MAX_NUMBER_STEP: i32 = 10;
    pub const MAX_NUMBER_CAP: i32 = 200;
    pub const DEVIATION_STEP: i32 = 2;
    pub const DEVIATION_CAP: i32 = 25;

    /// Storage keys and first-run defaults
    pub const STORAGE_NAMESPACE: &str = "INSQ";
    pub const DEFAULT_HIGH_SCORE: u64 = 10;
    pub const DEFAULT_HIGH_LEVEL: u32 = 5;
}

/// Screen-space center of the cell at grid coordinate `(x, y)`
#[inline]
pub fn cell_position(x: usize, y: usize) -> Vec2 {
    use consts::*;
    Vec2::new(
        x as f32 * (CELL_DIMS + PADDING) + INIT_X,
        y as f32 * (CELL_DIMS + PADDING) + INIT_Y,
    )
}

/// Namespaced storage key, e.g. `INSQ-highScore`
pub fn storage_key(name: &str) -> String {
    format!("{}-{}", consts::STORAGE_NAMESPACE, name)
}
