//! Data-driven game balance
//!
//! Every balance knob defaults to the value in `consts`. A tuning file only
//! needs the fields it overrides.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Largest value accepted for any number-range knob
pub const MAX_TUNED_NUMBER: i32 = 1_000_000;

#[derive(Error, Debug)]
pub enum TuningError {
    #[error("Grid must have at least one cell, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },
    #[error("{name} must be within [0, 1], got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },
    #[error("{name} must be positive, got {value}")]
    NonPositiveDuration { name: &'static str, value: f32 },
    #[error("{name} must be at least 1")]
    ZeroCount { name: &'static str },
    #[error("{name} must be within [{min}, {max}], got {value}")]
    NumberOutOfRange {
        name: &'static str,
        value: i32,
        min: i32,
        max: i32,
    },
    #[error("Invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Balance values for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub grid_width: usize,
    pub grid_height: usize,

    pub starting_lives: u32,
    pub starting_max_number: i32,
    pub starting_deviation: i32,

    pub min_grid_threshold: f64,
    pub reroll_percent: f64,
    pub max_resample_attempts: u32,
    pub max_threshold_passes: u32,

    pub base_score: u64,
    pub extend_every: u64,

    pub combo_timer_max: f32,
    pub combo_decay_interval: f32,

    pub ready_delay: f32,
    pub losing_delay: f32,

    pub max_number_step: i32,
    pub max_number_cap: i32,
    pub deviation_step: i32,
    pub deviation_cap: i32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            grid_width: GRID_WIDTH,
            grid_height: GRID_HEIGHT,

            starting_lives: STARTING_LIVES,
            starting_max_number: STARTING_MAX_NUMBER,
            starting_deviation: STARTING_DEVIATION,

            min_grid_threshold: MIN_GRID_THRESHOLD,
            reroll_percent: REROLL_PERCENT,
            max_resample_attempts: MAX_RESAMPLE_ATTEMPTS,
            max_threshold_passes: MAX_THRESHOLD_PASSES,

            base_score: BASE_SCORE,
            extend_every: EXTEND_EVERY,

            combo_timer_max: COMBO_TIMER_MAX,
            combo_decay_interval: COMBO_DECAY_INTERVAL,

            ready_delay: READY_DELAY,
            losing_delay: LOSING_DELAY,

            max_number_step: MAX_NUMBER_STEP,
            max_number_cap: MAX_NUMBER_CAP,
            deviation_step: DEVIATION_STEP,
            deviation_cap: DEVIATION_CAP,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(TuningError::EmptyGrid {
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        for (name, value) in [
            ("min_grid_threshold", self.min_grid_threshold),
            ("reroll_percent", self.reroll_percent),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(TuningError::ProbabilityOutOfRange { name, value });
            }
        }
        for (name, value) in [
            ("combo_timer_max", self.combo_timer_max),
            ("combo_decay_interval", self.combo_decay_interval),
            ("ready_delay", self.ready_delay),
            ("losing_delay", self.losing_delay),
        ] {
            if !(value > 0.0) {
                return Err(TuningError::NonPositiveDuration { name, value });
            }
        }
        for (name, value, min) in [
            ("starting_max_number", self.starting_max_number, 1),
            ("max_number_cap", self.max_number_cap, 1),
            ("max_number_step", self.max_number_step, 0),
            ("starting_deviation", self.starting_deviation, 0),
            ("deviation_cap", self.deviation_cap, 0),
            ("deviation_step", self.deviation_step, 0),
        ] {
            if !(min..=MAX_TUNED_NUMBER).contains(&value) {
                return Err(TuningError::NumberOutOfRange {
                    name,
                    value,
                    min,
                    max: MAX_TUNED_NUMBER,
                });
            }
        }
        if self.max_resample_attempts == 0 {
            return Err(TuningError::ZeroCount {
                name: "max_resample_attempts",
            });
        }
        if self.max_threshold_passes == 0 {
            return Err(TuningError::ZeroCount {
                name: "max_threshold_passes",
            });
        }
        if self.extend_every == 0 {
            return Err(TuningError::ZeroCount {
                name: "extend_every",
            });
        }
        Ok(())
    }

    /// Number of cells on the grid
    pub fn cell_count(&self) -> usize {
        self.grid_width * self.grid_height
    }
}
