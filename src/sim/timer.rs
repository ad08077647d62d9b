//! Owned countdown timers
//!
//! Delayed and recurring work is modelled as a `Timer` value stored on the
//! component that owns it (usually as `Option<Timer>`). Dropping or replacing
//! the value cancels it, so a component can never stack duplicate timers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    /// Seconds until the next fire
    remaining: f32,
    /// Re-arm interval for repeating timers
    period: Option<f32>,
    /// One-shot timers stop counting after firing
    finished: bool,
}

impl Timer {
    /// Fire once after `delay` seconds
    pub fn once(delay: f32) -> Self {
        Self {
            remaining: delay.max(0.0),
            period: None,
            finished: false,
        }
    }

    /// Fire every `interval` seconds, first fire after one interval
    pub fn repeating(interval: f32) -> Self {
        let interval = interval.max(f32::EPSILON);
        Self {
            remaining: interval,
            period: Some(interval),
            finished: false,
        }
    }

    /// Advance by `dt` seconds, returning how many times the timer fired
    pub fn tick(&mut self, dt: f32) -> u32 {
        if self.finished {
            return 0;
        }
        self.remaining -= dt;
        if self.remaining > 0.0 {
            return 0;
        }
        match self.period {
            None => {
                self.remaining = 0.0;
                self.finished = true;
                1
            }
            Some(period) => {
                let fired = (-self.remaining / period).floor() + 1.0;
                // Next fire lands in (0, period]
                let next = self.remaining.rem_euclid(period);
                self.remaining = if next > 0.0 { next } else { period };
                fired as u32
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}
