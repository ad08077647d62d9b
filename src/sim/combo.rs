//! Combo multiplier with a decaying timer

use serde::{Deserialize, Serialize};

use super::timer::Timer;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboTracker {
    count: u32,
    /// Seconds left before the combo starts decaying
    timer: f32,
    timer_max: f32,
    decay_interval: f32,
    /// Active decay cycle, at most one
    decay: Option<Timer>,
}

impl ComboTracker {
    pub fn new(timer_max: f32, decay_interval: f32) -> Self {
        Self {
            count: 1,
            timer: 0.0,
            timer_max,
            decay_interval,
            decay: None,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn timer(&self) -> f32 {
        self.timer
    }

    pub fn timer_max(&self) -> f32 {
        self.timer_max
    }

    /// Remaining combo time as a 0-1 fraction, for HUD bars
    pub fn timer_fraction(&self) -> f32 {
        if self.timer_max > 0.0 {
            self.timer / self.timer_max
        } else {
            0.0
        }
    }

    pub fn is_decaying(&self) -> bool {
        self.decay.is_some()
    }

    /// Successful absorption
    pub fn hit(&mut self) {
        self.timer = self.timer_max;
        self.count = self.count.saturating_add(1);
        self.decay = None;
    }

    /// Wrong absorption or damage
    pub fn miss(&mut self) {
        self.count = 1;
        self.timer = 0.0;
        self.decay = None;
    }

    /// Advance by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        if self.timer > 0.0 {
            self.timer = (self.timer - dt).max(0.0);
            if self.timer > 0.0 {
                return;
            }
        }

        if self.decay.is_none() {
            if self.count > 1 {
                self.decay = Some(Timer::repeating(self.decay_interval));
            }
            return;
        }

        if let Some(decay) = self.decay.as_mut() {
            let steps = decay.tick(dt);
            self.count = self.count.saturating_sub(steps).max(1);
        }
        if self.count == 1 {
            self.decay = None;
        }
    }
}
