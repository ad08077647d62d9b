//! Fixed-timestep accumulator

use crate::consts::{MAX_SUBSTEPS, SIM_DT};

/// Turns variable frame times into a whole number of `SIM_DT` steps
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedStep {
    accumulator: f32,
}

impl FixedStep {
    /// Frames longer than this are clamped (tab switches, debugger pauses)
    pub const MAX_FRAME: f32 = 0.1;

    pub fn new() -> Self {
        Self::default()
    }

    /// Add a frame's elapsed seconds, returning how many steps to run
    ///
    /// At most `MAX_SUBSTEPS` steps are returned; leftover time is kept.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, Self::MAX_FRAME);
        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            steps += 1;
        }
        steps
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
