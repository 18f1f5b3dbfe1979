//! Fixed-timestep clock.
//!
//! Turns variable frame deltas into a count of uniform physics steps. The
//! fractional remainder is carried in an accumulator so no simulated time is
//! gained or lost between frames.

use crate::error::{Error, Result};

pub const DEFAULT_FIXED_STEP: f64 = 1.0 / 60.0;
pub const DEFAULT_MAX_FRAME_DELTA: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct SimulationClock {
    fixed_step: f64,
    max_frame_delta: f64,
    max_steps_per_frame: Option<u32>,
    accumulator: f64,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self {
            fixed_step: DEFAULT_FIXED_STEP,
            max_frame_delta: DEFAULT_MAX_FRAME_DELTA,
            max_steps_per_frame: None,
            accumulator: 0.0,
        }
    }
}

impl SimulationClock {
    /// `fixed_step` must be positive and `max_frame_delta` non-negative,
    /// both finite.
    pub fn new(fixed_step: f64, max_frame_delta: f64) -> Result<Self> {
        if !fixed_step.is_finite() || fixed_step <= 0.0 {
            return Err(Error::InvalidClock {
                name: "fixed_step",
                value: fixed_step,
            });
        }
        if !max_frame_delta.is_finite() || max_frame_delta < 0.0 {
            return Err(Error::InvalidClock {
                name: "max_frame_delta",
                value: max_frame_delta,
            });
        }
        Ok(Self {
            fixed_step,
            max_frame_delta,
            ..Self::default()
        })
    }

    /// Caps the number of steps a single frame may emit. Whole steps beyond
    /// the cap are dropped; the sub-step remainder is still carried.
    pub fn with_max_steps_per_frame(mut self, max_steps: Option<u32>) -> Self {
        self.max_steps_per_frame = max_steps;
        self
    }

    pub fn fixed_step(&self) -> f64 {
        self.fixed_step
    }

    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Adds one frame's elapsed time and returns how many fixed steps to run.
    pub fn advance(&mut self, frame_delta: f64) -> u32 {
        let delta = if frame_delta.is_finite() {
            frame_delta.clamp(0.0, self.max_frame_delta)
        } else {
            0.0
        };
        self.accumulator += delta;

        let mut steps = 0u32;
        while self.accumulator >= self.fixed_step {
            self.accumulator -= self.fixed_step;
            steps += 1;
        }

        if let Some(max_steps) = self.max_steps_per_frame {
            if steps > max_steps {
                log::debug!(
                    "clock dropped {} catch-up steps (cap {})",
                    steps - max_steps,
                    max_steps
                );
                steps = max_steps;
            }
        }

        steps
    }
}
