//! Live-tunable simulation parameters.
//!
//! Values arrive from the control surface as `ParameterUpdate`s. Each one is
//! validated and clamped into its slider range before it reaches the physics
//! world, so the world never sees a non-finite gravity or material value.

use crate::error::{Error, Result};
use glam::Vec3;

pub const GRAVITY_RANGE: (f32, f32) = (-30.0, 30.0);
pub const RESTITUTION_RANGE: (f32, f32) = (0.0, 1.0);
pub const FRICTION_RANGE: (f32, f32) = (0.0, 2.0);
pub const DAMPING_RANGE: (f32, f32) = (0.0, 10.0);
pub const IMPULSE_RANGE: (f32, f32) = (-50.0, 50.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParameters {
    /// Vertical gravity component, m/s².
    pub gravity: f32,
    pub restitution: f32,
    pub friction: f32,
    /// Applied to both linear and angular damping.
    pub damping: f32,
    /// Magnitude of the horizontal impulse sent by `ApplyForce`.
    pub impulse: f32,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            gravity: -9.81,
            restitution: 0.5,
            friction: 0.5,
            damping: 0.0,
            impulse: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterUpdate {
    Gravity(f32),
    Restitution(f32),
    Friction(f32),
    Damping(f32),
    Impulse(f32),
}

impl ParameterUpdate {
    pub fn name(&self) -> &'static str {
        match self {
            ParameterUpdate::Gravity(_) => "gravity",
            ParameterUpdate::Restitution(_) => "restitution",
            ParameterUpdate::Friction(_) => "friction",
            ParameterUpdate::Damping(_) => "damping",
            ParameterUpdate::Impulse(_) => "impulse",
        }
    }

    fn value(&self) -> f32 {
        match *self {
            ParameterUpdate::Gravity(v)
            | ParameterUpdate::Restitution(v)
            | ParameterUpdate::Friction(v)
            | ParameterUpdate::Damping(v)
            | ParameterUpdate::Impulse(v) => v,
        }
    }

    fn range(&self) -> (f32, f32) {
        match self {
            ParameterUpdate::Gravity(_) => GRAVITY_RANGE,
            ParameterUpdate::Restitution(_) => RESTITUTION_RANGE,
            ParameterUpdate::Friction(_) => FRICTION_RANGE,
            ParameterUpdate::Damping(_) => DAMPING_RANGE,
            ParameterUpdate::Impulse(_) => IMPULSE_RANGE,
        }
    }
}

impl SimulationParameters {
    pub fn gravity_vector(&self) -> Vec3 {
        Vec3::new(0.0, self.gravity, 0.0)
    }

    /// Horizontal impulse along +X with the configured magnitude.
    pub fn impulse_vector(&self) -> Vec3 {
        Vec3::new(self.impulse, 0.0, 0.0)
    }

    /// Applies one update and returns the value actually stored.
    pub fn apply(&mut self, update: ParameterUpdate) -> Result<f32> {
        let raw = update.value();
        if !raw.is_finite() {
            return Err(Error::InvalidParameter {
                name: update.name(),
                value: raw,
            });
        }
        let (min, max) = update.range();
        let value = raw.clamp(min, max);

        match update {
            ParameterUpdate::Gravity(_) => self.gravity = value,
            ParameterUpdate::Restitution(_) => self.restitution = value,
            ParameterUpdate::Friction(_) => self.friction = value,
            ParameterUpdate::Damping(_) => self.damping = value,
            ParameterUpdate::Impulse(_) => self.impulse = value,
        }
        Ok(value)
    }

    /// Builds a parameter set from raw values, clamping each one.
    pub fn validated(self) -> Result<Self> {
        let mut params = Self::default();
        params.apply(ParameterUpdate::Gravity(self.gravity))?;
        params.apply(ParameterUpdate::Restitution(self.restitution))?;
        params.apply(ParameterUpdate::Friction(self.friction))?;
        params.apply(ParameterUpdate::Damping(self.damping))?;
        params.apply(ParameterUpdate::Impulse(self.impulse))?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_clamps_into_range() {
        let mut params = SimulationParameters::default();
        assert_eq!(params.apply(ParameterUpdate::Restitution(3.0)).unwrap(), 1.0);
        assert_eq!(params.restitution, 1.0);
        assert_eq!(params.apply(ParameterUpdate::Damping(-1.0)).unwrap(), 0.0);
    }

    #[test]
    fn test_apply_rejects_non_finite() {
        let mut params = SimulationParameters::default();
        let result = params.apply(ParameterUpdate::Gravity(f32::NAN));
        assert!(matches!(result, Err(Error::InvalidParameter { name: "gravity", .. })));
        assert_eq!(params.gravity, -9.81);
    }

    #[test]
    fn test_vectors() {
        let params = SimulationParameters {
            gravity: -3.0,
            impulse: 7.0,
            ..Default::default()
        };
        assert_eq!(params.gravity_vector(), Vec3::new(0.0, -3.0, 0.0));
        assert_eq!(params.impulse_vector(), Vec3::new(7.0, 0.0, 0.0));
    }
}
