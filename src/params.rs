//! Tunable parameters and construction-time configuration.
//!
//! `SimulationParameters` is the only mutable knob surface exposed to a host
//! application: the simulator never reaches into a process-wide config
//! object the way the original source it was distilled from did.

use serde::{Deserialize, Serialize};

use crate::error::SimulatorError;

/// External force mode applied in the `g2p` kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum GravityType {
    /// Constant vector gravity: `newVel += gravity * dt`.
    Vector = 0,
    /// Pure-down gravity: equivalent to `Vector` with `gravity = (0, -g, 0)`,
    /// kept as a distinct enum value so hosts can switch modes without
    /// tracking the magnitude separately.
    Down = 1,
    /// Inward-radial gravity toward the grid center.
    InwardRadial = 2,
}

/// Per-frame tunables, mirroring the uniform block's scalar/vector fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub gravity_type: GravityType,
    pub gravity: glam::Vec3,
    pub stiffness: f32,
    pub rest_density: f32,
    pub dynamic_viscosity: f32,
    /// Weight of curl-noise external force; 0 disables it entirely.
    pub noise: f32,
    /// Overall time-scale multiplier applied on top of `dt` in `step`.
    pub speed: f32,
    pub heat_speed_min: f32,
    pub heat_speed_max: f32,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            gravity_type: GravityType::Down,
            gravity: glam::Vec3::new(0.0, -9.8, 0.0),
            stiffness: 3.0,
            rest_density: 4.0,
            dynamic_viscosity: 0.1,
            noise: 0.0,
            speed: 1.0,
            heat_speed_min: 0.0,
            heat_speed_max: 0.15,
        }
    }
}

impl SimulationParameters {
    /// Reject non-finite floats and degenerate ranges rather than letting
    /// them silently propagate into the uniform buffer and corrupt the grid.
    pub fn validate(&self) -> Result<(), SimulatorError> {
        let finite_fields: &[(&str, f32)] = &[
            ("gravity.x", self.gravity.x),
            ("gravity.y", self.gravity.y),
            ("gravity.z", self.gravity.z),
            ("stiffness", self.stiffness),
            ("rest_density", self.rest_density),
            ("dynamic_viscosity", self.dynamic_viscosity),
            ("noise", self.noise),
            ("speed", self.speed),
            ("heat_speed_min", self.heat_speed_min),
            ("heat_speed_max", self.heat_speed_max),
        ];
        for (name, value) in finite_fields {
            if !value.is_finite() {
                return Err(SimulatorError::InvalidArgument(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        if self.rest_density <= 0.0 {
            return Err(SimulatorError::InvalidArgument(
                "rest_density must be positive".into(),
            ));
        }
        if self.noise < 0.0 {
            return Err(SimulatorError::InvalidArgument(
                "noise must be non-negative".into(),
            ));
        }
        if self.speed <= 0.0 {
            return Err(SimulatorError::InvalidArgument(
                "speed must be positive".into(),
            ));
        }
        if self.heat_speed_min >= self.heat_speed_max {
            return Err(SimulatorError::InvalidArgument(format!(
                "heat_speed_min ({}) must be < heat_speed_max ({})",
                self.heat_speed_min, self.heat_speed_max
            )));
        }
        Ok(())
    }
}

/// Wall thickness in cells, exposed as a tunable rather than hardcoded: some
/// stiffness/rest-density combinations need a thicker boundary band to stay
/// stable, so a host can widen it without recompiling shaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallThickness(pub u32);

impl Default for WallThickness {
    fn default() -> Self {
        WallThickness(1)
    }
}

/// Fixed-point multiplier used to encode grid momentum/mass for atomic
/// accumulation. See `fixed_point::validate_no_overflow`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedPointConfig {
    pub multiplier: f32,
}

impl Default for FixedPointConfig {
    fn default() -> Self {
        FixedPointConfig {
            multiplier: crate::fixed_point::DEFAULT_MULTIPLIER,
        }
    }
}

/// Construction-time configuration for [`crate::Simulator::init`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    pub max_particles: u32,
    /// Background grid is `grid_size^3` cells.
    pub grid_size: u32,
    pub wall_thickness: WallThickness,
    pub fixed_point: FixedPointConfig,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            max_particles: 8192,
            grid_size: 64,
            wall_thickness: WallThickness::default(),
            fixed_point: FixedPointConfig::default(),
        }
    }
}

/// Conservative ceiling on `|weight * (velocity + Q)|` and `|weight * term|`
/// contributions used only to size the overflow guard in
/// `fixed_point::validate_no_overflow`. Not a physical limit enforced by any
/// kernel.
pub const MAX_EXPECTED_WEIGHTED_MOMENTUM: f32 = 0.01;

impl SimulatorConfig {
    pub fn validate(&self) -> Result<(), SimulatorError> {
        if self.max_particles == 0 {
            return Err(SimulatorError::InvalidArgument(
                "max_particles must be > 0".into(),
            ));
        }
        if self.grid_size < 4 {
            return Err(SimulatorError::InvalidArgument(
                "grid_size must be >= 4".into(),
            ));
        }
        if self.wall_thickness.0 == 0 || self.wall_thickness.0 * 2 >= self.grid_size {
            return Err(SimulatorError::InvalidArgument(
                "wall_thickness must be >= 1 and leave an interior".into(),
            ));
        }
        if !crate::fixed_point::validate_no_overflow(
            self.max_particles,
            MAX_EXPECTED_WEIGHTED_MOMENTUM,
            self.fixed_point.multiplier,
        ) {
            return Err(SimulatorError::InvalidArgument(format!(
                "max_particles ({}) with fixed-point multiplier {} risks i32 atomic overflow",
                self.max_particles, self.fixed_point.multiplier
            )));
        }
        Ok(())
    }
}
