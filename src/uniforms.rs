//! The per-frame uniform block pushed to every kernel.

use bytemuck::{Pod, Zeroable};

use crate::impulse::MAX_IMPULSES;
use crate::params::{GravityType, SimulationParameters};

/// Mirrors `shaders/common.wgsl`'s `Uniforms` struct layout (std140-friendly:
/// every field is 16-byte aligned or packed into a `vec4`).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Uniforms {
    pub dt: f32,
    pub num_particles: u32,
    pub grid_size: u32,
    pub gravity_type: u32,

    pub gravity: [f32; 4],

    pub stiffness: f32,
    pub rest_density: f32,
    pub dynamic_viscosity: f32,
    pub noise: f32,

    pub heat_speed_min: f32,
    pub heat_speed_max: f32,
    pub wall_thickness: u32,
    /// Accumulated simulation time in seconds, used to advect the curl-noise
    /// field in `g2p` so enabling `noise` does not inject a per-particle
    /// constant bias.
    pub sim_time: f32,

    /// `pos.xyz, radius` per slot.
    pub impulse_pr: [[f32; 4]; MAX_IMPULSES],
    /// `strength, 0, 0, 0` per slot.
    pub impulse_s: [[f32; 4]; MAX_IMPULSES],
}

impl Uniforms {
    pub const SIZE: usize = std::mem::size_of::<Uniforms>();

    pub fn new(grid_size: u32, wall_thickness: u32) -> Self {
        let mut u = Uniforms::zeroed();
        u.grid_size = grid_size;
        u.wall_thickness = wall_thickness;
        u
    }

    /// Push the host-side tunables into the uniform image, leaving
    /// `num_particles`, `dt`, and the impulse slots untouched (those are
    /// updated separately by the scheduler and the impulse manager).
    pub fn apply_parameters(&mut self, params: &SimulationParameters) {
        self.gravity_type = params.gravity_type as u32;
        self.gravity = [params.gravity.x, params.gravity.y, params.gravity.z, 0.0];
        self.stiffness = params.stiffness;
        self.rest_density = params.rest_density;
        self.dynamic_viscosity = params.dynamic_viscosity;
        self.noise = params.noise;
        self.heat_speed_min = params.heat_speed_min;
        self.heat_speed_max = params.heat_speed_max;
    }
}

impl From<GravityType> for u32 {
    fn from(g: GravityType) -> u32 {
        g as u32
    }
}
