//! Per-particle record and its GPU-buffer layout.

use bytemuck::{Pod, Zeroable};

use crate::rand::{deterministic_random, sample_unit_ball};

/// GPU-resident per-particle record. Field order and types must match
/// `shaders/common.wgsl`'s `Particle` struct byte for byte.
///
/// `C` (the affine velocity gradient) is stored as three `vec4`s rather than
/// a `mat3x3` so that std430-style storage-buffer layout matches the WGSL
/// side without compiler-inserted padding surprises; the fourth component of
/// each row is unused padding.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Particle {
    pub position: [f32; 4],
    pub velocity: [f32; 4],
    pub c_row0: [f32; 4],
    pub c_row1: [f32; 4],
    pub c_row2: [f32; 4],
    /// x = density, y = mass, zw = padding.
    pub density_mass: [f32; 4],
    pub direction: [f32; 4],
    pub color: [f32; 4],
}

impl Particle {
    pub const SIZE: usize = std::mem::size_of::<Particle>();

    pub fn zeroed_record() -> Self {
        Zeroable::zeroed()
    }
}

/// Byte offsets of each logical field within [`Particle`], exposed to host
/// renderers so they can bind the particle buffer as a vertex/instance
/// source without depending on this crate's exact struct layout elsewhere.
#[derive(Debug, Clone, Copy)]
pub struct ParticleLayout {
    pub stride: u32,
    pub position_offset: u32,
    pub velocity_offset: u32,
    pub c_matrix_offset: u32,
    pub density_mass_offset: u32,
    pub direction_offset: u32,
    pub color_offset: u32,
}

impl ParticleLayout {
    pub fn new() -> Self {
        macro_rules! offset_of {
            ($field:ident) => {
                (std::mem::offset_of!(Particle, $field)) as u32
            };
        }
        ParticleLayout {
            stride: Particle::SIZE as u32,
            position_offset: offset_of!(position),
            velocity_offset: offset_of!(velocity),
            c_matrix_offset: offset_of!(c_row0),
            density_mass_offset: offset_of!(density_mass),
            direction_offset: offset_of!(direction),
            color_offset: offset_of!(color),
        }
    }
}

impl Default for ParticleLayout {
    fn default() -> Self {
        Self::new()
    }
}

/// CPU-side initial seeding used by `Simulator::init` (not by `reset`, which
/// dispatches the `resetParticles` kernel instead). Seeds every particle
/// uniformly inside the inset cube `[gridSize*(1-0.95)/2, gridSize*(1+0.95)/2]`
/// with isotropic direction sampling and volume-uniform radius.
pub fn seed_initial_particles(count: u32, grid_size: f32, seed_salt: u32) -> Vec<Particle> {
    (0..count)
        .map(|i| {
            let (dir, radius) = sample_unit_ball(i, seed_salt);
            let pos = (dir * radius * 0.95 + glam::Vec3::ONE) * 0.5 * grid_size;
            let mass = 1.0 - deterministic_random(i, seed_salt + 3) * 0.002;

            let mut p = Particle::zeroed_record();
            p.position = [pos.x, pos.y, pos.z, 0.0];
            p.density_mass = [1.0, mass, 0.0, 0.0];
            p.direction = [0.0, 0.0, 1.0, 0.0];
            p
        })
        .collect()
}
