//! Owns every GPU-resident buffer the simulator touches across a step.

use crate::buffer::StructuredBuffer;
use crate::cell::{CellAtomic, CellFloat};
use crate::particle::Particle;
use crate::uniforms::Uniforms;

pub struct GpuBuffers {
    pub particles: StructuredBuffer<Particle>,
    pub cell_atomic: StructuredBuffer<CellAtomic>,
    pub cell_float: StructuredBuffer<CellFloat>,
    pub uniforms: wgpu::Buffer,
}

impl GpuBuffers {
    pub fn new(device: &wgpu::Device, initial_particles: &[Particle], grid_size: u32) -> Self {
        let cell_count = (grid_size as u64).pow(3) as u32;

        let particle_usage = wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::COPY_SRC;
        let particles = StructuredBuffer::allocate_init(device, initial_particles, "Particle Buffer", particle_usage);

        let cell_atomic = StructuredBuffer::<CellAtomic>::allocate(
            device,
            cell_count,
            "Cell Atomic Buffer",
            wgpu::BufferUsages::STORAGE,
        );
        let cell_float = StructuredBuffer::<CellFloat>::allocate(
            device,
            cell_count,
            "Cell Float Buffer",
            wgpu::BufferUsages::STORAGE,
        );

        let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Simulation Uniforms"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        GpuBuffers {
            particles,
            cell_atomic,
            cell_float,
            uniforms,
        }
    }

    pub fn write_uniforms(&self, queue: &wgpu::Queue, uniforms: &Uniforms) {
        queue.write_buffer(&self.uniforms, 0, bytemuck::bytes_of(uniforms));
    }

    pub fn cell_count(&self) -> u32 {
        self.cell_atomic.count
    }
}
