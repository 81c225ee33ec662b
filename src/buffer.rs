//! A thin typed wrapper over a single `wgpu::Buffer`: a record-typed,
//! contiguous storage buffer, with CPU-side initial seeding and host-side
//! `write`/`label` bookkeeping. Atomic vs. plain-float field access is
//! realized as two alternate bind-group-layout entries chosen when a
//! kernel's pipeline is built (see `gpu_pipelines.rs`), not as runtime state
//! on the buffer itself.

use bytemuck::Pod;
use wgpu::util::DeviceExt;

/// A GPU-resident, densely packed array of `T`, created once and never
/// resized (matching every buffer's lifecycle in this simulator: allocate at
/// `init`, reused across `step`/`reset`, destroyed only with the simulator).
pub struct StructuredBuffer<T> {
    pub buffer: wgpu::Buffer,
    pub count: u32,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Pod> StructuredBuffer<T> {
    /// Allocate a zero-initialized buffer for `count` records of `T`.
    pub fn allocate(device: &wgpu::Device, count: u32, label: &str, usage: wgpu::BufferUsages) -> Self {
        let size = (count as u64) * (std::mem::size_of::<T>() as u64);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: size.max(std::mem::size_of::<T>() as u64),
            usage,
            mapped_at_creation: false,
        });
        StructuredBuffer {
            buffer,
            count,
            _marker: std::marker::PhantomData,
        }
    }

    /// Allocate and immediately upload `records` (used for initial particle
    /// seeding at `init`).
    pub fn allocate_init(device: &wgpu::Device, records: &[T], label: &str, usage: wgpu::BufferUsages) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(records),
            usage,
        });
        StructuredBuffer {
            buffer,
            count: records.len() as u32,
            _marker: std::marker::PhantomData,
        }
    }

    pub fn write(&self, queue: &wgpu::Queue, records: &[T]) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(records));
    }

    pub fn byte_size(&self) -> u64 {
        (self.count as u64) * (std::mem::size_of::<T>() as u64)
    }
}
