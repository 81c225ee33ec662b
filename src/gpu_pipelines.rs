//! Compute pipeline + bind-group-layout construction, one pair per kernel.
//!
//! A named `BindGroupLayout` per pass rather than one shared layout, built
//! once at `init` and reused for the lifetime of the simulator.

use crate::shaders;

pub struct GpuPipelines {
    pub clear_grid: wgpu::ComputePipeline,
    pub clear_grid_layout: wgpu::BindGroupLayout,

    pub p2g1: wgpu::ComputePipeline,
    pub p2g1_layout: wgpu::BindGroupLayout,

    pub p2g2: wgpu::ComputePipeline,
    pub p2g2_layout: wgpu::BindGroupLayout,

    pub update_grid: wgpu::ComputePipeline,
    pub update_grid_layout: wgpu::BindGroupLayout,

    pub g2p: wgpu::ComputePipeline,
    pub g2p_layout: wgpu::BindGroupLayout,

    pub reset_particles: wgpu::ComputePipeline,
    pub reset_particles_layout: wgpu::BindGroupLayout,
}

fn buffer_entry(binding: u32, ty: wgpu::BufferBindingType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    buffer_entry(binding, wgpu::BufferBindingType::Uniform)
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    buffer_entry(binding, wgpu::BufferBindingType::Storage { read_only })
}

fn make_layout(device: &wgpu::Device, label: &str, entries: &[wgpu::BindGroupLayoutEntry]) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries,
    })
}

fn make_pipeline(
    device: &wgpu::Device,
    source: &str,
    layout: &wgpu::BindGroupLayout,
    entry_point: &str,
    label: &str,
) -> wgpu::ComputePipeline {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{label} Layout")),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });
    device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        module: &module,
        entry_point: Some(entry_point),
        compilation_options: Default::default(),
        cache: None,
    })
}

impl GpuPipelines {
    pub fn new(device: &wgpu::Device) -> Self {
        let clear_grid_layout = make_layout(
            device,
            "Clear Grid Bind Group Layout",
            &[uniform_entry(0), storage_entry(1, false), storage_entry(2, false)],
        );
        let p2g1_layout = make_layout(
            device,
            "P2G1 Bind Group Layout",
            &[uniform_entry(0), storage_entry(1, true), storage_entry(2, false)],
        );
        let p2g2_layout = make_layout(
            device,
            "P2G2 Bind Group Layout",
            &[uniform_entry(0), storage_entry(1, false), storage_entry(2, false)],
        );
        let update_grid_layout = make_layout(
            device,
            "Update Grid Bind Group Layout",
            &[uniform_entry(0), storage_entry(1, false), storage_entry(2, false)],
        );
        let g2p_layout = make_layout(
            device,
            "G2P Bind Group Layout",
            &[uniform_entry(0), storage_entry(1, false), storage_entry(2, true)],
        );
        let reset_particles_layout = make_layout(
            device,
            "Reset Particles Bind Group Layout",
            &[uniform_entry(0), storage_entry(1, false)],
        );

        let clear_grid = make_pipeline(device, &shaders::clear_grid_source(), &clear_grid_layout, "clear_grid", "Clear Grid Pipeline");
        let p2g1 = make_pipeline(device, &shaders::p2g1_source(), &p2g1_layout, "p2g1", "P2G1 Pipeline");
        let p2g2 = make_pipeline(device, &shaders::p2g2_source(), &p2g2_layout, "p2g2", "P2G2 Pipeline");
        let update_grid = make_pipeline(device, &shaders::update_grid_source(), &update_grid_layout, "update_grid", "Update Grid Pipeline");
        let g2p = make_pipeline(device, &shaders::g2p_source(), &g2p_layout, "g2p", "G2P Pipeline");
        let reset_particles = make_pipeline(
            device,
            &shaders::reset_particles_source(),
            &reset_particles_layout,
            "reset_particles",
            "Reset Particles Pipeline",
        );

        GpuPipelines {
            clear_grid,
            clear_grid_layout,
            p2g1,
            p2g1_layout,
            p2g2,
            p2g2_layout,
            update_grid,
            update_grid_layout,
            g2p,
            g2p_layout,
            reset_particles,
            reset_particles_layout,
        }
    }
}
