//! Records and submits the per-step and per-reset compute passes.

use crate::gpu_buffers::GpuBuffers;
use crate::gpu_pipelines::GpuPipelines;

fn workgroups(count: u32) -> u32 {
    (count + 255) / 256
}

fn bind_group(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    entries: &[wgpu::BindGroupEntry],
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries,
    })
}

fn dispatch_pass(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    pipeline: &wgpu::ComputePipeline,
    bind_group: &wgpu::BindGroup,
    workgroup_count: u32,
) {
    let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
        label: Some(label),
        timestamp_writes: None,
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.dispatch_workgroups(workgroup_count, 1, 1);
}

/// Records clearGrid -> p2g1 -> p2g2 -> updateGrid -> g2p into `encoder`, in
/// that fixed order, for `num_particles` live particles on a `grid_size`
/// cube grid.
pub fn record_step(
    encoder: &mut wgpu::CommandEncoder,
    device: &wgpu::Device,
    pipelines: &GpuPipelines,
    buffers: &GpuBuffers,
    num_particles: u32,
    grid_size: u32,
) {
    let particle_workgroups = workgroups(num_particles.max(1));
    let cell_workgroups = workgroups(buffers.cell_count());
    let _ = grid_size;

    let clear_grid_bg = bind_group(
        device,
        "Clear Grid Bind Group",
        &pipelines.clear_grid_layout,
        &[
            wgpu::BindGroupEntry { binding: 0, resource: buffers.uniforms.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 1, resource: buffers.cell_atomic.buffer.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 2, resource: buffers.cell_float.buffer.as_entire_binding() },
        ],
    );
    dispatch_pass(encoder, "Clear Grid Pass", &pipelines.clear_grid, &clear_grid_bg, cell_workgroups);

    let p2g1_bg = bind_group(
        device,
        "P2G1 Bind Group",
        &pipelines.p2g1_layout,
        &[
            wgpu::BindGroupEntry { binding: 0, resource: buffers.uniforms.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 1, resource: buffers.particles.buffer.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 2, resource: buffers.cell_atomic.buffer.as_entire_binding() },
        ],
    );
    dispatch_pass(encoder, "P2G1 Pass", &pipelines.p2g1, &p2g1_bg, particle_workgroups);

    let p2g2_bg = bind_group(
        device,
        "P2G2 Bind Group",
        &pipelines.p2g2_layout,
        &[
            wgpu::BindGroupEntry { binding: 0, resource: buffers.uniforms.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 1, resource: buffers.particles.buffer.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 2, resource: buffers.cell_atomic.buffer.as_entire_binding() },
        ],
    );
    dispatch_pass(encoder, "P2G2 Pass", &pipelines.p2g2, &p2g2_bg, particle_workgroups);

    let update_grid_bg = bind_group(
        device,
        "Update Grid Bind Group",
        &pipelines.update_grid_layout,
        &[
            wgpu::BindGroupEntry { binding: 0, resource: buffers.uniforms.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 1, resource: buffers.cell_atomic.buffer.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 2, resource: buffers.cell_float.buffer.as_entire_binding() },
        ],
    );
    dispatch_pass(encoder, "Update Grid Pass", &pipelines.update_grid, &update_grid_bg, cell_workgroups);

    let g2p_bg = bind_group(
        device,
        "G2P Bind Group",
        &pipelines.g2p_layout,
        &[
            wgpu::BindGroupEntry { binding: 0, resource: buffers.uniforms.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 1, resource: buffers.particles.buffer.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 2, resource: buffers.cell_float.buffer.as_entire_binding() },
        ],
    );
    dispatch_pass(encoder, "G2P Pass", &pipelines.g2p, &g2p_bg, particle_workgroups);
}

/// Records resetParticles followed by two clearGrid dispatches, so that
/// stale grid-cell contents from the previous frame never leak into the
/// next `step` after a reset.
pub fn record_reset(
    encoder: &mut wgpu::CommandEncoder,
    device: &wgpu::Device,
    pipelines: &GpuPipelines,
    buffers: &GpuBuffers,
    max_particles: u32,
) {
    let particle_workgroups = workgroups(max_particles.max(1));
    let cell_workgroups = workgroups(buffers.cell_count());

    let reset_bg = bind_group(
        device,
        "Reset Particles Bind Group",
        &pipelines.reset_particles_layout,
        &[
            wgpu::BindGroupEntry { binding: 0, resource: buffers.uniforms.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 1, resource: buffers.particles.buffer.as_entire_binding() },
        ],
    );
    dispatch_pass(encoder, "Reset Particles Pass", &pipelines.reset_particles, &reset_bg, particle_workgroups);

    for _ in 0..2 {
        let clear_grid_bg = bind_group(
            device,
            "Clear Grid Bind Group",
            &pipelines.clear_grid_layout,
            &[
                wgpu::BindGroupEntry { binding: 0, resource: buffers.uniforms.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: buffers.cell_atomic.buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: buffers.cell_float.buffer.as_entire_binding() },
            ],
        );
        dispatch_pass(encoder, "Clear Grid Pass", &pipelines.clear_grid, &clear_grid_bg, cell_workgroups);
    }
}
