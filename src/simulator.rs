//! The host-facing simulator: owns the GPU device and every buffer/pipeline,
//! and drives the fixed `clearGrid -> p2g1 -> p2g2 -> updateGrid -> g2p`
//! schedule each `step`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};

use crate::error::SimulatorError;
use crate::gpu_buffers::GpuBuffers;
use crate::gpu_dispatch;
use crate::gpu_pipelines::GpuPipelines;
use crate::impulse::{ImpulseHandle, ImpulseManager};
use crate::params::{SimulationParameters, SimulatorConfig};
use crate::particle::{seed_initial_particles, ParticleLayout};
use crate::uniforms::Uniforms;

/// Simulation time never advances faster than this per `step` call, matching
/// the scheduler's `dt` clamp: a stalled host (debugger pause, window drag)
/// must not inject a huge `dt` that blows particles out of the grid.
const MAX_DT_SECONDS: f32 = 1.0 / 60.0;

/// Constant multiplier applied on top of `dt * speed`, matching the
/// scheduler's `effectiveDt` formula.
const DT_SCALE: f32 = 6.0;

pub struct Simulator {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipelines: GpuPipelines,
    buffers: GpuBuffers,
    config: SimulatorConfig,
    params: SimulationParameters,
    layout: ParticleLayout,
    impulses: ImpulseManager,
    num_particles: u32,
    current_time_ms: f64,
    device_lost: Arc<AtomicBool>,
}

impl Simulator {
    /// Allocate every GPU resource and seed `config.max_particles` particles.
    /// `num_particles` starts equal to `config.max_particles`; use
    /// [`Simulator::set_num_particles`] to simulate fewer.
    pub fn init(device: wgpu::Device, queue: wgpu::Queue, config: SimulatorConfig) -> Result<Self, SimulatorError> {
        config.validate()?;

        let device_lost = Arc::new(AtomicBool::new(false));
        let lost_flag = device_lost.clone();
        device.set_device_lost_callback(move |_reason, message| {
            warn!("GPU device lost: {message}");
            lost_flag.store(true, Ordering::SeqCst);
        });

        let initial_particles = seed_initial_particles(config.max_particles, config.grid_size as f32, 0);
        let buffers = GpuBuffers::new(&device, &initial_particles, config.grid_size);
        let pipelines = GpuPipelines::new(&device);

        let params = SimulationParameters::default();
        let mut uniforms = Uniforms::new(config.grid_size, config.wall_thickness.0);
        uniforms.apply_parameters(&params);
        uniforms.num_particles = config.max_particles;
        buffers.write_uniforms(&queue, &uniforms);

        info!(
            "simulator initialized: max_particles={} grid_size={}",
            config.max_particles, config.grid_size
        );

        Ok(Simulator {
            device,
            queue,
            pipelines,
            buffers,
            config,
            params,
            layout: ParticleLayout::new(),
            impulses: ImpulseManager::new(config.grid_size as f32),
            num_particles: config.max_particles,
            current_time_ms: 0.0,
            device_lost,
        })
    }

    fn check_device_lost(&self) -> Result<(), SimulatorError> {
        if self.device_lost.load(Ordering::SeqCst) {
            return Err(SimulatorError::DeviceLost);
        }
        Ok(())
    }

    /// Advance the simulation by `dt_seconds` (clamped to `1/60`), at
    /// absolute host time `now_ms` (used to drive impulse fade-out).
    pub fn step(&mut self, dt_seconds: f32, now_ms: f64) -> Result<(), SimulatorError> {
        self.check_device_lost()?;
        if !dt_seconds.is_finite() || !now_ms.is_finite() {
            return Err(SimulatorError::InvalidArgument(format!(
                "dt_seconds ({dt_seconds}) and now_ms ({now_ms}) must be finite"
            )));
        }
        self.current_time_ms = now_ms;

        let dt = dt_seconds.min(MAX_DT_SECONDS).max(0.0);
        let effective_dt = dt * DT_SCALE * self.params.speed;

        let mut uniforms = Uniforms::new(self.config.grid_size, self.config.wall_thickness.0);
        uniforms.apply_parameters(&self.params);
        uniforms.dt = effective_dt;
        uniforms.num_particles = self.num_particles;
        uniforms.sim_time = (now_ms / 1000.0) as f32;
        let (pr, s) = self.impulses.uniform_mirror(now_ms);
        uniforms.impulse_pr = pr;
        uniforms.impulse_s = s;
        self.buffers.write_uniforms(&self.queue, &uniforms);

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Simulation Step Encoder"),
        });
        gpu_dispatch::record_step(
            &mut encoder,
            &self.device,
            &self.pipelines,
            &self.buffers,
            self.num_particles,
            self.config.grid_size,
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        self.check_device_lost()
    }

    /// Reseed every particle (even beyond the current live count) and clear
    /// the grid, via the `resetParticles` kernel followed by two `clearGrid`
    /// dispatches.
    pub fn reset(&mut self) -> Result<(), SimulatorError> {
        self.check_device_lost()?;

        let mut uniforms = Uniforms::new(self.config.grid_size, self.config.wall_thickness.0);
        uniforms.apply_parameters(&self.params);
        uniforms.num_particles = self.config.max_particles;
        self.buffers.write_uniforms(&self.queue, &uniforms);

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Simulation Reset Encoder"),
        });
        gpu_dispatch::record_reset(&mut encoder, &self.device, &self.pipelines, &self.buffers, self.config.max_particles);
        self.queue.submit(std::iter::once(encoder.finish()));

        self.impulses = ImpulseManager::new(self.config.grid_size as f32);
        self.check_device_lost()
    }

    pub fn set_num_particles(&mut self, n: u32) -> Result<(), SimulatorError> {
        if n > self.config.max_particles {
            return Err(SimulatorError::InvalidArgument(format!(
                "requested {n} particles exceeds max_particles {}",
                self.config.max_particles
            )));
        }
        self.num_particles = n;
        Ok(())
    }

    pub fn set_parameters(&mut self, params: SimulationParameters) -> Result<(), SimulatorError> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    pub fn apply_impulse(&mut self, note: u8, velocity: u8, duration_ms: f32) -> ImpulseHandle {
        self.impulses.apply_impulse(note, velocity, duration_ms, self.current_time_ms)
    }

    pub fn has_active_impulse(&self) -> bool {
        self.impulses.has_active_impulse(self.current_time_ms)
    }

    pub fn particle_buffer(&self) -> &wgpu::Buffer {
        &self.buffers.particles.buffer
    }

    pub fn particle_layout(&self) -> ParticleLayout {
        self.layout
    }

    pub fn max_particles(&self) -> u32 {
        self.config.max_particles
    }

    pub fn num_particles(&self) -> u32 {
        self.num_particles
    }
}
