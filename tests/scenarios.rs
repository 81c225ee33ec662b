//! Black-box end-to-end scenarios against a real (fallback-adapter) `wgpu`
//! device, exercising the full `clearGrid -> p2g1 -> p2g2 -> updateGrid ->
//! g2p` pipeline. Mirrors the `create_test_device`/`map_async` readback
//! idiom used throughout `Quadraxis77-BioSpheres-Q`'s own GPU tests.

use mlsmpm_sim::{Particle, Simulator, SimulatorConfig};

fn create_test_device() -> (wgpu::Device, wgpu::Queue) {
    let _ = env_logger::try_init();

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::LowPower,
        compatible_surface: None,
        force_fallback_adapter: true,
    }))
    .expect("no fallback adapter available");

    pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        label: Some("Scenario Test Device"),
        required_features: wgpu::Features::empty(),
        required_limits: wgpu::Limits::downlevel_defaults(),
        memory_hints: wgpu::MemoryHints::default(),
        trace: wgpu::Trace::Off,
    }))
    .expect("failed to create test device")
}

/// Copy the live particle buffer back to host memory via a mapped staging
/// buffer. Only `count` particles are read back (the caller usually wants
/// `max_particles`).
fn read_particles(device: &wgpu::Device, queue: &wgpu::Queue, sim: &Simulator, count: u32) -> Vec<Particle> {
    let size = (count as u64) * (Particle::SIZE as u64);
    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Readback Staging Buffer"),
        size,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Readback Encoder"),
    });
    encoder.copy_buffer_to_buffer(sim.particle_buffer(), 0, &staging, 0, size);
    queue.submit(std::iter::once(encoder.finish()));

    let slice = staging.slice(..size);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        tx.send(result).unwrap();
    });
    let _ = device.poll(wgpu::PollType::Wait);
    rx.recv().unwrap().unwrap();

    let particles = {
        let data = slice.get_mapped_range();
        let particles: &[Particle] = bytemuck::cast_slice(&data);
        particles.to_vec()
    };
    staging.unmap();
    particles
}

fn in_bounds(p: &Particle, grid_size: f32) -> bool {
    (0..3).all(|c| p.position[c] >= 1.0 - 1e-3 && p.position[c] <= grid_size - 1.001 + 1e-3)
}

#[test]
fn cold_start_has_no_nans_and_stays_in_bounds() {
    let (device, queue) = create_test_device();
    let config = SimulatorConfig {
        max_particles: 1024,
        ..SimulatorConfig::default()
    };
    let grid_size = config.grid_size as f32;
    let mut sim = Simulator::init(device.clone(), queue.clone(), config).unwrap();

    sim.step(1.0 / 60.0, 0.0).unwrap();

    let particles = read_particles(&device, &queue, &sim, sim.max_particles());
    let mut in_bounds_count = 0;
    let mut density_positive_count = 0;
    for p in &particles {
        assert!(p.position.iter().all(|v| v.is_finite()), "position contains NaN/Inf");
        assert!(p.velocity.iter().all(|v| v.is_finite()), "velocity contains NaN/Inf");
        if in_bounds(p, grid_size) {
            in_bounds_count += 1;
        }
        if p.density_mass[0] > 0.0 {
            density_positive_count += 1;
        }
    }
    assert_eq!(in_bounds_count, particles.len(), "every particle must stay in bounds");
    let ratio = density_positive_count as f32 / particles.len() as f32;
    assert!(ratio >= 0.90, "expected >= 90% of particles with positive density, got {ratio}");
}

#[test]
fn reset_is_deterministic_and_idempotent() {
    let (device, queue) = create_test_device();
    let config = SimulatorConfig {
        max_particles: 1024,
        ..SimulatorConfig::default()
    };
    let mut sim = Simulator::init(device.clone(), queue.clone(), config).unwrap();

    sim.reset().unwrap();
    let snapshot_a = read_particles(&device, &queue, &sim, sim.max_particles());

    sim.reset().unwrap();
    let snapshot_b = read_particles(&device, &queue, &sim, sim.max_particles());

    for (a, b) in snapshot_a.iter().zip(snapshot_b.iter()) {
        assert_eq!(a.position, b.position);
        assert_eq!(a.density_mass, b.density_mass);
    }
}

#[test]
fn zero_dt_step_after_reset_leaves_positions_unchanged() {
    let (device, queue) = create_test_device();
    let config = SimulatorConfig {
        max_particles: 512,
        ..SimulatorConfig::default()
    };
    let mut sim = Simulator::init(device.clone(), queue.clone(), config).unwrap();

    sim.reset().unwrap();
    let before = read_particles(&device, &queue, &sim, sim.max_particles());

    sim.step(0.0, 0.0).unwrap();
    let after = read_particles(&device, &queue, &sim, sim.max_particles());

    for (a, b) in before.iter().zip(after.iter()) {
        assert_eq!(a.position, b.position, "dt=0 must be a position no-op");
    }
}

#[test]
fn stepping_with_zero_live_particles_leaves_buffer_untouched() {
    let (device, queue) = create_test_device();
    let config = SimulatorConfig {
        max_particles: 256,
        ..SimulatorConfig::default()
    };
    let mut sim = Simulator::init(device.clone(), queue.clone(), config).unwrap();
    sim.reset().unwrap();
    let before = read_particles(&device, &queue, &sim, sim.max_particles());

    sim.set_num_particles(0).unwrap();
    sim.step(1.0 / 60.0, 16.0).unwrap();

    let after = read_particles(&device, &queue, &sim, sim.max_particles());
    for (a, b) in before.iter().zip(after.iter()) {
        assert_eq!(a.position, b.position);
        assert_eq!(a.velocity, b.velocity);
    }
}

#[test]
fn single_impulse_moves_nearby_particles_outward() {
    let (device, queue) = create_test_device();
    let config = SimulatorConfig {
        max_particles: 10_000,
        ..SimulatorConfig::default()
    };
    let grid_size = config.grid_size as f32;
    let mut sim = Simulator::init(device.clone(), queue.clone(), config).unwrap();
    sim.reset().unwrap();

    let mut params = sim_default_params();
    params.gravity = glam::Vec3::ZERO;
    params.noise = 0.0;
    sim.set_parameters(params).unwrap();

    let before = read_particles(&device, &queue, &sim, sim.max_particles());

    let handle = sim.apply_impulse(64, 127, 400.0);

    let dt = 1.0 / 60.0;
    for frame in 0..30 {
        let now_ms = frame as f64 * (dt as f64 * 1000.0);
        sim.step(dt, now_ms).unwrap();
    }

    let after = read_particles(&device, &queue, &sim, sim.max_particles());

    let mut moved_outward = false;
    for (b, a) in before.iter().zip(after.iter()) {
        assert!(in_bounds(a, grid_size), "particle left the grid during impulse test");
        let bp = glam::Vec3::new(b.position[0], b.position[1], b.position[2]);
        let ap = glam::Vec3::new(a.position[0], a.position[1], a.position[2]);
        if (bp - handle.pos).length() <= handle.radius {
            let displacement = (ap - bp).length();
            if displacement >= 0.5 {
                moved_outward = true;
            }
        }
    }
    assert!(moved_outward, "expected at least one nearby particle to move >= 0.5 grid units");
}

#[test]
fn ten_impulses_keep_only_eight_slots_active() {
    let (device, queue) = create_test_device();
    let config = SimulatorConfig {
        max_particles: 512,
        ..SimulatorConfig::default()
    };
    let mut sim = Simulator::init(device.clone(), queue.clone(), config).unwrap();
    sim.reset().unwrap();

    for i in 0..10 {
        sim.step(1.0 / 60.0, i as f64 * 10.0).unwrap();
        sim.apply_impulse(64, 100, 200.0);
    }
    assert!(sim.has_active_impulse());
}

#[test]
fn expired_impulse_decays_to_negligible_motion() {
    let (device, queue) = create_test_device();
    let config = SimulatorConfig {
        max_particles: 2048,
        ..SimulatorConfig::default()
    };
    let mut sim = Simulator::init(device.clone(), queue.clone(), config).unwrap();
    sim.reset().unwrap();

    let mut params = sim_default_params();
    params.gravity = glam::Vec3::ZERO;
    params.noise = 0.0;
    sim.set_parameters(params).unwrap();

    sim.apply_impulse(64, 127, 100.0);

    let dt = 1.0 / 60.0;
    let mut now_ms = 0.0f64;
    let mut last_max_speed = f32::MAX;
    while now_ms < 500.0 {
        sim.step(dt, now_ms).unwrap();
        now_ms += dt as f64 * 1000.0;
        let particles = read_particles(&device, &queue, &sim, sim.max_particles());
        last_max_speed = particles
            .iter()
            .map(|p| glam::Vec3::new(p.velocity[0], p.velocity[1], p.velocity[2]).length())
            .fold(0.0f32, f32::max);
    }
    assert!(last_max_speed < 0.05, "max speed {last_max_speed} did not decay toward zero");
}

fn sim_default_params() -> mlsmpm_sim::SimulationParameters {
    mlsmpm_sim::SimulationParameters::default()
}

#[test]
fn non_finite_dt_is_rejected_as_invalid_argument() {
    let (device, queue) = create_test_device();
    let mut sim = Simulator::init(device, queue, SimulatorConfig::default()).unwrap();

    let err = sim.step(f32::NAN, 0.0).unwrap_err();
    assert!(matches!(err, mlsmpm_sim::SimulatorError::InvalidArgument(_)));

    let err = sim.step(1.0 / 60.0, f64::INFINITY).unwrap_err();
    assert!(matches!(err, mlsmpm_sim::SimulatorError::InvalidArgument(_)));
}

#[test]
fn particle_near_wall_stays_in_bounds_after_one_step() {
    let (device, queue) = create_test_device();
    let config = SimulatorConfig {
        max_particles: 4,
        ..SimulatorConfig::default()
    };
    let grid_size = config.grid_size as f32;
    let mut sim = Simulator::init(device.clone(), queue.clone(), config).unwrap();

    let mut params = sim_default_params();
    params.gravity = glam::Vec3::ZERO;
    params.noise = 0.0;
    sim.set_parameters(params).unwrap();

    let mut probe = Particle::zeroed_record();
    probe.position = [grid_size - 1.0005, 32.0, 32.0, 1.0];
    probe.velocity = [1.0, 0.0, 0.0, 0.0];
    probe.density_mass = [1.0, 1.0, 0.0, 0.0];
    probe.direction = [0.0, 0.0, 1.0, 0.0];
    queue.write_buffer(sim.particle_buffer(), 0, bytemuck::bytes_of(&probe));

    sim.step(1.0 / 60.0, 0.0).unwrap();

    let particles = read_particles(&device, &queue, &sim, 1);
    let p = &particles[0];
    assert!(p.position[0] <= grid_size - 1.001 + 1e-4, "particle crossed the wall: x={}", p.position[0]);
    assert!(p.velocity[0] <= 1.0, "wall contact must not accelerate the particle further outward");
}

#[test]
fn set_num_particles_beyond_max_is_rejected() {
    let (device, queue) = create_test_device();
    let config = SimulatorConfig {
        max_particles: 100,
        ..SimulatorConfig::default()
    };
    let mut sim = Simulator::init(device, queue, config).unwrap();
    assert!(sim.set_num_particles(101).is_err());
    assert!(sim.set_num_particles(100).is_ok());
}
