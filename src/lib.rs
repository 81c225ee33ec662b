pub mod buffer;
pub mod cell;
pub mod color;
pub mod error;
pub mod fixed_point;
pub mod gpu_buffers;
pub mod gpu_dispatch;
pub mod gpu_pipelines;
pub mod impulse;
pub mod params;
pub mod particle;
pub mod rand;
pub mod shaders;
pub mod simulator;
pub mod uniforms;

pub use error::SimulatorError;
pub use impulse::ImpulseHandle;
pub use params::{FixedPointConfig, GravityType, SimulationParameters, SimulatorConfig, WallThickness};
pub use particle::{Particle, ParticleLayout};
pub use simulator::Simulator;
