//! Error types surfaced by the simulator's host-facing API.

use thiserror::Error;

/// Failure modes for [`crate::Simulator`] operations: fatal allocation
/// failures at construction time, fatal device loss during a step/reset,
/// and precondition violations on host-supplied arguments. Numerical
/// degeneracy and impulse-slot eviction are not errors and never produce a
/// `SimulatorError`.
#[derive(Debug, Error)]
pub enum SimulatorError {
    /// GPU buffer, shader module, or pipeline creation failed during `init`.
    /// The simulator is not usable; construct a new one.
    #[error("GPU resource allocation failed: {0}")]
    Allocation(String),

    /// The device was lost during a `step` or `reset` submission. The
    /// simulator must be re-initialized; every subsequent call returns this
    /// error without touching the GPU.
    #[error("GPU device lost during simulation step")]
    DeviceLost,

    /// A host-supplied argument violated a precondition (e.g.
    /// `set_num_particles` exceeding `max_particles`, a non-finite `dt`, or
    /// an invalid `SimulationParameters` value). State is left unchanged.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
