//! Assembles full WGSL module sources for each compute kernel.
//!
//! WGSL has no `#include`; `common.wgsl`'s struct and helper-function
//! definitions are textually prepended to every kernel file before handing
//! the result to `device.create_shader_module`.

const COMMON: &str = include_str!("../assets/shaders/common.wgsl");
const CLEAR_GRID: &str = include_str!("../assets/shaders/clear_grid.wgsl");
const P2G1: &str = include_str!("../assets/shaders/p2g1.wgsl");
const P2G2: &str = include_str!("../assets/shaders/p2g2.wgsl");
const UPDATE_GRID: &str = include_str!("../assets/shaders/update_grid.wgsl");
const G2P: &str = include_str!("../assets/shaders/g2p.wgsl");
const RESET_PARTICLES: &str = include_str!("../assets/shaders/reset_particles.wgsl");

fn compose(kernel: &str) -> String {
    format!("{COMMON}\n{kernel}")
}

pub fn clear_grid_source() -> String {
    compose(CLEAR_GRID)
}

pub fn p2g1_source() -> String {
    compose(P2G1)
}

pub fn p2g2_source() -> String {
    compose(P2G2)
}

pub fn update_grid_source() -> String {
    compose(UPDATE_GRID)
}

pub fn g2p_source() -> String {
    compose(G2P)
}

pub fn reset_particles_source() -> String {
    compose(RESET_PARTICLES)
}
