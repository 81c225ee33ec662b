//! Background-grid cell records.

use bytemuck::{Pod, Zeroable};

/// Atomic-view cell record: fixed-point encoded momentum and mass,
/// accumulated via `atomicAdd` in `p2g1`/`p2g2`. Must stay a plain `i32`
/// quad, since `wgpu`/WGSL only allow atomic operations on scalar `i32`/`u32`
/// storage fields, never on a packed vector.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CellAtomic {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub mass: i32,
}

impl CellAtomic {
    pub const SIZE: usize = std::mem::size_of::<CellAtomic>();
}

/// Float-view cell record produced by `updateGrid`: decoded velocity and
/// mass, consumed by `g2p`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CellFloat {
    pub velocity_mass: [f32; 4],
}

impl CellFloat {
    pub const SIZE: usize = std::mem::size_of::<CellFloat>();
}
