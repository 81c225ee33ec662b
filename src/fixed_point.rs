//! Fixed-point encoding used to accumulate grid momentum/mass with
//! `atomicAdd` on `i32` storage in the `clearGrid`/`p2g1`/`p2g2` kernels.
//!
//! `encode`/`decode` here are the host-side mirror of the WGSL functions of
//! the same name in `shaders/common.wgsl`; both sides must agree on `M` bit
//! for bit for the fixed-point atomics to produce matching results.

/// Default fixed-point multiplier. Chosen so that per-cell accumulated
/// momentum/mass stay within `i32` range for particle counts and weights in
/// the simulator's documented operating range (up to ~160k particles).
pub const DEFAULT_MULTIPLIER: f32 = 1.0e7;

/// Encode a float as a fixed-point `i32` by rounding `f * multiplier`.
pub fn encode(f: f32, multiplier: f32) -> i32 {
    (f * multiplier).round() as i32
}

/// Decode a fixed-point `i32` back to a float.
pub fn decode(i: i32, multiplier: f32) -> f32 {
    i as f32 / multiplier
}

/// Validate that `max_particles` particles, each contributing at most
/// `max_expected_weighted_momentum` per stencil cell, cannot overflow the
/// `i32` accumulator at the given multiplier:
/// `maxParticles * maxExpectedWeightedMomentum < 2^31 / M`.
///
/// This is deliberately the worst-case bound of every particle landing in
/// the same cell at once; it is a coarse safety rail, not a tight estimate
/// of real per-cell occupancy (real occupancy is bounded by density, not
/// particle count). The multiplier is a configurable constant, validated at
/// `init` rather than hard-coded.
pub fn validate_no_overflow(
    max_particles: u32,
    max_expected_weighted_momentum: f32,
    multiplier: f32,
) -> bool {
    let worst_case = max_particles as f64 * max_expected_weighted_momentum as f64;
    worst_case < (i32::MAX as f64) / multiplier as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encode_decode_round_trip_small() {
        for &f in &[0.0_f32, 1.0, -1.0, 3.5, -3.5, 99.999, -99.999] {
            let got = decode(encode(f, DEFAULT_MULTIPLIER), DEFAULT_MULTIPLIER);
            let expected = (f * DEFAULT_MULTIPLIER).round() / DEFAULT_MULTIPLIER;
            assert!((got - expected).abs() < 1e-9);
        }
    }

    proptest! {
        #[test]
        fn encode_decode_error_bounded(f in -100.0f32..100.0f32) {
            let got = decode(encode(f, DEFAULT_MULTIPLIER), DEFAULT_MULTIPLIER);
            let expected = (f * DEFAULT_MULTIPLIER).round() / DEFAULT_MULTIPLIER;
            prop_assert_eq!(got, expected);
            prop_assert!((got - f).abs() <= 5e-8 + 1e-12);
        }
    }

    #[test]
    fn overflow_guard_rejects_pathological_scale() {
        assert!(!validate_no_overflow(10_000_000, 1.0, DEFAULT_MULTIPLIER));
        assert!(!validate_no_overflow(160_000, 50.0, DEFAULT_MULTIPLIER));
        assert!(validate_no_overflow(1_000, 0.1, DEFAULT_MULTIPLIER));
    }
}
