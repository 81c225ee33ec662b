//! CPU mirror of the `g2p` kernel's heat-map colorization, for testing and
//! for host applications that want the same motion-to-color mapping off-GPU
//! (e.g. a minimap or a non-GPU preview). The authoritative implementation
//! lives in `shaders/g2p.wgsl`; this function must match it term for term.

/// Map a per-particle displacement magnitude to a linear-RGB heat-map color,
/// blue (still) through red (fast).
pub fn heat_color(move_distance: f32, heat_speed_min: f32, heat_speed_max: f32) -> [f32; 3] {
    let t0 = ((move_distance - heat_speed_min) / (heat_speed_max - heat_speed_min)).clamp(0.0, 1.0);
    let t = t0 * t0 * (3.0 - 2.0 * t0);
    let heat = t.powf(1.8).clamp(0.0, 1.0);

    let hue = lerp(0.66, 0.0, heat);
    let sat = 1.0f32;
    let light = lerp(0.35, 0.55, heat);

    hsl_to_rgb(hue, sat, light)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Branchless HSL→RGB matching the WGSL implementation's formula.
pub fn hsl_to_rgb(hue: f32, sat: f32, light: f32) -> [f32; 3] {
    let c = (1.0 - (2.0 * light - 1.0).abs()) * sat;
    let mut out = [0.0f32; 3];
    for (i, offset) in [0.0f32, 2.0 / 3.0, 1.0 / 3.0].into_iter().enumerate() {
        let h_prime = frac((hue + offset) * 1.0) * 6.0;
        let rgb0 = (h_prime - 3.0).abs().clamp(0.0, 3.0);
        let rgb0 = (rgb0 - 1.0).clamp(0.0, 1.0);
        out[i] = ((rgb0 - 0.5) * c + light).clamp(0.0, 1.0);
    }
    out
}

fn frac(x: f32) -> f32 {
    x - x.floor()
}
