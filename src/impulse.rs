//! Polyphonic impulse system: up to [`MAX_IMPULSES`] concurrently decaying
//! radial force fields, mirrored into the uniform block each frame and
//! consumed by the `g2p` kernel.

use log::debug;

use crate::rand::deterministic_random;

/// Fixed slot count: a small uniform-buffer array-of-vec4, not a
/// dynamically sized buffer, so every kernel can index it without a
/// separate count field.
pub const MAX_IMPULSES: usize = 8;

/// A handle returned from [`ImpulseManager::apply_impulse`] describing the
/// slot an impulse was placed into and its resolved parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpulseHandle {
    pub slot: usize,
    pub start_ms: f64,
    pub end_ms: f64,
    pub base_strength: f32,
    pub radius: f32,
    pub pos: glam::Vec3,
}

#[derive(Debug, Clone, Copy)]
struct ImpulseSlot {
    start_ms: f64,
    end_ms: f64,
    base_strength: f32,
    radius: f32,
    pos: glam::Vec3,
}

impl ImpulseSlot {
    /// An "empty" slot: already expired at time zero so the first
    /// `apply_impulse` call always finds a free slot.
    const EMPTY: ImpulseSlot = ImpulseSlot {
        start_ms: 0.0,
        end_ms: 0.0,
        base_strength: 0.0,
        radius: 0.0,
        pos: glam::Vec3::ZERO,
    };

    fn is_expired(&self, now_ms: f64) -> bool {
        now_ms > self.end_ms
    }

    /// `(strength, fade)` at `now_ms`, or `(0.0, 0.0)` if expired.
    fn fade_at(&self, now_ms: f64) -> f32 {
        if self.is_expired(now_ms) || self.end_ms <= self.start_ms {
            return 0.0;
        }
        let t = (now_ms - self.start_ms) / (self.end_ms - self.start_ms);
        let fade = (1.0 - t).max(0.0) as f32;
        self.base_strength * fade
    }
}

/// Host-side ring of impulse slots. `grid_size` is needed for the
/// coordinate-space clamping in the position-sampling policy.
pub struct ImpulseManager {
    slots: [ImpulseSlot; MAX_IMPULSES],
    grid_size: f32,
    /// Center of the most recently placed impulse, used by the short-note
    /// annulus-sampling heuristic.
    previous_center: Option<glam::Vec3>,
    next_salt: u32,
}

impl ImpulseManager {
    pub fn new(grid_size: f32) -> Self {
        ImpulseManager {
            slots: [ImpulseSlot::EMPTY; MAX_IMPULSES],
            grid_size,
            previous_center: None,
            next_salt: 0,
        }
    }

    fn draw(&mut self) -> f32 {
        let salt = self.next_salt;
        self.next_salt = self.next_salt.wrapping_add(1);
        deterministic_random(salt, 0x9E3779B9)
    }

    /// Sample a new impulse center per the position-sampling policy:
    /// annulus around the previous center for short notes, uniform in the
    /// inset cube otherwise.
    fn sample_position(&mut self, note01: f32, duration_ms: f32) -> glam::Vec3 {
        let box_range = self.grid_size - 2.0;

        let (x, z) = if duration_ms < 150.0 {
            if let Some(prev) = self.previous_center {
                let proximity = 1.0 - duration_ms / 150.0;
                let angle = self.draw() * std::f32::consts::TAU;
                let r_min = box_range * 0.15 + proximity * box_range * 0.05;
                let r_max = box_range * 0.45;
                let r = r_min + self.draw() * (r_max - r_min).max(0.0);
                (prev.x + r * angle.cos(), prev.z + r * angle.sin())
            } else {
                (
                    1.0 + self.draw() * box_range,
                    1.0 + self.draw() * box_range,
                )
            }
        } else {
            (
                1.0 + self.draw() * box_range,
                1.0 + self.draw() * box_range,
            )
        };

        let y_base = (note01 * 0.3 + self.draw() * 0.7) * box_range + 1.0;

        let clamp = |v: f32| v.clamp(1.0, self.grid_size - 1.0);
        let pos = glam::Vec3::new(clamp(x), clamp(y_base), clamp(z));
        self.previous_center = Some(pos);
        pos
    }

    /// Allocate a slot: the first expired slot, or (if none) the slot with
    /// the smallest `end_ms`.
    fn allocate_slot(&self, now_ms: f64) -> usize {
        if let Some(i) = self.slots.iter().position(|s| s.is_expired(now_ms)) {
            return i;
        }
        self.slots
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.end_ms.total_cmp(&b.end_ms))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// Inject a new radial impulse. `note`/`velocity` are MIDI-style 0..127
    /// inputs; `duration_ms` sets both the fade window and (via the
    /// position-sampling policy) whether the impulse clusters near the
    /// previous one.
    pub fn apply_impulse(&mut self, note: u8, velocity: u8, duration_ms: f32, now_ms: f64) -> ImpulseHandle {
        let note01 = note as f32 / 127.0;
        let v01 = velocity as f32 / 127.0;

        let pos = self.sample_position(note01, duration_ms);

        let duration_scale = 1.0 / (duration_ms / 120.0).max(1.0).sqrt();
        let base_strength = 14.0 * v01 * duration_scale;
        let radius = 14.0 + (duration_ms / 120.0).min(30.0);

        let slot_idx = self.allocate_slot(now_ms);
        if now_ms <= self.slots[slot_idx].end_ms {
            debug!(
                "impulse slot {slot_idx} evicted early (end_ms {} < new start {now_ms})",
                self.slots[slot_idx].end_ms
            );
        }

        let end_ms = now_ms + duration_ms as f64;
        self.slots[slot_idx] = ImpulseSlot {
            start_ms: now_ms,
            end_ms,
            base_strength,
            radius,
            pos,
        };

        ImpulseHandle {
            slot: slot_idx,
            start_ms: now_ms,
            end_ms,
            base_strength,
            radius,
            pos,
        }
    }

    pub fn has_active_impulse(&self, now_ms: f64) -> bool {
        self.slots.iter().any(|s| !s.is_expired(now_ms))
    }

    /// Compute the `(pos.xyz, radius)` / `(strength, 0, 0, 0)` pairs to
    /// mirror into the uniform block for this frame.
    pub fn uniform_mirror(&self, now_ms: f64) -> ([[f32; 4]; MAX_IMPULSES], [[f32; 4]; MAX_IMPULSES]) {
        let mut pr = [[0.0f32; 4]; MAX_IMPULSES];
        let mut s = [[0.0f32; 4]; MAX_IMPULSES];
        for (i, slot) in self.slots.iter().enumerate() {
            pr[i] = [slot.pos.x, slot.pos.y, slot.pos.z, slot.radius];
            s[i] = [slot.fade_at(now_ms), 0.0, 0.0, 0.0];
        }
        (pr, s)
    }
}
