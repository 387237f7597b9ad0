#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-frame transform evaluation for formation sets and the star anchor.
//!
//! The evaluator holds no per-particle state. Every frame it recomputes each
//! element from the immutable [`FormationSet`], the morph progress and the
//! elapsed ensemble time, writing into a caller-owned buffer in set order.

use std::f32::consts::PI;

use evergreen_core::{
    quat_from_euler_xyz, FormationSet, FormationTuning, MotionTuning, ParticleRecord, Role,
    Transform,
};
use glam::{Quat, Vec3};

/// Pure system that turns formation sets into frame transforms.
#[derive(Debug)]
pub struct TransformEvaluator {
    tuning: MotionTuning,
    star_anchor: Vec3,
}

impl TransformEvaluator {
    /// Creates an evaluator using the supplied motion constants.
    ///
    /// The star's assembled position is resolved from the apex of the cone
    /// described by `formation`.
    #[must_use]
    pub fn new(tuning: MotionTuning, formation: &FormationTuning) -> Self {
        let star_anchor = Vec3::new(0.0, formation.apex_height() + tuning.star.apex_offset, 0.0);
        Self {
            tuning,
            star_anchor,
        }
    }

    /// Motion constants used by the evaluator.
    #[must_use]
    pub fn tuning(&self) -> &MotionTuning {
        &self.tuning
    }

    /// Point the star settles on once the ensemble is assembled.
    #[must_use]
    pub fn star_anchor(&self) -> Vec3 {
        self.star_anchor
    }

    /// Replaces the contents of `out` with one transform per record of `set`.
    ///
    /// `progress` is clamped to `[0, 1]`. The buffer keeps its capacity
    /// between frames.
    pub fn evaluate(
        &self,
        set: &FormationSet,
        progress: f32,
        elapsed: f32,
        out: &mut Vec<Transform>,
    ) {
        out.clear();
        out.reserve(set.len());
        let progress = clamp_progress(progress);
        let role = set.role();

        for (index, record) in set.iter().enumerate() {
            out.push(self.evaluate_record(
                role,
                index,
                record,
                set.tangent(index),
                progress,
                elapsed,
            ));
        }
    }

    /// Evaluates a single record at position `index` within its set.
    ///
    /// `tangent` is only consulted for ribbon segments; when absent the
    /// segment falls back to its stored base orientation.
    #[must_use]
    pub fn evaluate_record(
        &self,
        role: Role,
        index: usize,
        record: &ParticleRecord,
        tangent: Option<Quat>,
        progress: f32,
        elapsed: f32,
    ) -> Transform {
        let progress = clamp_progress(progress);
        let blended = blend_position(record, progress);
        let translation = blended + secondary_offset(role, record, progress, elapsed, &self.tuning);
        let rotation = self.orientation(role, record, tangent, blended, progress, elapsed);

        let size = record.base_scale * pop_factor(progress, self.tuning.pop_amplitude);
        let scale = match role {
            Role::Ribbon => {
                let phase = elapsed * self.tuning.ribbon_breath_rate
                    + index as f32 * self.tuning.ribbon_breath_spacing;
                let breathe = 1.0 + phase.sin() * self.tuning.ribbon_breath_amplitude;
                Vec3::new(size * breathe, 1.0, 1.0)
            }
            _ => Vec3::splat(size),
        };

        Transform::new(translation, rotation, scale)
    }

    /// Transform of the star anchor sitting on the cone apex.
    #[must_use]
    pub fn evaluate_star(&self, progress: f32, elapsed: f32) -> Transform {
        let star = &self.tuning.star;
        let progress = clamp_progress(progress);
        let translation = star.dispersed_position.lerp(self.star_anchor, progress);
        let rotation = Quat::from_rotation_y(elapsed * star.spin_rate);
        let size = star.base_scale + (elapsed * star.breath_rate).sin() * star.breath_amplitude;

        Transform::new(translation, rotation, Vec3::splat(size))
    }

    fn orientation(
        &self,
        role: Role,
        record: &ParticleRecord,
        tangent: Option<Quat>,
        blended: Vec3,
        progress: f32,
        elapsed: f32,
    ) -> Quat {
        let tuning = &self.tuning;
        let base = record.base_rotation;
        let id = record.id.phase();

        if role == Role::Ribbon {
            if progress < tuning.ribbon_settle_threshold {
                return quat_from_euler_xyz(Vec3::new(
                    elapsed + id,
                    elapsed * 0.5 + id,
                    base.z,
                ));
            }
            return tangent.unwrap_or_else(|| quat_from_euler_xyz(base));
        }

        if progress < tuning.settle_threshold {
            return quat_from_euler_xyz(Vec3::new(base.x + elapsed, base.y + elapsed, base.z));
        }

        let facing = blended.x.atan2(blended.z);
        let euler = match role {
            Role::Needle => base.lerp(Vec3::new(0.0, facing, tuning.needle_tilt), progress),
            Role::Bauble => base,
            Role::Bell => {
                let wind = (elapsed * tuning.bell_wind_rate + id).sin() * tuning.bell_wind_amplitude;
                base.lerp(Vec3::new(wind, facing, wind), progress)
            }
            Role::Gift => base.lerp(
                Vec3::new(0.0, id + elapsed * tuning.gift_spin_rate, 0.0),
                progress,
            ),
            Role::Ribbon => base,
        };

        quat_from_euler_xyz(euler)
    }
}

impl Default for TransformEvaluator {
    fn default() -> Self {
        Self::new(MotionTuning::default(), &FormationTuning::default())
    }
}

/// Linear blend between the dispersed and assembled positions.
///
/// Exact at both endpoints.
#[must_use]
pub fn blend_position(record: &ParticleRecord, progress: f32) -> Vec3 {
    if progress <= 0.0 {
        return record.dispersed_position;
    }
    if progress >= 1.0 {
        return record.assembled_position;
    }
    record
        .dispersed_position
        .lerp(record.assembled_position, progress)
}

/// Floating motion layered on top of the blended position.
///
/// The amplitude shrinks linearly with progress and is exactly zero once
/// the ensemble is assembled.
#[must_use]
pub fn secondary_offset(
    role: Role,
    record: &ParticleRecord,
    progress: f32,
    elapsed: f32,
    tuning: &MotionTuning,
) -> Vec3 {
    let fade = 1.0 - clamp_progress(progress);
    if fade == 0.0 {
        return Vec3::ZERO;
    }

    let id = record.id.phase();
    match role {
        Role::Needle => {
            let phase = elapsed * record.motion_speed + id;
            Vec3::new(0.0, phase.sin() * fade * tuning.needle_float, 0.0)
        }
        Role::Bauble | Role::Bell | Role::Gift => {
            let phase = elapsed * record.motion_speed + id;
            Vec3::new(0.0, phase.cos() * fade * tuning.ornament_float, 0.0)
        }
        Role::Ribbon => {
            let amplitude = fade * tuning.ribbon_float;
            let offset = id * tuning.ribbon_phase_spacing;
            let sway = elapsed * record.motion_speed;
            Vec3::new(
                (sway + offset).sin() * amplitude,
                (sway * tuning.ribbon_vertical_ratio + offset).cos() * amplitude,
                0.0,
            )
        }
    }
}

/// Symmetric size emphasis peaking half way through a transition.
#[must_use]
pub fn pop_factor(progress: f32, amplitude: f32) -> f32 {
    1.0 + (clamp_progress(progress) * PI).sin() * amplitude
}

fn clamp_progress(progress: f32) -> f32 {
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    }
}
