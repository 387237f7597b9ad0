//! Spiral path builder for ribbon segments.
//!
//! The ribbon winds from just below the cone apex down to its base. The
//! radius is a linear taper plus a periodic drape, and every segment is
//! oriented along the path toward its successor so neighbouring segments
//! read as one continuous band.

use std::f32::consts::TAU;

use evergreen_core::{
    euler_xyz_from_quat, FormationSet, FormationTuning, ParticleId, ParticleRecord,
    RibbonTuning, Role,
};
use glam::{Mat3, Quat, Vec3};
use rand::Rng;

use crate::sample_sphere;

/// Generates `count` ribbon segments laid along the spiral path.
pub fn generate_spiral<R>(count: usize, tuning: &FormationTuning, rng: &mut R) -> FormationSet
where
    R: Rng + ?Sized,
{
    let ribbon = &tuning.ribbon;
    let id_base = Role::Ribbon.id_base();

    let mut records = Vec::with_capacity(count);
    let mut tangents = Vec::with_capacity(count);
    for index in 0..count {
        let t = index as f32 / count as f32;
        let t_next = (index + 1) as f32 / count as f32;
        let current = spiral_point(t, tuning);
        let next = spiral_point(t_next, tuning);

        let tangent = look_rotation(next - current);

        records.push(ParticleRecord {
            id: ParticleId::new(id_base + index as u32),
            dispersed_position: sample_sphere(tuning.scatter_radius, rng),
            assembled_position: current,
            base_rotation: euler_xyz_from_quat(tangent),
            base_scale: segment_width(t, ribbon),
            motion_speed: ribbon.motion_speed.lerp(rng.gen()),
        });
        tangents.push(tangent);
    }

    FormationSet::with_tangents(Role::Ribbon, records, tangents)
}

/// Position on the spiral at path parameter `t`, where 0 is the top.
#[must_use]
pub fn spiral_point(t: f32, tuning: &FormationTuning) -> Vec3 {
    let ribbon = &tuning.ribbon;
    let start_y = tuning.apex_height() - ribbon.apex_offset;
    let end_y = -tuning.apex_height();
    let y = start_y - t * (start_y - end_y);

    let taper = t * tuning.tree_base_radius * ribbon.radius_flare;
    let drape = (t * TAU * ribbon.drape_cycles).sin() * ribbon.drape_amplitude;
    let radius = taper + drape;

    let theta = t * TAU * ribbon.turns;
    Vec3::new(radius * theta.cos(), y, radius * theta.sin())
}

/// Width of the segment at path parameter `t`.
#[must_use]
pub fn segment_width(t: f32, ribbon: &RibbonTuning) -> f32 {
    ribbon.width_base + (t * TAU * ribbon.width_cycles).sin() * ribbon.width_amplitude
}

/// Orientation whose local +Z axis points along `direction`, banked around world +Y.
///
/// A zero direction yields the identity. Directions parallel to +Y fall back
/// to +X as the side axis.
#[must_use]
pub fn look_rotation(direction: Vec3) -> Quat {
    let forward = direction.normalize_or_zero();
    if forward == Vec3::ZERO {
        return Quat::IDENTITY;
    }

    let side = Vec3::Y.cross(forward);
    let right = if side.length_squared() <= f32::EPSILON {
        Vec3::X
    } else {
        side.normalize()
    };
    let up = forward.cross(right);

    Quat::from_mat3(&Mat3::from_cols(right, up, forward)).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_rotation_maps_forward_axis_onto_direction() {
        let direction = Vec3::new(1.0, -0.3, 0.5);
        let rotation = look_rotation(direction);
        let forward = rotation * Vec3::Z;
        assert!(forward.dot(direction.normalize()) > 1.0 - 1e-5);
    }

    #[test]
    fn look_rotation_handles_vertical_and_zero_directions() {
        assert_eq!(look_rotation(Vec3::ZERO), Quat::IDENTITY);
        let down = look_rotation(Vec3::NEG_Y) * Vec3::Z;
        assert!(down.dot(Vec3::NEG_Y) > 1.0 - 1e-5);
    }

    #[test]
    fn spiral_starts_below_apex_and_ends_on_base() {
        let tuning = FormationTuning::default();
        let top = spiral_point(0.0, &tuning);
        let bottom = spiral_point(1.0, &tuning);

        assert!((top.y - (tuning.apex_height() - tuning.ribbon.apex_offset)).abs() < 1e-5);
        assert!(top.x.hypot(top.z) < 1e-5);
        assert!((bottom.y + tuning.apex_height()).abs() < 1e-5);
        let flared = tuning.tree_base_radius * tuning.ribbon.radius_flare;
        assert!((bottom.x.hypot(bottom.z) - flared).abs() < 1e-3);
    }

    #[test]
    fn drape_perturbs_the_linear_taper() {
        let tuning = FormationTuning::default();
        let t = 1.0 / (4.0 * tuning.ribbon.drape_cycles);
        let point = spiral_point(t, &tuning);
        let taper = t * tuning.tree_base_radius * tuning.ribbon.radius_flare;
        let radius = point.x.hypot(point.z);
        assert!((radius - (taper + tuning.ribbon.drape_amplitude)).abs() < 1e-4);
    }

    #[test]
    fn segment_width_ripples_around_base_width() {
        let ribbon = RibbonTuning::default();
        let peak = segment_width(1.0 / (4.0 * ribbon.width_cycles), &ribbon);
        assert!((peak - (ribbon.width_base + ribbon.width_amplitude)).abs() < 1e-5);
        assert!((segment_width(0.0, &ribbon) - ribbon.width_base).abs() < 1e-6);
    }
}
