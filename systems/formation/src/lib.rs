#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural formation generator producing immutable particle datasets.
//!
//! Every role receives a dispersed position sampled uniformly inside the
//! scatter sphere. Cone roles are assembled on a golden-angle spiral through
//! the tree volume; ribbon segments follow the helix built by [`spiral`].

pub mod spiral;

use std::f32::consts::{PI, TAU};

use evergreen_core::{
    FormationRequest, FormationSet, FormationTuning, GenerationError, ParticleId,
    ParticleRecord, Role, TuningError,
};
use glam::Vec3;
use rand::Rng;

/// Pure system that turns validated requests into formation sets.
#[derive(Debug, Default)]
pub struct FormationGenerator {
    tuning: FormationTuning,
}

impl FormationGenerator {
    /// Creates a generator using the supplied geometry constants.
    ///
    /// Fails when the constants would produce non-positive scales or a cone
    /// that is not biased toward its base.
    pub fn new(tuning: FormationTuning) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self { tuning })
    }

    /// Geometry constants used by the generator.
    #[must_use]
    pub fn tuning(&self) -> &FormationTuning {
        &self.tuning
    }

    /// Validates `count` and generates a set for `role`.
    ///
    /// Negative or oversized counts are rejected before any sampling happens.
    pub fn generate<R>(
        &self,
        role: Role,
        count: i64,
        rng: &mut R,
    ) -> Result<FormationSet, GenerationError>
    where
        R: Rng + ?Sized,
    {
        let request = FormationRequest::new(role, count)?;
        Ok(self.generate_request(request, rng))
    }

    /// Generates exactly `request.count()` records for the requested role.
    pub fn generate_request<R>(&self, request: FormationRequest, rng: &mut R) -> FormationSet
    where
        R: Rng + ?Sized,
    {
        match request.role() {
            Role::Ribbon => spiral::generate_spiral(request.count(), &self.tuning, rng),
            role => generate_cone_set(role, request.count(), &self.tuning, rng),
        }
    }
}

fn generate_cone_set<R>(
    role: Role,
    count: usize,
    tuning: &FormationTuning,
    rng: &mut R,
) -> FormationSet
where
    R: Rng + ?Sized,
{
    let scale_range = tuning.scale_range(role);
    let push = tuning.push_factor(role);
    let id_base = role.id_base();

    let mut records = Vec::with_capacity(count);
    for index in 0..count {
        let dispersed_position = sample_sphere(tuning.scatter_radius, rng);
        let cone = sample_cone(tuning, index, rng);
        let assembled_position = push_outward(cone, push, tuning.ornament_push.min_radius);
        let base_rotation = Vec3::new(
            rng.gen::<f32>() * PI,
            rng.gen::<f32>() * PI,
            rng.gen::<f32>() * PI,
        );

        records.push(ParticleRecord {
            id: ParticleId::new(id_base + index as u32),
            dispersed_position,
            assembled_position,
            base_rotation,
            base_scale: scale_range.lerp(rng.gen()),
            motion_speed: tuning.motion_speed.lerp(rng.gen()),
        });
    }

    FormationSet::new(role, records)
}

/// Samples a point uniformly distributed through the volume of a sphere.
///
/// The polar angle comes from an inverse cosine so directions are uniform
/// over the sphere, and the radius from a cube root so shells receive mass
/// proportional to their volume.
pub fn sample_sphere<R>(radius: f32, rng: &mut R) -> Vec3
where
    R: Rng + ?Sized,
{
    let theta = rng.gen::<f32>() * TAU;
    let phi = rng.gen_range(-1.0f32..=1.0).acos();
    let r = rng.gen::<f32>().cbrt() * radius;

    Vec3::new(
        r * phi.sin() * theta.cos(),
        r * phi.sin() * theta.sin(),
        r * phi.cos(),
    )
}

/// Samples a point inside the tree cone for the particle at `index`.
///
/// Heights are biased toward the base by the tuning exponent and the
/// azimuth advances by the golden angle per index.
pub fn sample_cone<R>(tuning: &FormationTuning, index: usize, rng: &mut R) -> Vec3
where
    R: Rng + ?Sized,
{
    let height_ratio = rng.gen::<f32>().powf(tuning.height_bias);
    let y = height_ratio * tuning.tree_height - tuning.tree_height * 0.5;
    let radius = tuning.tree_base_radius * (1.0 - height_ratio);

    let angle = index as f32 * tuning.golden_angle_degrees.to_radians();
    let jitter = tuning.radial_jitter_min + rng.gen::<f32>() * (1.0 - tuning.radial_jitter_min);
    let r = radius * jitter;

    Vec3::new(r * angle.cos(), y, r * angle.sin())
}

fn push_outward(position: Vec3, factor: f32, min_radius: f32) -> Vec3 {
    let horizontal = position.x.hypot(position.z);
    if factor == 1.0 || horizontal <= min_radius {
        return position;
    }

    Vec3::new(position.x * factor, position.y, position.z * factor)
}
