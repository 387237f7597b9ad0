use std::f32::consts::PI;

use evergreen_core::{
    quat_from_euler_xyz, FormationTuning, GenerationError, Role, ScaleRange, TuningError,
    RIBBON_ID_BASE,
};
use evergreen_system_formation::{sample_cone, sample_sphere, FormationGenerator};
use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const SAMPLE_COUNT: usize = 50_000;

fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

#[test]
fn generates_exact_count_with_contiguous_ids() {
    let generator = FormationGenerator::default();
    let mut rng = rng(0x5eed);

    for role in Role::ALL {
        let set = generator
            .generate(role, 257, &mut rng)
            .expect("valid request");
        assert_eq!(set.len(), 257, "{role} record count");
        assert_eq!(set.role(), role);

        let base = role.id_base();
        for (index, record) in set.iter().enumerate() {
            assert_eq!(record.id.get(), base + index as u32, "{role} id at {index}");
        }
    }
}

#[test]
fn zero_count_yields_empty_set_without_error() {
    let generator = FormationGenerator::default();
    let mut rng = rng(1);

    for role in Role::ALL {
        let set = generator.generate(role, 0, &mut rng).expect("zero is valid");
        assert!(set.is_empty());
        assert!(set.tangents().is_empty());
    }
}

#[test]
fn negative_count_is_rejected() {
    let generator = FormationGenerator::default();
    let error = generator
        .generate(Role::Gift, -1, &mut rng(2))
        .expect_err("negative counts are a contract violation");

    assert_eq!(
        error,
        GenerationError::NegativeCount {
            role: Role::Gift,
            count: -1
        }
    );
}

#[test]
fn identical_seeds_replay_identical_sets() {
    let generator = FormationGenerator::default();
    let first = generator
        .generate(Role::Bell, 64, &mut rng(42))
        .expect("valid");
    let second = generator
        .generate(Role::Bell, 64, &mut rng(42))
        .expect("valid");

    assert_eq!(first, second);
}

#[test]
fn sphere_sampling_fills_volume_not_centre() {
    let radius = 35.0;
    let shells = 5;
    let mut counts = vec![0usize; shells];
    let mut outer_half = 0usize;
    let mut rng = rng(0xc0ffee);

    for _ in 0..SAMPLE_COUNT {
        let point = sample_sphere(radius, &mut rng);
        let distance = point.length();
        assert!(distance <= radius + 1e-3, "sample escaped the sphere");
        let shell = ((distance / radius) * shells as f32) as usize;
        counts[shell.min(shells - 1)] += 1;
        outer_half += usize::from(distance > radius * 0.5);
    }

    for pair in counts.windows(2) {
        assert!(
            pair[1] > pair[0],
            "shell density must grow toward the surface: {counts:?}"
        );
    }

    // A uniform-radius sampler would put half the mass in the outer half.
    let outer_fraction = outer_half as f32 / SAMPLE_COUNT as f32;
    assert!(
        outer_fraction > 0.8,
        "outer half holds {outer_fraction} of the mass"
    );
}

#[test]
fn sphere_sampling_has_no_directional_bias() {
    let mut rng = rng(7);
    let mut upper = 0usize;
    let mut positive_x = 0usize;
    for _ in 0..SAMPLE_COUNT {
        let point = sample_sphere(1.0, &mut rng);
        upper += usize::from(point.z > 0.0);
        positive_x += usize::from(point.x > 0.0);
    }

    for count in [upper, positive_x] {
        let fraction = count as f32 / SAMPLE_COUNT as f32;
        assert!((fraction - 0.5).abs() < 0.02, "hemisphere fraction {fraction}");
    }
}

#[test]
fn cone_sampling_is_denser_near_the_base() {
    let tuning = FormationTuning::default();
    let half = tuning.apex_height();
    let mut rng = rng(0xbeef);
    let mut lower = 0usize;
    let mut upper = 0usize;

    for index in 0..SAMPLE_COUNT {
        let point = sample_cone(&tuning, index, &mut rng);
        assert!(point.y >= -half - 1e-4 && point.y <= half + 1e-4);

        let height_ratio = (point.y + half) / tuning.tree_height;
        let max_radius = tuning.tree_base_radius * (1.0 - height_ratio);
        assert!(point.x.hypot(point.z) <= max_radius + 1e-3);

        if point.y < 0.0 {
            lower += 1;
        } else {
            upper += 1;
        }
    }

    // With exponent 1.6 roughly 65% of samples fall into the lower half.
    assert!(
        lower as f32 > upper as f32 * 1.5,
        "lower {lower} vs upper {upper}"
    );
}

#[test]
fn cone_sampling_fills_interior_volume() {
    let tuning = FormationTuning::default();
    let half = tuning.apex_height();
    let mut rng = rng(3);
    let mut interior = 0usize;

    for index in 0..SAMPLE_COUNT {
        let point = sample_cone(&tuning, index, &mut rng);
        let height_ratio = (point.y + half) / tuning.tree_height;
        let max_radius = tuning.tree_base_radius * (1.0 - height_ratio);
        if point.x.hypot(point.z) < max_radius * 0.9 {
            interior += 1;
        }
    }

    assert!(interior as f32 > SAMPLE_COUNT as f32 * 0.5);
}

#[test]
fn records_respect_role_ranges() {
    let generator = FormationGenerator::default();
    let tuning = generator.tuning().clone();
    let mut rng = rng(11);

    for role in [Role::Needle, Role::Bauble, Role::Bell, Role::Gift] {
        let set = generator.generate(role, 500, &mut rng).expect("valid");
        let scale = tuning.scale_range(role);
        for record in set.iter() {
            assert!(scale.contains(record.base_scale), "{role} scale");
            assert!(tuning.motion_speed.contains(record.motion_speed));
            assert!(record.dispersed_position.length() <= tuning.scatter_radius + 1e-3);
            for angle in record.base_rotation.to_array() {
                assert!((0.0..=PI).contains(&angle), "{role} rotation {angle}");
            }
        }
    }
}

#[test]
fn ornaments_sit_near_the_cone_surface() {
    let generator = FormationGenerator::default();
    let tuning = generator.tuning().clone();
    let half = tuning.apex_height();
    let set = generator
        .generate(Role::Bauble, 2_000, &mut rng(19))
        .expect("valid");

    let mut beyond_cone = 0usize;
    for record in set.iter() {
        let position = record.assembled_position;
        let height_ratio = (position.y + half) / tuning.tree_height;
        let cone_radius = tuning.tree_base_radius * (1.0 - height_ratio);
        let horizontal = position.x.hypot(position.z);
        assert!(horizontal <= cone_radius * tuning.push_factor(Role::Bauble) + 1e-3);
        beyond_cone += usize::from(horizontal > cone_radius);
    }

    assert!(beyond_cone > 0, "some baubles should poke through the needles");
}

#[test]
fn ribbon_segments_follow_the_spiral_downward() {
    let generator = FormationGenerator::default();
    let set = generator
        .generate(Role::Ribbon, 400, &mut rng(23))
        .expect("valid");

    assert_eq!(set.tangents().len(), set.len());
    assert_eq!(set.records()[0].id.get(), RIBBON_ID_BASE);
    for pair in set.records().windows(2) {
        assert!(pair[1].assembled_position.y < pair[0].assembled_position.y);
    }
}

#[test]
fn ribbon_tangent_points_at_next_segment() {
    let generator = FormationGenerator::default();
    let set = generator
        .generate(Role::Ribbon, 2_000, &mut rng(29))
        .expect("valid");

    for index in 0..set.len() - 1 {
        let here = set.records()[index].assembled_position;
        let next = set.records()[index + 1].assembled_position;
        let expected = (next - here).normalize();
        let forward = set.tangent(index).expect("tangent") * Vec3::Z;
        let angle = forward.dot(expected).clamp(-1.0, 1.0).acos();
        assert!(angle < 1e-2, "segment {index} deviates by {angle} rad");
    }
}

#[test]
fn ribbon_base_rotation_encodes_the_tangent() {
    let generator = FormationGenerator::default();
    let set = generator
        .generate(Role::Ribbon, 300, &mut rng(31))
        .expect("valid");

    for (index, record) in set.iter().enumerate() {
        let from_euler = quat_from_euler_xyz(record.base_rotation);
        let tangent = set.tangent(index).expect("tangent");
        assert!(
            from_euler.dot(tangent).abs() > 1.0 - 1e-4,
            "segment {index} euler mismatch"
        );
    }
}

#[test]
fn invalid_tuning_is_rejected_before_sampling() {
    let negative_gifts = FormationTuning {
        gift_scale: ScaleRange {
            min: -1.0,
            max: -0.5,
        },
        ..FormationTuning::default()
    };
    let error = FormationGenerator::new(negative_gifts).expect_err("negative scales");
    assert!(matches!(error, TuningError::NotGreater { field: "gift_scale", .. }));

    let top_heavy = FormationTuning {
        height_bias: 0.4,
        ..FormationTuning::default()
    };
    let error = FormationGenerator::new(top_heavy).expect_err("apex bias");
    assert!(matches!(error, TuningError::NotGreater { field: "height_bias", .. }));
}

#[test]
fn custom_tuning_shapes_generated_records() {
    let tuning = FormationTuning {
        tree_height: 20.0,
        gift_scale: ScaleRange::new(0.4, 0.5),
        ..FormationTuning::default()
    };
    let generator = FormationGenerator::new(tuning.clone()).expect("valid tuning");
    let set = generator
        .generate(Role::Gift, 200, &mut rng(11))
        .expect("valid request");

    for record in set.iter() {
        assert!(tuning.gift_scale.contains(record.base_scale));
        assert!(record.assembled_position.y.abs() <= tuning.apex_height() + 1e-4);
    }
}
