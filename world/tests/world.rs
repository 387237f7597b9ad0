use std::time::Duration;

use evergreen_core::{
    Command, Event, Formation, FormationTuning, GenerationError, MotionTuning, Role, ScaleRange,
    TuningError,
};
use evergreen_world::{apply, query, World, WorldConfig};

const FRAME: Duration = Duration::from_millis(100);

fn populate(world: &mut World, role: Role, count: i64) -> Vec<Event> {
    let mut events = Vec::new();
    apply(world, Command::PopulateRole { role, count }, &mut events);
    events
}

#[test]
fn new_world_is_dispersed_and_empty() {
    let world = World::new();

    assert_eq!(query::formation(&world), Formation::Dispersed);
    assert_eq!(query::progress(&world), 0.0);
    assert_eq!(query::elapsed(&world), Duration::ZERO);
    assert_eq!(query::particle_count(&world), 0);
    for role in Role::ALL {
        assert!(query::formation_set(&world, role).is_none());
    }
}

#[test]
fn populate_generates_requested_set() {
    let mut world = World::new();
    let events = populate(&mut world, Role::Bauble, 80);

    assert_eq!(
        events,
        vec![Event::RolePopulated {
            role: Role::Bauble,
            count: 80,
            cached: false,
        }]
    );
    let set = query::formation_set(&world, Role::Bauble).expect("populated");
    assert_eq!(set.len(), 80);
    assert_eq!(set.role(), Role::Bauble);
}

#[test]
fn repeated_population_is_served_from_cache() {
    let mut world = World::new();
    let _ = populate(&mut world, Role::Needle, 300);
    let first = query::formation_set(&world, Role::Needle)
        .expect("populated")
        .clone();

    let _ = populate(&mut world, Role::Needle, 120);
    let events = populate(&mut world, Role::Needle, 300);

    assert_eq!(
        events,
        vec![Event::RolePopulated {
            role: Role::Needle,
            count: 300,
            cached: true,
        }]
    );
    assert_eq!(query::cached_set_count(&world), 2);
    assert_eq!(query::formation_set(&world, Role::Needle), Some(&first));
}

#[test]
fn rejected_population_keeps_previous_set() {
    let mut world = World::new();
    let _ = populate(&mut world, Role::Gift, 30);

    let events = populate(&mut world, Role::Gift, -4);

    assert_eq!(
        events,
        vec![Event::PopulationRejected {
            role: Role::Gift,
            reason: GenerationError::NegativeCount {
                role: Role::Gift,
                count: -4,
            },
        }]
    );
    assert_eq!(
        query::formation_set(&world, Role::Gift).map(|set| set.len()),
        Some(30)
    );
}

#[test]
fn equal_seeds_generate_equal_sets_in_any_order() {
    let config = WorldConfig {
        seed: 99,
        ..WorldConfig::default()
    };
    let mut first = World::with_config(config.clone()).expect("valid config");
    let mut second = World::with_config(config).expect("valid config");

    let _ = populate(&mut first, Role::Bell, 70);
    let _ = populate(&mut first, Role::Ribbon, 500);
    let _ = populate(&mut second, Role::Ribbon, 500);
    let _ = populate(&mut second, Role::Bell, 70);

    for role in [Role::Bell, Role::Ribbon] {
        assert_eq!(
            query::formation_set(&first, role),
            query::formation_set(&second, role),
            "{role} differs"
        );
    }
}

#[test]
fn different_seeds_generate_different_sets() {
    let mut first = World::with_config(WorldConfig {
        seed: 1,
        ..WorldConfig::default()
    })
    .expect("valid config");
    let mut second = World::with_config(WorldConfig {
        seed: 2,
        ..WorldConfig::default()
    })
    .expect("valid config");

    let _ = populate(&mut first, Role::Bauble, 40);
    let _ = populate(&mut second, Role::Bauble, 40);

    assert_ne!(
        query::formation_set(&first, Role::Bauble),
        query::formation_set(&second, Role::Bauble)
    );
}

#[test]
fn toggle_flips_target_and_announces_it() {
    let mut world = World::new();
    let mut events = Vec::new();

    apply(&mut world, Command::ToggleFormation, &mut events);
    assert_eq!(query::formation(&world), Formation::Assembled);
    assert_eq!(
        events,
        vec![Event::FormationChanged {
            formation: Formation::Assembled,
        }]
    );

    events.clear();
    apply(&mut world, Command::ToggleFormation, &mut events);
    assert_eq!(query::formation(&world), Formation::Dispersed);
    assert_eq!(
        events,
        vec![Event::FormationChanged {
            formation: Formation::Dispersed,
        }]
    );
}

#[test]
fn ticks_advance_clock_and_progress_toward_target() {
    let mut world = World::new();
    let mut events = Vec::new();

    apply(&mut world, Command::Tick { dt: FRAME }, &mut events);
    assert_eq!(query::progress(&world), 0.0, "dispersed target keeps progress at rest");

    apply(
        &mut world,
        Command::SetFormation {
            formation: Formation::Assembled,
        },
        &mut events,
    );

    let mut previous = query::progress(&world);
    for _ in 0..20 {
        apply(&mut world, Command::Tick { dt: FRAME }, &mut events);
        let progress = query::progress(&world);
        assert!(progress > previous);
        previous = progress;
    }

    assert_eq!(query::tick_index(&world), 21);
    assert_eq!(query::elapsed(&world), FRAME * 21);
    assert!(events.contains(&Event::TimeAdvanced { dt: FRAME }));
}

#[test]
fn retargeting_mid_transition_reverses_progress() {
    let mut world = World::new();
    let mut events = Vec::new();

    apply(&mut world, Command::ToggleFormation, &mut events);
    for _ in 0..5 {
        apply(&mut world, Command::Tick { dt: FRAME }, &mut events);
    }
    let midway = query::progress(&world);

    apply(&mut world, Command::ToggleFormation, &mut events);
    apply(&mut world, Command::Tick { dt: FRAME }, &mut events);

    assert!(query::progress(&world) < midway);
}

#[test]
fn sets_iterate_in_draw_order() {
    let mut world = World::new();
    for role in [Role::Gift, Role::Needle, Role::Ribbon] {
        let _ = populate(&mut world, role, 10);
    }

    let roles: Vec<Role> = query::formation_sets(&world).map(|set| set.role()).collect();
    assert_eq!(roles, vec![Role::Needle, Role::Ribbon, Role::Gift]);
    assert_eq!(query::particle_count(&world), 30);
}

#[test]
fn out_of_range_tuning_is_rejected_at_creation() {
    let negative_bells = WorldConfig {
        formation: FormationTuning {
            bell_scale: ScaleRange {
                min: -0.6,
                max: 1.2,
            },
            ..FormationTuning::default()
        },
        ..WorldConfig::default()
    };
    assert!(matches!(
        World::with_config(negative_bells),
        Err(TuningError::NotGreater {
            field: "bell_scale",
            ..
        })
    ));

    let frozen = WorldConfig {
        motion: MotionTuning {
            smoothing_rate: -1.0,
            ..MotionTuning::default()
        },
        ..WorldConfig::default()
    };
    assert!(matches!(
        World::with_config(frozen),
        Err(TuningError::NotGreater {
            field: "smoothing_rate",
            ..
        })
    ));
}
