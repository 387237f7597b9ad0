#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative ensemble state for Evergreen.
//!
//! The world owns the generated formation sets, the morph progress and the
//! ensemble clock. It is mutated exclusively through [`apply`] and read
//! through the [`query`] module.

use std::{collections::HashMap, time::Duration};

use evergreen_core::{
    Command, Event, Formation, FormationRequest, FormationSet, FormationTuning, MotionTuning, Role,
    TuningError,
};
use evergreen_system_formation::FormationGenerator;
use evergreen_system_morph::MorphState;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Seed used when no explicit seed is configured.
pub const DEFAULT_SEED: u64 = 0x5eed_e7e2_6ee2_0001;

const ROLE_SEED_STRIDE: u64 = 0x9e37_79b9_7f4a_7c15;

/// Settings the world is created with.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldConfig {
    /// Seed that all generated formation sets derive from.
    pub seed: u64,
    /// Geometry used by the formation generator.
    pub formation: FormationTuning,
    /// Motion constants; the world consumes the smoothing rate.
    pub motion: MotionTuning,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            formation: FormationTuning::default(),
            motion: MotionTuning::default(),
        }
    }
}

/// Represents the authoritative Evergreen ensemble.
#[derive(Debug)]
pub struct World {
    seed: u64,
    generator: FormationGenerator,
    cache: HashMap<FormationRequest, FormationSet>,
    active: HashMap<Role, FormationRequest>,
    morph: MorphState,
    formation: Formation,
    elapsed: Duration,
    tick_index: u64,
}

impl World {
    /// Creates a dispersed world with no populated roles and default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::assemble(
            DEFAULT_SEED,
            FormationGenerator::default(),
            MorphState::from_tuning(&MotionTuning::default()),
        )
    }

    /// Creates a dispersed world from the provided settings.
    ///
    /// Fails when the formation or motion constants are out of range.
    pub fn with_config(config: WorldConfig) -> Result<Self, TuningError> {
        config.motion.validate()?;
        let generator = FormationGenerator::new(config.formation)?;
        Ok(Self::assemble(
            config.seed,
            generator,
            MorphState::from_tuning(&config.motion),
        ))
    }

    fn assemble(seed: u64, generator: FormationGenerator, morph: MorphState) -> Self {
        Self {
            seed,
            morph,
            generator,
            cache: HashMap::new(),
            active: HashMap::new(),
            formation: Formation::default(),
            elapsed: Duration::ZERO,
            tick_index: 0,
        }
    }

    fn set_formation(&mut self, formation: Formation, out_events: &mut Vec<Event>) {
        if self.formation == formation {
            return;
        }
        self.formation = formation;
        tracing::info!(
            target: "world",
            ?formation,
            progress = self.morph.progress(),
            "morph target changed"
        );
        out_events.push(Event::FormationChanged { formation });
    }

    fn populate(&mut self, role: Role, count: i64, out_events: &mut Vec<Event>) {
        let request = match FormationRequest::new(role, count) {
            Ok(request) => request,
            Err(reason) => {
                tracing::warn!(target: "world", %role, count, %reason, "population rejected");
                out_events.push(Event::PopulationRejected { role, reason });
                return;
            }
        };

        let cached = self.cache.contains_key(&request);
        if !cached {
            let mut rng = ChaCha8Rng::seed_from_u64(request_seed(self.seed, request));
            let set = self.generator.generate_request(request, &mut rng);
            tracing::debug!(target: "world", %role, count = set.len(), "generated formation set");
            let _ = self.cache.insert(request, set);
        }
        let _ = self.active.insert(role, request);

        out_events.push(Event::RolePopulated {
            role,
            count: request.count(),
            cached,
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Derives the generation seed of a request so equal requests replay equal sets
/// regardless of the order they arrive in.
fn request_seed(seed: u64, request: FormationRequest) -> u64 {
    let role_index = Role::ALL
        .iter()
        .position(|role| *role == request.role())
        .unwrap_or_default() as u64;
    seed.wrapping_add((role_index + 1).wrapping_mul(ROLE_SEED_STRIDE))
        ^ (request.count() as u64).rotate_left(32)
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.elapsed = world.elapsed.saturating_add(dt);
            world.morph.advance_toward(dt, world.formation);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SetFormation { formation } => world.set_formation(formation, out_events),
        Command::ToggleFormation => {
            let formation = world.formation.toggled();
            world.set_formation(formation, out_events);
        }
        Command::PopulateRole { role, count } => world.populate(role, count, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use evergreen_core::{Formation, FormationSet, Role};

    use super::World;

    /// Formation set currently active for `role`, if the role was populated.
    #[must_use]
    pub fn formation_set(world: &World, role: Role) -> Option<&FormationSet> {
        let request = world.active.get(&role)?;
        world.cache.get(request)
    }

    /// Iterator over every populated role and its active set in draw order.
    pub fn formation_sets(world: &World) -> impl Iterator<Item = &FormationSet> {
        Role::ALL
            .into_iter()
            .filter_map(|role| formation_set(world, role))
    }

    /// Number of formation sets held in the cache, active or not.
    #[must_use]
    pub fn cached_set_count(world: &World) -> usize {
        world.cache.len()
    }

    /// Total number of particles across all active sets.
    #[must_use]
    pub fn particle_count(world: &World) -> usize {
        formation_sets(world).map(FormationSet::len).sum()
    }

    /// Current morph progress in `[0, 1]`.
    #[must_use]
    pub fn progress(world: &World) -> f32 {
        world.morph.progress()
    }

    /// Formation the ensemble currently morphs toward.
    #[must_use]
    pub fn formation(world: &World) -> Formation {
        world.formation
    }

    /// Total ensemble time accumulated from ticks.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Number of ticks applied so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}
