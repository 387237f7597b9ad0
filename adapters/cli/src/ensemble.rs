//! Glue between the world, the transform evaluator and the rendered scene.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use evergreen_core::{Command, Event, Role};
use evergreen_rendering::{FrameInput, Scene};
use evergreen_system_bootstrap::Bootstrap;
use evergreen_system_transform::TransformEvaluator;
use evergreen_world::{apply, query, World, WorldConfig};

/// Running ensemble driven one frame at a time.
#[derive(Debug)]
pub(crate) struct Ensemble {
    world: World,
    evaluator: TransformEvaluator,
    events: Vec<Event>,
}

impl Ensemble {
    /// Creates the world and populates every role requested by `bootstrap`.
    ///
    /// Fails when the tuning is out of range or any role count is rejected.
    pub(crate) fn bootstrap(config: WorldConfig, bootstrap: &Bootstrap) -> Result<Self> {
        let evaluator = TransformEvaluator::new(config.motion.clone(), &config.formation);
        let mut world = World::with_config(config).context("invalid world settings")?;

        let mut commands = Vec::new();
        bootstrap.commands(&mut commands);
        let mut events = Vec::new();
        for command in commands {
            apply(&mut world, command, &mut events);
        }

        if let Some((role, reason)) = bootstrap.rejections(&events).first() {
            bail!("cannot populate {role}: {reason}");
        }

        tracing::info!(
            target: "cli",
            particles = query::particle_count(&world),
            formation = ?query::formation(&world),
            "ensemble ready"
        );
        events.clear();

        Ok(Self {
            world,
            evaluator,
            events,
        })
    }

    /// Applies the frame's input, advances the clock by `dt` and refreshes `scene`.
    pub(crate) fn step(&mut self, dt: Duration, input: FrameInput, scene: &mut Scene) {
        self.events.clear();
        if input.formation_toggle {
            apply(&mut self.world, Command::ToggleFormation, &mut self.events);
        }
        apply(&mut self.world, Command::Tick { dt }, &mut self.events);
        self.fill_scene(scene);
    }

    /// Evaluates every populated role and the star into `scene`.
    pub(crate) fn fill_scene(&self, scene: &mut Scene) {
        let progress = query::progress(&self.world);
        let elapsed = query::elapsed(&self.world).as_secs_f32();

        for role in Role::ALL {
            let out = scene.buffer_mut(role).transforms_mut();
            match query::formation_set(&self.world, role) {
                Some(set) => self.evaluator.evaluate(set, progress, elapsed, out),
                None => out.clear(),
            }
        }
        scene.star = self.evaluator.evaluate_star(progress, elapsed);
        scene.formation = query::formation(&self.world);
        scene.progress = progress;
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }
}
