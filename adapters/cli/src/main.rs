#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Evergreen ensemble.

mod config;
mod ensemble;

use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::Parser;
use evergreen_core::{Formation, Role, WINDOW_TITLE};
use evergreen_rendering::{Color, FrameInput, Presentation, RenderingBackend, Scene};
use evergreen_rendering_macroquad::MacroquadBackend;
use evergreen_system_bootstrap::{Bootstrap, RoleCounts};
use evergreen_world::{query, WorldConfig, DEFAULT_SEED};
use tracing_subscriber::EnvFilter;

use self::{config::TuningFile, ensemble::Ensemble};

/// Frame delta used by the headless loop.
const HEADLESS_FRAME: Duration = Duration::from_nanos(16_666_667);

/// Background behind the ensemble.
const CLEAR_COLOR: Color = Color::from_hex(0x020604);

/// Morphing particle ensemble that gathers into a decorated tree.
#[derive(Debug, Parser)]
#[command(name = "evergreen", version)]
struct CliArgs {
    /// Run without a window and print a summary after `--frames` frames.
    #[arg(long)]
    headless: bool,
    /// Number of fixed 1/60 s frames simulated in headless mode.
    #[arg(long, default_value_t = 600)]
    frames: u32,
    /// Seed every generated formation set derives from.
    #[arg(long)]
    seed: Option<u64>,
    /// TOML file overriding formation, motion and count settings.
    #[arg(long, value_name = "PATH")]
    tuning: Option<PathBuf>,
    /// Start morphing toward the tree immediately.
    #[arg(long)]
    assembled: bool,
    /// Synchronise presentation with the display refresh rate.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set, value_name = "BOOL")]
    vsync: bool,
    /// Print frame timing once per second.
    #[arg(long)]
    show_fps: bool,
    /// Number of needles.
    #[arg(long, allow_negative_numbers = true)]
    needles: Option<i64>,
    /// Number of baubles.
    #[arg(long, allow_negative_numbers = true)]
    baubles: Option<i64>,
    /// Number of bells.
    #[arg(long, allow_negative_numbers = true)]
    bells: Option<i64>,
    /// Number of gifts.
    #[arg(long, allow_negative_numbers = true)]
    gifts: Option<i64>,
    /// Number of ribbon segments.
    #[arg(long, allow_negative_numbers = true)]
    ribbon: Option<i64>,
}

impl CliArgs {
    /// Applies per-role count flags on top of `counts`.
    fn override_counts(&self, counts: &mut RoleCounts) {
        let overrides = [
            (Role::Needle, self.needles),
            (Role::Bauble, self.baubles),
            (Role::Bell, self.bells),
            (Role::Gift, self.gifts),
            (Role::Ribbon, self.ribbon),
        ];
        for (role, count) in overrides {
            if let Some(count) = count {
                counts.set(role, count);
            }
        }
    }

    fn formation(&self) -> Formation {
        if self.assembled {
            Formation::Assembled
        } else {
            Formation::Dispersed
        }
    }
}

/// Entry point for the Evergreen command-line interface.
fn main() -> Result<()> {
    init_logging();
    let args = CliArgs::parse();

    let tuning = match &args.tuning {
        Some(path) => TuningFile::load(path)?,
        None => TuningFile::default(),
    };
    let TuningFile {
        formation,
        motion,
        mut counts,
    } = tuning;
    args.override_counts(&mut counts);

    let config = WorldConfig {
        seed: args.seed.unwrap_or(DEFAULT_SEED),
        formation,
        motion,
    };
    let bootstrap = Bootstrap::new(counts, args.formation());
    let ensemble = Ensemble::bootstrap(config, &bootstrap)?;

    if args.headless {
        run_headless(ensemble, args.frames);
        Ok(())
    } else {
        run_windowed(ensemble, &args)
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn run_headless(mut ensemble: Ensemble, frames: u32) {
    let mut scene = Scene::new();
    ensemble.fill_scene(&mut scene);
    for _ in 0..frames {
        ensemble.step(HEADLESS_FRAME, FrameInput::default(), &mut scene);
    }

    let world = ensemble.world();
    for buffer in scene.buffers() {
        tracing::debug!(target: "cli", role = %buffer.role(), instances = buffer.len(), "buffer");
    }
    tracing::info!(
        target: "cli",
        ticks = query::tick_index(world),
        elapsed = ?query::elapsed(world),
        formation = ?scene.formation,
        progress = scene.progress,
        instances = scene.instance_count(),
        star = ?scene.star.translation,
        "headless run finished"
    );
}

fn run_windowed(mut ensemble: Ensemble, args: &CliArgs) -> Result<()> {
    let mut scene = Scene::new();
    ensemble.fill_scene(&mut scene);

    let presentation = Presentation::new(WINDOW_TITLE, CLEAR_COLOR, scene);
    MacroquadBackend::new()
        .with_vsync(args.vsync)
        .with_show_fps(args.show_fps)
        .run(presentation, move |dt, input, scene| {
            ensemble.step(dt, input, scene);
        })
}
