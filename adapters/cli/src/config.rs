//! Optional TOML tuning file.
//!
//! Every table and key is optional; anything left out keeps the reference
//! value. Unknown keys are rejected so typos surface instead of silently
//! falling back to defaults, and values are range-checked once parsed.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use evergreen_core::{FormationTuning, MotionTuning};
use evergreen_system_bootstrap::RoleCounts;
use serde::Deserialize;

/// Contents of a tuning file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct TuningFile {
    /// Formation geometry overrides.
    pub(crate) formation: FormationTuning,
    /// Motion overrides.
    pub(crate) motion: MotionTuning,
    /// Particle counts per role.
    pub(crate) counts: RoleCounts,
}

impl TuningFile {
    /// Reads and parses the tuning file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read tuning file at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse tuning file at {}", path.display()))
    }

    /// Parses tuning file contents and checks every value is in range.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let tuning: Self = toml::from_str(contents).context("invalid tuning toml")?;
        tuning
            .formation
            .validate()
            .context("invalid [formation] settings")?;
        tuning.motion.validate().context("invalid [motion] settings")?;
        Ok(tuning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_keeps_reference_values() {
        let tuning = TuningFile::parse("").expect("empty file is valid");
        assert_eq!(tuning, TuningFile::default());
    }

    #[test]
    fn partial_tables_override_only_named_keys() {
        let tuning = TuningFile::parse(
            r#"
            [formation]
            tree_height = 20.0

            [formation.ribbon]
            turns = 4.0

            [motion]
            smoothing_rate = 3.0

            [motion.star]
            spin_rate = 0.0

            [counts]
            needle = 1200
            "#,
        )
        .expect("valid tuning");

        assert_eq!(tuning.formation.tree_height, 20.0);
        assert_eq!(
            tuning.formation.tree_base_radius,
            FormationTuning::default().tree_base_radius
        );
        assert_eq!(tuning.formation.ribbon.turns, 4.0);
        assert_eq!(tuning.formation.ribbon.width_base, 0.8);
        assert_eq!(tuning.motion.smoothing_rate, 3.0);
        assert_eq!(tuning.motion.settle_threshold, 0.2);
        assert_eq!(tuning.motion.star.spin_rate, 0.0);
        assert_eq!(tuning.motion.star.base_scale, 1.2);
        assert_eq!(tuning.counts.needle, 1200);
        assert_eq!(tuning.counts.gift, 30);
    }

    #[test]
    fn scale_ranges_and_vectors_use_inline_tables() {
        let tuning = TuningFile::parse(
            r#"
            [formation]
            gift_scale = { min = 0.4, max = 1.0 }

            [motion.star]
            dispersed_position = [0.0, 30.0, 0.0]
            apex_offset = 0.4
            "#,
        )
        .expect("valid tuning");

        assert_eq!(tuning.formation.gift_scale.min, 0.4);
        assert_eq!(tuning.formation.gift_scale.max, 1.0);
        assert_eq!(tuning.motion.star.dispersed_position.y, 30.0);
        assert_eq!(tuning.motion.star.apex_offset, 0.4);
    }

    #[test]
    fn out_of_range_values_are_reported() {
        let error = TuningFile::parse("[formation]\ngift_scale = { min = -1.0, max = -0.5 }\n")
            .expect_err("negative scale");
        let message = format!("{error:#}");
        assert!(message.contains("[formation]"));
        assert!(message.contains("gift_scale"));

        let error = TuningFile::parse("[formation]\nheight_bias = 0.4\n").expect_err("apex bias");
        assert!(format!("{error:#}").contains("height_bias"));

        let error = TuningFile::parse("[motion]\nsettle_threshold = 2.0\n").expect_err("threshold");
        assert!(format!("{error:#}").contains("[motion]"));
    }

    #[test]
    fn unknown_keys_are_reported() {
        let error = TuningFile::parse("[formation]\ntree_hieght = 3.0\n").expect_err("typo");
        assert!(format!("{error:#}").contains("tree_hieght"));
    }

    #[test]
    fn negative_counts_parse_and_are_left_to_generation() {
        let tuning = TuningFile::parse("[counts]\nbell = -4\n").expect("valid toml");
        assert_eq!(tuning.counts.bell, -4);
    }

    #[test]
    fn missing_file_names_the_path() {
        let error = TuningFile::load(Path::new("/definitely/not/here.toml")).expect_err("missing");
        assert!(format!("{error:#}").contains("/definitely/not/here.toml"));
    }
}
