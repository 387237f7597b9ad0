//! Named tuning knobs for formation geometry and morph motion.
//!
//! Every field defaults to the reference look. Adapters may deserialize
//! partial tables from configuration files; missing keys keep their defaults.
//! Deserialized values bypass the constructors, so consumers call
//! [`FormationTuning::validate`] and [`MotionTuning::validate`] before use.

use std::f32::consts::FRAC_PI_4;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Role;

/// Reasons a set of tuning values is rejected.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TuningError {
    /// The value must exceed a lower bound.
    #[error("{field} must be greater than {bound} (received {value})")]
    NotGreater {
        /// Name of the offending field.
        field: &'static str,
        /// Value that failed validation.
        value: f32,
        /// Exclusive lower bound.
        bound: f32,
    },
    /// The value must stay below an upper bound.
    #[error("{field} must be less than {bound} (received {value})")]
    NotLess {
        /// Name of the offending field.
        field: &'static str,
        /// Value that failed validation.
        value: f32,
        /// Exclusive upper bound.
        bound: f32,
    },
    /// The value must reach a lower bound.
    #[error("{field} must be at least {min} (received {value})")]
    TooSmall {
        /// Name of the offending field.
        field: &'static str,
        /// Value that failed validation.
        value: f32,
        /// Inclusive lower bound.
        min: f32,
    },
    /// The value must lie inside a closed interval.
    #[error("{field} must lie in [{min}, {max}] (received {value})")]
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// Value that failed validation.
        value: f32,
        /// Inclusive lower bound.
        min: f32,
        /// Inclusive upper bound.
        max: f32,
    },
    /// A range was given with its bounds in reverse.
    #[error("{field} range is reversed (min {min} > max {max})")]
    ReversedRange {
        /// Name of the offending range.
        field: &'static str,
        /// Lower bound as given.
        min: f32,
        /// Upper bound as given.
        max: f32,
    },
}

fn greater_than(field: &'static str, value: f32, bound: f32) -> Result<(), TuningError> {
    if value.is_finite() && value > bound {
        Ok(())
    } else {
        Err(TuningError::NotGreater {
            field,
            value,
            bound,
        })
    }
}

fn at_least(field: &'static str, value: f32, min: f32) -> Result<(), TuningError> {
    if value.is_finite() && value >= min {
        Ok(())
    } else {
        Err(TuningError::TooSmall { field, value, min })
    }
}

fn less_than(field: &'static str, value: f32, bound: f32) -> Result<(), TuningError> {
    if value < bound {
        Ok(())
    } else {
        Err(TuningError::NotLess {
            field,
            value,
            bound,
        })
    }
}

fn within(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), TuningError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(TuningError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

/// Closed range a uniform draw is taken from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScaleRange {
    /// Smallest value that may be drawn.
    pub min: f32,
    /// Largest value that may be drawn.
    pub max: f32,
}

impl ScaleRange {
    /// Creates a new range; the bounds are swapped when given in reverse.
    #[must_use]
    pub fn new(min: f32, max: f32) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Maps a unit sample in `[0, 1)` onto the range.
    #[must_use]
    pub fn lerp(&self, unit: f32) -> f32 {
        self.min + (self.max - self.min) * unit
    }

    /// Reports whether the value lies inside the range.
    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Checks that both bounds are finite, positive and in order.
    pub fn validate_positive(&self, field: &'static str) -> Result<(), TuningError> {
        if self.min > self.max {
            return Err(TuningError::ReversedRange {
                field,
                min: self.min,
                max: self.max,
            });
        }
        greater_than(field, self.min, 0.0)?;
        greater_than(field, self.max, 0.0)
    }
}

/// Outward push applied to ornament cone positions on the horizontal axes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrnamentPush {
    /// Multiplier applied to round ornaments.
    pub bauble: f32,
    /// Multiplier applied to pendant ornaments.
    pub bell: f32,
    /// Multiplier applied to boxed ornaments.
    pub gift: f32,
    /// Horizontal radius below which no push is applied.
    pub min_radius: f32,
}

impl Default for OrnamentPush {
    fn default() -> Self {
        Self {
            bauble: 1.15,
            bell: 1.05,
            gift: 1.05,
            min_radius: 0.1,
        }
    }
}

/// Shape of the ribbon spiral wound around the tree cone.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RibbonTuning {
    /// Number of times the ribbon wraps around the cone.
    pub turns: f32,
    /// Distance below the apex where the ribbon starts.
    pub apex_offset: f32,
    /// Multiplier applied to the cone radius so the ribbon floats outside the needles.
    pub radius_flare: f32,
    /// Amplitude of the periodic drape added to the radius.
    pub drape_amplitude: f32,
    /// Number of full drape cycles along the ribbon.
    pub drape_cycles: f32,
    /// Mean segment width.
    pub width_base: f32,
    /// Amplitude of the width ripple.
    pub width_amplitude: f32,
    /// Number of full width ripple cycles along the ribbon.
    pub width_cycles: f32,
    /// Range of secondary motion frequency multipliers.
    pub motion_speed: ScaleRange,
}

impl Default for RibbonTuning {
    fn default() -> Self {
        Self {
            turns: 6.0,
            apex_offset: 0.5,
            radius_flare: 1.3,
            drape_amplitude: 0.15,
            drape_cycles: 6.0,
            width_base: 0.8,
            width_amplitude: 0.5,
            width_cycles: 4.0,
            motion_speed: ScaleRange::new(0.5, 1.0),
        }
    }
}

/// Geometry constants used when generating formation sets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormationTuning {
    /// Radius of the sphere the dispersed formation fills.
    pub scatter_radius: f32,
    /// Total height of the tree cone, centred on the origin.
    pub tree_height: f32,
    /// Radius of the tree cone at its base.
    pub tree_base_radius: f32,
    /// Exponent applied to the height draw; values above one bias toward the base.
    pub height_bias: f32,
    /// Azimuth increment per particle index, in degrees.
    pub golden_angle_degrees: f32,
    /// Lower bound of the radial jitter factor; the upper bound is one.
    pub radial_jitter_min: f32,
    /// Outward push applied to ornaments.
    pub ornament_push: OrnamentPush,
    /// Scale range of needles.
    pub needle_scale: ScaleRange,
    /// Scale range of baubles.
    pub bauble_scale: ScaleRange,
    /// Scale range of bells.
    pub bell_scale: ScaleRange,
    /// Scale range of gifts.
    pub gift_scale: ScaleRange,
    /// Range of secondary motion frequency multipliers for cone roles.
    pub motion_speed: ScaleRange,
    /// Ribbon spiral shape.
    pub ribbon: RibbonTuning,
}

impl FormationTuning {
    /// Uniform scale range drawn for cone roles.
    ///
    /// Ribbon widths follow the spiral ripple instead and report the needle range.
    #[must_use]
    pub fn scale_range(&self, role: Role) -> ScaleRange {
        match role {
            Role::Needle | Role::Ribbon => self.needle_scale,
            Role::Bauble => self.bauble_scale,
            Role::Bell => self.bell_scale,
            Role::Gift => self.gift_scale,
        }
    }

    /// Horizontal push factor applied to the role's cone position.
    #[must_use]
    pub fn push_factor(&self, role: Role) -> f32 {
        match role {
            Role::Bauble => self.ornament_push.bauble,
            Role::Bell => self.ornament_push.bell,
            Role::Gift => self.ornament_push.gift,
            Role::Needle | Role::Ribbon => 1.0,
        }
    }

    /// Height of the cone apex.
    #[must_use]
    pub fn apex_height(&self) -> f32 {
        self.tree_height * 0.5
    }

    /// Rejects values that would break the formation geometry.
    ///
    /// Dimensions and scales must be positive, the height draw must stay
    /// biased toward the base and ornament pushes may only move outward.
    pub fn validate(&self) -> Result<(), TuningError> {
        greater_than("scatter_radius", self.scatter_radius, 0.0)?;
        greater_than("tree_height", self.tree_height, 0.0)?;
        greater_than("tree_base_radius", self.tree_base_radius, 0.0)?;
        greater_than("height_bias", self.height_bias, 1.0)?;
        within("radial_jitter_min", self.radial_jitter_min, 0.0, 1.0)?;

        let push = &self.ornament_push;
        for (field, factor) in [
            ("ornament_push.bauble", push.bauble),
            ("ornament_push.bell", push.bell),
            ("ornament_push.gift", push.gift),
        ] {
            at_least(field, factor, 1.0)?;
        }
        at_least("ornament_push.min_radius", push.min_radius, 0.0)?;

        self.needle_scale.validate_positive("needle_scale")?;
        self.bauble_scale.validate_positive("bauble_scale")?;
        self.bell_scale.validate_positive("bell_scale")?;
        self.gift_scale.validate_positive("gift_scale")?;
        self.motion_speed.validate_positive("motion_speed")?;

        let ribbon = &self.ribbon;
        greater_than("ribbon.turns", ribbon.turns, 0.0)?;
        greater_than("ribbon.radius_flare", ribbon.radius_flare, 0.0)?;
        greater_than("ribbon.width_base", ribbon.width_base, 0.0)?;
        at_least("ribbon.width_amplitude", ribbon.width_amplitude, 0.0)?;
        // Widths must stay positive at the trough of the ripple.
        less_than("ribbon.width_amplitude", ribbon.width_amplitude, ribbon.width_base)?;
        ribbon.motion_speed.validate_positive("ribbon.motion_speed")
    }
}

impl Default for FormationTuning {
    fn default() -> Self {
        Self {
            scatter_radius: 35.0,
            tree_height: 13.0,
            tree_base_radius: 6.0,
            height_bias: 1.6,
            golden_angle_degrees: 137.5,
            radial_jitter_min: 0.3,
            ornament_push: OrnamentPush::default(),
            needle_scale: ScaleRange::new(0.8, 1.2),
            bauble_scale: ScaleRange::new(0.5, 1.3),
            bell_scale: ScaleRange::new(0.6, 1.2),
            gift_scale: ScaleRange::new(0.5, 0.9),
            motion_speed: ScaleRange::new(0.2, 1.0),
            ribbon: RibbonTuning::default(),
        }
    }
}

/// Motion of the single star anchor sitting on the apex.
///
/// The assembled position is not stored here; it follows the apex of the
/// cone described by [`FormationTuning`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StarTuning {
    /// Position while the ensemble is dispersed.
    pub dispersed_position: Vec3,
    /// Height above the cone apex the star settles at once assembled.
    pub apex_offset: f32,
    /// Spin around the vertical axis, in radians per second.
    pub spin_rate: f32,
    /// Nominal size.
    pub base_scale: f32,
    /// Amplitude of the breathing oscillation.
    pub breath_amplitude: f32,
    /// Angular frequency of the breathing oscillation.
    pub breath_rate: f32,
}

impl Default for StarTuning {
    fn default() -> Self {
        Self {
            dispersed_position: Vec3::new(0.0, 25.0, 0.0),
            apex_offset: 0.1,
            spin_rate: 0.8,
            base_scale: 1.2,
            breath_amplitude: 0.05,
            breath_rate: 3.0,
        }
    }
}

/// Constants that shape the per-frame morph evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MotionTuning {
    /// Exponential smoothing rate `k` of the morph progress.
    pub smoothing_rate: f32,
    /// Progress below which cone roles tumble instead of settling.
    pub settle_threshold: f32,
    /// Progress below which ribbon segments tumble instead of following the path.
    pub ribbon_settle_threshold: f32,
    /// Peak extra scale reached half way through a transition.
    pub pop_amplitude: f32,
    /// Floating amplitude of needles while dispersed.
    pub needle_float: f32,
    /// Floating amplitude of ornaments while dispersed.
    pub ornament_float: f32,
    /// Floating amplitude of ribbon segments while dispersed.
    pub ribbon_float: f32,
    /// Multiplier applied to ribbon ids before they enter the motion phase.
    pub ribbon_phase_spacing: f32,
    /// Ratio between the vertical and horizontal ribbon float frequencies.
    pub ribbon_vertical_ratio: f32,
    /// Tilt of assembled needles around the Z axis, in radians.
    pub needle_tilt: f32,
    /// Amplitude of the bell wind sway, in radians.
    pub bell_wind_amplitude: f32,
    /// Angular frequency of the bell wind sway.
    pub bell_wind_rate: f32,
    /// Spin of assembled gifts, in radians per second.
    pub gift_spin_rate: f32,
    /// Amplitude of the ribbon width breathing.
    pub ribbon_breath_amplitude: f32,
    /// Angular frequency of the ribbon width breathing.
    pub ribbon_breath_rate: f32,
    /// Phase step between neighbouring ribbon segments.
    pub ribbon_breath_spacing: f32,
    /// Star anchor motion.
    pub star: StarTuning,
}

impl MotionTuning {
    /// Rejects values that would stall the morph or collapse sizes.
    pub fn validate(&self) -> Result<(), TuningError> {
        greater_than("smoothing_rate", self.smoothing_rate, 0.0)?;
        within("settle_threshold", self.settle_threshold, 0.0, 1.0)?;
        within("ribbon_settle_threshold", self.ribbon_settle_threshold, 0.0, 1.0)?;
        within("pop_amplitude", self.pop_amplitude, 0.0, 1.0)?;
        at_least("ribbon_breath_amplitude", self.ribbon_breath_amplitude, 0.0)?;
        less_than("ribbon_breath_amplitude", self.ribbon_breath_amplitude, 1.0)?;

        let star = &self.star;
        greater_than("star.base_scale", star.base_scale, 0.0)?;
        at_least("star.breath_amplitude", star.breath_amplitude, 0.0)?;
        less_than("star.breath_amplitude", star.breath_amplitude, star.base_scale)
    }
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            smoothing_rate: 1.5,
            settle_threshold: 0.2,
            ribbon_settle_threshold: 0.9,
            pop_amplitude: 0.2,
            needle_float: 0.5,
            ornament_float: 1.0,
            ribbon_float: 2.5,
            ribbon_phase_spacing: 0.1,
            ribbon_vertical_ratio: 0.6,
            needle_tilt: FRAC_PI_4,
            bell_wind_amplitude: 0.1,
            bell_wind_rate: 2.0,
            gift_spin_rate: 0.5,
            ribbon_breath_amplitude: 0.1,
            ribbon_breath_rate: 2.0,
            ribbon_breath_spacing: 0.05,
            star: StarTuning::default(),
        }
    }
}
