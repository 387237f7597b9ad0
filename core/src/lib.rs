#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Evergreen ensemble.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing the formation the user asked for and the time that elapsed, the
//! world executes those commands via its `apply` entry point, and then
//! broadcasts [`Event`] values. Systems consume immutable [`FormationSet`]
//! data and produce [`Transform`] streams without retaining per-particle
//! state.

mod tuning;

use std::{fmt, str::FromStr, time::Duration};

use glam::{Mat3, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use tuning::{
    FormationTuning, MotionTuning, OrnamentPush, RibbonTuning, ScaleRange, StarTuning,
    TuningError,
};

/// Canonical title shown when the experience boots.
pub const WINDOW_TITLE: &str = "Evergreen";

/// Largest particle count accepted for a single role.
pub const MAX_PARTICLES_PER_ROLE: usize = 1_000_000;

/// Identifier offset applied to ribbon segments so their motion phases never
/// line up with the other roles.
pub const RIBBON_ID_BASE: u32 = 20_000;

/// One of the two end states an ensemble can be posed in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Formation {
    /// Particles float inside the scatter sphere.
    #[default]
    Dispersed,
    /// Particles sit on the tree cone.
    Assembled,
}

impl Formation {
    /// Progress value the morph state converges to for this formation.
    #[must_use]
    pub const fn target_progress(self) -> f32 {
        match self {
            Self::Dispersed => 0.0,
            Self::Assembled => 1.0,
        }
    }

    /// Returns the opposite formation.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Dispersed => Self::Assembled,
            Self::Assembled => Self::Dispersed,
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the ensemble clock and the morph progress by the provided delta.
    Tick {
        /// Duration of time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the ensemble morph toward the provided formation.
    SetFormation {
        /// Formation the ensemble should converge to.
        formation: Formation,
    },
    /// Requests that the ensemble morph toward the opposite formation.
    ToggleFormation,
    /// Requests that a role be populated with the provided number of particles.
    ///
    /// The count is signed so that malformed requests coming from adapters
    /// reach the generation boundary and are rejected there.
    PopulateRole {
        /// Role that should be populated.
        role: Role,
        /// Requested particle count.
        count: i64,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the ensemble clock advanced.
    TimeAdvanced {
        /// Duration of time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the ensemble now morphs toward a new formation.
    FormationChanged {
        /// Formation that became the morph target.
        formation: Formation,
    },
    /// Confirms that a role holds a generated formation set.
    RolePopulated {
        /// Role whose set is available.
        role: Role,
        /// Number of records in the set.
        count: usize,
        /// Whether the set was served from the cache instead of being generated.
        cached: bool,
    },
    /// Reports that a population request was rejected.
    PopulationRejected {
        /// Role named in the request.
        role: Role,
        /// Specific reason the request failed.
        reason: GenerationError,
    },
}

/// Element roles that make up the ensemble.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// Fine filler element that gives the tree its volume.
    Needle,
    /// Round ornament.
    Bauble,
    /// Pendant ornament that sways once assembled.
    Bell,
    /// Boxed ornament that spins once assembled.
    Gift,
    /// Ribbon segment laid along the spiral path.
    Ribbon,
}

impl Role {
    /// Every role in stable draw order.
    pub const ALL: [Role; 5] = [
        Role::Needle,
        Role::Ribbon,
        Role::Bauble,
        Role::Bell,
        Role::Gift,
    ];

    /// Lower-case name used by configuration files and the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Needle => "needle",
            Self::Bauble => "bauble",
            Self::Bell => "bell",
            Self::Gift => "gift",
            Self::Ribbon => "ribbon",
        }
    }

    /// Identifier assigned to the first record generated for the role.
    #[must_use]
    pub const fn id_base(self) -> u32 {
        match self {
            Self::Ribbon => RIBBON_ID_BASE,
            _ => 0,
        }
    }

    /// Number of material variants the renderer cycles through for the role.
    ///
    /// Gifts come in three wrapping styles; every other role has one material.
    #[must_use]
    pub const fn material_variants(self) -> usize {
        match self {
            Self::Gift => 3,
            _ => 1,
        }
    }

    /// Particle count used by the reference ensemble.
    #[must_use]
    pub const fn default_count(self) -> usize {
        match self {
            Self::Needle => 3_500,
            Self::Bauble => 80,
            Self::Bell => 70,
            Self::Gift => 30,
            Self::Ribbon => 2_000,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Role {
    type Err = GenerationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalised = value.trim().to_ascii_lowercase();
        Role::ALL
            .into_iter()
            .find(|role| role.name() == normalised)
            .ok_or_else(|| GenerationError::UnknownRole {
                name: value.to_owned(),
            })
    }
}

/// Identifier of a single particle, unique within its role.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ParticleId(u32);

impl ParticleId {
    /// Creates a new particle identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Identifier as a phase offset for secondary motion.
    #[must_use]
    pub fn phase(&self) -> f32 {
        self.0 as f32
    }
}

/// Immutable geometry of a single particle in both formations.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleRecord {
    /// Identifier unique within the owning role.
    pub id: ParticleId,
    /// Location inside the scatter sphere.
    pub dispersed_position: Vec3,
    /// Location on the tree cone.
    pub assembled_position: Vec3,
    /// Resting XYZ Euler orientation while dispersed, in radians.
    pub base_rotation: Vec3,
    /// Nominal size of the element.
    pub base_scale: f32,
    /// Frequency multiplier for floating and swaying motion.
    pub motion_speed: f32,
}

/// Ordered, immutable collection of particle records for one role.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormationSet {
    role: Role,
    records: Vec<ParticleRecord>,
    tangents: Vec<Quat>,
}

impl FormationSet {
    /// Creates a set from records in generation order.
    #[must_use]
    pub fn new(role: Role, records: Vec<ParticleRecord>) -> Self {
        Self {
            role,
            records,
            tangents: Vec::new(),
        }
    }

    /// Creates a path-following set whose records carry a precomputed tangent frame.
    ///
    /// `tangents` must hold one orientation per record.
    #[must_use]
    pub fn with_tangents(role: Role, records: Vec<ParticleRecord>, tangents: Vec<Quat>) -> Self {
        debug_assert_eq!(records.len(), tangents.len(), "one tangent per record");
        Self {
            role,
            records,
            tangents,
        }
    }

    /// Creates an empty set for the provided role.
    #[must_use]
    pub fn empty(role: Role) -> Self {
        Self::new(role, Vec::new())
    }

    /// Role shared by every record in the set.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Records in stable buffer order.
    #[must_use]
    pub fn records(&self) -> &[ParticleRecord] {
        &self.records
    }

    /// Iterator over the records in stable buffer order.
    pub fn iter(&self) -> impl Iterator<Item = &ParticleRecord> {
        self.records.iter()
    }

    /// Number of records in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Reports whether the set holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Precomputed path orientation of the record at `index`, if the set carries one.
    #[must_use]
    pub fn tangent(&self, index: usize) -> Option<Quat> {
        self.tangents.get(index).copied()
    }

    /// All precomputed path orientations; empty for sets without a path.
    #[must_use]
    pub fn tangents(&self) -> &[Quat] {
        &self.tangents
    }
}

/// Validated request to generate a formation set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FormationRequest {
    role: Role,
    count: usize,
}

impl FormationRequest {
    /// Validates a signed particle count for the provided role.
    ///
    /// Returns an error when the count is negative or exceeds
    /// [`MAX_PARTICLES_PER_ROLE`]. A count of zero is valid.
    pub fn new(role: Role, count: i64) -> Result<Self, GenerationError> {
        if count < 0 {
            return Err(GenerationError::NegativeCount { role, count });
        }

        let count = usize::try_from(count).map_err(|_| GenerationError::CountTooLarge {
            role,
            count,
            max: MAX_PARTICLES_PER_ROLE,
        })?;
        if count > MAX_PARTICLES_PER_ROLE {
            return Err(GenerationError::CountTooLarge {
                role,
                count: count as i64,
                max: MAX_PARTICLES_PER_ROLE,
            });
        }

        Ok(Self { role, count })
    }

    /// Role the request targets.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Number of records the generated set will hold.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }
}

/// Final visual transform of a single element for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// World-space position.
    pub translation: Vec3,
    /// World-space orientation.
    pub rotation: Quat,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Transform {
    /// Transform that leaves geometry untouched.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Creates a new transform from its components.
    #[must_use]
    pub const fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Composes the transform into a column-major model matrix.
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Builds an orientation from intrinsic XYZ Euler angles in radians.
///
/// The X rotation is applied outermost, matching `Rx * Ry * Rz`. The order is
/// pinned here instead of going through `glam::EulerRot`, whose orders have
/// been redefined between glam releases.
#[must_use]
pub fn quat_from_euler_xyz(euler: Vec3) -> Quat {
    Quat::from_rotation_x(euler.x) * Quat::from_rotation_y(euler.y) * Quat::from_rotation_z(euler.z)
}

/// Decomposes an orientation into intrinsic XYZ Euler angles in radians.
///
/// Inverse of [`quat_from_euler_xyz`]. Near gimbal lock the Z angle is
/// folded into X.
#[must_use]
pub fn euler_xyz_from_quat(rotation: Quat) -> Vec3 {
    let m = Mat3::from_quat(rotation);
    let m13 = m.z_axis.x;
    let y = m13.clamp(-1.0, 1.0).asin();
    if m13.abs() < 0.999_999_9 {
        let x = (-m.z_axis.y).atan2(m.z_axis.z);
        let z = (-m.y_axis.x).atan2(m.x_axis.x);
        Vec3::new(x, y, z)
    } else {
        let x = m.y_axis.z.atan2(m.y_axis.y);
        Vec3::new(x, y, 0.0)
    }
}

/// Reasons a generation request may be rejected.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// The requested particle count was negative.
    #[error("{role} count must not be negative (received {count})")]
    NegativeCount {
        /// Role named in the request.
        role: Role,
        /// Count that failed validation.
        count: i64,
    },
    /// The requested particle count exceeded the supported maximum.
    #[error("{role} count {count} exceeds the maximum of {max}")]
    CountTooLarge {
        /// Role named in the request.
        role: Role,
        /// Count that failed validation.
        count: i64,
        /// Largest accepted count.
        max: usize,
    },
    /// The role name did not match any known role.
    #[error("unknown role '{name}' (expected one of needle, bauble, bell, gift, ribbon)")]
    UnknownRole {
        /// Name that failed to parse.
        name: String,
    },
}
