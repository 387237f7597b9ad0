#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Evergreen adapters.
//!
//! The world and the transform evaluator know nothing about meshes or
//! materials. This crate owns the per-role instance buffers they write into,
//! the fixed material and prototype geometry tables, and the camera rig that
//! backends present the ensemble through.

pub mod camera;
pub mod geometry;
pub mod materials;

use anyhow::Result as AnyResult;
use evergreen_core::{Formation, Role, Transform};
use std::{error::Error, fmt, time::Duration};

pub use camera::{CameraRig, Lighting};
pub use geometry::{PrototypeMesh, Shape};
pub use materials::{Material, MaterialSlice, MaterialTable};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Creates an opaque color from a `0xRRGGBB` literal.
    #[must_use]
    pub const fn from_hex(rgb: u32) -> Self {
        Self::from_rgb_u8((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }

    /// Multiplies the color channels by `factor`, leaving alpha untouched.
    #[must_use]
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            red: self.red * factor,
            green: self.green * factor,
            blue: self.blue * factor,
            alpha: self.alpha,
        }
    }

    /// Channel-wise product of two colors, keeping the alpha of `self`.
    #[must_use]
    pub fn modulate(self, other: Self) -> Self {
        Self {
            red: self.red * other.red,
            green: self.green * other.green,
            blue: self.blue * other.blue,
            alpha: self.alpha,
        }
    }

    /// Channel-wise sum of two colors, keeping the alpha of `self`.
    #[must_use]
    pub fn added(self, other: Self) -> Self {
        Self {
            red: self.red + other.red,
            green: self.green + other.green,
            blue: self.blue + other.blue,
            alpha: self.alpha,
        }
    }

    /// Clamps every channel into `0.0..=1.0`.
    #[must_use]
    pub fn saturate(self) -> Self {
        Self {
            red: self.red.clamp(0.0, 1.0),
            green: self.green.clamp(0.0, 1.0),
            blue: self.blue.clamp(0.0, 1.0),
            alpha: self.alpha.clamp(0.0, 1.0),
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Whether the adapter detected a formation toggle press on this frame.
    pub formation_toggle: bool,
}

/// Ordered transforms of every element of one role for the current frame.
///
/// Slot `i` always holds record `i` of the role's formation set.
#[derive(Clone, Debug, PartialEq)]
pub struct InstanceBuffer {
    role: Role,
    transforms: Vec<Transform>,
}

impl InstanceBuffer {
    /// Creates an empty buffer for the provided role.
    #[must_use]
    pub fn new(role: Role) -> Self {
        Self {
            role,
            transforms: Vec::new(),
        }
    }

    /// Role whose elements the buffer holds.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Transforms in slot order.
    #[must_use]
    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    /// Mutable storage the evaluator writes into; capacity is kept across frames.
    pub fn transforms_mut(&mut self) -> &mut Vec<Transform> {
        &mut self.transforms
    }

    /// Number of instances in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Reports whether the buffer holds no instances.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Splits the buffer into contiguous runs that share a material.
    #[must_use]
    pub fn material_slices(&self, materials: &MaterialTable) -> Vec<MaterialSlice> {
        materials.slices(self.role, self.transforms.len())
    }
}

/// Declarative description of everything drawn in a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    buffers: Vec<InstanceBuffer>,
    /// Transform of the star anchor.
    pub star: Transform,
    /// Formation the ensemble is heading toward.
    pub formation: Formation,
    /// Morph progress used to evaluate the buffers.
    pub progress: f32,
}

impl Scene {
    /// Creates a scene with one empty buffer per role.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffers: Role::ALL.into_iter().map(InstanceBuffer::new).collect(),
            star: Transform::IDENTITY,
            formation: Formation::default(),
            progress: 0.0,
        }
    }

    /// Buffer holding the transforms of `role`.
    #[must_use]
    pub fn buffer(&self, role: Role) -> &InstanceBuffer {
        &self.buffers[slot(role)]
    }

    /// Mutable buffer holding the transforms of `role`.
    pub fn buffer_mut(&mut self, role: Role) -> &mut InstanceBuffer {
        &mut self.buffers[slot(role)]
    }

    /// Every buffer in draw order.
    pub fn buffers(&self) -> impl Iterator<Item = &InstanceBuffer> {
        self.buffers.iter()
    }

    /// Total number of role instances, excluding the star.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.buffers.iter().map(InstanceBuffer::len).sum()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

const fn slot(role: Role) -> usize {
    match role {
        Role::Needle => 0,
        Role::Ribbon => 1,
        Role::Bauble => 2,
        Role::Bell => 3,
        Role::Gift => 4,
    }
}

/// Complete description of what the backend should present.
#[derive(Clone, Debug)]
pub struct Presentation {
    /// Title used for the window.
    pub window_title: String,
    /// Background color behind the ensemble.
    pub clear_color: Color,
    /// Initial scene contents.
    pub scene: Scene,
    /// Role to material assignments.
    pub materials: MaterialTable,
    /// Orbiting camera the ensemble is viewed through.
    pub camera: CameraRig,
    /// Light rig used to shade prototype geometry.
    pub lighting: Lighting,
}

impl Presentation {
    /// Creates a presentation with the reference material table, camera and lighting.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
            materials: MaterialTable::reference(),
            camera: CameraRig::default(),
            lighting: Lighting::default(),
        }
    }
}

/// Rendering backend capable of presenting Evergreen scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// per-frame input captured by the adapter, and refreshes the scene before
    /// it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// A role needs at least one material variant to be drawable.
    InvalidVariantCount {
        /// Role whose variant list failed validation.
        role: Role,
        /// Provided number of variants.
        variants: usize,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidVariantCount { role, variants } => {
                write!(
                    f,
                    "{role} needs at least one material variant (received {variants})"
                )
            }
        }
    }
}

impl Error for RenderingError {}
