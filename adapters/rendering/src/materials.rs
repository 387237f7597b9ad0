//! Fixed role to material assignments.
//!
//! Every role draws with a single material except gifts, whose set is split
//! into equal contiguous slices, one per wrapping style.

use std::ops::Range;

use evergreen_core::Role;

use crate::{Color, RenderingError};

/// Surface description used to shade prototype geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// Human readable name, used in logs.
    pub name: &'static str,
    /// Albedo color.
    pub base: Color,
    /// Secondary color painted on upward facing faces, such as a gift ribbon.
    pub accent: Option<Color>,
    /// Microfacet roughness in `0.0..=1.0`; lower values read glossier.
    pub roughness: f32,
    /// Metalness in `0.0..=1.0`; metals tint their highlights.
    pub metalness: f32,
    /// Self-illumination added after lighting.
    pub emissive: Color,
    /// Strength of the emissive term.
    pub emissive_intensity: f32,
}

impl Material {
    const fn plain(name: &'static str, base: Color, roughness: f32, metalness: f32) -> Self {
        Self {
            name,
            base,
            accent: None,
            roughness,
            metalness,
            emissive: Color::from_hex(0x000000),
            emissive_intensity: 0.0,
        }
    }

    const fn wrap(name: &'static str, base: Color, accent: Color) -> Self {
        Self {
            accent: Some(accent),
            ..Self::plain(name, base, 0.3, 0.1)
        }
    }

    const fn glowing(self, emissive: Color, intensity: f32) -> Self {
        Self {
            emissive,
            emissive_intensity: intensity,
            ..self
        }
    }
}

/// Deep green, flat shaded filler.
pub const EMERALD: Material = Material::plain("emerald", Color::from_hex(0x004d25), 0.4, 0.1);

/// Polished metallic gold.
pub const GOLD: Material = Material::plain("gold", Color::from_hex(0xFFD700), 0.15, 1.0)
    .glowing(Color::from_hex(0xFDB931), 0.1);

/// Glossy red lacquer.
pub const RED_GLOSS: Material = Material::plain("red gloss", Color::from_hex(0xD90429), 0.05, 0.2);

/// Silky red ribbon.
pub const SILK_RED: Material = Material::plain("silk red", Color::from_hex(0xD6001C), 0.2, 0.3)
    .glowing(Color::from_hex(0x550000), 0.1);

/// Reference gift wrapping styles.
pub const GIFT_WRAPS: [Material; 3] = [
    Material::wrap("classic cross", Color::from_hex(0xC40C0C), Color::from_hex(0xFFFFFF)),
    Material::wrap("gold stripe", Color::from_hex(0x8B0000), Color::from_hex(0xFFD700)),
    Material::wrap("diagonal", Color::from_hex(0xE60000), Color::from_hex(0xFFFFFF)),
];

/// Contiguous run of instances that share a material.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialSlice {
    /// Material used for the run.
    pub material: Material,
    /// Slots covered by the run.
    pub range: Range<usize>,
}

/// Process-wide material assignments for every role and the star.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialTable {
    needle: Material,
    bauble: Material,
    bell: Material,
    ribbon: Material,
    star: Material,
    gift_wraps: Vec<Material>,
}

impl MaterialTable {
    /// Creates a table with the reference materials and the provided gift wraps.
    ///
    /// At least one wrap is required.
    pub fn new(gift_wraps: Vec<Material>) -> Result<Self, RenderingError> {
        if gift_wraps.is_empty() {
            return Err(RenderingError::InvalidVariantCount {
                role: Role::Gift,
                variants: 0,
            });
        }

        Ok(Self {
            needle: EMERALD,
            bauble: RED_GLOSS,
            bell: GOLD,
            ribbon: SILK_RED,
            star: GOLD,
            gift_wraps,
        })
    }

    /// Reference table with the three gift wrapping styles.
    #[must_use]
    pub fn reference() -> Self {
        Self {
            needle: EMERALD,
            bauble: RED_GLOSS,
            bell: GOLD,
            ribbon: SILK_RED,
            star: GOLD,
            gift_wraps: GIFT_WRAPS.to_vec(),
        }
    }

    /// Material variants available to `role`, in slice order.
    #[must_use]
    pub fn variants(&self, role: Role) -> &[Material] {
        match role {
            Role::Needle => std::slice::from_ref(&self.needle),
            Role::Bauble => std::slice::from_ref(&self.bauble),
            Role::Bell => std::slice::from_ref(&self.bell),
            Role::Ribbon => std::slice::from_ref(&self.ribbon),
            Role::Gift => &self.gift_wraps,
        }
    }

    /// Material used for the star anchor.
    #[must_use]
    pub fn star(&self) -> &Material {
        &self.star
    }

    /// Splits `count` slots of `role` into equal contiguous runs, one per variant.
    ///
    /// When the count does not divide evenly the leading runs take one extra
    /// slot each. Empty runs are omitted.
    #[must_use]
    pub fn slices(&self, role: Role, count: usize) -> Vec<MaterialSlice> {
        let variants = self.variants(role);
        let base = count / variants.len();
        let remainder = count % variants.len();

        let mut slices = Vec::with_capacity(variants.len());
        let mut start = 0;
        for (index, material) in variants.iter().enumerate() {
            let len = base + usize::from(index < remainder);
            if len == 0 {
                continue;
            }
            slices.push(MaterialSlice {
                material: *material,
                range: start..start + len,
            });
            start += len;
        }
        slices
    }
}

impl Default for MaterialTable {
    fn default() -> Self {
        Self::reference()
    }
}
