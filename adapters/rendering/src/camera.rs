//! Orbiting camera rig and the fixed light setup.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_3, TAU};

use glam::Vec3;

use crate::{Color, Material};

/// Camera orbiting the ensemble on a sphere around a fixed target.
///
/// Angles are in radians. The polar angle is measured from +Y, so `PI / 2`
/// looks at the target horizontally.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraRig {
    /// Point the camera looks at.
    pub target: Vec3,
    /// Distance from the target.
    pub distance: f32,
    /// Rotation around the vertical axis.
    pub azimuth: f32,
    /// Angle between +Y and the view ray.
    pub polar: f32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Idle rotation applied every second.
    pub auto_rotate_rate: f32,
    /// Closest allowed distance.
    pub min_distance: f32,
    /// Farthest allowed distance.
    pub max_distance: f32,
    /// Smallest allowed polar angle.
    pub min_polar: f32,
    /// Largest allowed polar angle.
    pub max_polar: f32,
}

impl CameraRig {
    /// Advances the idle rotation by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        if dt.is_finite() && dt > 0.0 {
            self.azimuth = (self.azimuth + self.auto_rotate_rate * dt).rem_euclid(TAU);
        }
    }

    /// Rotates the camera, keeping the polar angle inside its limits.
    pub fn orbit(&mut self, azimuth_delta: f32, polar_delta: f32) {
        self.azimuth = (self.azimuth + azimuth_delta).rem_euclid(TAU);
        self.polar = (self.polar + polar_delta).clamp(self.min_polar, self.max_polar);
    }

    /// Moves the camera toward (negative) or away from (positive) the target.
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance + delta).clamp(self.min_distance, self.max_distance);
    }

    /// World-space camera position.
    #[must_use]
    pub fn eye(&self) -> Vec3 {
        let horizontal = self.polar.sin() * self.distance;
        self.target
            + Vec3::new(
                horizontal * self.azimuth.sin(),
                self.polar.cos() * self.distance,
                horizontal * self.azimuth.cos(),
            )
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 22.0,
            azimuth: 0.0,
            polar: FRAC_PI_2,
            fov_degrees: 45.0,
            // One revolution every two minutes.
            auto_rotate_rate: TAU / 120.0,
            min_distance: 10.0,
            max_distance: 40.0,
            min_polar: FRAC_PI_3,
            max_polar: std::f32::consts::PI / 1.8,
        }
    }
}

/// Directional light rig: a warm key light, a tinted rim light and ambient fill.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lighting {
    /// Fill applied to every face regardless of orientation.
    pub ambient: Color,
    /// Direction toward the key light.
    pub key_direction: Vec3,
    /// Key light color.
    pub key_color: Color,
    /// Direction toward the rim light.
    pub rim_direction: Vec3,
    /// Rim light color, already scaled by its intensity.
    pub rim_color: Color,
}

impl Lighting {
    /// Lit color of a face of `material` whose outward normal is `normal`.
    ///
    /// `accent` selects the material's accent color when it has one.
    #[must_use]
    pub fn shade(&self, material: &Material, normal: Vec3, accent: bool) -> Color {
        let albedo = match (accent, material.accent) {
            (true, Some(color)) => color,
            _ => material.base,
        };
        let normal = normal.normalize_or_zero();
        let key = normal.dot(self.key_direction.normalize_or_zero()).max(0.0);
        let rim = normal.dot(self.rim_direction.normalize_or_zero()).max(0.0);

        // Metals lose diffuse and tint their highlight with the albedo.
        let diffuse = key * (1.0 - 0.5 * material.metalness);
        let gloss = (1.0 - material.roughness) * key.powi(8);
        let highlight = self
            .key_color
            .scaled(1.0 - material.metalness)
            .added(albedo.scaled(material.metalness))
            .scaled(gloss);

        albedo
            .modulate(self.ambient.added(self.key_color.scaled(diffuse)))
            .added(highlight)
            .added(self.rim_color.scaled(rim))
            .added(material.emissive.scaled(material.emissive_intensity))
            .saturate()
    }
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: Color::from_hex(0x2a3a33),
            key_direction: Vec3::new(10.0, 20.0, 10.0),
            key_color: Color::from_hex(0xffebc2),
            rim_direction: Vec3::new(-10.0, 5.0, -10.0),
            rim_color: Color::from_hex(0x42f5ad).scaled(0.35),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{EMERALD, GIFT_WRAPS, GOLD};

    #[test]
    fn default_camera_looks_along_negative_z_from_front() {
        let camera = CameraRig::default();
        let eye = camera.eye();
        assert!((eye - Vec3::new(0.0, 0.0, 22.0)).length() < 1e-4);
    }

    #[test]
    fn zoom_and_orbit_respect_limits() {
        let mut camera = CameraRig::default();
        camera.zoom(-100.0);
        assert_eq!(camera.distance, 10.0);
        camera.zoom(100.0);
        assert_eq!(camera.distance, 40.0);

        camera.orbit(0.0, -3.0);
        assert_eq!(camera.polar, camera.min_polar);
        camera.orbit(0.0, 3.0);
        assert_eq!(camera.polar, camera.max_polar);
    }

    #[test]
    fn idle_rotation_wraps_azimuth() {
        let mut camera = CameraRig::default();
        camera.advance(150.0);
        assert!((0.0..TAU).contains(&camera.azimuth));
        assert!((camera.azimuth - TAU * 0.25).abs() < 1e-3);

        let before = camera.azimuth;
        camera.advance(f32::NAN);
        camera.advance(-1.0);
        assert_eq!(camera.azimuth, before);
    }

    #[test]
    fn faces_toward_key_light_are_brighter() {
        let lighting = Lighting::default();
        let lit = lighting.shade(&EMERALD, lighting.key_direction, false);
        let unlit = lighting.shade(&EMERALD, -lighting.key_direction, false);
        assert!(lit.green > unlit.green);
        assert!(lit.red <= 1.0 && lit.green <= 1.0 && lit.blue <= 1.0);
    }

    #[test]
    fn accent_faces_use_accent_color_when_available() {
        let lighting = Lighting::default();
        let up = Vec3::Y;
        let wrap = GIFT_WRAPS[1];
        assert_ne!(lighting.shade(&wrap, up, true), lighting.shade(&wrap, up, false));
        assert_eq!(lighting.shade(&GOLD, up, true), lighting.shade(&GOLD, up, false));
    }
}
