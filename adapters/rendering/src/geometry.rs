//! Prototype geometry shared by every instance of a role.
//!
//! Meshes are flat shaded: each triangle owns its three vertices and carries
//! its face normal, which keeps the faceted look of the needles and lets the
//! backend shade per face without smoothing groups.

use std::f32::consts::{PI, TAU};

use evergreen_core::Role;
use glam::Vec3;

/// Parametric description of a prototype mesh in local space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    /// Pointed cone along +Y, centred on the origin.
    Cone {
        /// Radius of the base.
        radius: f32,
        /// Distance from base to apex.
        height: f32,
        /// Number of sides around the axis.
        sides: u16,
    },
    /// Latitude and longitude sphere centred on the origin.
    Sphere {
        /// Sphere radius.
        radius: f32,
        /// Number of latitude bands.
        rings: u16,
        /// Number of longitude segments.
        segments: u16,
    },
    /// Truncated cone along +Y shifted by `drop` so it hangs below its anchor.
    Frustum {
        /// Radius of the top cap.
        top_radius: f32,
        /// Radius of the bottom cap.
        bottom_radius: f32,
        /// Distance between the caps.
        height: f32,
        /// Number of sides around the axis.
        sides: u16,
        /// Vertical offset applied after building.
        drop: f32,
    },
    /// Axis aligned box centred on the origin.
    Cuboid {
        /// Full extent along each axis.
        size: Vec3,
    },
    /// Extruded star outline in the XY plane with one spike pointing up.
    Star {
        /// Number of spikes.
        points: u16,
        /// Distance from the centre to a spike tip.
        outer_radius: f32,
        /// Distance from the centre to a notch between spikes.
        inner_radius: f32,
        /// Thickness along Z.
        depth: f32,
    },
}

impl Shape {
    /// Prototype of the star anchor.
    pub const STAR: Self = Self::Star {
        points: 5,
        outer_radius: 0.9,
        inner_radius: 0.45,
        depth: 0.3,
    };

    /// Prototype drawn for every element of `role`.
    #[must_use]
    pub const fn for_role(role: Role) -> Self {
        match role {
            Role::Needle => Self::Cone {
                radius: 0.08,
                height: 0.45,
                sides: 4,
            },
            Role::Bauble => Self::Sphere {
                radius: 0.3,
                rings: 8,
                segments: 12,
            },
            Role::Bell => Self::Frustum {
                top_radius: 0.1,
                bottom_radius: 0.4,
                height: 0.5,
                sides: 16,
                drop: -0.25,
            },
            Role::Gift => Self::Cuboid {
                size: Vec3::splat(0.5),
            },
            // Long along Z so neighbouring segments overlap along the path.
            Role::Ribbon => Self::Cuboid {
                size: Vec3::new(0.15, 0.01, 0.12),
            },
        }
    }
}

/// Triangle list with one face normal per vertex.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PrototypeMesh {
    /// Vertex positions in local space.
    pub positions: Vec<Vec3>,
    /// Outward face normal of the triangle each vertex belongs to.
    pub normals: Vec<Vec3>,
    /// Triangle indices; every three consecutive entries form one face.
    pub indices: Vec<u16>,
}

impl PrototypeMesh {
    /// Triangulates `shape` with counter-clockwise outward facing triangles.
    #[must_use]
    pub fn build(shape: &Shape) -> Self {
        let mut mesh = Self::default();
        match *shape {
            Shape::Cone {
                radius,
                height,
                sides,
            } => mesh.frustum(0.0, radius, height, sides, 0.0),
            Shape::Sphere {
                radius,
                rings,
                segments,
            } => mesh.sphere(radius, rings, segments),
            Shape::Frustum {
                top_radius,
                bottom_radius,
                height,
                sides,
                drop,
            } => mesh.frustum(top_radius, bottom_radius, height, sides, drop),
            Shape::Cuboid { size } => mesh.cuboid(size * 0.5),
            Shape::Star {
                points,
                outer_radius,
                inner_radius,
                depth,
            } => mesh.star(points, outer_radius, inner_radius, depth),
        }
        mesh
    }

    /// Number of triangles in the mesh.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Smallest box enclosing every vertex, as `(min, max)`.
    #[must_use]
    pub fn bounds(&self) -> (Vec3, Vec3) {
        self.positions.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), position| (min.min(*position), max.max(*position)),
        )
    }

    fn triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        let normal = (b - a).cross(c - a).normalize_or_zero();
        for position in [a, b, c] {
            self.indices.push(self.positions.len() as u16);
            self.positions.push(position);
            self.normals.push(normal);
        }
    }

    fn quad(&mut self, a: Vec3, b: Vec3, c: Vec3, d: Vec3) {
        self.triangle(a, b, c);
        self.triangle(a, c, d);
    }

    fn frustum(&mut self, top_radius: f32, bottom_radius: f32, height: f32, sides: u16, drop: f32) {
        let sides = sides.max(3);
        let top_y = height * 0.5 + drop;
        let bottom_y = -height * 0.5 + drop;
        let ring = |radius: f32, y: f32, index: u16| {
            let theta = f32::from(index % sides) * TAU / f32::from(sides);
            Vec3::new(radius * theta.sin(), y, radius * theta.cos())
        };
        let top_centre = Vec3::new(0.0, top_y, 0.0);
        let bottom_centre = Vec3::new(0.0, bottom_y, 0.0);

        for index in 0..sides {
            let b0 = ring(bottom_radius, bottom_y, index);
            let b1 = ring(bottom_radius, bottom_y, index + 1);
            if top_radius <= f32::EPSILON {
                self.triangle(b0, b1, top_centre);
            } else {
                let t0 = ring(top_radius, top_y, index);
                let t1 = ring(top_radius, top_y, index + 1);
                self.quad(b0, b1, t1, t0);
                self.triangle(top_centre, t0, t1);
            }
            self.triangle(bottom_centre, b1, b0);
        }
    }

    fn sphere(&mut self, radius: f32, rings: u16, segments: u16) {
        let rings = rings.max(2);
        let segments = segments.max(3);
        let point = |ring: u16, segment: u16| {
            let phi = f32::from(ring) * PI / f32::from(rings);
            let theta = f32::from(segment % segments) * TAU / f32::from(segments);
            Vec3::new(
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
                radius * phi.sin() * theta.cos(),
            )
        };

        for ring in 0..rings {
            for segment in 0..segments {
                let lower_left = point(ring + 1, segment);
                let lower_right = point(ring + 1, segment + 1);
                let upper_right = point(ring, segment + 1);
                let upper_left = point(ring, segment);
                if ring == 0 {
                    self.triangle(lower_left, lower_right, upper_left);
                } else if ring + 1 == rings {
                    self.triangle(lower_left, upper_right, upper_left);
                } else {
                    self.quad(lower_left, lower_right, upper_right, upper_left);
                }
            }
        }
    }

    fn cuboid(&mut self, half: Vec3) {
        let Vec3 { x, y, z } = half;
        let v = Vec3::new;
        self.quad(v(-x, -y, z), v(x, -y, z), v(x, y, z), v(-x, y, z));
        self.quad(v(x, -y, -z), v(-x, -y, -z), v(-x, y, -z), v(x, y, -z));
        self.quad(v(x, -y, z), v(x, -y, -z), v(x, y, -z), v(x, y, z));
        self.quad(v(-x, -y, -z), v(-x, -y, z), v(-x, y, z), v(-x, y, -z));
        self.quad(v(-x, y, z), v(x, y, z), v(x, y, -z), v(-x, y, -z));
        self.quad(v(-x, -y, -z), v(x, -y, -z), v(x, -y, z), v(-x, -y, z));
    }

    fn star(&mut self, points: u16, outer_radius: f32, inner_radius: f32, depth: f32) {
        let corners = points.max(2) * 2;
        let half = depth * 0.5;
        let outline = |index: u16| {
            let index = index % corners;
            let angle = f32::from(index) * PI / f32::from(points.max(2)) + PI * 0.5;
            let radius = if index % 2 == 0 {
                outer_radius
            } else {
                inner_radius
            };
            (radius * angle.cos(), radius * angle.sin())
        };
        let front_centre = Vec3::new(0.0, 0.0, half);
        let back_centre = Vec3::new(0.0, 0.0, -half);

        for index in 0..corners {
            let (x0, y0) = outline(index);
            let (x1, y1) = outline(index + 1);
            let front0 = Vec3::new(x0, y0, half);
            let front1 = Vec3::new(x1, y1, half);
            let back0 = Vec3::new(x0, y0, -half);
            let back1 = Vec3::new(x1, y1, -half);

            self.triangle(front_centre, front0, front1);
            self.triangle(back_centre, back1, back0);
            self.quad(back0, back1, front1, front0);
        }
    }
}
