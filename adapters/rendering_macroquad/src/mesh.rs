//! CPU-side batching of shaded prototype instances into Macroquad meshes.
//!
//! Macroquad 0.3 clamps a single draw call to 5000 indices, so instances are
//! appended triangle by triangle into chunks that stay below that ceiling.

use evergreen_core::{Role, Transform};
use evergreen_rendering::{Lighting, Material, MaterialTable, PrototypeMesh, Scene, Shape};
use glam::Vec3;
use macroquad::{
    math::{vec2, vec3},
    models::{draw_mesh, Mesh, Vertex},
};

use crate::to_macroquad_color;

/// Largest index count submitted in one chunk; a multiple of three.
pub(crate) const MAX_CHUNK_INDICES: usize = 4_998;

/// Normals pointing at least this far up receive the material accent.
const ACCENT_FACE_THRESHOLD: f32 = 0.5;

/// Prototype meshes for every role and the star, built once per run.
#[derive(Debug)]
pub(crate) struct PrototypeLibrary {
    roles: Vec<(Role, PrototypeMesh)>,
    star: PrototypeMesh,
}

impl PrototypeLibrary {
    pub(crate) fn new() -> Self {
        Self {
            roles: Role::ALL
                .into_iter()
                .map(|role| (role, PrototypeMesh::build(&Shape::for_role(role))))
                .collect(),
            star: PrototypeMesh::build(&Shape::STAR),
        }
    }

    pub(crate) fn role(&self, role: Role) -> &PrototypeMesh {
        self.roles
            .iter()
            .find(|(candidate, _)| *candidate == role)
            .map_or(&self.star, |(_, mesh)| mesh)
    }

    pub(crate) fn star(&self) -> &PrototypeMesh {
        &self.star
    }
}

/// Triangle soup for one frame, split into draw-call sized chunks.
pub(crate) struct MeshBatch {
    chunks: Vec<Mesh>,
    used: usize,
}

impl MeshBatch {
    pub(crate) fn new() -> Self {
        Self {
            chunks: Vec::new(),
            used: 0,
        }
    }

    /// Empties the batch while keeping chunk allocations for the next frame.
    pub(crate) fn clear(&mut self) {
        for chunk in &mut self.chunks {
            chunk.vertices.clear();
            chunk.indices.clear();
        }
        self.used = 0;
    }

    /// Appends every instance of the scene, followed by the star.
    pub(crate) fn push_scene(
        &mut self,
        scene: &Scene,
        prototypes: &PrototypeLibrary,
        materials: &MaterialTable,
        lighting: &Lighting,
    ) {
        for buffer in scene.buffers() {
            let prototype = prototypes.role(buffer.role());
            for slice in buffer.material_slices(materials) {
                for transform in &buffer.transforms()[slice.range] {
                    self.push_instance(prototype, transform, &slice.material, lighting);
                }
            }
        }
        self.push_instance(prototypes.star(), &scene.star, materials.star(), lighting);
    }

    /// Transforms one prototype into world space and shades each face.
    pub(crate) fn push_instance(
        &mut self,
        prototype: &PrototypeMesh,
        transform: &Transform,
        material: &Material,
        lighting: &Lighting,
    ) {
        let matrix = transform.to_matrix();
        let inverse_scale = transform.scale.recip();
        let inverse_scale = if inverse_scale.is_finite() {
            inverse_scale
        } else {
            Vec3::ONE
        };

        for face in prototype.indices.chunks_exact(3) {
            let local_normal = prototype.normals[usize::from(face[0])];
            let normal = (transform.rotation * (local_normal * inverse_scale)).normalize_or_zero();
            let accent = local_normal.y >= ACCENT_FACE_THRESHOLD;
            let color = to_macroquad_color(lighting.shade(material, normal, accent));

            let chunk = self.reserve_triangle();
            for index in face {
                let position = matrix.transform_point3(prototype.positions[usize::from(*index)]);
                chunk.indices.push(chunk.vertices.len() as u16);
                chunk.vertices.push(Vertex {
                    position: vec3(position.x, position.y, position.z),
                    uv: vec2(0.0, 0.0),
                    color,
                });
            }
        }
    }

    fn reserve_triangle(&mut self) -> &mut Mesh {
        let full = self
            .chunks
            .get(self.used.saturating_sub(1))
            .map_or(true, |chunk| chunk.indices.len() + 3 > MAX_CHUNK_INDICES);
        if self.used == 0 || full {
            if self.used == self.chunks.len() {
                self.chunks.push(Mesh {
                    vertices: Vec::new(),
                    indices: Vec::new(),
                    texture: None,
                });
            }
            self.used += 1;
        }
        let last = self.used - 1;
        &mut self.chunks[last]
    }

    /// Chunks filled during the current frame.
    pub(crate) fn chunks(&self) -> &[Mesh] {
        &self.chunks[..self.used]
    }

    pub(crate) fn triangle_count(&self) -> usize {
        self.chunks().iter().map(|chunk| chunk.indices.len() / 3).sum()
    }

    /// Submits every chunk; requires an active Macroquad context.
    pub(crate) fn draw(&self) {
        for chunk in self.chunks() {
            draw_mesh(chunk);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evergreen_rendering::materials::{EMERALD, GIFT_WRAPS};
    use glam::Quat;

    #[test]
    fn chunks_never_exceed_the_index_ceiling() {
        let prototypes = PrototypeLibrary::new();
        let lighting = Lighting::default();
        let mut batch = MeshBatch::new();
        let gift = prototypes.role(Role::Gift);

        for index in 0..700 {
            let transform = Transform::new(
                Vec3::new(index as f32, 0.0, 0.0),
                Quat::IDENTITY,
                Vec3::ONE,
            );
            batch.push_instance(gift, &transform, &GIFT_WRAPS[0], &lighting);
        }

        assert_eq!(batch.triangle_count(), 700 * 12);
        assert!(batch.chunks().len() > 1);
        for chunk in batch.chunks() {
            assert!(chunk.indices.len() <= MAX_CHUNK_INDICES);
            assert_eq!(chunk.indices.len(), chunk.vertices.len());
            assert_eq!(chunk.indices.len() % 3, 0);
        }
    }

    #[test]
    fn clear_reuses_chunks() {
        let prototypes = PrototypeLibrary::new();
        let lighting = Lighting::default();
        let mut batch = MeshBatch::new();
        batch.push_instance(
            prototypes.role(Role::Needle),
            &Transform::IDENTITY,
            &EMERALD,
            &lighting,
        );
        assert_eq!(batch.triangle_count(), 8);

        batch.clear();
        assert!(batch.chunks().is_empty());
        assert_eq!(batch.triangle_count(), 0);
    }

    #[test]
    fn instances_are_placed_in_world_space() {
        let prototypes = PrototypeLibrary::new();
        let lighting = Lighting::default();
        let mut batch = MeshBatch::new();
        let offset = Vec3::new(3.0, -2.0, 5.0);
        let transform = Transform::new(offset, Quat::IDENTITY, Vec3::splat(2.0));
        batch.push_instance(
            prototypes.role(Role::Gift),
            &transform,
            &GIFT_WRAPS[0],
            &lighting,
        );

        for vertex in &batch.chunks()[0].vertices {
            let local = Vec3::new(vertex.position.x, vertex.position.y, vertex.position.z) - offset;
            assert!((local.abs().max_element() - 0.5).abs() < 1e-4);
        }
    }

    #[test]
    fn scene_batch_includes_star_and_every_buffer() {
        let prototypes = PrototypeLibrary::new();
        let mut scene = Scene::new();
        scene
            .buffer_mut(Role::Bell)
            .transforms_mut()
            .push(Transform::IDENTITY);
        scene
            .buffer_mut(Role::Gift)
            .transforms_mut()
            .extend([Transform::IDENTITY; 3]);

        let mut batch = MeshBatch::new();
        batch.push_scene(
            &scene,
            &prototypes,
            &MaterialTable::reference(),
            &Lighting::default(),
        );

        let expected = prototypes.role(Role::Bell).triangle_count()
            + 3 * prototypes.role(Role::Gift).triangle_count()
            + prototypes.star().triangle_count();
        assert_eq!(batch.triangle_count(), expected);
    }
}
