//! Scene graph seam between galaxy orchestration and the renderer.
//!
//! [`SceneGraph`] is what the orchestration code talks to. [`PointScene`]
//! is the in-memory implementation; the wgpu renderer mirrors whatever it
//! has attached.

use std::collections::HashMap;

use glam::{Mat4, Vec3};

use crate::galaxy::PointField;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DrawableId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendMode {
    Normal,
    Additive,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMaterial {
    /// World units with attenuation, pixels without.
    pub size: f32,
    pub blend: BlendMode,
    pub depth_write: bool,
    pub size_attenuation: bool,
    pub vertex_colors: bool,
}

impl PointMaterial {
    pub fn galaxy(size: f32) -> Self {
        Self {
            size,
            blend: BlendMode::Additive,
            depth_write: true,
            size_attenuation: true,
            vertex_colors: true,
        }
    }
}

pub trait SceneGraph {
    /// Wraps `field` in a drawable. The drawable owns the field until it
    /// is disposed.
    fn create_point_drawable(&mut self, field: PointField, material: PointMaterial) -> DrawableId;

    /// Attaching an already attached drawable is a no-op.
    fn attach(&mut self, drawable: DrawableId);

    fn detach(&mut self, drawable: DrawableId);

    /// Releases the drawable's buffers. Disposing an attached drawable
    /// detaches it first.
    fn dispose(&mut self, drawable: DrawableId);

    /// Euler rotation (XYZ order) in radians.
    fn set_rotation(&mut self, drawable: DrawableId, rotation: Vec3);
}

pub struct PointCloud {
    pub field: PointField,
    pub material: PointMaterial,
    pub rotation: Vec3,
}

impl PointCloud {
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_euler(
            glam::EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }
}

#[derive(Default)]
pub struct PointScene {
    next_id: u64,
    drawables: HashMap<DrawableId, PointCloud>,
    attached: Vec<DrawableId>,
}

impl PointScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, drawable: DrawableId) -> Option<&PointCloud> {
        self.drawables.get(&drawable)
    }

    pub fn is_attached(&self, drawable: DrawableId) -> bool {
        self.attached.contains(&drawable)
    }

    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    /// Drawables created and not yet disposed, attached or not.
    pub fn live_count(&self) -> usize {
        self.drawables.len()
    }

    /// Attached drawables in attachment order.
    pub fn attached(&self) -> impl Iterator<Item = (DrawableId, &PointCloud)> + '_ {
        self.attached
            .iter()
            .filter_map(|id| self.drawables.get(id).map(|cloud| (*id, cloud)))
    }
}

impl SceneGraph for PointScene {
    fn create_point_drawable(&mut self, field: PointField, material: PointMaterial) -> DrawableId {
        let id = DrawableId(self.next_id);
        self.next_id += 1;
        self.drawables.insert(
            id,
            PointCloud {
                field,
                material,
                rotation: Vec3::ZERO,
            },
        );
        id
    }

    fn attach(&mut self, drawable: DrawableId) {
        if !self.drawables.contains_key(&drawable) {
            log::warn!("Ignoring attach of unknown drawable {:?}", drawable);
            return;
        }
        if !self.attached.contains(&drawable) {
            self.attached.push(drawable);
        }
    }

    fn detach(&mut self, drawable: DrawableId) {
        self.attached.retain(|id| *id != drawable);
    }

    fn dispose(&mut self, drawable: DrawableId) {
        self.detach(drawable);
        self.drawables.remove(&drawable);
    }

    fn set_rotation(&mut self, drawable: DrawableId, rotation: Vec3) {
        if let Some(cloud) = self.drawables.get_mut(&drawable) {
            cloud.rotation = rotation;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::generate;
    use crate::params::ParameterSet;
    use rand::SeedableRng;

    fn field(count: u32) -> PointField {
        let params = ParameterSet { count, ..Default::default() };
        generate(&params, &mut rand::rngs::StdRng::seed_from_u64(3))
    }

    #[test]
    fn test_attach_is_idempotent() {
        let mut scene = PointScene::new();
        let id = scene.create_point_drawable(field(100), PointMaterial::galaxy(0.01));
        scene.attach(id);
        scene.attach(id);
        assert_eq!(scene.attached_count(), 1);
    }

    #[test]
    fn test_dispose_detaches() {
        let mut scene = PointScene::new();
        let id = scene.create_point_drawable(field(100), PointMaterial::galaxy(0.01));
        scene.attach(id);
        scene.dispose(id);
        assert_eq!(scene.attached_count(), 0);
        assert_eq!(scene.live_count(), 0);
        assert!(scene.get(id).is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut scene = PointScene::new();
        let a = scene.create_point_drawable(field(100), PointMaterial::galaxy(0.01));
        scene.dispose(a);
        let b = scene.create_point_drawable(field(100), PointMaterial::galaxy(0.01));
        assert_ne!(a, b);
    }

    #[test]
    fn test_model_matrix_identity_without_rotation() {
        let mut scene = PointScene::new();
        let id = scene.create_point_drawable(field(100), PointMaterial::galaxy(0.01));
        assert_eq!(scene.get(id).unwrap().model_matrix(), Mat4::IDENTITY);

        scene.set_rotation(id, Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0));
        let rotated = scene.get(id).unwrap().model_matrix().transform_point3(Vec3::X);
        assert!((rotated - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }
}
