//! Application state: the parameter set, the generator and the one live
//! galaxy drawable.

use glam::Vec3;

use crate::galaxy::GalaxyGenerator;
use crate::params::ParameterSet;
use crate::scene::{DrawableId, PointMaterial, SceneGraph};

pub struct AppState {
    pub params: ParameterSet,
    generator: GalaxyGenerator,
    current: Option<DrawableId>,
}

impl AppState {
    pub fn new(params: ParameterSet, generator: GalaxyGenerator) -> Self {
        Self {
            params,
            generator,
            current: None,
        }
    }

    pub fn current(&self) -> Option<DrawableId> {
        self.current
    }

    /// Replaces the live galaxy with one built from the current parameters.
    ///
    /// The old drawable is detached and disposed before the new one is
    /// attached.
    pub fn regenerate<S: SceneGraph + ?Sized>(&mut self, scene: &mut S) -> DrawableId {
        if let Some(previous) = self.current.take() {
            scene.detach(previous);
            scene.dispose(previous);
        }

        let field = self.generator.generate(&self.params);
        let drawable = scene.create_point_drawable(field, PointMaterial::galaxy(self.params.size));
        scene.attach(drawable);
        self.current = Some(drawable);

        log::info!(
            "Regenerated galaxy: {} particles, {} branches, radius {:.2}",
            self.params.count,
            self.params.branches,
            self.params.radius
        );
        drawable
    }

    /// Fresh random draws with unchanged parameters.
    pub fn reseed<S: SceneGraph + ?Sized>(&mut self, scene: &mut S) -> DrawableId {
        self.generator.reseed();
        self.regenerate(scene)
    }

    /// Per-frame rotation. `elapsed` is seconds since startup.
    pub fn tick<S: SceneGraph + ?Sized>(&self, scene: &mut S, elapsed: f32) {
        let Some(drawable) = self.current else {
            return;
        };
        if self.params.spin == 0.0 {
            return;
        }

        scene.set_rotation(drawable, galaxy_rotation(&self.params, elapsed));
    }
}

pub fn galaxy_rotation(params: &ParameterSet, elapsed: f32) -> Vec3 {
    Vec3::new(
        elapsed.sin() / params.radius,
        -(elapsed * params.spin) / 2.0,
        0.0,
    )
}
