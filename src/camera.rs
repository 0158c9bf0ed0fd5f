//! Orbit camera with spherical coordinates and damped controls.
//!
//! Y-up coordinate system, mouse drag for rotation, scroll for zoom.
//! Theta = horizontal, Phi = polar angle from +Y (clamped away from the poles).
//! Input is queued and drained a little every `update`, so motion eases out.

use glam::{Mat4, Vec3};

const DEFAULT_FOV_DEGREES: f32 = 75.0;
const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 100.0;
const UP_VECTOR: Vec3 = Vec3::Y;
const MIN_PHI: f32 = 0.01;
const MAX_PHI: f32 = std::f32::consts::PI - 0.01;
const MIN_RADIUS: f32 = 0.5;
const MAX_RADIUS: f32 = 60.0;
const DAMPING_FACTOR: f32 = 0.05;
const SETTLE_EPSILON: f32 = 1e-5;
const INITIAL_EYE: Vec3 = Vec3::new(3.0, 3.0, 3.0);

/// Orbit camera around a target point.
pub struct Camera {
    target: Vec3,
    radius: f32,
    theta: f32,  // Horizontal angle
    phi: f32,    // Polar angle
    aspect_ratio: f32,
    pending_theta: f32,
    pending_phi: f32,
    pending_zoom: f32,
    view_projection_matrix: Mat4,
}

impl Camera {
    pub fn new(aspect_ratio: f32) -> Self {
        let offset = INITIAL_EYE;
        let radius = offset.length();
        let mut camera = Self {
            target: Vec3::ZERO,
            radius,
            theta: offset.z.atan2(offset.x),
            phi: (offset.y / radius).acos(),
            aspect_ratio,
            pending_theta: 0.0,
            pending_phi: 0.0,
            pending_zoom: 0.0,
            view_projection_matrix: Mat4::IDENTITY,
        };
        camera.update_matrices();
        camera
    }

    /// Queues a rotation, applied over the following updates.
    pub fn rotate(&mut self, delta_x: f32, delta_y: f32) {
        self.pending_theta += delta_x;
        self.pending_phi += delta_y;
    }

    /// Queues a zoom; positive moves toward the target.
    pub fn zoom(&mut self, delta: f32) {
        self.pending_zoom += delta;
    }

    /// Applies a damped share of the queued motion. Returns whether the camera moved.
    pub fn update(&mut self) -> bool {
        if self.is_settled() {
            return false;
        }

        self.theta += self.pending_theta * DAMPING_FACTOR;
        self.phi = (self.phi + self.pending_phi * DAMPING_FACTOR).clamp(MIN_PHI, MAX_PHI);
        self.radius = (self.radius - self.pending_zoom * DAMPING_FACTOR).clamp(MIN_RADIUS, MAX_RADIUS);

        let decay = 1.0 - DAMPING_FACTOR;
        self.pending_theta *= decay;
        self.pending_phi *= decay;
        self.pending_zoom *= decay;

        self.update_matrices();
        true
    }

    pub fn is_settled(&self) -> bool {
        self.pending_theta.abs() < SETTLE_EPSILON
            && self.pending_phi.abs() < SETTLE_EPSILON
            && self.pending_zoom.abs() < SETTLE_EPSILON
    }

    pub fn update_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
        self.update_matrices();
    }

    pub fn eye_position(&self) -> Vec3 {
        self.calculate_eye_position()
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.view_projection_matrix
    }

    pub fn view_projection_matrix_transposed(&self) -> [[f32; 4]; 4] {
        self.view_projection_matrix.to_cols_array_2d()
    }

    fn update_matrices(&mut self) {
        let position = self.calculate_eye_position();
        let view = Mat4::look_at_rh(position, self.target, UP_VECTOR);
        let projection = Mat4::perspective_rh(
            DEFAULT_FOV_DEGREES.to_radians(),
            self.aspect_ratio,
            NEAR_PLANE,
            FAR_PLANE,
        );
        self.view_projection_matrix = projection * view;
    }

    fn calculate_eye_position(&self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.target.x + self.radius * sin_phi * self.theta.cos(),
            self.target.y + self.radius * self.phi.cos(),
            self.target.z + self.radius * sin_phi * self.theta.sin(),
        )
    }
}
