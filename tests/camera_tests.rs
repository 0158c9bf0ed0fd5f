use approx::assert_relative_eq;
use galaxy_generator::camera::Camera;
use glam::{Mat4, Vec3};

fn settle(camera: &mut Camera) -> usize {
    let mut frames = 0;
    while camera.update() {
        frames += 1;
        assert!(frames < 10_000, "camera never settled");
    }
    frames
}

fn assert_finite(matrix: &[[f32; 4]; 4]) {
    for row in matrix {
        for &val in row {
            assert!(val.is_finite(), "Camera matrix contains non-finite values");
        }
    }
}

#[test]
fn test_camera_creation() {
    let camera = Camera::new(16.0 / 9.0);
    let matrix = camera.view_projection_matrix_transposed();

    let identity = Mat4::IDENTITY.to_cols_array_2d();
    assert_ne!(matrix, identity, "Camera matrix should not be identity");
    assert_finite(&matrix);
}

#[test]
fn test_initial_eye_position() {
    let camera = Camera::new(1.0);
    let eye = camera.eye_position();
    assert_relative_eq!(eye.x, 3.0, epsilon = 1e-4);
    assert_relative_eq!(eye.y, 3.0, epsilon = 1e-4);
    assert_relative_eq!(eye.z, 3.0, epsilon = 1e-4);
}

#[test]
fn test_origin_projects_to_screen_center() {
    let camera = Camera::new(16.0 / 9.0);
    let clip = camera.view_projection_matrix() * Vec3::ZERO.extend(1.0);
    assert_relative_eq!(clip.x / clip.w, 0.0, epsilon = 1e-5);
    assert_relative_eq!(clip.y / clip.w, 0.0, epsilon = 1e-5);
}

#[test]
fn test_rotation_is_damped() {
    let mut camera = Camera::new(16.0 / 9.0);
    let initial_matrix = camera.view_projection_matrix_transposed();

    camera.rotate(0.1, 0.0);
    assert_eq!(
        camera.view_projection_matrix_transposed(),
        initial_matrix,
        "Rotation should only apply on update"
    );

    assert!(camera.update());
    let after_one = camera.eye_position();
    assert_ne!(camera.view_projection_matrix_transposed(), initial_matrix);

    let frames = settle(&mut camera);
    assert!(frames > 1, "Damping should spread motion over several frames");
    assert_ne!(camera.eye_position(), after_one);
    assert!(camera.is_settled());
}

#[test]
fn test_settled_camera_does_not_move() {
    let mut camera = Camera::new(16.0 / 9.0);
    assert!(camera.is_settled());
    assert!(!camera.update());
}

#[test]
fn test_camera_zoom() {
    let mut camera = Camera::new(16.0 / 9.0);
    let initial_distance = camera.eye_position().length();

    camera.zoom(2.0);
    settle(&mut camera);

    assert!(camera.eye_position().length() < initial_distance);
}

#[test]
fn test_camera_aspect_ratio_update() {
    let mut camera = Camera::new(16.0 / 9.0);
    let initial_matrix = camera.view_projection_matrix_transposed();

    camera.update_aspect_ratio(4.0 / 3.0);
    let updated_matrix = camera.view_projection_matrix_transposed();

    assert_ne!(initial_matrix, updated_matrix, "Camera matrix should change after aspect ratio update");
}

#[test]
fn test_camera_rotation_limits() {
    let mut camera = Camera::new(16.0 / 9.0);

    camera.rotate(0.0, 500.0);
    settle(&mut camera);
    let matrix1 = camera.view_projection_matrix_transposed();
    assert!(camera.eye_position().y < camera.eye_position().length());

    camera.rotate(0.0, -1000.0);
    settle(&mut camera);
    let matrix2 = camera.view_projection_matrix_transposed();

    assert_finite(&matrix1);
    assert_finite(&matrix2);
}

#[test]
fn test_camera_minimum_zoom() {
    let mut camera = Camera::new(16.0 / 9.0);

    camera.zoom(1_000.0);
    settle(&mut camera);

    assert!(camera.eye_position().length() > 0.0);
    assert_finite(&camera.view_projection_matrix_transposed());
}
