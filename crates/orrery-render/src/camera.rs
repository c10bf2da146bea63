//! Fixed look-at camera producing view and reverse-Z projection matrices.

use glam::{Mat4, Vec3};

/// A perspective camera looking from `eye` at `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    /// Near clip plane distance (always positive).
    pub near: f32,
    /// Far clip plane distance (always positive, > near).
    pub far: f32,
}

impl Camera {
    /// Compute the view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Compute the projection matrix with reverse-Z.
    ///
    /// The near plane maps to depth 1 and the far plane to depth 0.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.far, self.near)
    }

    /// Compute the combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Update the aspect ratio from a surface size. Zero height counts as 1.
    pub fn set_aspect_ratio(&mut self, width: u32, height: u32) {
        self.aspect_ratio = width as f32 / height.max(1) as f32;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(10.0, -90.0, 90.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: std::f32::consts::FRAC_PI_4,
            aspect_ratio: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn project(camera: &Camera, point: Vec3) -> Vec3 {
        let clip = camera.view_projection_matrix() * point.extend(1.0);
        clip.truncate() / clip.w
    }

    #[test]
    fn test_default_camera_matches_scene_setup() {
        let camera = Camera::default();
        assert_eq!(camera.eye, Vec3::new(10.0, -90.0, 90.0));
        assert_eq!(camera.target, Vec3::ZERO);
        assert!((camera.fov_y - 45f32.to_radians()).abs() < 1e-6);
        assert_eq!((camera.near, camera.far), (0.1, 1000.0));
    }

    #[test]
    fn test_target_projects_to_screen_center() {
        let camera = Camera::default();
        let ndc = project(&camera, Vec3::ZERO);
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5, "ndc = {ndc}");
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_reverse_z_near_is_one_far_is_zero() {
        let camera = Camera::default();
        let proj = camera.projection_matrix();
        let near = proj * Vec4::new(0.0, 0.0, -camera.near, 1.0);
        let far = proj * Vec4::new(0.0, 0.0, -camera.far, 1.0);
        assert!((near.z / near.w - 1.0).abs() < 1e-5);
        assert!((far.z / far.w).abs() < 1e-5);
    }

    #[test]
    fn test_nearer_points_get_larger_depth() {
        let camera = Camera::default();
        let toward_eye = camera.eye.normalize() * 40.0;
        let closer = project(&camera, toward_eye);
        let center = project(&camera, Vec3::ZERO);
        assert!(closer.z > center.z);
    }

    #[test]
    fn test_set_aspect_ratio_clamps_zero_height() {
        let mut camera = Camera::default();
        camera.set_aspect_ratio(800, 600);
        assert!((camera.aspect_ratio - 800.0 / 600.0).abs() < 1e-6);
        camera.set_aspect_ratio(640, 0);
        assert_eq!(camera.aspect_ratio, 640.0);
    }

    #[test]
    fn test_sun_and_orbit_are_in_view() {
        let mut camera = Camera::default();
        camera.set_aspect_ratio(1280, 720);
        for point in [
            Vec3::new(42.0, 0.0, 0.0),
            Vec3::new(-42.0, 0.0, 0.0),
            Vec3::new(0.0, 42.0, 0.0),
            Vec3::new(0.0, -42.0, 0.0),
        ] {
            let ndc = project(&camera, point);
            assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0, "{point} -> {ndc}");
        }
    }
}
