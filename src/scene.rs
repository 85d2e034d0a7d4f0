// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Synapse Hero Engine - Scene, Camera and Starfield

use glam::{Mat4, Vec2, Vec3};
use rand::Rng;

use crate::config::SceneParams;
use crate::field::sample_shell;
use crate::types::SceneTransform;

// ---------------------------------------------------------------------------
// Camera
// ---------------------------------------------------------------------------

/// Perspective camera on +z that breathes slowly around its rest point and
/// always looks at the origin. Projection depends only on the current
/// viewport; resizing re-derives it from scratch.
#[derive(Debug, Clone)]
pub struct Camera {
    fov_y: f32,
    near: f32,
    far: f32,
    aspect: f32,
    position: Vec3,
    projection: Mat4,
    view: Mat4,
}

impl Camera {
    pub fn new(params: &SceneParams, width: f32, height: f32) -> Self {
        let position = Vec3::new(0.0, 0.0, params.camera_distance);
        let mut camera = Self {
            fov_y: params.fov_degrees.to_radians(),
            near: params.near,
            far: params.far,
            aspect: 1.0,
            position,
            projection: Mat4::IDENTITY,
            view: Mat4::look_at_rh(position, Vec3::ZERO, Vec3::Y),
        };
        if !camera.resize(width, height) {
            camera.resize(1.0, 1.0);
        }
        camera
    }

    /// Returns `false` and keeps the old projection for unusable sizes.
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            return false;
        }
        self.aspect = width / height;
        self.projection = Mat4::perspective_rh_gl(self.fov_y, self.aspect, self.near, self.far);
        true
    }

    pub fn update(&mut self, t: f64, params: &SceneParams) {
        self.position = Vec3::new(
            ((t * params.camera_rate_x as f64).sin() * params.camera_sway_x as f64) as f32,
            ((t * params.camera_rate_y as f64).cos() * params.camera_sway_y as f64) as f32,
            params.camera_distance,
        );
        self.view = Mat4::look_at_rh(self.position, Vec3::ZERO, Vec3::Y);
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Column-major.
    pub fn projection_matrix(&self) -> [f32; 16] {
        self.projection.to_cols_array()
    }

    /// Column-major.
    pub fn view_matrix(&self) -> [f32; 16] {
        self.view.to_cols_array()
    }
}

// ---------------------------------------------------------------------------
// Starfield
// ---------------------------------------------------------------------------

/// Static background points on a wide, unflattened shell.
#[derive(Debug, Clone, Default)]
pub struct Starfield {
    positions: Vec<f32>,
}

impl Starfield {
    pub fn generate<R: Rng + ?Sized>(params: &SceneParams, rng: &mut R) -> Self {
        let mut positions = Vec::with_capacity(params.star_count * 3);
        for _ in 0..params.star_count {
            let p = sample_shell(rng, params.star_min_radius, params.star_max_radius, 1.0);
            positions.extend_from_slice(&p.to_array());
        }
        Self { positions }
    }

    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }
}

// ---------------------------------------------------------------------------
// Scene transform
// ---------------------------------------------------------------------------

/// Rotation from the smoothed pointer plus slow drift, scale from scroll.
pub fn scene_transform(
    t: f64,
    smoothed_pointer: Vec2,
    scroll_progress: f32,
    camera: &Camera,
    params: &SceneParams,
) -> SceneTransform {
    SceneTransform {
        rotation_x: smoothed_pointer.y * params.tilt,
        rotation_y: (t * params.drift_rate as f64) as f32 + smoothed_pointer.x,
        scale: scroll_scale(scroll_progress, params.scroll_shrink),
        camera_position: camera.position(),
        star_rotation_x: (t * params.star_spin_x as f64) as f32,
        star_rotation_y: (t * params.star_spin_y as f64) as f32,
        key_light_intensity: params.key_light_base
            + ((t * params.key_light_rate as f64).sin() as f32) * params.key_light_swing,
    }
}

pub fn scroll_scale(progress: f32, shrink: f32) -> f32 {
    1.0 - progress.clamp(0.0, 1.0) * shrink
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_scroll_scale_range() {
        assert_eq!(scroll_scale(0.0, 0.22), 1.0);
        assert!((scroll_scale(1.0, 0.22) - 0.78).abs() < 1e-6);
        assert!((scroll_scale(4.0, 0.22) - 0.78).abs() < 1e-6);
    }

    #[test]
    fn test_transform_at_rest() {
        let params = SceneParams::default();
        let camera = Camera::new(&params, 1600.0, 900.0);
        let tr = scene_transform(0.0, Vec2::ZERO, 0.0, &camera, &params);
        assert_eq!(tr.rotation_x, 0.0);
        assert_eq!(tr.rotation_y, 0.0);
        assert_eq!(tr.scale, 1.0);
        assert_eq!(tr.key_light_intensity, 4.5);
    }

    #[test]
    fn test_transform_follows_pointer_and_drift() {
        let params = SceneParams::default();
        let camera = Camera::new(&params, 1600.0, 900.0);
        let tr = scene_transform(10.0, Vec2::new(0.1, 0.2), 0.5, &camera, &params);
        assert!((tr.rotation_y - (0.38 + 0.1)).abs() < 1e-5);
        assert!((tr.rotation_x - 0.1).abs() < 1e-6);
        assert!((tr.scale - 0.89).abs() < 1e-6);
        assert!(tr.key_light_intensity >= 3.7 && tr.key_light_intensity <= 5.3);
    }

    #[test]
    fn test_resize_rederives_aspect() {
        let params = SceneParams::default();
        let mut camera = Camera::new(&params, 1600.0, 900.0);
        assert!((camera.aspect() - 16.0 / 9.0).abs() < 1e-6);
        let before = camera.projection_matrix();
        assert!(camera.resize(900.0, 900.0));
        assert_eq!(camera.aspect(), 1.0);
        assert_ne!(camera.projection_matrix(), before);
        let fresh = Camera::new(&params, 900.0, 900.0);
        assert_eq!(camera.projection_matrix(), fresh.projection_matrix());
    }

    #[test]
    fn test_bad_resize_keeps_projection() {
        let params = SceneParams::default();
        let mut camera = Camera::new(&params, 1600.0, 900.0);
        let before = camera.projection_matrix();
        assert!(!camera.resize(0.0, 900.0));
        assert!(!camera.resize(f32::NAN, 900.0));
        assert_eq!(camera.projection_matrix(), before);
    }

    #[test]
    fn test_camera_breathes_at_fixed_depth() {
        let params = SceneParams::default();
        let mut camera = Camera::new(&params, 800.0, 600.0);
        for step in 0..100 {
            camera.update(step as f64 * 0.7, &params);
            let p = camera.position();
            assert_eq!(p.z, 12.0);
            assert!(p.x.abs() <= 0.5 + 1e-6);
            assert!(p.y.abs() <= 0.3 + 1e-6);
        }
    }

    #[test]
    fn test_starfield_shell() {
        let params = SceneParams::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let stars = Starfield::generate(&params, &mut rng);
        assert_eq!(stars.len(), 400);
        for p in stars.positions().chunks_exact(3) {
            let r = Vec3::from_slice(p).length();
            assert!(r >= 18.0 - 1e-3 && r <= 46.0 + 1e-3, "star at r = {}", r);
        }
    }
}
