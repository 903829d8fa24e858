//! # Camera
//!
//! The camera holds the viewer parameters read by the renderer every frame and by the line
//! tool on every pointer event: eye placement, clip distances and viewport size. It is shared
//! between both as a [`SharedCamera`]; the renderer writes the viewport size on resize.
//!
//! [`Camera::screen_to_world`] is the pointer unprojection: output-local pixels are normalized
//! to `[-1, 1]`, lifted to a clip-space point on the near plane, multiplied by the inverse
//! projection and offset by the eye position. With the default parameters one world unit is
//! one pixel.

use std::sync::Arc;

use nalgebra_glm as glm;
use parking_lot::RwLock;

use crate::error::TransformError;
use crate::transform;
use crate::vertex::Vertex;

/// The camera as shared between the renderer and the interaction layer.
pub type SharedCamera = Arc<RwLock<Camera>>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye_position: glm::Vec3,
    pub eye_direction: glm::Vec3,
    pub focus_position: glm::Vec3,
    pub up_direction: glm::Vec3,
    /// Distance to the near clip plane.
    pub near: f32,
    /// Distance to the far clip plane.
    pub far: f32,
    /// Viewport width in pixels.
    pub width: f32,
    /// Viewport height in pixels.
    pub height: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye_position: glm::vec3(0.0, 0.0, 1500.0),
            eye_direction: glm::vec3(0.0, 0.0, 1.0),
            focus_position: glm::Vec3::zeros(),
            up_direction: glm::Vec3::y(),
            near: 1000.0,
            far: 1_000_000.0,
            width: 1024.0,
            height: 1024.0,
        }
    }
}

impl Camera {
    pub fn into_shared(self) -> SharedCamera {
        Arc::new(RwLock::new(self))
    }

    /// Width over height; a zero height counts as one.
    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height.max(1.0)
    }

    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        self.width = width as f32;
        self.height = height as f32;
    }

    /// Moves eye and focus together by `dx`, `dy` world units.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let offset = glm::vec3(dx, dy, 0.0);
        self.eye_position += offset;
        self.focus_position += offset;
    }

    /// Translation applied before the model transform so that the eye's `x`/`y` sits at the
    /// centre of the viewport.
    pub fn view_matrix(&self) -> glm::Mat4 {
        glm::translation(&glm::vec3(-self.eye_position.x, -self.eye_position.y, 0.0))
    }

    pub fn projection(&self) -> glm::Mat4 {
        transform::perspective(self.near, self.far, self.width, self.height)
    }

    /// Rescales an output-local pixel position to `[-1, 1]` with `y` pointing up and the
    /// viewport centre at the origin.
    pub fn normalize(&self, x: f32, y: f32) -> glm::Vec2 {
        let half_width = self.width / 2.0;
        let half_height = self.height / 2.0;
        glm::vec2((x - half_width) / half_width, (half_height - y) / half_height)
    }

    /// Converts an output-local pixel position into a point on the drawing plane.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::Degenerate`] when the projection cannot be inverted, which
    /// happens only for `near == far` or an empty viewport.
    pub fn screen_to_world(&self, x: f32, y: f32) -> Result<glm::Vec3, TransformError> {
        let inverse = transform::invert(&self.projection())?;
        let normalized = self.normalize(x, y);

        // On the near plane clip w equals the near distance and NDC depth is zero.
        let clip = glm::vec4(
            normalized.x * self.near,
            normalized.y * self.near,
            0.0,
            self.near,
        );
        let view = inverse * clip;

        Ok(glm::vec3(
            view.x / view.w + self.eye_position.x,
            view.y / view.w + self.eye_position.y,
            Vertex::PLANE_Z,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_800x600() -> Camera {
        let mut camera = Camera::default();
        camera.set_viewport_size(800, 600);
        camera
    }

    #[test]
    fn centre_normalizes_to_origin() {
        let camera = camera_800x600();
        assert_eq!(camera.normalize(400.0, 300.0), glm::vec2(0.0, 0.0));
        assert_eq!(camera.normalize(800.0, 0.0), glm::vec2(1.0, 1.0));
        assert_eq!(camera.normalize(0.0, 600.0), glm::vec2(-1.0, -1.0));
    }

    #[test]
    fn one_unit_per_pixel() {
        let camera = camera_800x600();

        let centre = camera.screen_to_world(400.0, 300.0).unwrap();
        assert!(centre.x.abs() < 1e-3 && centre.y.abs() < 1e-3);

        let right = camera.screen_to_world(450.0, 300.0).unwrap();
        assert!((right.x - 50.0).abs() < 1e-3);
        assert!(right.y.abs() < 1e-3);

        let up = camera.screen_to_world(400.0, 200.0).unwrap();
        assert!((up.y - 100.0).abs() < 1e-3);
        assert_eq!(up.z, Vertex::PLANE_Z);
    }

    #[test]
    fn pan_offsets_world_coordinates() {
        let mut camera = camera_800x600();
        camera.pan(100.0, -20.0);

        let centre = camera.screen_to_world(400.0, 300.0).unwrap();
        assert!((centre.x - 100.0).abs() < 1e-3);
        assert!((centre.y + 20.0).abs() < 1e-3);
        assert_eq!(camera.focus_position, glm::vec3(100.0, -20.0, 0.0));
    }

    #[test]
    fn degenerate_camera_reports_error() {
        let mut camera = camera_800x600();
        camera.far = camera.near;
        assert!(camera.screen_to_world(10.0, 10.0).is_err());

        let mut empty = Camera::default();
        empty.set_viewport_size(0, 0);
        assert!(empty.screen_to_world(0.0, 0.0).is_err());
    }

    #[test]
    fn drawn_points_render_where_they_were_drawn() {
        let camera = camera_800x600();
        let model = transform::model_matrix(&transform::ModelTransform::default());

        let world = camera.screen_to_world(600.0, 150.0).unwrap();
        let clip = camera.projection()
            * model
            * camera.view_matrix()
            * glm::vec4(world.x, world.y, world.z, 1.0);
        let back = glm::vec2(clip.x / clip.w, clip.y / clip.w);

        let expected = camera.normalize(600.0, 150.0);
        assert!((back - expected).norm() < 1e-4);
    }
}
