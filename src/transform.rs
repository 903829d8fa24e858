//! # Transform and Projection
//!
//! Matrix construction for the constant buffer and the inverse used to unproject pointer
//! positions.
//!
//! ## Convention
//!
//! Everything in this crate uses `nalgebra-glm`'s column-vector convention: a point is
//! transformed as `M * v`, and matrices are uploaded column-major, which is what WGSL's
//! `mat4x4<f32> * vec4<f32>` expects. The unprojection in [`Camera`](crate::Camera) uses the
//! same matrices, so CPU-side world coordinates and GPU-side clip coordinates cannot drift.
//!
//! The model transform is defined as the row-vector product `Rx · Ry · Rz · Scale · Translate`:
//! a point is rotated about X, then Y, then Z, then scaled, then translated. In column-vector
//! form that is `T * S * Rz * Ry * Rx`, which is what [`model_matrix`] returns.
//!
//! The projection has the row-vector layout
//!
//! ```text
//! | 2n/w  0     0           0 |
//! | 0     2n/h  0           0 |
//! | 0     0     f/(f-n)     1 |
//! | 0     0     n·f/(n-f)   0 |
//! ```
//!
//! and [`perspective`] returns its transpose. A view-space point at depth `z` lands at clip
//! `w = z` and NDC depth `0` on the near plane, `1` on the far plane.

use nalgebra_glm as glm;

use crate::error::TransformError;

/// Determinants whose magnitude is below this are treated as singular.
pub const DEGENERATE_EPSILON: f64 = 1e-12;

/// Scalar parameters of the model transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelTransform {
    /// Rotation angles about X, Y and Z, in radians.
    pub rotation: glm::Vec3,
    pub scale: glm::Vec3,
    pub translation: glm::Vec3,
}

impl Default for ModelTransform {
    /// Places the drawing plane 1500 units in front of the viewer with a scale of 1.5.
    ///
    /// With the default camera's near plane at 1000 this maps one world unit onto one pixel,
    /// the same mapping [`Camera::screen_to_world`](crate::Camera::screen_to_world) uses.
    fn default() -> Self {
        Self {
            rotation: glm::Vec3::zeros(),
            scale: glm::vec3(1.5, 1.5, 1.5),
            translation: glm::vec3(0.0, 0.0, 1500.0),
        }
    }
}

/// Builds the model matrix `Rx · Ry · Rz · Scale · Translate` (row-vector order).
pub fn model_matrix(transform: &ModelTransform) -> glm::Mat4 {
    let rotate_x = glm::rotation(transform.rotation.x, &glm::Vec3::x());
    let rotate_y = glm::rotation(transform.rotation.y, &glm::Vec3::y());
    let rotate_z = glm::rotation(transform.rotation.z, &glm::Vec3::z());
    let scale = glm::scaling(&transform.scale);
    let translate = glm::translation(&transform.translation);

    translate * scale * rotate_z * rotate_y * rotate_x
}

/// Builds the perspective projection for a viewport of `width` × `height` units.
///
/// Degenerate inputs (`near == far`, zero width or height) produce non-finite entries; they
/// are caught when the matrix is inverted, not here.
pub fn perspective(near: f32, far: f32, width: f32, height: f32) -> glm::Mat4 {
    glm::Mat4::new(
        2.0 * near / width,
        0.0,
        0.0,
        0.0,
        0.0,
        2.0 * near / height,
        0.0,
        0.0,
        0.0,
        0.0,
        far / (far - near),
        near * far / (near - far),
        0.0,
        0.0,
        1.0,
        0.0,
    )
}

/// Inverts a 4×4 matrix.
///
/// The inversion runs in `f64` so that the large depth terms of the projection do not eat
/// the precision of the small ones.
///
/// # Errors
///
/// Returns [`TransformError::Degenerate`] when the determinant is not finite or is within
/// [`DEGENERATE_EPSILON`] of zero. Callers should treat this as a configuration error.
pub fn invert(matrix: &glm::Mat4) -> Result<glm::Mat4, TransformError> {
    let matrix = matrix.map(f64::from);
    let determinant = matrix.determinant();
    if !determinant.is_finite() || determinant.abs() < DEGENERATE_EPSILON {
        return Err(TransformError::Degenerate { determinant });
    }

    matrix
        .try_inverse()
        .map(|inverse| inverse.map(|value| value as f32))
        .ok_or(TransformError::Degenerate { determinant })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: &glm::Mat4, b: &glm::Mat4, tolerance: f32) {
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() <= tolerance, "{a} != {b}");
        }
    }

    #[test]
    fn projection_inverse_is_identity() {
        let projection = perspective(1000.0, 1_000_000.0, 800.0, 600.0);
        let inverse = invert(&projection).unwrap();

        assert_close(&(inverse * projection), &glm::Mat4::identity(), 1e-4);
        assert_close(&(projection * inverse), &glm::Mat4::identity(), 1e-4);
    }

    #[test]
    fn equal_clip_planes_are_degenerate() {
        let projection = perspective(1000.0, 1000.0, 800.0, 600.0);
        assert!(matches!(
            invert(&projection),
            Err(TransformError::Degenerate { .. })
        ));
    }

    #[test]
    fn zero_viewport_is_degenerate() {
        assert!(invert(&perspective(1000.0, 1_000_000.0, 0.0, 600.0)).is_err());
        assert!(invert(&glm::Mat4::zeros()).is_err());
    }

    #[test]
    fn projection_maps_near_and_far_planes() {
        let projection = perspective(1000.0, 1_000_000.0, 800.0, 600.0);

        let near = projection * glm::vec4(400.0, 300.0, 1000.0, 1.0);
        assert!((near.x / near.w - 1.0).abs() < 1e-6);
        assert!((near.y / near.w - 1.0).abs() < 1e-6);
        assert!((near.z / near.w).abs() < 1e-4);

        let far = projection * glm::vec4(0.0, 0.0, 1_000_000.0, 1.0);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn model_matrix_rotates_then_scales_then_translates() {
        let transform = ModelTransform {
            rotation: glm::vec3(0.0, 0.0, std::f32::consts::FRAC_PI_2),
            scale: glm::vec3(2.0, 2.0, 2.0),
            translation: glm::vec3(10.0, 0.0, 0.0),
        };
        let moved = model_matrix(&transform) * glm::vec4(1.0, 0.0, 0.0, 1.0);

        assert!((moved.x - 10.0).abs() < 1e-5);
        assert!((moved.y - 2.0).abs() < 1e-5);
        assert!(moved.z.abs() < 1e-5);
    }

    #[test]
    fn rotation_order_is_x_then_y() {
        let half_pi = std::f32::consts::FRAC_PI_2;
        let transform = ModelTransform {
            rotation: glm::vec3(half_pi, half_pi, 0.0),
            scale: glm::vec3(1.0, 1.0, 1.0),
            translation: glm::Vec3::zeros(),
        };
        // X first sends +Y to +Z, then Y sends +Z to +X.
        let moved = model_matrix(&transform) * glm::vec4(0.0, 1.0, 0.0, 1.0);

        assert!((moved.x - 1.0).abs() < 1e-5);
        assert!(moved.y.abs() < 1e-5);
        assert!(moved.z.abs() < 1e-5);
    }
}
