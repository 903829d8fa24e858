//! # Uniform Buffer
//!
//! This module defines the `UniformBuffer` struct, the per-frame constant-buffer payload
//! transferred from the CPU to the GPU before every draw call. It carries the model transform,
//! the perspective projection and the light direction used by the line shader.
//!
//! ## Overview
//!
//! - **Transform**: The model transform (rotation, scale, translation) premultiplied with the
//!   camera's eye offset. See [`crate::transform`] for the multiplication order.
//! - **Projection**: The perspective projection built from the camera's clip distances and
//!   viewport size.
//! - **Light vector**: The direction the light travels, consumed by the pixel stage.
//!
//! The vertex shader computes `projection * transform * position`; both matrices are stored
//! column-major, which is how `nalgebra-glm` lays out a `Mat4` and how WGSL reads a
//! `mat4x4<f32>`.
//!
//! ## Memory Layout
//!
//! - `#[repr(C)]`: Fields are laid out in declaration order with C alignment rules.
//! - `bytemuck::Pod` and `bytemuck::Zeroable`: The struct can be copied into a GPU buffer as
//!   raw bytes.
//! - The struct must be a multiple of 16 bytes. The vec3 light vector is followed by one
//!   padding float to meet that rule; [`UniformBuffer::validate_size`] checks it before the
//!   buffer is created.
//!
//! ## Example Usage
//!
//! ```rust
//! use line_sketch::UniformBuffer;
//!
//! assert_eq!(UniformBuffer::SIZE, 144);
//! assert!(UniformBuffer::validate_size().is_ok());
//! ```

use nalgebra_glm as glm;

use crate::error::RendererError;

/// The constant-buffer payload uploaded once per frame.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct UniformBuffer {
    /// The model transform applied to every vertex position and normal.
    pub transform: glm::Mat4,

    /// The perspective projection mapping view space to clip space.
    pub projection: glm::Mat4,

    /// Direction of the light, in the same space as transformed normals.
    pub light_vector: glm::Vec3,

    /// Keeps the struct size a multiple of 16 bytes.
    pub padding: f32,
}

impl Default for UniformBuffer {
    fn default() -> Self {
        Self::new(
            glm::Mat4::identity(),
            glm::Mat4::identity(),
            glm::Vec3::from(Self::DEFAULT_LIGHT),
        )
    }
}

impl UniformBuffer {
    /// Size of the payload in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Light travelling away from the viewer, into the screen.
    pub const DEFAULT_LIGHT: [f32; 3] = [0.0, 0.0, 1.0];

    pub fn new(transform: glm::Mat4, projection: glm::Mat4, light_vector: glm::Vec3) -> Self {
        Self {
            transform,
            projection,
            light_vector,
            padding: 0.0,
        }
    }

    /// Checks that the payload size satisfies the 16-byte constant-buffer rule.
    ///
    /// # Errors
    ///
    /// [`RendererError::ConstantBufferAlignment`] with the offending size.
    pub fn validate_size() -> Result<usize, RendererError> {
        Self::check_alignment(Self::SIZE)
    }

    pub(crate) fn check_alignment(size: usize) -> Result<usize, RendererError> {
        if size % 16 != 0 {
            return Err(RendererError::ConstantBufferAlignment(size));
        }
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_is_sixteen_byte_aligned() {
        assert_eq!(UniformBuffer::SIZE, 144);
        assert_eq!(UniformBuffer::validate_size().unwrap(), 144);
    }

    #[test]
    fn misaligned_size_is_rejected() {
        assert!(matches!(
            UniformBuffer::check_alignment(140),
            Err(RendererError::ConstantBufferAlignment(140))
        ));
    }

    #[test]
    fn light_sits_after_both_matrices() {
        let buffer = UniformBuffer::new(
            glm::Mat4::identity(),
            glm::Mat4::identity(),
            glm::vec3(1.0, 2.0, 3.0),
        );
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&buffer));
        assert_eq!(&floats[32..36], &[1.0, 2.0, 3.0, 0.0]);
    }
}
