//! # Uniform Binding Module
//!
//! This module defines the `UniformBinding` struct, which owns the constant buffer of the line
//! pipeline together with the bind group that exposes it to the shaders.
//!
//! ## Overview
//!
//! The `UniformBinding` struct encapsulates:
//!
//! - **Uniform buffer**: A GPU buffer sized to exactly one [`UniformBuffer`] payload.
//! - **Bind group layout**: Declares the buffer at binding `0` of group `0`, visible to both the
//!   vertex stage (transform and projection) and the fragment stage (light vector).
//! - **Bind group**: Connects the buffer to that layout for use in a render pass.
//!
//! ## How It Works
//!
//! 1. **Initialization**: [`UniformBinding::new`] validates the payload size against the
//!    16-byte rule, then allocates the buffer, layout and bind group.
//! 2. **Updating Uniform Data**: [`UniformBinding::update_buffer`] rewrites the whole payload.
//!    The previous contents are discarded; nothing is read back.
//! 3. **Rendering**: The renderer sets `bind_group` at index `0` before drawing.
//!
//! Shader side, the matching declaration is:
//!
//! ```wgsl
//! @group(0) @binding(0)
//! var<uniform> constants: Constants;
//! ```

use crate::error::RendererError;
use crate::uniform_buffer::UniformBuffer;

/// The constant buffer of the line pipeline and its bind group.
pub struct UniformBinding {
    /// The GPU buffer holding one [`UniformBuffer`] payload.
    ///
    /// It is created with `UNIFORM | COPY_DST` usage so the renderer can rewrite it from the
    /// CPU every frame.
    pub buffer: wgpu::Buffer,

    /// The bind group that binds `buffer` at binding `0`.
    pub bind_group: wgpu::BindGroup,

    /// The layout of `bind_group`, referenced by the pipeline layout.
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl UniformBinding {
    /// Creates the constant buffer, its layout and its bind group.
    ///
    /// # Errors
    ///
    /// Returns [`RendererError::ConstantBufferAlignment`] if the payload size is not a multiple
    /// of 16 bytes. Nothing is allocated in that case.
    pub fn new(device: &wgpu::Device) -> Result<Self, RendererError> {
        let size = UniformBuffer::validate_size()?;
        log::debug!("Creating constant buffer of {size} bytes");

        let buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Constant Buffer"),
                contents: bytemuck::cast_slice(&[UniformBuffer::default()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            },
        );

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(size as u64),
                },
                count: None,
            }],
            label: Some("constant_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("constant_bind_group"),
        });

        Ok(Self {
            buffer,
            bind_group,
            bind_group_layout,
        })
    }

    /// Overwrites the whole constant buffer with `uniform_buffer`.
    pub fn update_buffer(&self, queue: &wgpu::Queue, uniform_buffer: UniformBuffer) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[uniform_buffer]))
    }
}
