//! # Vertex Module
//!
//! This module provides the `Vertex` struct, the fixed-layout record that describes one GPU
//! vertex of a drawn line. Every vertex carries a position, a normal, a texture coordinate
//! and a color, and the byte image of a `Vertex` is exactly what the render pipeline uploads
//! into its vertex buffer.
//!
//! # Overview
//!
//! ## Structs
//!
//! - [`Vertex`]: A single vertex with position, normal, texture coordinate and color attributes.
//!
//! ## Methods
//!
//! - [`Vertex::vertex_attributes`]: Returns the vertex attributes layout supported by the `Vertex` struct.
//! - [`Vertex::description`]: Returns the memory layout for vertex data to be provided to the GPU.
//! - [`Vertex::to_floats`] / [`Vertex::from_floats`]: Flatten to and rebuild from the 12-float wire image.
//!
//! ## Usage
//!
//! ```rust
//! use line_sketch::Vertex;
//!
//! let start = Vertex::with_color([0.0, 0.0, 0.0], [0.0, 0.0, 1.0, 1.0]);
//! let end = Vertex::new([50.0, 0.0, 0.0]);
//!
//! let floats = [start.to_floats(), end.to_floats()].concat();
//! assert_eq!(floats.len(), 2 * Vertex::STRIDE);
//! ```
//!
//! # GPU Compatibility
//!
//! The layout is `Float32x3` position, `Float32x3` normal, `Float32x2` texture coordinate and
//! `Float32x4` color: 48 bytes per vertex. Shaders must declare their vertex inputs at the same
//! locations (0 to 3) for the pipeline to interpret the buffer correctly.
//!
//! # Crate Dependencies
//!
//! - `wgpu` for the GPU attributes and layouts.
//! - `bytemuck` for safe conversion of vertex slices into bytes.

/// Represents a single vertex of a drawn primitive.
///
/// Each `Vertex` holds a 3D position, a normal, a texture coordinate and an RGBA color, all
/// stored as `f32` arrays in that order. The struct is `#[repr(C)]` and `Pod`, so a slice of
/// vertices can be handed to the GPU as raw bytes with `bytemuck::cast_slice`.
///
/// # Defaults
///
/// - `position`: the origin of the drawing plane (`z = 0`).
/// - `normal`: `[0.0, 0.0, -1.0]`, pointing toward the viewer.
/// - `tex_coord`: `[0.0, 0.0]`.
/// - `color`: opaque white.
///
/// All convenience constructors start from these defaults and override only the fields they
/// take, so every vertex ends up with the same memory layout regardless of how it was built.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// The position of the vertex in world space, as `[x, y, z]`.
    position: [f32; 3],

    /// The surface normal of the vertex, used by the pixel stage for its light term.
    normal: [f32; 3],

    /// The texture coordinate sampled by the pixel stage.
    tex_coord: [f32; 2],

    /// The RGBA color of the vertex, each channel normalized to `0.0..=1.0`.
    color: [f32; 4],
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, Self::PLANE_Z],
            normal: Self::DEFAULT_NORMAL,
            tex_coord: [0.0, 0.0],
            color: Self::DEFAULT_COLOR,
        }
    }
}

impl Vertex {
    /// Number of `f32` values in one vertex.
    pub const STRIDE: usize = 12;

    /// Size of one vertex in bytes.
    pub const BYTE_SIZE: usize = Self::STRIDE * std::mem::size_of::<f32>();

    /// Depth of the drawing plane for vertices created from 2D coordinates.
    pub const PLANE_Z: f32 = 0.0;

    /// Normal pointing toward the viewer.
    pub const DEFAULT_NORMAL: [f32; 3] = [0.0, 0.0, -1.0];

    /// Opaque white.
    pub const DEFAULT_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

    /// Creates a vertex at `position` with default normal, texture coordinate and color.
    pub fn new(position: [f32; 3]) -> Self {
        Self::with_normal(position, Self::DEFAULT_NORMAL)
    }

    /// Creates a vertex on the drawing plane from an `x`/`y` pair and an RGB color.
    ///
    /// The alpha channel is opaque and `z` is [`Vertex::PLANE_Z`].
    pub fn from_xy_rgb(x: f32, y: f32, r: f32, g: f32, b: f32) -> Self {
        Self {
            position: [x, y, Self::PLANE_Z],
            color: [r, g, b, 1.0],
            ..Self::default()
        }
    }

    pub fn with_normal(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self::with_tex_coord(position, normal, [0.0, 0.0])
    }

    pub fn with_color(position: [f32; 3], color: [f32; 4]) -> Self {
        let mut vertex = Self::new(position);
        vertex.set_color(color);
        vertex
    }

    pub fn with_tex_coord(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self::full(position, normal, tex_coord, Self::DEFAULT_COLOR)
    }

    /// Creates a vertex with every attribute given explicitly.
    pub fn full(
        position: [f32; 3],
        normal: [f32; 3],
        tex_coord: [f32; 2],
        color: [f32; 4],
    ) -> Self {
        Self {
            position,
            normal,
            tex_coord,
            color,
        }
    }

    pub fn position(&self) -> [f32; 3] {
        self.position
    }

    pub fn normal(&self) -> [f32; 3] {
        self.normal
    }

    pub fn tex_coord(&self) -> [f32; 2] {
        self.tex_coord
    }

    pub fn color(&self) -> [f32; 4] {
        self.color
    }

    pub fn set_position(&mut self, position: [f32; 3]) {
        self.position = position;
    }

    pub fn set_normal(&mut self, normal: [f32; 3]) {
        self.normal = normal;
    }

    pub fn set_tex_coord(&mut self, tex_coord: [f32; 2]) {
        self.tex_coord = tex_coord;
    }

    pub fn set_color(&mut self, color: [f32; 4]) {
        self.color = color;
    }

    /// Flattens the vertex into its 12-float wire image.
    ///
    /// The order is position, normal, texture coordinate, color, which is the order the
    /// vertex buffer layout returned by [`Vertex::description`] expects.
    pub fn to_floats(&self) -> [f32; Self::STRIDE] {
        let mut floats = [0.0; Self::STRIDE];
        floats.copy_from_slice(bytemuck::cast_slice(std::slice::from_ref(self)));
        floats
    }

    /// Rebuilds a vertex from the first [`Vertex::STRIDE`] floats of `floats`.
    ///
    /// Returns `None` when the slice is shorter than one vertex.
    pub fn from_floats(floats: &[f32]) -> Option<Self> {
        let floats = floats.get(..Self::STRIDE)?;
        Some(bytemuck::pod_read_unaligned(bytemuck::cast_slice(floats)))
    }

    /// Generates the vertex attributes layout for the `Vertex` struct.
    ///
    /// # Returns
    ///
    /// Four attributes at shader locations `0..=3`:
    ///
    /// - `0`: position, `Float32x3`
    /// - `1`: normal, `Float32x3`
    /// - `2`: texture coordinate, `Float32x2`
    /// - `3`: color, `Float32x4`
    ///
    /// Offsets are derived by the `vertex_attr_array!` macro from the formats, so they always
    /// agree with the `#[repr(C)]` field order above.
    pub fn vertex_attributes() -> Vec<wgpu::VertexAttribute> {
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2, 3 => Float32x4]
            .to_vec()
    }

    /// Returns the vertex buffer layout for the `Vertex` struct.
    ///
    /// # Parameters
    ///
    /// - `attributes`: The attributes returned by [`Vertex::vertex_attributes`].
    ///
    /// # Returns
    ///
    /// A `wgpu::VertexBufferLayout` with an `array_stride` of [`Vertex::BYTE_SIZE`], per-vertex
    /// stepping, and the given attributes.
    pub fn description(attributes: &[wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_stride() {
        assert_eq!(std::mem::size_of::<Vertex>(), 48);
        assert_eq!(Vertex::BYTE_SIZE, 48);

        let attributes = Vertex::vertex_attributes();
        let offsets: Vec<_> = attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 24, 32]);
        assert_eq!(
            Vertex::description(&attributes).array_stride,
            Vertex::BYTE_SIZE as u64
        );
    }

    #[test]
    fn constructors_share_defaults() {
        assert_eq!(Vertex::new([0.0, 0.0, 0.0]), Vertex::default());

        let plain = Vertex::new([1.0, 2.0, 3.0]);
        assert_eq!(plain.normal(), [0.0, 0.0, -1.0]);
        assert_eq!(plain.tex_coord(), [0.0, 0.0]);
        assert_eq!(plain.color(), [1.0, 1.0, 1.0, 1.0]);

        let colored = Vertex::with_color([1.0, 2.0, 3.0], [0.5, 0.5, 0.5, 1.0]);
        assert_eq!(colored.normal(), plain.normal());
        assert_eq!(colored.position(), plain.position());

        let planar = Vertex::from_xy_rgb(4.0, 5.0, 0.0, 1.0, 0.0);
        assert_eq!(planar.position(), [4.0, 5.0, Vertex::PLANE_Z]);
        assert_eq!(planar.color(), [0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn floats_follow_field_order() {
        let vertex = Vertex::full(
            [1.0, 2.0, 3.0],
            [4.0, 5.0, 6.0],
            [7.0, 8.0],
            [9.0, 10.0, 11.0, 12.0],
        );
        let floats = vertex.to_floats();
        assert_eq!(
            floats,
            [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0]
        );
        assert_eq!(Vertex::from_floats(&floats), Some(vertex));
        assert_eq!(Vertex::from_floats(&floats[..11]), None);
    }
}
