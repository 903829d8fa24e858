//! # Texture Binding
//!
//! The small sampled texture of the line pipeline. The image is generated in memory once at
//! initialization and never reloaded: a 20×20 RGBA field of opaque white with a slightly
//! darker one-pixel border, so sampling at the default texture coordinate `(0, 0)` tints
//! lines only faintly.
//!
//! The texture view and its sampler live in bind group `1`:
//!
//! ```wgsl
//! @group(1) @binding(0) var line_texture: texture_2d<f32>;
//! @group(1) @binding(1) var line_sampler: sampler;
//! ```

/// A tightly packed RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureImage {
    pub const BYTES_PER_PIXEL: u32 = 4;

    /// The built-in 20×20 line texture.
    pub fn line_pattern() -> Self {
        Self::bordered(20, 20, [255, 255, 255, 255], [235, 235, 235, 255])
    }

    /// A `width` × `height` image filled with `fill`, framed by a one-pixel `border`.
    pub fn bordered(width: u32, height: u32, fill: [u8; 4], border: [u8; 4]) -> Self {
        let pixels = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .flat_map(|(x, y)| {
                let on_edge = x == 0 || y == 0 || x + 1 == width || y + 1 == height;
                if on_edge {
                    border
                } else {
                    fill
                }
            })
            .collect();

        Self {
            width,
            height,
            pixels,
        }
    }

    /// Bytes in one row of pixels.
    pub fn bytes_per_row(&self) -> u32 {
        self.width * Self::BYTES_PER_PIXEL
    }
}

/// The sampled texture, its sampler and their bind group.
pub struct TextureBinding {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl TextureBinding {
    /// Uploads `image` into an immutable sRGB texture and binds it with a linear sampler.
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, image: &TextureImage) -> Self {
        let texture = wgpu::util::DeviceExt::create_texture_with_data(
            device,
            queue,
            &wgpu::TextureDescriptor {
                label: Some("Line Texture"),
                size: wgpu::Extent3d {
                    width: image.width,
                    height: image.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &image.pixels,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Line Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("texture_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        Self {
            texture,
            view,
            sampler,
            bind_group,
            bind_group_layout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_pattern_is_twenty_square() {
        let image = TextureImage::line_pattern();
        assert_eq!((image.width, image.height), (20, 20));
        assert_eq!(image.pixels.len(), 20 * 20 * 4);
        assert_eq!(image.bytes_per_row(), 80);
    }

    #[test]
    fn border_frames_fill() {
        let image = TextureImage::bordered(3, 3, [1, 1, 1, 1], [9, 9, 9, 9]);
        let pixel = |x: usize, y: usize| &image.pixels[(y * 3 + x) * 4..(y * 3 + x) * 4 + 4];
        assert_eq!(pixel(1, 1), &[1, 1, 1, 1]);
        assert_eq!(pixel(0, 0), &[9, 9, 9, 9]);
        assert_eq!(pixel(2, 1), &[9, 9, 9, 9]);
    }
}
