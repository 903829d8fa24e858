//! # GPU Management Module
//!
//! The `gpu` module sets up the device-level objects every other GPU resource is created from:
//! the presentation surface, the logical device and its command queue, and the surface
//! configuration (the swap chain, in older terminology).
//!
//! ## Overview
//!
//! [`Gpu`] abstracts away adapter selection, device creation and surface configuration. The
//! renderer owns exactly one `Gpu` for as long as its pipeline is initialized and drops it in
//! `clean_up`.
//!
//! ## Features
//!
//! - **Fallible asynchronous initialization**: [`Gpu::new_async`] reports a missing adapter,
//!   a rejected device request or a surface without formats as a [`RendererError`] instead of
//!   panicking, so the caller can leave the renderer uninitialized.
//! - **Surface resizing**: [`Gpu::resize`] reconfigures the surface for a new drawable size.
//! - **Depth texture creation**: [`Gpu::create_depth_texture`] builds the depth attachment that
//!   matches the current surface size.
//!
//! ## Example Usage
//!
//! ```ignore
//! use line_sketch::Gpu;
//!
//! async fn create_gpu(window: std::sync::Arc<winit::window::Window>) -> Gpu {
//!     let size = window.inner_size();
//!     Gpu::new_async(window, size.width, size.height).await.unwrap()
//! }
//! ```

use wgpu::InstanceDescriptor;

use crate::error::RendererError;

/// The GPU device, queue and configured presentation surface.
///
/// # Fields
/// - `surface`: The presentation target, tied to a window or canvas.
/// - `device`: Creates every buffer, texture and pipeline of the renderer.
/// - `queue`: Receives buffer writes and command buffers.
/// - `surface_config`: Size, format and present mode of the surface.
/// - `surface_format`: The colour format the render pipeline targets.
pub struct Gpu {
    /// The surface frames are presented to.
    pub surface: wgpu::Surface<'static>,

    /// The logical device.
    pub device: wgpu::Device,

    /// The command queue of `device`.
    pub queue: wgpu::Queue,

    /// The current surface configuration. `width` and `height` always hold the last size the
    /// surface was configured with.
    pub surface_config: wgpu::SurfaceConfiguration,

    /// The colour format chosen for the surface.
    pub surface_format: wgpu::TextureFormat,
}

impl Gpu {
    /// Returns the size the surface is currently configured with.
    pub fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    /// Reconfigures the surface for a new drawable size.
    ///
    /// Both dimensions must be non-zero; wgpu rejects empty surfaces. The renderer never
    /// calls this with a zero size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.reconfigure();
    }

    /// Applies the current configuration again, used after the surface was lost.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Creates a `Depth32Float` depth attachment of the given size.
    pub fn create_depth_texture(&self, width: u32, height: u32) -> wgpu::TextureView {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Depth Texture View"),
            format: Some(wgpu::TextureFormat::Depth32Float),
            dimension: Some(wgpu::TextureViewDimension::D2),
            aspect: wgpu::TextureAspect::All,
            base_mip_level: 0,
            base_array_layer: 0,
            array_layer_count: None,
            mip_level_count: None,
            usage: None,
        })
    }

    /// Creates the surface for `window`, picks an adapter compatible with it, requests a
    /// device and configures the surface at `width` × `height`.
    ///
    /// # Errors
    ///
    /// - [`RendererError::SurfaceCreation`] if the window cannot back a surface.
    /// - [`RendererError::AdapterNotFound`] if no adapter can present to that surface.
    /// - [`RendererError::DeviceRequest`] if the adapter refuses the requested limits.
    /// - [`RendererError::NoSurfaceFormat`] if the surface reports no usable format.
    pub async fn new_async(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<Self, RendererError> {
        let instance = wgpu::Instance::new(&InstanceDescriptor::default());

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RendererError::AdapterNotFound)?;

        log::info!("WGPU Adapter: {:?}", adapter.get_info());
        log::debug!("WGPU Adapter Features: {:#?}", adapter.features());

        // WebGL2 cannot meet the default limits, so the downlevel set is requested there.
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("WGPU Device"),
                    memory_hints: wgpu::MemoryHints::default(),
                    required_features: wgpu::Features::default(),
                    #[cfg(not(target_arch = "wasm32"))]
                    required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                    #[cfg(all(target_arch = "wasm32", feature = "webgpu"))]
                    required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                    #[cfg(all(target_arch = "wasm32", feature = "webgl"))]
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                },
                None,
            )
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);

        // egui wants a non-srgb surface texture
        let surface_format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|format| !format.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or(RendererError::NoSurfaceFormat)?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: surface_capabilities
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &surface_config);
        log::info!(
            "Configured {surface_format:?} surface at {}x{}",
            surface_config.width,
            surface_config.height
        );

        Ok(Self {
            surface,
            device,
            queue,
            surface_config,
            surface_format,
        })
    }
}
