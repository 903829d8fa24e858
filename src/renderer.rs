//! # Renderer Module
//!
//! The `Renderer` owns every GPU resource of the line pipeline and is the only place that
//! talks to the device after start-up. It is shared between the redraw loop and the event
//! handlers, so all of its methods take `&self` and serialise on one internal lock.
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized --initialize--> Initialized --start_rendering--> Rendering
//!                                                    ^               |
//!                                    start_rendering |               | stop_rendering
//!                                                    |               v
//!                                                    +---------- Suspended
//!
//! any state --clean_up--> Disposed
//! ```
//!
//! - [`Renderer::initialize`] builds the whole resource set. Nothing is installed unless every
//!   step succeeds, so a failed initialization leaves the renderer `Uninitialized`.
//! - [`Renderer::render`] draws one frame, and only while `Rendering`.
//! - [`Renderer::update_vertex_buffer`] re-uploads the geometry store after an edit.
//! - [`Renderer::resize`] recreates the size-dependent resources (surface configuration, depth
//!   attachment, viewport). A zero size keeps the pipeline suspended until a real size arrives.
//! - [`Renderer::clean_up`] releases everything exactly once; it also runs on drop.
//!
//! ## Locking
//!
//! The pipeline lock is always taken before the geometry store's read lock or the camera
//! lock, never the other way round. The frame itself never reads the store: it draws the
//! vertex count that was resident after the last upload.

use std::path::PathBuf;

use nalgebra_glm as glm;
use parking_lot::{Mutex, RwLock};

use crate::camera::{Camera, SharedCamera};
use crate::config::Settings;
use crate::draw_manager::SharedDrawManager;
use crate::error::RendererError;
use crate::gpu::Gpu;
use crate::shader;
use crate::texture_binding::{TextureBinding, TextureImage};
use crate::transform::{self, ModelTransform};
use crate::uniform_binding::UniformBinding;
use crate::uniform_buffer::UniformBuffer;
use crate::vertex::Vertex;

/// Where the render pipeline is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// No GPU resources exist yet.
    Uninitialized,
    /// Resources exist but the frame loop has not been started.
    Initialized,
    /// Frames are drawn on every redraw.
    Rendering,
    /// Resources exist but frames are skipped.
    Suspended,
    /// Resources have been released; the renderer cannot be used again.
    Disposed,
}

impl PipelineState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Uninitialized => "Uninitialized",
            Self::Initialized => "Initialized",
            Self::Rendering => "Rendering",
            Self::Suspended => "Suspended",
            Self::Disposed => "Disposed",
        }
    }

    /// Whether GPU resources are installed in this state.
    pub fn has_resources(self) -> bool {
        matches!(self, Self::Initialized | Self::Rendering | Self::Suspended)
    }

    /// The state after a start request. Only a state with resources can start.
    pub fn started(self) -> Self {
        match self {
            Self::Initialized | Self::Suspended => Self::Rendering,
            other => other,
        }
    }

    /// The state after a stop request.
    pub fn stopped(self) -> Self {
        match self {
            Self::Rendering => Self::Suspended,
            other => other,
        }
    }
}

/// The rectangle of the surface the lines are drawn into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// The full-surface viewport for a `width` × `height` drawable.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// What a resize request amounts to, given the current surface size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAction {
    /// Same size as configured; nothing to do.
    Unchanged,
    /// One dimension is zero; suspend until a usable size arrives.
    Minimize,
    /// Reconfigure the surface and recreate size-dependent resources.
    Reconfigure,
}

impl ResizeAction {
    pub fn plan(current: (u32, u32), requested: (u32, u32), minimized: bool) -> Self {
        if requested.0 == 0 || requested.1 == 0 {
            Self::Minimize
        } else if requested == current && !minimized {
            Self::Unchanged
        } else {
            Self::Reconfigure
        }
    }
}

/// The egui output drawn on top of the lines.
pub struct Overlay {
    pub screen_descriptor: egui_wgpu::ScreenDescriptor,
    pub paint_jobs: Vec<egui::epaint::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
}

/// Anything that can push the geometry store's contents to the GPU.
///
/// The line tool calls this after each store edit. [`Renderer`] is the production
/// implementation.
pub trait VertexUpload {
    fn update_vertex_buffer(&self) -> Result<(), RendererError>;
}

/// Size in bytes of a vertex buffer holding `vertex_count` vertices. Never zero, so an empty
/// store still has a bindable buffer.
pub fn vertex_buffer_size(vertex_count: u32) -> u64 {
    u64::from(vertex_count.max(1)) * Vertex::BYTE_SIZE as u64
}

/// Every GPU object the pipeline owns.
///
/// Created as a whole by [`Renderer::initialize`] and dropped as a whole by
/// [`Renderer::clean_up`].
pub struct GpuResources {
    /// Device, queue and configured surface.
    pub gpu: Gpu,

    /// Depth attachment matching the surface size.
    pub depth_texture_view: wgpu::TextureView,

    /// The area of the surface lines are drawn into.
    pub viewport: Viewport,

    /// Line-list pipeline with the vertex layout, shaders and depth test baked in.
    pub pipeline: wgpu::RenderPipeline,

    /// Constant buffer at group 0.
    pub uniform: UniformBinding,

    /// Texture and sampler at group 1.
    pub texture: TextureBinding,

    /// The flattened geometry store as of the last upload.
    pub vertex_buffer: wgpu::Buffer,

    /// Draws the tool panel on top of the lines.
    pub egui_renderer: egui_wgpu::Renderer,
}

impl GpuResources {
    async fn create(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        shader_source: &str,
    ) -> Result<Self, RendererError> {
        let gpu = Gpu::new_async(target, width, height).await?;
        let (width, height) = gpu.size();

        let shader_module = shader::create_module(&gpu.device, shader_source).await?;
        let uniform = UniformBinding::new(&gpu.device)?;
        let texture = TextureBinding::new(&gpu.device, &gpu.queue, &TextureImage::line_pattern());
        let pipeline = Self::create_pipeline(
            &gpu.device,
            gpu.surface_format,
            &shader_module,
            &uniform,
            &texture,
        )
        .await?;

        let vertex_buffer = Self::create_vertex_buffer(&gpu.device, 0);
        let depth_texture_view = gpu.create_depth_texture(width, height);

        let egui_renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.surface_config.format,
            Some(Renderer::DEPTH_FORMAT),
            1,
            false,
        );

        Ok(Self {
            gpu,
            depth_texture_view,
            viewport: Viewport::from_size(width, height),
            pipeline,
            uniform,
            texture,
            vertex_buffer,
            egui_renderer,
        })
    }

    fn create_vertex_buffer(device: &wgpu::Device, vertex_count: u32) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Vertex Buffer"),
            size: vertex_buffer_size(vertex_count),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    async fn create_pipeline(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        shader_module: &wgpu::ShaderModule,
        uniform: &UniformBinding,
        texture: &TextureBinding,
    ) -> Result<wgpu::RenderPipeline, RendererError> {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Line Pipeline Layout"),
            bind_group_layouts: &[&uniform.bind_group_layout, &texture.bind_group_layout],
            push_constant_ranges: &[],
        });

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Line Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader_module,
                entry_point: Some(shader::VERTEX_ENTRY),
                buffers: &[Vertex::description(&Vertex::vertex_attributes())],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList, // Every two vertices form one segment.
                strip_index_format: None,
                front_face: wgpu::FrontFace::Cw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
                unclipped_depth: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: Renderer::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: shader_module,
                entry_point: Some(shader::FRAGMENT_ENTRY),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview: None,
            cache: None,
        });

        match device.pop_error_scope().await {
            Some(error) => Err(RendererError::PipelineCreation(error.to_string())),
            None => Ok(pipeline),
        }
    }

    /// Writes `floats` into the vertex buffer, recreating it when the vertex count changed.
    fn upload_vertices(&mut self, floats: &[f32], resident_vertex_count: u32) -> u32 {
        let vertex_count = (floats.len() / Vertex::STRIDE) as u32;
        if vertex_count != resident_vertex_count {
            log::debug!("Recreating vertex buffer: {resident_vertex_count} -> {vertex_count} vertices");
            self.vertex_buffer = Self::create_vertex_buffer(&self.gpu.device, vertex_count);
        }
        if !floats.is_empty() {
            self.gpu
                .queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(floats));
        }
        vertex_count
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        self.depth_texture_view = self.gpu.create_depth_texture(width, height);
        self.viewport = Viewport::from_size(width, height);
    }

    fn update_texture(&mut self, id: egui::TextureId, image_delta: &egui::epaint::ImageDelta) {
        self.egui_renderer
            .update_texture(&self.gpu.device, &self.gpu.queue, id, image_delta);
    }

    /// Encodes and presents one frame of `vertex_count` line vertices with `overlay` on top.
    fn draw_frame(
        &mut self,
        constants: UniformBuffer,
        background_color: wgpu::Color,
        vertex_count: u32,
        overlay: Option<&Overlay>,
    ) -> Result<bool, RendererError> {
        self.uniform.update_buffer(&self.gpu.queue, constants);

        let surface_texture = match self.gpu.surface.get_current_texture() {
            Ok(surface_texture) => surface_texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.gpu.reconfigure();
                return Ok(false);
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timed out acquiring the next frame");
                return Ok(false);
            }
            Err(error) => return Err(error.into()),
        };

        let surface_texture_view =
            surface_texture
                .texture
                .create_view(&wgpu::TextureViewDescriptor {
                    label: Some("Surface Texture View"),
                    format: Some(self.gpu.surface_format),
                    ..Default::default()
                });

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let overlay_commands = match overlay {
            Some(overlay) => self.egui_renderer.update_buffers(
                &self.gpu.device,
                &self.gpu.queue,
                &mut encoder,
                &overlay.paint_jobs,
                &overlay.screen_descriptor,
            ),
            None => Vec::new(),
        };

        encoder.insert_debug_marker("Render lines");

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(background_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let viewport = self.viewport;
            render_pass.set_viewport(
                viewport.x,
                viewport.y,
                viewport.width,
                viewport.height,
                viewport.min_depth,
                viewport.max_depth,
            );
            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.uniform.bind_group, &[]);
            render_pass.set_bind_group(1, &self.texture.bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            if vertex_count > 0 {
                render_pass.draw(0..vertex_count, 0..1);
            }

            if let Some(overlay) = overlay {
                self.egui_renderer.render(
                    &mut render_pass.forget_lifetime(),
                    &overlay.paint_jobs,
                    &overlay.screen_descriptor,
                );
            }
        }

        self.gpu.queue.submit(
            overlay_commands
                .into_iter()
                .chain(std::iter::once(encoder.finish())),
        );
        surface_texture.present();
        Ok(true)
    }
}

/// egui texture uploads that arrived before there was a device to upload them to.
///
/// egui sends a texture's full image once and only patches it afterwards, so every upload is
/// kept in order until the pipeline is initialized.
#[derive(Default)]
struct PendingTextures {
    set: Vec<(egui::TextureId, egui::epaint::ImageDelta)>,
}

impl PendingTextures {
    fn defer(&mut self, delta: &egui::TexturesDelta) {
        self.set.extend(delta.set.iter().cloned());
        self.set.retain(|(id, _)| !delta.free.contains(id));
        log::debug!("{} egui texture uploads waiting for initialization", self.len());
    }

    fn len(&self) -> usize {
        self.set.len()
    }

    fn take(&mut self) -> Vec<(egui::TextureId, egui::epaint::ImageDelta)> {
        std::mem::take(&mut self.set)
    }
}

/// Everything behind the renderer's lock.
struct Pipeline {
    state: PipelineState,
    resources: Option<GpuResources>,
    /// Size the surface is configured with; meaningful once resources exist.
    surface_size: (u32, u32),
    /// Vertices in the GPU vertex buffer; the draw count of every frame.
    resident_vertex_count: u32,
    /// The state to return to once a zero-size resize is followed by a usable one.
    restore_state: Option<PipelineState>,
    pending_textures: PendingTextures,
    background_color: wgpu::Color,
    model_transform: ModelTransform,
    shader_path: Option<PathBuf>,
    /// Reused flattening buffer for uploads.
    scratch: Vec<f32>,
}

impl Pipeline {
    fn new(settings: &Settings) -> Self {
        Self {
            state: PipelineState::Uninitialized,
            resources: None,
            surface_size: (0, 0),
            resident_vertex_count: 0,
            restore_state: None,
            pending_textures: PendingTextures::default(),
            background_color: settings.background_color,
            model_transform: settings.model_transform,
            shader_path: settings.shader_path.clone(),
            scratch: Vec::new(),
        }
    }

    fn start(&mut self) {
        self.state = self.state.started();
    }

    fn stop(&mut self) {
        self.state = self.state.stopped();
    }

    /// A start requested from outside. While minimized it only changes what the pipeline
    /// returns to once the surface has an area again.
    fn request_start(&mut self) {
        match self.restore_state.as_mut() {
            Some(previous) => *previous = previous.started(),
            None => self.start(),
        }
    }

    fn request_stop(&mut self) {
        match self.restore_state.as_mut() {
            Some(previous) => *previous = previous.stopped(),
            None => self.stop(),
        }
    }

    /// Applies a new drawable size to the size-dependent state.
    ///
    /// The vertex and constant buffers and the resident vertex count are left alone. GPU
    /// resources, when present, are recreated for the new size.
    fn apply_resize(&mut self, width: u32, height: u32, camera: &RwLock<Camera>) -> ResizeAction {
        let action = ResizeAction::plan(
            self.surface_size,
            (width, height),
            self.restore_state.is_some(),
        );

        match action {
            ResizeAction::Unchanged => {}
            ResizeAction::Minimize => {
                if self.restore_state.is_none() {
                    log::info!("Surface has no area, suspending rendering");
                    self.restore_state = Some(self.state);
                    self.stop();
                }
            }
            ResizeAction::Reconfigure => {
                log::info!("Resizing renderer surface to: ({width}, {height})");
                let resume = match self.restore_state.take() {
                    Some(previous) => previous == PipelineState::Rendering,
                    None => self.state == PipelineState::Rendering,
                };
                self.stop();

                if let Some(resources) = self.resources.as_mut() {
                    resources.resize(width, height);
                }
                self.surface_size = (width, height);
                camera.write().set_viewport_size(width, height);

                if resume {
                    self.start();
                }
            }
        }
        action
    }
}

/// The render pipeline.
///
/// # Example
///
/// ```ignore
/// let store = DrawManager::shared();
/// let camera = Camera::default().into_shared();
/// let renderer = Arc::new(Renderer::new(store, camera, &Settings::default()));
///
/// pollster::block_on(renderer.initialize(window.clone(), width, height))?;
/// renderer.start_rendering();
/// renderer.render(None)?;
/// ```
pub struct Renderer {
    pipeline: Mutex<Pipeline>,
    store: SharedDrawManager,
    camera: SharedCamera,
}

impl Renderer {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Creates an uninitialized renderer reading geometry from `store` and view parameters
    /// from `camera`.
    pub fn new(store: SharedDrawManager, camera: SharedCamera, settings: &Settings) -> Self {
        Self {
            pipeline: Mutex::new(Pipeline::new(settings)),
            store,
            camera,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.pipeline.lock().state
    }

    /// Number of vertices the next frame will draw.
    pub fn resident_vertex_count(&self) -> u32 {
        self.pipeline.lock().resident_vertex_count
    }

    /// The configured surface size, if the pipeline is initialized.
    pub fn surface_size(&self) -> Option<(u32, u32)> {
        let pipeline = self.pipeline.lock();
        pipeline.resources.as_ref().map(|_| pipeline.surface_size)
    }

    pub fn background_color(&self) -> wgpu::Color {
        self.pipeline.lock().background_color
    }

    pub fn set_background_color(&self, color: wgpu::Color) {
        log::info!(
            "Background color set to ({}, {}, {}, {})",
            color.r,
            color.g,
            color.b,
            color.a
        );
        self.pipeline.lock().background_color = color;
    }

    pub fn model_transform(&self) -> ModelTransform {
        self.pipeline.lock().model_transform
    }

    pub fn set_model_transform(&self, model_transform: ModelTransform) {
        self.pipeline.lock().model_transform = model_transform;
    }

    /// Creates every GPU resource and uploads the current geometry.
    ///
    /// The device work happens without holding the lock; the finished resource set is
    /// installed afterwards, and only if no other initialization won the race.
    ///
    /// # Errors
    ///
    /// - [`RendererError::InvalidState`] unless the renderer is `Uninitialized`.
    /// - Any setup failure of the device, shader, constant buffer or pipeline. The renderer
    ///   stays `Uninitialized` in that case.
    pub async fn initialize(
        &self,
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<(), RendererError> {
        let shader_path = {
            let pipeline = self.pipeline.lock();
            if pipeline.state != PipelineState::Uninitialized {
                return Err(RendererError::InvalidState {
                    operation: "initialize",
                    state: pipeline.state,
                });
            }
            pipeline.shader_path.clone()
        };

        let shader_source = shader::load_source(shader_path.as_deref())?;
        let mut resources = GpuResources::create(target, width, height, &shader_source).await?;

        let mut guard = self.pipeline.lock();
        let pipeline = &mut *guard;
        if pipeline.state != PipelineState::Uninitialized {
            log::warn!("Discarding resources of a concurrent initialization");
            return Err(RendererError::InvalidState {
                operation: "initialize",
                state: pipeline.state,
            });
        }

        self.store.read().write_floats(&mut pipeline.scratch);
        pipeline.resident_vertex_count = resources.upload_vertices(&pipeline.scratch, 0);

        let (width, height) = resources.gpu.size();
        self.camera.write().set_viewport_size(width, height);

        pipeline.resources = Some(resources);
        pipeline.surface_size = (width, height);
        pipeline.state = PipelineState::Initialized;
        log::info!(
            "Render pipeline initialized at {width}x{height} with {} vertices",
            pipeline.resident_vertex_count
        );
        Ok(())
    }

    /// Attaches the pipeline to the frame loop. Does nothing unless resources exist.
    ///
    /// While the surface is minimized the request is remembered and takes effect when the
    /// surface has an area again.
    pub fn start_rendering(&self) {
        let mut pipeline = self.pipeline.lock();
        let before = pipeline.state;
        pipeline.request_start();
        if before != pipeline.state {
            log::info!("Rendering started");
        }
    }

    /// Detaches the pipeline from the frame loop.
    pub fn stop_rendering(&self) {
        let mut pipeline = self.pipeline.lock();
        let before = pipeline.state;
        pipeline.request_stop();
        if before != pipeline.state {
            log::info!("Rendering stopped");
        }
    }

    /// Draws one frame and presents it.
    ///
    /// Returns `Ok(false)` when no frame was drawn: the pipeline is not `Rendering`, or the
    /// surface was lost or outdated and has been reconfigured for the next frame.
    ///
    /// # Errors
    ///
    /// [`RendererError::Surface`] when the surface fails in a way reconfiguration cannot fix.
    pub fn render(&self, overlay: Option<Overlay>) -> Result<bool, RendererError> {
        let mut guard = self.pipeline.lock();
        let pipeline = &mut *guard;
        let Some(resources) = pipeline.resources.as_mut() else {
            if let Some(overlay) = overlay.as_ref() {
                pipeline.pending_textures.defer(&overlay.textures_delta);
            }
            return Ok(false);
        };

        // egui sends each texture delta once, so both lists are applied even on skipped frames.
        for (id, image_delta) in pipeline.pending_textures.take() {
            resources.update_texture(id, &image_delta);
        }
        if let Some(overlay) = overlay.as_ref() {
            for (id, image_delta) in &overlay.textures_delta.set {
                resources.update_texture(*id, image_delta);
            }
        }

        let result = if pipeline.state == PipelineState::Rendering {
            let camera = *self.camera.read();
            let constants = UniformBuffer::new(
                transform::model_matrix(&pipeline.model_transform) * camera.view_matrix(),
                camera.projection(),
                glm::Vec3::from(UniformBuffer::DEFAULT_LIGHT),
            );
            resources.draw_frame(
                constants,
                pipeline.background_color,
                pipeline.resident_vertex_count,
                overlay.as_ref(),
            )
        } else {
            log::trace!("Skipping frame while {}", pipeline.state.name());
            Ok(false)
        };

        if let Some(overlay) = overlay {
            for id in &overlay.textures_delta.free {
                resources.egui_renderer.free_texture(id);
            }
        }

        result
    }

    /// Re-uploads the whole geometry store into the vertex buffer.
    ///
    /// The frame loop is stopped for the duration of the upload and resumed afterwards if it
    /// was running. Before initialization this does nothing.
    pub fn update_vertex_buffer(&self) -> Result<(), RendererError> {
        let mut guard = self.pipeline.lock();
        let pipeline = &mut *guard;
        if pipeline.resources.is_none() {
            log::debug!("Vertex upload requested while {}", pipeline.state.name());
            return Ok(());
        }

        let was_rendering = pipeline.state == PipelineState::Rendering;
        pipeline.stop();

        self.store.read().write_floats(&mut pipeline.scratch);
        if let Some(resources) = pipeline.resources.as_mut() {
            pipeline.resident_vertex_count =
                resources.upload_vertices(&pipeline.scratch, pipeline.resident_vertex_count);
        }
        log::trace!("Uploaded {} vertices", pipeline.resident_vertex_count);

        if was_rendering {
            pipeline.start();
        }
        Ok(())
    }

    /// Adapts the size-dependent resources to a new drawable size.
    ///
    /// The vertex and constant buffers are left alone; only the surface configuration, the
    /// depth attachment, the viewport and the camera's viewport size change.
    pub fn resize(&self, width: u32, height: u32) {
        let mut pipeline = self.pipeline.lock();
        if pipeline.resources.is_none() {
            log::debug!("Ignoring resize to {width}x{height} while {}", pipeline.state.name());
            return;
        }
        pipeline.apply_resize(width, height, &self.camera);
    }

    /// Releases every GPU resource. Safe to call any number of times.
    pub fn clean_up(&self) {
        let mut pipeline = self.pipeline.lock();
        if pipeline.state == PipelineState::Disposed {
            return;
        }
        pipeline.stop();
        if pipeline.resources.take().is_some() {
            log::info!("Render pipeline resources released");
        }
        pipeline.resident_vertex_count = 0;
        pipeline.surface_size = (0, 0);
        pipeline.restore_state = None;
        pipeline.pending_textures = PendingTextures::default();
        pipeline.state = PipelineState::Disposed;
    }
}

impl VertexUpload for Renderer {
    fn update_vertex_buffer(&self) -> Result<(), RendererError> {
        Renderer::update_vertex_buffer(self)
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.clean_up();
    }
}
