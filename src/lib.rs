//! # Line Sketch Library
//!
//! This library implements an interactive line-drawing prototype: line segments are drawn with
//! the pointer and rendered in real time through a `wgpu` pipeline with a configurable model
//! transform and a perspective projection.
//!
//! ## Modules
//!
//! - [`app`]: The `winit` application handler, egui tool panel and input translation.
//! - [`renderer`]: The render pipeline lifecycle, the per-frame draw and vertex uploads.
//! - [`gpu`]: Device, queue and surface setup.
//! - [`interaction`]: The line tool state machine.
//! - [`events`]: Input events and the subscription hub that delivers them.
//! - [`draw_manager`]: The geometry store backing the vertex buffer.
//! - [`primitive`]: Drawable primitives; currently line segments.
//! - [`vertex`]: The GPU vertex record and its buffer layout.
//! - [`transform`]: Model and projection matrices and their inversion.
//! - [`camera`]: Viewer parameters and pointer unprojection.
//! - [`uniform_buffer`] and [`uniform_binding`]: The per-frame constant buffer.
//! - [`texture_binding`]: The sampled line texture.
//! - [`shader`]: The WGSL program.
//! - [`config`]: Start-up settings.
//! - [`error`]: Error types.
//!
//! ## Data Flow
//!
//! ```text
//! pointer event -> EventHub -> LineTool -> DrawManager edit -> Renderer::update_vertex_buffer
//!                                                                        |
//!                                   redraw tick -> Renderer::render <----+
//! ```
//!
//! The geometry store and the camera are created once and handed to both the renderer and
//! the line tool. The renderer keeps its GPU resources behind a single lock; the frame loop
//! and the upload path both go through it.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use line_sketch::{Camera, DrawManager, LineTool, Renderer, Settings, ToolState};
//!
//! let store = DrawManager::shared();
//! let mut camera = Camera::default();
//! camera.set_viewport_size(800, 600);
//! let camera = camera.into_shared();
//!
//! // Uninitialized renderers accept uploads as no-ops, so the tool can run headless.
//! let renderer = Arc::new(Renderer::new(store.clone(), camera.clone(), &Settings::default()));
//! let mut tool = LineTool::new(store.clone(), camera, renderer);
//!
//! tool.select_tool();
//! tool.pointer_pressed(400.0, 300.0)?;
//! tool.pointer_moved(450.0, 300.0)?;
//! tool.pointer_released(450.0, 300.0)?;
//!
//! assert_eq!(tool.state(), ToolState::ToolArmed);
//! assert_eq!(store.read().vertex_count(), 2);
//! # Ok::<(), line_sketch::Error>(())
//! ```

pub mod app;
pub mod camera;
pub mod config;
pub mod draw_manager;
pub mod error;
pub mod events;
pub mod gpu;
pub mod interaction;
pub mod primitive;
pub mod renderer;
pub mod shader;
pub mod texture_binding;
pub mod transform;
pub mod uniform_binding;
pub mod uniform_buffer;
pub mod vertex;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub use crate::app::App;
pub use crate::camera::{Camera, SharedCamera};
pub use crate::config::{LineColors, Settings};
pub use crate::draw_manager::{DrawManager, SharedDrawManager};
pub use crate::error::{Error, RendererError, Result, TransformError};
pub use crate::events::{EventHub, InputEvent, InputHandler, SubscriptionId};
pub use crate::gpu::Gpu;
pub use crate::interaction::{LineTool, ToolState};
pub use crate::primitive::{Line, Primitive};
pub use crate::renderer::{Overlay, PipelineState, Renderer, VertexUpload};
pub use crate::shader::SHADER_SOURCE;
pub use crate::transform::ModelTransform;
pub use crate::uniform_binding::UniformBinding;
pub use crate::uniform_buffer::UniformBuffer;
pub use crate::vertex::Vertex;

/// Browser entry point: binds to the page's `canvas` element and runs the event loop.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    if console_log::init_with_level(log::Level::Info).is_err() {
        return;
    }

    let event_loop = match winit::event_loop::EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(error) => {
            log::error!("Failed to create event loop: {error}");
            return;
        }
    };
    let mut app = App::default();
    if let Err(error) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {error}");
    }
}
