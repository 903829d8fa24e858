//! # Application Core (`app.rs`)
//!
//! The `App` struct is the `winit` application handler. It owns the window and the egui
//! state, builds the geometry store, camera, renderer and line tool on construction, and
//! translates window events into [`InputEvent`]s for the [`EventHub`].
//!
//! ## Features and Components
//!
//! - **Window Management**: Creates the window (or binds the `canvas` element on the web) and
//!   forwards resizes to the renderer.
//! - **Pointer Input**: Left-button presses, cursor moves and releases become pointer events
//!   for the line tool, unless egui claims them.
//! - **Keyboard**: `L` selects the line tool. The arrow keys pan the view. `Escape` cancels
//!   the current gesture, or exits when nothing is selected.
//! - **Tool Panel**: An egui window with the tool buttons, background presets, the vertex
//!   count and the tool and pipeline states.
//!
//! ## Platform-Specific Notes
//!
//! - **Desktop**: The renderer is initialized synchronously with `pollster`.
//! - **WebAssembly**: Initialization runs on the browser's executor. Its result comes back
//!   through a `oneshot` channel and is picked up on the next window event.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

use std::sync::Arc;

use parking_lot::Mutex;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseButton, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
    window::{Theme, Window},
};

use crate::camera::SharedCamera;
use crate::config::Settings;
use crate::draw_manager::{DrawManager, SharedDrawManager};
use crate::events::{EventHub, InputEvent, SubscriptionId};
use crate::interaction::{LineTool, ToolState};
use crate::renderer::{Overlay, Renderer};

#[cfg(target_arch = "wasm32")]
use crate::error::RendererError;

/// Clicks on the tool panel, applied after the egui pass.
#[derive(Default)]
struct PanelActions {
    event: Option<InputEvent>,
    background: Option<wgpu::Color>,
}

pub struct App {
    settings: Settings,

    store: SharedDrawManager,

    camera: SharedCamera,

    renderer: Arc<Renderer>,

    tool: Arc<Mutex<LineTool>>,

    hub: EventHub,

    subscriptions: Vec<SubscriptionId>,

    window: Option<Arc<Window>>,

    gui_state: Option<egui_winit::State>,

    /// Last cursor position in physical pixels.
    cursor: Option<(f32, f32)>,

    last_size: (u32, u32),

    #[cfg(target_arch = "wasm32")]
    init_receiver: Option<futures::channel::oneshot::Receiver<Result<(), RendererError>>>,
}

impl Default for App {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl App {
    pub fn new(settings: Settings) -> Self {
        let store = DrawManager::shared();
        let camera = settings.camera.into_shared();
        let renderer = Arc::new(Renderer::new(store.clone(), camera.clone(), &settings));
        let tool = Arc::new(Mutex::new(
            LineTool::new(store.clone(), camera.clone(), renderer.clone())
                .with_colors(settings.line_colors),
        ));

        let mut hub = EventHub::default();
        let subscriptions = vec![
            hub.subscribe(Box::new(tool.clone())),
            hub.subscribe(Box::new(renderer.clone())),
        ];

        Self {
            settings,
            store,
            camera,
            renderer,
            tool,
            hub,
            subscriptions,
            window: None,
            gui_state: None,
            cursor: None,
            last_size: (0, 0),
            #[cfg(target_arch = "wasm32")]
            init_receiver: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &SharedDrawManager {
        &self.store
    }

    pub fn camera(&self) -> &SharedCamera {
        &self.camera
    }

    pub fn renderer(&self) -> &Arc<Renderer> {
        &self.renderer
    }

    fn dispatch(&mut self, event: InputEvent) {
        // Failures are already logged by the hub; the gesture simply does not advance.
        let _ = self.hub.dispatch(&event);
    }

    fn handle_key(&mut self, event_loop: &winit::event_loop::ActiveEventLoop, key_code: KeyCode) {
        match key_code {
            KeyCode::KeyL => self.dispatch(InputEvent::SelectTool),
            KeyCode::ArrowLeft | KeyCode::ArrowRight | KeyCode::ArrowUp | KeyCode::ArrowDown => {
                if let Some((dx, dy)) = pan_offset(key_code, self.settings.pan_step) {
                    self.camera.write().pan(dx, dy);
                    log::trace!("Panned view by ({dx}, {dy})");
                }
            }
            KeyCode::Escape => {
                if self.tool.lock().state() == ToolState::Idle {
                    event_loop.exit();
                } else {
                    self.dispatch(InputEvent::Cancel);
                }
            }
            _ => {}
        }
    }

    fn start_renderer(&self, result: Result<(), crate::error::RendererError>) {
        match result {
            Ok(()) => self.renderer.start_rendering(),
            Err(error) => log::error!("Failed to initialize renderer: {error}"),
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn poll_initialization(&mut self) {
        let Some(receiver) = self.init_receiver.as_mut() else {
            return;
        };
        match receiver.try_recv() {
            Ok(Some(result)) => {
                self.init_receiver = None;
                self.start_renderer(result);
            }
            Ok(None) => {}
            Err(_) => {
                log::error!("Renderer initialization was dropped");
                self.init_receiver = None;
            }
        }
    }

    fn draw_panel(&self, ctx: &egui::Context) -> PanelActions {
        let mut actions = PanelActions::default();
        let tool_state = self.tool.lock().state();
        let vertex_count = self.store.read().vertex_count();
        let pipeline_state = self.renderer.state();

        egui::Window::new("Tools").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .selectable_label(tool_state != ToolState::Idle, "Draw Line")
                    .clicked()
                {
                    actions.event = Some(InputEvent::SelectTool);
                }
                if ui
                    .selectable_label(tool_state == ToolState::Idle, "Select")
                    .clicked()
                {
                    actions.event = Some(InputEvent::DeselectTool);
                }
            });
            ui.horizontal(|ui| {
                ui.label("Background");
                if ui.button("White").clicked() {
                    actions.background = Some(Settings::WHITE_BACKGROUND);
                }
                if ui.button("Black").clicked() {
                    actions.background = Some(Settings::BLACK_BACKGROUND);
                }
            });
            ui.separator();
            ui.label(format!("Vertices: {vertex_count}"));
            ui.label(format!("Tool: {}", tool_state.name()));
            ui.label(format!("Pipeline: {}", pipeline_state.name()));
        });

        actions
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let mut attributes = Window::default_attributes();

        #[cfg(not(target_arch = "wasm32"))]
        {
            let (width, height) = self.settings.initial_size;
            attributes = attributes
                .with_title(self.settings.title.as_str())
                .with_inner_size(PhysicalSize::new(width, height));
        }

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowAttributesExtWebSys;

            let canvas = wgpu::web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.get_element_by_id("canvas"))
                .and_then(|element| element.dyn_into::<wgpu::web_sys::HtmlCanvasElement>().ok());
            match canvas {
                Some(canvas) => {
                    self.last_size = (canvas.width(), canvas.height());
                    attributes = attributes.with_canvas(Some(canvas));
                }
                None => log::error!("No canvas element with id \"canvas\""),
            }
        }

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(error) => {
                log::error!("Failed to create window: {error}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        let gui_context = egui::Context::default();

        #[cfg(not(target_arch = "wasm32"))]
        {
            let inner_size = window.inner_size();
            self.last_size = (inner_size.width, inner_size.height);
        }

        #[cfg(target_arch = "wasm32")]
        {
            gui_context.set_pixels_per_point(window.scale_factor() as f32);
        }

        let viewport_id = gui_context.viewport_id();
        self.gui_state = Some(egui_winit::State::new(
            gui_context,
            viewport_id,
            &window,
            Some(window.scale_factor() as _),
            Some(Theme::Dark),
            None,
        ));

        let (width, height) = self.last_size;
        log::info!("Initializing renderer at ({width} x {height})");

        #[cfg(not(target_arch = "wasm32"))]
        {
            let result = pollster::block_on(self.renderer.initialize(window, width, height));
            if result.is_err() {
                event_loop.exit();
            }
            self.start_renderer(result);
        }

        #[cfg(target_arch = "wasm32")]
        {
            let (sender, receiver) = futures::channel::oneshot::channel();
            self.init_receiver = Some(receiver);
            let renderer = self.renderer.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let result = renderer.initialize(window, width, height).await;
                if sender.send(result).is_err() {
                    log::error!("Failed to send renderer initialization result!");
                }
            });
        }
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        #[cfg(target_arch = "wasm32")]
        self.poll_initialization();

        let (Some(gui_state), Some(window)) = (self.gui_state.as_mut(), self.window.clone()) else {
            return;
        };

        if gui_state.on_window_event(&window, &event).consumed {
            window.request_redraw();
            return;
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    winit::event::KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(event_loop, key_code),
            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = (position.x as f32, position.y as f32);
                self.cursor = Some((x, y));
                self.dispatch(InputEvent::PointerMoved { x, y });
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                if let Some((x, y)) = self.cursor {
                    let event = match state {
                        ElementState::Pressed => InputEvent::PointerPressed { x, y },
                        ElementState::Released => InputEvent::PointerReleased { x, y },
                    };
                    self.dispatch(event);
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.last_size = (width, height);
                self.dispatch(InputEvent::Resized { width, height });
            }
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting...");
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                let Some(gui_state) = self.gui_state.as_mut() else {
                    return;
                };
                let gui_input = gui_state.take_egui_input(&window);
                let ctx = gui_state.egui_ctx().clone();
                ctx.begin_pass(gui_input);

                let actions = self.draw_panel(&ctx);

                let egui::FullOutput {
                    textures_delta,
                    shapes,
                    pixels_per_point,
                    platform_output,
                    ..
                } = ctx.end_pass();

                if let Some(gui_state) = self.gui_state.as_mut() {
                    gui_state.handle_platform_output(&window, platform_output);
                }

                let paint_jobs = ctx.tessellate(shapes, pixels_per_point);
                let (width, height) = self.last_size;
                let overlay = Overlay {
                    screen_descriptor: egui_wgpu::ScreenDescriptor {
                        size_in_pixels: [width, height],
                        pixels_per_point: window.scale_factor() as f32,
                    },
                    paint_jobs,
                    textures_delta,
                };

                if let Err(error) = self.renderer.render(Some(overlay)) {
                    log::error!("Failed to render frame: {error}");
                }

                if let Some(background) = actions.background {
                    self.renderer.set_background_color(background);
                }
                if let Some(event) = actions.event {
                    self.dispatch(event);
                }
            }
            _ => (),
        }

        window.request_redraw();
    }

    fn exiting(&mut self, _event_loop: &winit::event_loop::ActiveEventLoop) {
        for id in self.subscriptions.drain(..) {
            self.hub.unsubscribe(id);
        }
        self.renderer.clean_up();
    }
}

/// The world-space offset an arrow key moves the view by. World y points up.
fn pan_offset(key_code: KeyCode, step: f32) -> Option<(f32, f32)> {
    match key_code {
        KeyCode::ArrowLeft => Some((-step, 0.0)),
        KeyCode::ArrowRight => Some((step, 0.0)),
        KeyCode::ArrowUp => Some((0.0, step)),
        KeyCode::ArrowDown => Some((0.0, -step)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;

    #[test]
    fn arrow_keys_pan_along_world_axes() {
        assert_eq!(pan_offset(KeyCode::ArrowLeft, 20.0), Some((-20.0, 0.0)));
        assert_eq!(pan_offset(KeyCode::ArrowRight, 20.0), Some((20.0, 0.0)));
        assert_eq!(pan_offset(KeyCode::ArrowUp, 20.0), Some((0.0, 20.0)));
        assert_eq!(pan_offset(KeyCode::ArrowDown, 20.0), Some((0.0, -20.0)));
        assert_eq!(pan_offset(KeyCode::KeyL, 20.0), None);
    }

    #[test]
    fn panning_moves_the_unprojected_pointer() {
        let mut camera = Camera::default();
        camera.set_viewport_size(800, 600);
        let before = camera.screen_to_world(400.0, 300.0).unwrap();

        let (dx, dy) = pan_offset(KeyCode::ArrowRight, 20.0).unwrap();
        camera.pan(dx, dy);
        let after = camera.screen_to_world(400.0, 300.0).unwrap();

        assert!((after.x - before.x - 20.0).abs() < 1e-3);
        assert!((after.y - before.y).abs() < 1e-3);
    }
}
