//! # Event Wiring
//!
//! Input reaches the line tool and the renderer through an [`EventHub`]. Handlers are
//! registered explicitly and keep their [`SubscriptionId`] so they can be removed again, which
//! is what a tool switch does.
//!
//! ```ignore
//! let mut hub = EventHub::default();
//! let tool_subscription = hub.subscribe(Box::new(tool.clone()));
//! hub.subscribe(Box::new(renderer.clone()));
//!
//! hub.dispatch(&InputEvent::PointerPressed { x: 400.0, y: 300.0 })?;
//! hub.unsubscribe(tool_subscription);
//! ```

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;
use crate::interaction::LineTool;
use crate::renderer::Renderer;

/// Input delivered to handlers. Pointer positions are in output-local physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerPressed { x: f32, y: f32 },
    PointerMoved { x: f32, y: f32 },
    PointerReleased { x: f32, y: f32 },
    Resized { width: u32, height: u32 },
    SelectTool,
    DeselectTool,
    Cancel,
}

pub trait InputHandler {
    fn handle_event(&mut self, event: &InputEvent) -> Result<()>;
}

impl InputHandler for LineTool {
    fn handle_event(&mut self, event: &InputEvent) -> Result<()> {
        match *event {
            InputEvent::PointerPressed { x, y } => self.pointer_pressed(x, y),
            InputEvent::PointerMoved { x, y } => self.pointer_moved(x, y),
            InputEvent::PointerReleased { x, y } => self.pointer_released(x, y),
            InputEvent::SelectTool => {
                self.select_tool();
                Ok(())
            }
            InputEvent::DeselectTool => self.deselect_tool(),
            InputEvent::Cancel => self.cancel(),
            InputEvent::Resized { .. } => Ok(()),
        }
    }
}

impl InputHandler for Arc<Mutex<LineTool>> {
    fn handle_event(&mut self, event: &InputEvent) -> Result<()> {
        self.lock().handle_event(event)
    }
}

impl InputHandler for Arc<Renderer> {
    fn handle_event(&mut self, event: &InputEvent) -> Result<()> {
        if let InputEvent::Resized { width, height } = *event {
            self.resize(width, height);
        }
        Ok(())
    }
}

/// Handle returned by [`EventHub::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Delivers each event to every subscriber, in subscription order.
#[derive(Default)]
pub struct EventHub {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Box<dyn InputHandler>)>,
}

impl EventHub {
    pub fn subscribe(&mut self, handler: Box<dyn InputHandler>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, handler));
        id
    }

    /// Removes a subscriber. Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(subscribed, _)| *subscribed != id);
        before != self.subscribers.len()
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Delivers `event` to every subscriber.
    ///
    /// A failing handler does not stop delivery to the others. Every failure is logged and
    /// the first one is returned.
    pub fn dispatch(&mut self, event: &InputEvent) -> Result<()> {
        let mut first_error = None;
        for (id, handler) in &mut self.subscribers {
            if let Err(error) = handler.handle_event(event) {
                log::error!("Handler {id:?} failed on {event:?}: {error}");
                first_error.get_or_insert(error);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::config::Settings;
    use crate::draw_manager::DrawManager;
    use crate::error::{Error, TransformError};
    use crate::interaction::ToolState;

    struct Recorder(Arc<Mutex<Vec<InputEvent>>>);

    impl InputHandler for Recorder {
        fn handle_event(&mut self, event: &InputEvent) -> Result<()> {
            self.0.lock().push(*event);
            Ok(())
        }
    }

    struct Failing;

    impl InputHandler for Failing {
        fn handle_event(&mut self, _event: &InputEvent) -> Result<()> {
            Err(TransformError::Degenerate { determinant: 0.0 }.into())
        }
    }

    #[test]
    fn unsubscribed_handlers_stop_receiving() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut hub = EventHub::default();
        let id = hub.subscribe(Box::new(Recorder(seen.clone())));

        hub.dispatch(&InputEvent::SelectTool).unwrap();
        assert!(hub.unsubscribe(id));
        assert!(!hub.unsubscribe(id));
        hub.dispatch(&InputEvent::Cancel).unwrap();

        assert_eq!(*seen.lock(), vec![InputEvent::SelectTool]);
        assert!(hub.is_empty());
    }

    #[test]
    fn failure_does_not_stop_delivery() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut hub = EventHub::default();
        hub.subscribe(Box::new(Failing));
        hub.subscribe(Box::new(Recorder(seen.clone())));

        let result = hub.dispatch(&InputEvent::Cancel);

        assert!(matches!(result, Err(Error::Transform(_))));
        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn gesture_through_hub_reaches_store() {
        let store = DrawManager::shared();
        let mut camera = Camera::default();
        camera.set_viewport_size(800, 600);
        let camera = camera.into_shared();
        let renderer = Arc::new(Renderer::new(
            store.clone(),
            camera.clone(),
            &Settings::default(),
        ));
        let tool = Arc::new(Mutex::new(LineTool::new(
            store.clone(),
            camera,
            renderer.clone(),
        )));

        let mut hub = EventHub::default();
        hub.subscribe(Box::new(tool.clone()));
        hub.subscribe(Box::new(renderer.clone()));

        for event in [
            InputEvent::SelectTool,
            InputEvent::PointerPressed { x: 400.0, y: 300.0 },
            InputEvent::PointerMoved { x: 450.0, y: 300.0 },
            InputEvent::PointerReleased { x: 450.0, y: 300.0 },
            InputEvent::Resized {
                width: 1024,
                height: 768,
            },
        ] {
            hub.dispatch(&event).unwrap();
        }

        assert_eq!(tool.lock().state(), ToolState::ToolArmed);
        assert_eq!(store.read().len(), 1);
        assert_eq!(store.read().vertex_count(), 2);
    }
}
