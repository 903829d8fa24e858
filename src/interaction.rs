//! # Line Tool
//!
//! The interaction state machine that turns pointer gestures into line segments.
//!
//! ```text
//!          select_tool              pointer_pressed
//!   Idle --------------> ToolArmed -----------------> Drawing --+ pointer_moved
//!    ^                    ^  |                          |  ^     |
//!    |    cancel          |  |      pointer_released    |  +-----+
//!    +--------------------+--|<-------------------------+
//!    |                       |
//!    +-----------------------+-- cancel (from Drawing, removes the line)
//! ```
//!
//! A press adds a zero-length line at the pointer, each move replaces that line with one
//! ending at the pointer, and the release replaces it once more with the committed colour.
//! The geometry store therefore holds exactly one line per gesture at all times, and the
//! vertex buffer is re-uploaded after every edit.
//!
//! Events that make no sense in the current state (a move before any press, a press while
//! idle) are dropped without touching the store.

use std::sync::Arc;

use nalgebra_glm as glm;

use crate::camera::SharedCamera;
use crate::config::LineColors;
use crate::draw_manager::SharedDrawManager;
use crate::error::Result;
use crate::primitive::Line;
use crate::renderer::VertexUpload;

/// Where the line tool is in a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum ToolState {
    /// No tool selected.
    Idle = -1,
    /// The line tool is selected and waiting for a press.
    ToolArmed = 0,
    /// A line follows the pointer.
    Drawing = 1,
}

impl ToolState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::ToolArmed => "Armed",
            Self::Drawing => "Drawing",
        }
    }
}

pub struct LineTool {
    state: ToolState,
    store: SharedDrawManager,
    camera: SharedCamera,
    uploader: Arc<dyn VertexUpload>,
    colors: LineColors,
    /// The line of the gesture in progress; mirrors the store's tail while drawing.
    current: Option<Line>,
}

impl LineTool {
    pub fn new(
        store: SharedDrawManager,
        camera: SharedCamera,
        uploader: Arc<dyn VertexUpload>,
    ) -> Self {
        Self {
            state: ToolState::Idle,
            store,
            camera,
            uploader,
            colors: LineColors::default(),
            current: None,
        }
    }

    pub fn with_colors(mut self, colors: LineColors) -> Self {
        self.colors = colors;
        self
    }

    pub fn state(&self) -> ToolState {
        self.state
    }

    pub fn current_line(&self) -> Option<&Line> {
        self.current.as_ref()
    }

    pub fn colors(&self) -> LineColors {
        self.colors
    }

    /// Arms the tool. Ignored unless idle.
    pub fn select_tool(&mut self) {
        if self.state != ToolState::Idle {
            log::debug!("Line tool already selected ({})", self.state.name());
            return;
        }
        self.state = ToolState::ToolArmed;
        log::info!("Line tool selected");
    }

    /// Drops the tool, discarding a line still being drawn.
    pub fn deselect_tool(&mut self) -> Result<()> {
        if self.state == ToolState::Drawing {
            self.cancel()?;
        }
        if self.state != ToolState::Idle {
            log::info!("Line tool deselected");
        }
        self.state = ToolState::Idle;
        Ok(())
    }

    /// Starts a line at the pointer.
    pub fn pointer_pressed(&mut self, x: f32, y: f32) -> Result<()> {
        if self.state != ToolState::ToolArmed {
            log::trace!("Ignoring press while {}", self.state.name());
            return Ok(());
        }

        let point = self.world_point(x, y)?;
        let line = Line::degenerate(point, self.colors.in_progress);
        self.store.write().add_last(line);
        self.current = Some(line);
        self.state = ToolState::Drawing;
        log::debug!("Line started at ({}, {})", point[0], point[1]);

        self.uploader.update_vertex_buffer()?;
        Ok(())
    }

    /// Moves the end of the line in progress to the pointer.
    pub fn pointer_moved(&mut self, x: f32, y: f32) -> Result<()> {
        let (ToolState::Drawing, Some(current)) = (self.state, self.current) else {
            return Ok(());
        };

        let line = current.with_end(self.world_point(x, y)?);
        self.store.write().replace_last(line);
        self.current = Some(line);

        self.uploader.update_vertex_buffer()?;
        Ok(())
    }

    /// Finishes the line at the pointer and recolours it as committed.
    pub fn pointer_released(&mut self, x: f32, y: f32) -> Result<()> {
        let (ToolState::Drawing, Some(current)) = (self.state, self.current) else {
            log::trace!("Ignoring release while {}", self.state.name());
            return Ok(());
        };

        let mut line = current.with_end(self.world_point(x, y)?);
        line.set_color(self.colors.committed);
        self.store.write().replace_last(line);
        self.current = None;
        self.state = ToolState::ToolArmed;
        log::debug!("Line committed");

        self.uploader.update_vertex_buffer()?;
        Ok(())
    }

    /// Abandons the gesture and returns to idle.
    ///
    /// While drawing, the unfinished line is removed from the store.
    pub fn cancel(&mut self) -> Result<()> {
        match self.state {
            ToolState::Idle => Ok(()),
            ToolState::ToolArmed => {
                self.state = ToolState::Idle;
                Ok(())
            }
            ToolState::Drawing => {
                self.store.write().del_last();
                self.current = None;
                self.state = ToolState::Idle;
                log::debug!("Line cancelled");

                self.uploader.update_vertex_buffer()?;
                Ok(())
            }
        }
    }

    fn world_point(&self, x: f32, y: f32) -> Result<[f32; 3]> {
        let point: glm::Vec3 = self.camera.read().screen_to_world(x, y)?;
        Ok([point.x, point.y, point.z])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::draw_manager::DrawManager;
    use crate::error::{Error, RendererError};
    use crate::renderer::PipelineState;
    use parking_lot::Mutex;

    /// Records the store's vertex count at each upload request.
    struct RecordingUploader {
        store: SharedDrawManager,
        uploads: Mutex<Vec<usize>>,
    }

    impl VertexUpload for RecordingUploader {
        fn update_vertex_buffer(&self) -> std::result::Result<(), RendererError> {
            let count = self.store.read().vertex_count();
            self.uploads.lock().push(count);
            Ok(())
        }
    }

    struct FailingUploader;

    impl VertexUpload for FailingUploader {
        fn update_vertex_buffer(&self) -> std::result::Result<(), RendererError> {
            Err(RendererError::InvalidState {
                operation: "upload vertices",
                state: PipelineState::Disposed,
            })
        }
    }

    fn tool() -> (LineTool, SharedDrawManager, Arc<RecordingUploader>) {
        let store = DrawManager::shared();
        let mut camera = Camera::default();
        camera.set_viewport_size(800, 600);
        let uploader = Arc::new(RecordingUploader {
            store: store.clone(),
            uploads: Mutex::new(Vec::new()),
        });
        let tool = LineTool::new(store.clone(), camera.into_shared(), uploader.clone());
        (tool, store, uploader)
    }

    fn assert_near(actual: [f32; 3], expected: [f32; 3]) {
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-3, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn gesture_walks_states_in_order() {
        let (mut tool, _, _) = tool();
        assert_eq!(tool.state(), ToolState::Idle);

        tool.select_tool();
        assert_eq!(tool.state(), ToolState::ToolArmed);
        tool.pointer_pressed(10.0, 10.0).unwrap();
        assert_eq!(tool.state(), ToolState::Drawing);
        tool.pointer_moved(20.0, 20.0).unwrap();
        assert_eq!(tool.state(), ToolState::Drawing);
        tool.pointer_released(30.0, 30.0).unwrap();
        assert_eq!(tool.state(), ToolState::ToolArmed);
    }

    #[test]
    fn press_move_release_draws_one_line() {
        let (mut tool, store, uploader) = tool();
        let colors = tool.colors();

        tool.select_tool();
        tool.pointer_pressed(400.0, 300.0).unwrap();
        {
            let store = store.read();
            let line = store.last().and_then(|p| p.as_line()).copied().unwrap();
            assert_near(line.start.position(), [0.0, 0.0, 0.0]);
            assert_near(line.end.position(), [0.0, 0.0, 0.0]);
            assert_eq!(line.start.color(), colors.in_progress);
        }

        tool.pointer_moved(450.0, 300.0).unwrap();
        let moved = store.read().last().and_then(|p| p.as_line()).copied().unwrap();
        assert_near(moved.end.position(), [50.0, 0.0, 0.0]);
        assert_eq!(store.read().len(), 1);

        tool.pointer_released(450.0, 300.0).unwrap();
        let store = store.read();
        assert_eq!(store.len(), 1);
        let line = store.last().and_then(|p| p.as_line()).copied().unwrap();
        assert_near(line.start.position(), [0.0, 0.0, 0.0]);
        assert_near(line.end.position(), [50.0, 0.0, 0.0]);
        assert_eq!(line.start.color(), colors.committed);
        assert_eq!(line.end.color(), colors.committed);

        assert_eq!(*uploader.uploads.lock(), vec![2, 2, 2]);
        assert!(tool.current_line().is_none());
    }

    #[test]
    fn second_gesture_appends() {
        let (mut tool, store, _) = tool();
        tool.select_tool();
        for x in [100.0, 200.0] {
            tool.pointer_pressed(x, 100.0).unwrap();
            tool.pointer_released(x + 10.0, 100.0).unwrap();
        }
        assert_eq!(store.read().len(), 2);
        assert_eq!(store.read().vertex_count(), 4);
    }

    #[test]
    fn cancel_removes_unfinished_line() {
        let (mut tool, store, uploader) = tool();
        tool.select_tool();
        tool.pointer_pressed(0.0, 0.0).unwrap();
        tool.pointer_moved(100.0, 100.0).unwrap();

        tool.cancel().unwrap();

        assert_eq!(tool.state(), ToolState::Idle);
        assert!(tool.current_line().is_none());
        assert!(store.read().is_empty());
        assert_eq!(uploader.uploads.lock().last(), Some(&0));
    }

    #[test]
    fn cancel_keeps_committed_lines() {
        let (mut tool, store, _) = tool();
        tool.select_tool();
        tool.pointer_pressed(0.0, 0.0).unwrap();
        tool.pointer_released(5.0, 5.0).unwrap();
        tool.pointer_pressed(10.0, 10.0).unwrap();

        tool.cancel().unwrap();

        assert_eq!(store.read().len(), 1);
    }

    #[test]
    fn cancel_from_armed_and_idle() {
        let (mut tool, _, uploader) = tool();
        tool.cancel().unwrap();
        assert_eq!(tool.state(), ToolState::Idle);

        tool.select_tool();
        tool.cancel().unwrap();
        assert_eq!(tool.state(), ToolState::Idle);
        assert!(uploader.uploads.lock().is_empty());
    }

    #[test]
    fn out_of_state_events_are_ignored() {
        let (mut tool, store, uploader) = tool();

        tool.pointer_moved(1.0, 1.0).unwrap();
        tool.pointer_released(1.0, 1.0).unwrap();
        tool.pointer_pressed(1.0, 1.0).unwrap();
        assert_eq!(tool.state(), ToolState::Idle);

        tool.select_tool();
        tool.pointer_moved(1.0, 1.0).unwrap();
        tool.pointer_released(1.0, 1.0).unwrap();
        assert_eq!(tool.state(), ToolState::ToolArmed);

        assert!(store.read().is_empty());
        assert!(uploader.uploads.lock().is_empty());
    }

    #[test]
    fn select_while_drawing_is_ignored() {
        let (mut tool, _, _) = tool();
        tool.select_tool();
        tool.pointer_pressed(1.0, 1.0).unwrap();
        tool.select_tool();
        assert_eq!(tool.state(), ToolState::Drawing);
    }

    #[test]
    fn deselect_while_drawing_cancels() {
        let (mut tool, store, _) = tool();
        tool.select_tool();
        tool.pointer_pressed(1.0, 1.0).unwrap();

        tool.deselect_tool().unwrap();

        assert_eq!(tool.state(), ToolState::Idle);
        assert!(store.read().is_empty());
    }

    #[test]
    fn degenerate_camera_leaves_state_unchanged() {
        let store = DrawManager::shared();
        let mut camera = Camera::default();
        camera.far = camera.near;
        let uploader = Arc::new(RecordingUploader {
            store: store.clone(),
            uploads: Mutex::new(Vec::new()),
        });
        let mut tool = LineTool::new(store.clone(), camera.into_shared(), uploader.clone());

        tool.select_tool();
        let result = tool.pointer_pressed(10.0, 10.0);

        assert!(matches!(result, Err(Error::Transform(_))));
        assert_eq!(tool.state(), ToolState::ToolArmed);
        assert!(store.read().is_empty());
        assert!(uploader.uploads.lock().is_empty());
    }

    #[test]
    fn upload_failure_is_reported() {
        let mut camera = Camera::default();
        camera.set_viewport_size(800, 600);
        let mut tool = LineTool::new(
            DrawManager::shared(),
            camera.into_shared(),
            Arc::new(FailingUploader),
        );
        tool.select_tool();
        assert!(matches!(
            tool.pointer_pressed(1.0, 1.0),
            Err(Error::Renderer(RendererError::InvalidState { .. }))
        ));
    }

    #[test]
    fn state_values() {
        assert_eq!(ToolState::Idle as i8, -1);
        assert_eq!(ToolState::ToolArmed as i8, 0);
        assert_eq!(ToolState::Drawing as i8, 1);
        assert_eq!(ToolState::Drawing.name(), "Drawing");
    }
}
