//! # Settings
//!
//! Start-up parameters of the application. There is no configuration file; the defaults below
//! are the configuration, and embedders override individual fields before handing the
//! [`Settings`] to [`App::new`](crate::App::new).

use std::path::PathBuf;

use crate::camera::Camera;
use crate::transform::ModelTransform;

/// Colours applied to a line over the course of a gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineColors {
    /// Colour of the line while the pointer is still down.
    pub in_progress: [f32; 4],
    /// Colour of the line once the pointer is released.
    pub committed: [f32; 4],
}

impl Default for LineColors {
    fn default() -> Self {
        Self {
            in_progress: [0.2, 0.4, 1.0, 1.0],
            committed: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub title: String,
    /// Requested inner size of the window in physical pixels.
    pub initial_size: (u32, u32),
    pub background_color: wgpu::Color,
    /// WGSL file to load instead of the embedded program.
    pub shader_path: Option<PathBuf>,
    pub model_transform: ModelTransform,
    pub camera: Camera,
    pub line_colors: LineColors,
    /// World units the view moves per arrow-key press.
    pub pan_step: f32,
}

impl Settings {
    pub const WHITE_BACKGROUND: wgpu::Color = wgpu::Color::WHITE;
    pub const BLACK_BACKGROUND: wgpu::Color = wgpu::Color::BLACK;
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: "Line Sketch".to_string(),
            initial_size: (1024, 768),
            background_color: wgpu::Color {
                r: 0.025,
                g: 0.025,
                b: 0.025,
                a: 1.0,
            },
            shader_path: None,
            model_transform: ModelTransform::default(),
            camera: Camera::default(),
            line_colors: LineColors::default(),
            pan_step: 20.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_colors_differ_by_phase() {
        let colors = LineColors::default();
        assert_ne!(colors.in_progress, colors.committed);
        assert_eq!(colors.committed, [1.0; 4]);
    }

    #[test]
    fn defaults_use_embedded_shader() {
        let settings = Settings::default();
        assert!(settings.shader_path.is_none());
        assert_eq!(settings.camera, Camera::default());
        assert_eq!(settings.background_color.a, 1.0);
        assert!(settings.pan_step > 0.0);
    }
}
