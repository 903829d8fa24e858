//! # Shader Program
//!
//! The line pipeline uses a single WGSL program with two entry points, [`VERTEX_ENTRY`] and
//! [`FRAGMENT_ENTRY`]. The program is compiled into the binary as [`SHADER_SOURCE`]; a file on
//! disk can replace it through [`Settings::shader_path`](crate::config::Settings::shader_path),
//! which is handy while iterating on the shading without rebuilding.
//!
//! Compilation goes through a validation error scope so that a broken program surfaces as
//! [`RendererError::ShaderCompilation`] instead of an uncaptured device error.

use std::borrow::Cow;
use std::path::Path;

use crate::error::RendererError;

/// The WGSL source of the line pipeline.
pub const SHADER_SOURCE: &str = include_str!("shaders/lines.wgsl");

pub const VERTEX_ENTRY: &str = "vertex_main";
pub const FRAGMENT_ENTRY: &str = "fragment_main";

/// Returns the program text, read from `path` when one is given.
///
/// # Errors
///
/// - [`RendererError::ShaderNotFound`] if `path` does not exist.
/// - [`RendererError::ShaderRead`] if it exists but cannot be read as UTF-8 text.
pub fn load_source(path: Option<&Path>) -> Result<Cow<'static, str>, RendererError> {
    let Some(path) = path else {
        return Ok(Cow::Borrowed(SHADER_SOURCE));
    };

    if !path.exists() {
        return Err(RendererError::ShaderNotFound(path.to_path_buf()));
    }

    log::info!("Loading shader from {}", path.display());
    std::fs::read_to_string(path)
        .map(Cow::Owned)
        .map_err(|source| RendererError::ShaderRead {
            path: path.to_path_buf(),
            source,
        })
}

/// Compiles `source` into a shader module.
///
/// # Errors
///
/// [`RendererError::ShaderCompilation`] with the validation message if the program does not
/// compile.
pub async fn create_module(
    device: &wgpu::Device,
    source: &str,
) -> Result<wgpu::ShaderModule, RendererError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Line Shader"),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(source)),
    });

    match device.pop_error_scope().await {
        Some(error) => Err(RendererError::ShaderCompilation(error.to_string())),
        None => Ok(module),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_source_has_both_entry_points() {
        let source = load_source(None).unwrap();
        assert!(matches!(source, Cow::Borrowed(_)));
        assert!(source.contains(&format!("fn {VERTEX_ENTRY}(")));
        assert!(source.contains(&format!("fn {FRAGMENT_ENTRY}(")));
    }

    #[test]
    fn missing_file_is_reported() {
        let path = std::env::temp_dir().join("line-sketch-no-such-shader.wgsl");
        match load_source(Some(&path)) {
            Err(RendererError::ShaderNotFound(missing)) => assert_eq!(missing, path),
            other => panic!("expected ShaderNotFound, got {other:?}"),
        }
    }

    #[test]
    fn file_source_replaces_embedded() {
        let path = std::env::temp_dir().join(format!(
            "line-sketch-shader-{}.wgsl",
            std::process::id()
        ));
        std::fs::write(&path, "// custom").unwrap();

        let source = load_source(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(source, "// custom");
    }
}
