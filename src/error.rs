//! # Errors
//!
//! Error types shared across the crate. Setup failures in the render pipeline are fatal and
//! surface to the caller as [`RendererError`]; matrix problems found while unprojecting a
//! pointer position surface as [`TransformError`]. The umbrella [`Error`] is what event
//! handlers return, so a single dispatch loop can log whatever went wrong.
//!
//! Precondition violations that arise from ordinary event races (a stray pointer move before
//! the first press, removing from an empty store) are not errors at all; the components treat
//! them as no-ops.

use std::path::PathBuf;

use thiserror::Error;

use crate::renderer::PipelineState;

/// Failures raised while creating, driving or tearing down the render pipeline.
#[derive(Error, Debug)]
pub enum RendererError {
    #[error("Failed to create surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    #[error("No suitable GPU adapter found")]
    AdapterNotFound,
    #[error("Failed to request device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),
    #[error("Surface reports no supported formats")]
    NoSurfaceFormat,
    #[error("Shader file is not found at \"{}\"", .0.display())]
    ShaderNotFound(PathBuf),
    #[error("Failed to read shader file \"{}\": {source}", path.display())]
    ShaderRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to compile shader: {0}")]
    ShaderCompilation(String),
    #[error("Failed to create render pipeline: {0}")]
    PipelineCreation(String),
    #[error("Constant buffer size must be a multiple of 16, got {0} bytes")]
    ConstantBufferAlignment(usize),
    #[error("Cannot {operation} while the pipeline is {state:?}")]
    InvalidState {
        operation: &'static str,
        state: PipelineState,
    },
    #[error("Failed to acquire surface texture: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

/// Failures of the transform/projection math.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum TransformError {
    #[error("Matrix is not invertible (determinant {determinant})")]
    Degenerate { determinant: f64 },
}

/// Any error the application layer may have to report.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Renderer(#[from] RendererError),
    #[error(transparent)]
    Transform(#[from] TransformError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
