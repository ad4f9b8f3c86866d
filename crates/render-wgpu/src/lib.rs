//! wgpu render backend for the baked scene.
//!
//! Draws every attached model mesh with an unlit material (color times
//! baked map) and linear-range fog, into a 4x multisampled target resolved
//! onto the window surface.
//!
//! # Invariants
//! - Renderer never mutates scene state.
//! - GPU copies of materials are rebuilt whenever the library revision moves.
//! - Clear color and fog color are converted to linear light before use.

mod gpu;
mod prepare;
mod shaders;
mod surface;

pub use gpu::{MSAA_SAMPLES, ScenePipeline};
pub use prepare::{DrawItem, FrameUniforms, MaterialUniforms, clear_color, collect_draws};
pub use surface::{FrameOutput, SurfaceRenderer};

/// Errors from the GPU backend.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no texture formats")]
    NoSurfaceFormat,
    #[error("surface was lost or outdated and has been reconfigured")]
    SurfaceReconfigured,
    #[error("failed to acquire frame: {0}")]
    Surface(wgpu::SurfaceError),
}

impl RenderError {
    /// True for errors that only cost the current frame.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RenderError::SurfaceReconfigured | RenderError::Surface(wgpu::SurfaceError::Timeout)
        )
    }

    /// True when rendering cannot continue: the device is out of memory,
    /// the surface failed in an unrecoverable way, or setup never finished.
    pub fn is_fatal(&self) -> bool {
        !self.is_transient()
    }
}
