//! Rendering adapter: camera and renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers never mutate the scene.
//! - Pixel ratio is clamped to [`MAX_PIXEL_RATIO`] before it reaches a backend.
//!
//! The text renderer here backs headless runs and tests; the GPU backend
//! lives in `bakedscene-render-wgpu` behind the same trait.

mod camera;
mod renderer;

pub use camera::PerspectiveCamera;
pub use renderer::{DebugTextRenderer, MAX_PIXEL_RATIO, Renderer, RendererSettings};
