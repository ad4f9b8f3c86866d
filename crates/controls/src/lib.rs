//! Orbit camera controls.
//!
//! # Invariants
//! - Raw window events are translated to [`PointerInput`] before reaching the controls.
//! - The camera's polar angle never leaves the configured band after an update.

pub mod orbit;
pub mod pointer;

pub use orbit::{OrbitConfig, OrbitControls, Spherical};
pub use pointer::PointerInput;
