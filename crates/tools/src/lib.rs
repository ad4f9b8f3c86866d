//! Developer Tooling: the fog debug panel and a read-only scene inspector.
//!
//! # Invariants
//! - Tools never mutate the scene directly; the panel reports edits to its caller.

pub mod inspector;
pub mod panel;

pub use inspector::{NodeInfo, SceneInspector, SceneSummary};
pub use panel::{DebugPanel, PANEL_WIDTH};
