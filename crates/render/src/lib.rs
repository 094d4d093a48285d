//! Rendering Adapter: the scene-graph collaborator the streaming core talks to.
//!
//! # Invariants
//! - The core only attaches, detaches and moves nodes; it never draws.
//! - Render output derives from the attached scene and a view.

mod renderer;
mod scene;

pub use renderer::{DebugTextRenderer, RenderView, Renderer};
pub use scene::{NodeKind, RetainedScene, Scene, SceneNode};

pub fn crate_info() -> &'static str {
    "highway-render v0.1.0"
}
