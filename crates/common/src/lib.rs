//! Shared types for the highway streaming core.

mod types;

pub use types::{AssetId, NodeId, Transform};
