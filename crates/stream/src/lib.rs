//! Streaming: the rolling window of road segments, the segment factory, and
//! roadside scenery placement.
//!
//! # Invariants
//! - Segment positions are strictly increasing from head to tail.
//! - The window never holds more than `visible_segments` tiles.
//! - Eviction runs before extension in every frame.
//!
//! Scenery follows a seeded RNG passed in by the caller, so a fixed seed
//! and input sequence reproduce the same road.

mod config;
mod scatter;
mod segment;
mod window;

pub use config::{ConfigError, SceneryConfig, StreamConfig};
pub use scatter::{Decoration, Scatter, ScatterReport};
pub use segment::{
    FALLBACK_SOIL_MATERIAL, ROAD_MATERIAL, Segment, SegmentFactory, Shoulder, Side, Strip,
    SurfaceMaterials,
};
pub use window::{SegmentRecord, SegmentWindow, WindowStats, WindowUpdate};

pub fn crate_info() -> &'static str {
    "highway-stream v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("stream"));
    }
}
