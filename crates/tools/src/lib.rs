//! Developer tooling: read-only session inspection and the speedometer
//! readout UI collaborators consume.
//!
//! # Invariants
//! - Tools never mutate a session.

mod inspector;

pub use inspector::{SegmentInfo, SessionInspector, SessionSummary, SpeedReading, Speedometer};

pub fn crate_info() -> &'static str {
    "highway-tools v0.1.0"
}
