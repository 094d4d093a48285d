//! Driving kernel: the session that owns the road window, the speed model,
//! the vehicle and the asset gate.
//!
//! # Invariants
//! - No ambient globals; every collaborator is owned by a `Session`.
//! - Same seed and same input sequence give the same `layout_hash`.

pub mod session;
pub mod speed;
pub mod vehicle;

pub use session::{Session, SessionConfig, SessionError, SessionEvent, StepReport};
pub use speed::{SpeedModel, SpeedParams};
pub use vehicle::{LightKind, LightMount, LightPlacement, LightRig, Vehicle, VehicleVariant};

pub fn crate_info() -> &'static str {
    "highway-kernel v0.1.0"
}
