//! Driver input: the one boolean snapshot the session accepts per tick.
//!
//! # Invariants
//! - Hosts translate their own key events into an `InputSnapshot`; nothing
//!   downstream sees raw events.
//! - Holding the cruise key flips cruise control once, not every frame.

pub mod snapshot;

pub use snapshot::{CruiseToggle, InputSnapshot, Key};

pub fn crate_info() -> &'static str {
    "highway-input v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("input"));
    }
}
