//! Asset slots for the streaming core: decoration prototypes, the soil
//! texture, and the countdown gate that holds the road back until they resolve.
//!
//! # Invariants
//! - A failed load leaves its slot empty forever; it still counts toward the gate.
//! - Nothing in here blocks the frame loop.

mod gate;
mod import;
mod inbox;
mod prototype;
mod registry;

pub use gate::LoadGate;
pub use import::{AssetManifest, ManifestEntry, import_gltf, import_slot, import_texture};
pub use inbox::{AssetInbox, AssetOutcome, AssetSender};
pub use prototype::{AssetError, AssetSlot, LoadedAsset, Prototype, PrototypeKind, Texture};
pub use registry::PrototypeRegistry;

pub fn crate_info() -> &'static str {
    "highway-assets v0.1.0"
}
