use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::prototype::{AssetError, AssetSlot, LoadedAsset};

/// The resolved result of one asset load.
#[derive(Debug)]
pub struct AssetOutcome {
    pub slot: AssetSlot,
    pub result: Result<LoadedAsset, AssetError>,
}

impl AssetOutcome {
    pub fn loaded(slot: AssetSlot, asset: LoadedAsset) -> Self {
        Self {
            slot,
            result: Ok(asset),
        }
    }

    pub fn failed(slot: AssetSlot, error: AssetError) -> Self {
        Self {
            slot,
            result: Err(error),
        }
    }
}

/// Hand-off point between asset loaders and the frame loop.
///
/// Loaders may run anywhere and push outcomes through an [`AssetSender`].
/// The frame loop drains without blocking.
pub struct AssetInbox {
    tx: Sender<AssetOutcome>,
    rx: Receiver<AssetOutcome>,
}

/// Cloneable sending half of an [`AssetInbox`].
#[derive(Clone)]
pub struct AssetSender {
    tx: Sender<AssetOutcome>,
}

impl AssetSender {
    /// Deliver an outcome. Returns `false` if the inbox is gone.
    pub fn send(&self, outcome: AssetOutcome) -> bool {
        self.tx.send(outcome).is_ok()
    }
}

impl AssetInbox {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub fn sender(&self) -> AssetSender {
        AssetSender {
            tx: self.tx.clone(),
        }
    }

    /// Everything delivered since the last drain, in arrival order.
    pub fn drain(&self) -> Vec<AssetOutcome> {
        let mut out = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(outcome) => out.push(outcome),
                // The inbox holds its own sender, so Disconnected cannot occur.
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        out
    }
}

impl Default for AssetInbox {
    fn default() -> Self {
        Self::new()
    }
}
