use highway_common::AssetId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::PathBuf;

/// Errors from asset loading and registration.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("glTF parse error: {0}")]
    GltfParse(String),
    #[error("unsupported image format: {0}")]
    UnsupportedImage(PathBuf),
    #[error("{asset} cannot fill the {slot} slot")]
    SlotMismatch { slot: AssetSlot, asset: String },
}

/// One externally loaded resource the scene declares up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetSlot {
    SoilTexture,
    Tree,
    Rock,
    Grass,
}

impl AssetSlot {
    pub const ALL: [AssetSlot; 4] = [
        AssetSlot::SoilTexture,
        AssetSlot::Tree,
        AssetSlot::Rock,
        AssetSlot::Grass,
    ];

    /// The prototype kind this slot holds, if it holds a model.
    pub fn prototype_kind(self) -> Option<PrototypeKind> {
        match self {
            AssetSlot::SoilTexture => None,
            AssetSlot::Tree => Some(PrototypeKind::Tree),
            AssetSlot::Rock => Some(PrototypeKind::Rock),
            AssetSlot::Grass => Some(PrototypeKind::Grass),
        }
    }
}

impl fmt::Display for AssetSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetSlot::SoilTexture => "soil_texture",
            AssetSlot::Tree => "tree",
            AssetSlot::Rock => "rock",
            AssetSlot::Grass => "grass",
        };
        f.write_str(name)
    }
}

/// Decoration category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrototypeKind {
    Tree,
    Rock,
    Grass,
}

impl PrototypeKind {
    pub fn slot(self) -> AssetSlot {
        match self {
            PrototypeKind::Tree => AssetSlot::Tree,
            PrototypeKind::Rock => AssetSlot::Rock,
            PrototypeKind::Grass => AssetSlot::Grass,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PrototypeKind::Tree => "tree",
            PrototypeKind::Rock => "rock",
            PrototypeKind::Grass => "grass",
        }
    }
}

/// A loaded template model, cloned once per placed decoration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prototype {
    pub id: AssetId,
    pub kind: PrototypeKind,
    pub name: String,
    /// Lowest `y` of the model bounds at unit scale. Clones are lifted by
    /// `-base_offset * scale` so they rest on the ground.
    pub base_offset: f32,
}

impl Prototype {
    pub fn new(kind: PrototypeKind, name: impl Into<String>, base_offset: f32) -> Self {
        let name = name.into();
        Self {
            id: content_id(&[kind.label().as_bytes(), name.as_bytes()]),
            kind,
            name,
            base_offset,
        }
    }

    /// Stand-in model for hosts without model files.
    pub fn placeholder(kind: PrototypeKind) -> Self {
        Self::new(kind, format!("{}_placeholder", kind.label()), 0.0)
    }
}

/// A loaded surface texture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Texture {
    pub id: AssetId,
    pub name: String,
    /// Wrap repeat in `u`/`v`.
    pub repeat: [f32; 2],
}

impl Texture {
    pub fn new(name: impl Into<String>, data: &[u8]) -> Self {
        let name = name.into();
        Self {
            id: content_id(&[name.as_bytes(), data]),
            name,
            repeat: [4.0, 4.0],
        }
    }

    pub fn placeholder() -> Self {
        Self::new("soil_placeholder", &[])
    }
}

/// A resolved load: either a texture or a model prototype.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedAsset {
    Texture(Texture),
    Prototype(Prototype),
}

impl LoadedAsset {
    /// Stand-in asset that fits `slot`, for hosts without real model files.
    pub fn placeholder(slot: AssetSlot) -> Self {
        match slot.prototype_kind() {
            Some(kind) => LoadedAsset::Prototype(Prototype::placeholder(kind)),
            None => LoadedAsset::Texture(Texture::placeholder()),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            LoadedAsset::Texture(t) => format!("texture '{}'", t.name),
            LoadedAsset::Prototype(p) => format!("{} prototype '{}'", p.kind.label(), p.name),
        }
    }
}

/// Content-addressed id: first eight bytes of the SHA-256 over all parts.
pub(crate) fn content_id(parts: &[&[u8]]) -> AssetId {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&result[..8]);
    AssetId(u64::from_le_bytes(bytes))
}
