use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::inbox::AssetOutcome;
use crate::prototype::{AssetError, AssetSlot, LoadedAsset, Prototype, PrototypeKind, Texture};

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G'];
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];

/// Import a glTF model as a decoration prototype.
///
/// Reads the JSON metadata only: the prototype is named after the first mesh
/// and `base_offset` comes from the lowest `min[1]` of every `POSITION`
/// accessor. Vertex buffers are left to the renderer.
pub fn import_gltf(path: impl AsRef<Path>, kind: PrototypeKind) -> Result<Prototype, AssetError> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path)?;
    let json: serde_json::Value =
        serde_json::from_str(&data).map_err(|e| AssetError::GltfParse(e.to_string()))?;

    let meshes = json
        .get("meshes")
        .and_then(|m| m.as_array())
        .ok_or_else(|| AssetError::GltfParse(format!("{}: no meshes", path.display())))?;

    let name = meshes
        .first()
        .and_then(|m| m.get("name"))
        .and_then(|n| n.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| file_stem(path));

    let accessors = json
        .get("accessors")
        .and_then(|a| a.as_array())
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let mut base_offset: Option<f32> = None;
    for mesh in meshes {
        let primitives = mesh
            .get("primitives")
            .and_then(|p| p.as_array())
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        for primitive in primitives {
            let Some(index) = primitive
                .get("attributes")
                .and_then(|a| a.get("POSITION"))
                .and_then(|i| i.as_u64())
            else {
                continue;
            };
            let accessor = accessors.get(index as usize).ok_or_else(|| {
                AssetError::GltfParse(format!("POSITION accessor {index} out of range"))
            })?;
            if let Some(min_y) = accessor
                .get("min")
                .and_then(|m| m.as_array())
                .and_then(|m| m.get(1))
                .and_then(|y| y.as_f64())
            {
                let min_y = min_y as f32;
                base_offset = Some(base_offset.map_or(min_y, |b| b.min(min_y)));
            }
        }
    }

    let prototype = Prototype::new(kind, name, base_offset.unwrap_or(0.0));
    tracing::debug!(
        kind = kind.label(),
        name = %prototype.name,
        base_offset = prototype.base_offset,
        "imported glTF prototype"
    );
    Ok(prototype)
}

/// Import a PNG or JPEG surface texture. The id is content-addressed over
/// the file bytes.
pub fn import_texture(path: impl AsRef<Path>) -> Result<Texture, AssetError> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    if !(data.starts_with(PNG_MAGIC) || data.starts_with(JPEG_MAGIC)) {
        return Err(AssetError::UnsupportedImage(path.to_path_buf()));
    }
    Ok(Texture::new(file_stem(path), &data))
}

/// Load whatever a slot expects from `path`.
pub fn import_slot(slot: AssetSlot, path: impl AsRef<Path>) -> AssetOutcome {
    let result = match slot.prototype_kind() {
        Some(kind) => import_gltf(path, kind).map(LoadedAsset::Prototype),
        None => import_texture(path).map(LoadedAsset::Texture),
    };
    AssetOutcome { slot, result }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".into())
}

/// One declared load in an [`AssetManifest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub slot: AssetSlot,
    pub path: PathBuf,
}

/// JSON list of the assets a scene waits for before it bootstraps.
///
/// Relative paths resolve against the manifest's directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetManifest {
    pub entries: Vec<ManifestEntry>,
    #[serde(skip)]
    root: PathBuf,
}

impl AssetManifest {
    pub fn from_json_str(json: &str) -> Result<Self, AssetError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let mut manifest: Self = serde_json::from_reader(file)?;
        manifest.root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(manifest)
    }

    /// Number of loads the gate must see.
    pub fn required(&self) -> usize {
        self.entries.len()
    }

    pub fn resolve_path(&self, entry: &ManifestEntry) -> PathBuf {
        if entry.path.is_absolute() {
            entry.path.clone()
        } else {
            self.root.join(&entry.path)
        }
    }

    /// Run every declared load synchronously, one outcome per entry.
    pub fn load_all(&self) -> Vec<AssetOutcome> {
        self.entries
            .iter()
            .map(|entry| import_slot(entry.slot, self.resolve_path(entry)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PINE_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "meshes": [
            { "name": "pine", "primitives": [ { "attributes": { "POSITION": 0 } } ] },
            { "name": "trunk", "primitives": [ { "attributes": { "POSITION": 1 } } ] }
        ],
        "accessors": [
            { "count": 3, "min": [-1.0, -0.25, -1.0], "max": [1.0, 4.0, 1.0] },
            { "count": 3, "min": [-0.2, -0.75, -0.2], "max": [0.2, 1.0, 0.2] }
        ]
    }"#;

    fn write_temp(suffix: &str, bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        tmp.write_all(bytes).unwrap();
        tmp
    }

    #[test]
    fn gltf_base_offset_is_lowest_position_min() {
        let tmp = write_temp(".gltf", PINE_GLTF.as_bytes());
        let proto = import_gltf(tmp.path(), PrototypeKind::Tree).unwrap();
        assert_eq!(proto.name, "pine");
        assert_eq!(proto.kind, PrototypeKind::Tree);
        assert_eq!(proto.base_offset, -0.75);
    }

    #[test]
    fn gltf_without_meshes_is_rejected() {
        let tmp = write_temp(".gltf", br#"{ "asset": { "version": "2.0" } }"#);
        let err = import_gltf(tmp.path(), PrototypeKind::Rock).unwrap_err();
        assert!(matches!(err, AssetError::GltfParse(_)));
    }

    #[test]
    fn gltf_garbage_is_a_parse_error() {
        let tmp = write_temp(".gltf", b"not json");
        assert!(matches!(
            import_gltf(tmp.path(), PrototypeKind::Grass),
            Err(AssetError::GltfParse(_))
        ));
    }

    #[test]
    fn texture_requires_image_magic() {
        let png = write_temp(".png", &[0x89, b'P', b'N', b'G', 0, 1, 2]);
        let tex = import_texture(png.path()).unwrap();
        assert!(!tex.name.is_empty());

        let txt = write_temp(".png", b"hello");
        assert!(matches!(
            import_texture(txt.path()),
            Err(AssetError::UnsupportedImage(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let outcome = import_slot(AssetSlot::Tree, "/definitely/not/here.gltf");
        assert!(matches!(outcome.result, Err(AssetError::Io(_))));
    }

    #[test]
    fn manifest_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pine.gltf"), PINE_GLTF).unwrap();
        std::fs::write(dir.path().join("soil.png"), [0x89, b'P', b'N', b'G']).unwrap();
        let manifest_path = dir.path().join("assets.json");
        std::fs::write(
            &manifest_path,
            r#"{ "entries": [
                { "slot": "soil_texture", "path": "soil.png" },
                { "slot": "tree", "path": "pine.gltf" },
                { "slot": "rock", "path": "missing.gltf" }
            ] }"#,
        )
        .unwrap();

        let manifest = AssetManifest::load(&manifest_path).unwrap();
        assert_eq!(manifest.required(), 3);

        let outcomes = manifest.load_all();
        assert_eq!(outcomes.len(), 3);
        assert!(matches!(outcomes[0].result, Ok(LoadedAsset::Texture(_))));
        assert!(matches!(outcomes[1].result, Ok(LoadedAsset::Prototype(_))));
        assert!(outcomes[2].result.is_err());
    }

    #[test]
    fn manifest_rejects_unknown_slot() {
        let err = AssetManifest::from_json_str(r#"{ "entries": [ { "slot": "car", "path": "x" } ] }"#)
            .unwrap_err();
        assert!(matches!(err, AssetError::Json(_)));
    }
}
