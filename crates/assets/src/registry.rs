use crate::prototype::{AssetError, AssetSlot, LoadedAsset, Prototype, PrototypeKind, Texture};

/// One optional value per declared asset slot.
///
/// An empty slot is a normal state: the asset is still loading or failed.
/// Placement that depends on it is skipped.
#[derive(Debug, Clone, Default)]
pub struct PrototypeRegistry {
    soil: Option<Texture>,
    tree: Option<Prototype>,
    rock: Option<Prototype>,
    grass: Option<Prototype>,
}

impl PrototypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every slot filled by placeholders.
    pub fn with_placeholders() -> Self {
        Self {
            soil: Some(Texture::placeholder()),
            tree: Some(Prototype::placeholder(PrototypeKind::Tree)),
            rock: Some(Prototype::placeholder(PrototypeKind::Rock)),
            grass: Some(Prototype::placeholder(PrototypeKind::Grass)),
        }
    }

    /// Fill a slot. The asset must match the slot's kind; a later load
    /// replaces an earlier one.
    pub fn insert(&mut self, slot: AssetSlot, asset: LoadedAsset) -> Result<(), AssetError> {
        match (slot, asset) {
            (AssetSlot::SoilTexture, LoadedAsset::Texture(t)) => self.soil = Some(t),
            (slot, LoadedAsset::Prototype(p)) if slot.prototype_kind() == Some(p.kind) => {
                let kind = p.kind;
                *self.prototype_slot(kind) = Some(p);
            }
            (slot, asset) => {
                return Err(AssetError::SlotMismatch {
                    slot,
                    asset: asset.describe(),
                });
            }
        }
        Ok(())
    }

    pub fn prototype(&self, kind: PrototypeKind) -> Option<&Prototype> {
        match kind {
            PrototypeKind::Tree => self.tree.as_ref(),
            PrototypeKind::Rock => self.rock.as_ref(),
            PrototypeKind::Grass => self.grass.as_ref(),
        }
    }

    pub fn soil_texture(&self) -> Option<&Texture> {
        self.soil.as_ref()
    }

    pub fn is_filled(&self, slot: AssetSlot) -> bool {
        match slot {
            AssetSlot::SoilTexture => self.soil.is_some(),
            AssetSlot::Tree => self.tree.is_some(),
            AssetSlot::Rock => self.rock.is_some(),
            AssetSlot::Grass => self.grass.is_some(),
        }
    }

    pub fn filled_count(&self) -> usize {
        AssetSlot::ALL.iter().filter(|s| self.is_filled(**s)).count()
    }

    fn prototype_slot(&mut self, kind: PrototypeKind) -> &mut Option<Prototype> {
        match kind {
            PrototypeKind::Tree => &mut self.tree,
            PrototypeKind::Rock => &mut self.rock,
            PrototypeKind::Grass => &mut self.grass,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_registry_has_no_prototypes() {
        let reg = PrototypeRegistry::new();
        assert!(reg.prototype(PrototypeKind::Tree).is_none());
        assert!(reg.soil_texture().is_none());
        assert_eq!(reg.filled_count(), 0);
    }

    #[test]
    fn insert_fills_matching_slot() {
        let mut reg = PrototypeRegistry::new();
        let rock = Prototype::new(PrototypeKind::Rock, "boulder", -0.2);
        reg.insert(AssetSlot::Rock, LoadedAsset::Prototype(rock.clone()))
            .unwrap();
        assert_eq!(reg.prototype(PrototypeKind::Rock), Some(&rock));
        assert!(reg.is_filled(AssetSlot::Rock));
        assert!(!reg.is_filled(AssetSlot::Tree));
    }

    #[test]
    fn insert_rejects_mismatched_slot() {
        let mut reg = PrototypeRegistry::new();
        let grass = Prototype::placeholder(PrototypeKind::Grass);
        let err = reg
            .insert(AssetSlot::Tree, LoadedAsset::Prototype(grass))
            .unwrap_err();
        assert!(matches!(err, AssetError::SlotMismatch { slot: AssetSlot::Tree, .. }));

        let err = reg
            .insert(AssetSlot::Rock, LoadedAsset::Texture(Texture::placeholder()))
            .unwrap_err();
        assert!(err.to_string().contains("rock"));
        assert_eq!(reg.filled_count(), 0);
    }

    #[test]
    fn placeholders_fill_everything() {
        let reg = PrototypeRegistry::with_placeholders();
        assert_eq!(reg.filled_count(), AssetSlot::ALL.len());
    }
}
