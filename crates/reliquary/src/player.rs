//! # Player Inventory
//!
//! Everything a player owns: one bag, one equipment set, one wallet, plus
//! the character level that gates equipping.
//!
//! Save files are a single JSON document holding one snapshot per
//! container. Loading checks every version before touching anything, so a
//! rejected file leaves the player as they were.

use serde::{Deserialize, Serialize};
use std::path::Path;

use reliquary_economy::{
    Bag, BagSnapshot, CharacterLevel, Containers, EconomyError, EquipmentSet, EquipmentSnapshot,
    ItemStats, PersistenceCodec, TemplateResolver, Wallet, WalletSnapshot, SNAPSHOT_VERSION,
};

use crate::error::{GameError, GameResult};

/// Newest save file version.
pub const SAVE_VERSION: u32 = 1;

const fn legacy_version() -> u32 {
    1
}

/// On-disk save document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveGame {
    /// Save format version.
    #[serde(default = "legacy_version")]
    pub version: u32,
    /// Character level.
    pub level: u32,
    /// Bag snapshot.
    pub bag: BagSnapshot,
    /// Equipment snapshot.
    pub equipment: EquipmentSnapshot,
    /// Wallet snapshot.
    pub wallet: WalletSnapshot,
}

/// A player's containers and level.
#[derive(Clone, Debug)]
pub struct PlayerInventory {
    /// The bag.
    pub bag: Bag,
    /// Equipped items.
    pub equipment: EquipmentSet,
    /// Currency.
    pub wallet: Wallet,
    level: u32,
}

impl PlayerInventory {
    /// Creates an empty inventory.
    #[must_use]
    pub fn new(bag_capacity: usize, level: u32) -> Self {
        Self {
            bag: Bag::new(bag_capacity),
            equipment: EquipmentSet::new(),
            wallet: Wallet::default(),
            level: level.max(1),
        }
    }

    /// Character level.
    #[inline]
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Sets the character level (minimum 1).
    pub fn set_level(&mut self, level: u32) {
        self.level = level.max(1);
    }

    /// Sum of equipped stat bonuses.
    #[must_use]
    pub fn stat_totals(&self) -> ItemStats {
        self.equipment.total_stats()
    }

    /// Borrows the bag and equipment for a transfer.
    pub fn containers(&mut self) -> Containers<'_> {
        Containers::new(&mut self.bag, &mut self.equipment, &self.level)
    }

    /// Captures the current state.
    #[must_use]
    pub fn save(&self) -> SaveGame {
        SaveGame {
            version: SAVE_VERSION,
            level: self.level,
            bag: PersistenceCodec::save_bag(&self.bag),
            equipment: PersistenceCodec::save_equipment(&self.equipment),
            wallet: PersistenceCodec::save_wallet(&self.wallet),
        }
    }

    /// Restores state from a save.
    ///
    /// # Errors
    ///
    /// `UnsupportedSave` or `UnsupportedVersion` when any part is newer
    /// than this build reads; nothing is mutated in that case.
    pub fn restore(&mut self, save: &SaveGame, resolver: &dyn TemplateResolver) -> GameResult<()> {
        if save.version > SAVE_VERSION {
            return Err(GameError::UnsupportedSave {
                found: save.version,
                supported: SAVE_VERSION,
            });
        }
        for found in [save.bag.version, save.equipment.version, save.wallet.version] {
            if found > SNAPSHOT_VERSION {
                return Err(EconomyError::UnsupportedVersion {
                    found,
                    supported: SNAPSHOT_VERSION,
                }
                .into());
            }
        }

        PersistenceCodec::load_bag(&mut self.bag, &save.bag, resolver)?;
        PersistenceCodec::load_equipment(&mut self.equipment, &save.equipment, resolver)?;
        PersistenceCodec::load_wallet(&mut self.wallet, &save.wallet)?;
        self.set_level(save.level);
        Ok(())
    }

    /// Writes a save file.
    ///
    /// # Errors
    ///
    /// `Serialization` or `Io` from the economy layer.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> GameResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&self.save()).map_err(EconomyError::from)?;
        std::fs::write(path, json).map_err(EconomyError::from)?;
        tracing::info!("Saved player to {}", path.display());
        Ok(())
    }

    /// Reads and restores a save file.
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, `Serialization` if it is malformed,
    /// otherwise as [`PlayerInventory::restore`].
    pub fn load_from_file(&mut self, path: impl AsRef<Path>, resolver: &dyn TemplateResolver) -> GameResult<()> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(EconomyError::from)?;
        let save: SaveGame = PersistenceCodec::from_json(&text)?;
        self.restore(&save, resolver)?;
        tracing::info!("Loaded player from {}", path.display());
        Ok(())
    }
}

impl CharacterLevel for PlayerInventory {
    fn character_level(&self) -> u32 {
        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reliquary_economy::{
        AffixKind, Catalog, EquipmentSlot, ItemCategory, ItemInstance, ItemTemplate, Rarity,
    };

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .insert(
                ItemTemplate::new("amulet", "Amulet", ItemCategory::Equipment)
                    .equippable_in(EquipmentSlot::Neck),
            )
            .unwrap();
        catalog
    }

    fn amulet(catalog: &Catalog, crit: i32) -> ItemInstance {
        let stats = ItemStats {
            crit,
            toughness: 4,
            ..ItemStats::default()
        };
        ItemInstance::fixed(
            catalog.get("amulet").unwrap().clone(),
            4,
            Rarity::Uncommon,
            AffixKind::Assassin,
            stats,
        )
    }

    #[test]
    fn test_level_floor() {
        let mut player = PlayerInventory::new(4, 0);
        assert_eq!(player.level(), 1);
        player.set_level(12);
        assert_eq!(player.character_level(), 12);
    }

    #[test]
    fn test_stat_totals_follow_equipment() {
        let catalog = catalog();
        let mut player = PlayerInventory::new(4, 5);
        player.equipment.swap(EquipmentSlot::Neck, Some(amulet(&catalog, 3)));
        assert_eq!(player.stat_totals().crit, 3);
        assert_eq!(player.stat_totals().toughness, 4);
    }

    #[test]
    fn test_save_restore_round_trip() {
        let catalog = catalog();
        let mut player = PlayerInventory::new(3, 7);
        player.bag.add(amulet(&catalog, 2)).unwrap();
        player.equipment.swap(EquipmentSlot::Neck, Some(amulet(&catalog, 5)));
        player.wallet.add(321);

        let save = player.save();
        let mut restored = PlayerInventory::new(10, 1);
        restored.restore(&save, &catalog).unwrap();

        assert_eq!(restored.level(), 7);
        assert_eq!(restored.bag.capacity(), 3);
        assert_eq!(restored.bag.item(0), player.bag.item(0));
        assert_eq!(
            restored.equipment.get(EquipmentSlot::Neck),
            player.equipment.get(EquipmentSlot::Neck)
        );
        assert_eq!(restored.wallet.amount(), 321);
    }

    #[test]
    fn test_newer_part_rejects_whole_save() {
        let catalog = catalog();
        let mut player = PlayerInventory::new(3, 7);
        player.wallet.add(50);
        let mut save = player.save();
        save.wallet.version = SNAPSHOT_VERSION + 1;
        save.bag.capacity = 1;

        let err = player.restore(&save, &catalog).unwrap_err();
        assert!(matches!(
            err,
            GameError::Economy(EconomyError::UnsupportedVersion { .. })
        ));
        assert_eq!(player.bag.capacity(), 3);
    }

    #[test]
    fn test_save_file_round_trip() {
        let catalog = catalog();
        let path = std::env::temp_dir().join(format!("reliquary_save_{}.json", std::process::id()));

        let mut player = PlayerInventory::new(2, 9);
        player.bag.add(amulet(&catalog, 1)).unwrap();
        player.save_to_file(&path).unwrap();

        let mut loaded = PlayerInventory::new(2, 1);
        loaded.load_from_file(&path, &catalog).unwrap();
        assert_eq!(loaded.level(), 9);
        assert_eq!(loaded.bag.item(0), player.bag.item(0));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let mut player = PlayerInventory::new(2, 1);
        let err = player
            .load_from_file("/definitely/not/here.json", &catalog())
            .unwrap_err();
        assert!(matches!(err, GameError::Economy(EconomyError::Io(_))));
    }
}
