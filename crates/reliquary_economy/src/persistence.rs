//! # Persistence Codec
//!
//! Snapshots of the Bag, Equipment Set and Wallet, serialized as JSON.
//!
//! Items are stored by template id plus their rolled fields; templates are
//! re-resolved through a [`TemplateResolver`] on load. An id that no longer
//! resolves still loads, with `template = None`, so one retired template
//! never costs a player their whole save.
//!
//! Every snapshot carries a `version`. Data without one is read as version
//! 1; data from a newer version is rejected before anything is mutated.
//!
//! ```text
//! {"version":1,"capacity":24,"slots":[
//!     {"occupied":true,"count":1,"item":{"template_id":"iron-sword", ...}},
//!     {"occupied":false,"count":0}, ...]}
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::bag::{Bag, ItemStack, MAX_BAG_CAPACITY};
use crate::catalog::TemplateResolver;
use crate::equipment::{EquipmentSet, EquipmentSlot};
use crate::error::{EconomyError, EconomyResult};
use crate::item::{AffixKind, ItemInstance, ItemStats, Rarity, MAX_ITEM_LEVEL, MIN_ITEM_LEVEL};
use crate::wallet::Wallet;

/// Newest snapshot version this build writes and reads.
pub const SNAPSHOT_VERSION: u32 = 1;

const fn legacy_version() -> u32 {
    1
}

/// One persisted item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    /// Template id.
    pub template_id: String,
    /// Item level.
    pub item_level: u32,
    /// Required character level.
    pub required_level: u32,
    /// Rarity.
    pub rarity: Rarity,
    /// Affix.
    #[serde(default)]
    pub affix: AffixKind,
    /// Stat bonuses.
    #[serde(default)]
    pub stats: ItemStats,
    /// Monetary value.
    pub value: u64,
}

impl ItemSnapshot {
    /// Captures an item.
    #[must_use]
    pub fn capture(item: &ItemInstance) -> Self {
        Self {
            template_id: item.template_id.clone(),
            item_level: item.item_level,
            required_level: item.required_level,
            rarity: item.rarity,
            affix: item.affix,
            stats: item.stats,
            value: item.value,
        }
    }

    /// Rebuilds the item, resolving its template.
    ///
    /// Levels are clamped into `[1, 30]` and value raised to at least 1, so
    /// hand-edited data cannot produce an item the generator never would.
    #[must_use]
    pub fn restore(&self, resolver: &dyn TemplateResolver) -> ItemInstance {
        let template = resolver.resolve(&self.template_id);
        if template.is_none() {
            tracing::warn!(
                "Template {} not in catalog, loading item without template",
                self.template_id
            );
        }

        let item_level = self.item_level.clamp(MIN_ITEM_LEVEL, MAX_ITEM_LEVEL);
        let required_level = self.required_level.clamp(MIN_ITEM_LEVEL, MAX_ITEM_LEVEL);
        let value = self.value.max(1);
        if item_level != self.item_level || required_level != self.required_level || value != self.value {
            tracing::warn!(
                "Item {} had out-of-range fields (level {}, required {}, value {}), clamped",
                self.template_id,
                self.item_level,
                self.required_level,
                self.value
            );
        }

        ItemInstance {
            template,
            template_id: self.template_id.clone(),
            item_level,
            required_level,
            rarity: self.rarity,
            affix: self.affix,
            stats: self.stats,
            value,
        }
    }
}

/// One persisted bag slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BagSlotSnapshot {
    /// Whether the slot held an item.
    pub occupied: bool,
    /// Units in the slot.
    #[serde(default)]
    pub count: u32,
    /// The item, present when occupied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<ItemSnapshot>,
}

/// Persisted bag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BagSnapshot {
    /// Schema version.
    #[serde(default = "legacy_version")]
    pub version: u32,
    /// Slot count.
    pub capacity: usize,
    /// Every slot, in index order.
    pub slots: Vec<BagSlotSnapshot>,
}

/// One persisted equipment slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquippedSnapshot {
    /// Which slot.
    pub slot: EquipmentSlot,
    /// Whether it held an item.
    pub occupied: bool,
    /// The item, present when occupied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<ItemSnapshot>,
}

/// Persisted equipment set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentSnapshot {
    /// Schema version.
    #[serde(default = "legacy_version")]
    pub version: u32,
    /// All ten slots.
    pub equipped: Vec<EquippedSnapshot>,
}

/// Persisted wallet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSnapshot {
    /// Schema version.
    #[serde(default = "legacy_version")]
    pub version: u32,
    /// Balance.
    pub amount: u64,
}

fn check_version(found: u32) -> EconomyResult<()> {
    if found > SNAPSHOT_VERSION {
        tracing::error!(
            "Snapshot version {} is newer than supported {}",
            found,
            SNAPSHOT_VERSION
        );
        return Err(EconomyError::UnsupportedVersion {
            found,
            supported: SNAPSHOT_VERSION,
        });
    }
    Ok(())
}

/// Saves and loads container snapshots.
pub struct PersistenceCodec;

impl PersistenceCodec {
    /// Captures the bag.
    #[must_use]
    pub fn save_bag(bag: &Bag) -> BagSnapshot {
        let slots = bag
            .slots()
            .iter()
            .map(|slot| match slot {
                Some(stack) => BagSlotSnapshot {
                    occupied: true,
                    count: stack.count,
                    item: Some(ItemSnapshot::capture(&stack.item)),
                },
                None => BagSlotSnapshot {
                    occupied: false,
                    count: 0,
                    item: None,
                },
            })
            .collect();

        BagSnapshot {
            version: SNAPSHOT_VERSION,
            capacity: bag.capacity(),
            slots,
        }
    }

    /// Replaces the bag's contents with a snapshot.
    ///
    /// The bag takes the snapshot's capacity. Slots marked occupied without
    /// an item load empty; entries past the capacity are dropped. Every
    /// occupied slot loads with a count of 1.
    ///
    /// # Errors
    ///
    /// `UnsupportedVersion` for a newer snapshot, `InvalidSnapshot` for a
    /// capacity outside `1..=MAX_BAG_CAPACITY`; the bag is left untouched.
    pub fn load_bag(bag: &mut Bag, snapshot: &BagSnapshot, resolver: &dyn TemplateResolver) -> EconomyResult<()> {
        check_version(snapshot.version)?;
        if snapshot.capacity == 0 || snapshot.capacity > MAX_BAG_CAPACITY {
            return Err(EconomyError::InvalidSnapshot(format!(
                "bag capacity {} outside 1..={MAX_BAG_CAPACITY}",
                snapshot.capacity
            )));
        }

        if snapshot.slots.len() > snapshot.capacity {
            tracing::warn!(
                "Bag snapshot has {} slots for capacity {}, dropping the rest",
                snapshot.slots.len(),
                snapshot.capacity
            );
        }

        let mut slots: Vec<Option<ItemStack>> = vec![None; snapshot.capacity];
        for (index, entry) in snapshot.slots.iter().take(snapshot.capacity).enumerate() {
            if !entry.occupied {
                continue;
            }
            let Some(item) = &entry.item else {
                tracing::warn!("Bag slot {} marked occupied but has no item", index);
                continue;
            };
            if entry.count > 1 {
                tracing::warn!("Bag slot {} had count {}, loading one unit", index, entry.count);
            }
            slots[index] = Some(ItemStack {
                item: item.restore(resolver),
                count: 1,
            });
        }

        bag.replace_contents(slots);
        Ok(())
    }

    /// Captures the equipment set.
    #[must_use]
    pub fn save_equipment(equipment: &EquipmentSet) -> EquipmentSnapshot {
        let equipped = equipment
            .iter()
            .map(|(slot, item)| EquippedSnapshot {
                slot,
                occupied: item.is_some(),
                item: item.map(ItemSnapshot::capture),
            })
            .collect();

        EquipmentSnapshot {
            version: SNAPSHOT_VERSION,
            equipped,
        }
    }

    /// Replaces the equipment set's contents with a snapshot.
    ///
    /// Slots missing from the snapshot load empty; a repeated slot keeps
    /// its last entry.
    ///
    /// # Errors
    ///
    /// `UnsupportedVersion` for a newer snapshot; the set is left untouched.
    pub fn load_equipment(
        equipment: &mut EquipmentSet,
        snapshot: &EquipmentSnapshot,
        resolver: &dyn TemplateResolver,
    ) -> EconomyResult<()> {
        check_version(snapshot.version)?;

        let mut slots: [Option<ItemInstance>; 10] = Default::default();
        for entry in &snapshot.equipped {
            slots[entry.slot.index()] = if entry.occupied {
                entry.item.as_ref().map(|item| item.restore(resolver))
            } else {
                None
            };
        }

        equipment.replace_contents(slots);
        Ok(())
    }

    /// Captures the wallet.
    #[must_use]
    pub fn save_wallet(wallet: &Wallet) -> WalletSnapshot {
        WalletSnapshot {
            version: SNAPSHOT_VERSION,
            amount: wallet.amount(),
        }
    }

    /// Restores the wallet balance.
    ///
    /// # Errors
    ///
    /// `UnsupportedVersion` for a newer snapshot.
    pub fn load_wallet(wallet: &mut Wallet, snapshot: &WalletSnapshot) -> EconomyResult<()> {
        check_version(snapshot.version)?;
        wallet.replace_amount(snapshot.amount);
        Ok(())
    }

    /// Encodes a snapshot as JSON.
    ///
    /// # Errors
    ///
    /// `Serialization` if encoding fails.
    pub fn to_json<T: Serialize>(snapshot: &T) -> EconomyResult<String> {
        Ok(serde_json::to_string(snapshot)?)
    }

    /// Decodes a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// `Serialization` for malformed input.
    pub fn from_json<T: DeserializeOwned>(text: &str) -> EconomyResult<T> {
        Ok(serde_json::from_str(text)?)
    }
}
