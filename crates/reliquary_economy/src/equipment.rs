//! # Equipment Set
//!
//! Ten named slots, each holding at most one item.
//!
//! [`EquipmentSet::swap`] is the single primitive every equip, unequip and
//! slot-to-slot exchange is composed from. Compatibility is checked by the
//! caller (see [`crate::item::ItemInstance::fits_slot`]); the set itself only
//! stores.

use serde::{Deserialize, Serialize};

use crate::events::{ChangeReceiver, ChangeSignal, ChangeTopic};
use crate::item::{ItemInstance, ItemStats};

/// Named equipment slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EquipmentSlot {
    /// Helmet.
    Head,
    /// Amulet.
    Neck,
    /// Left ring.
    RingLeft,
    /// Right ring.
    RingRight,
    /// Weapon.
    Weapon,
    /// Trinket.
    Trinket,
    /// First upgrade slot.
    Upgrade1,
    /// Second upgrade slot.
    Upgrade2,
    /// Third upgrade slot.
    Upgrade3,
    /// Fourth upgrade slot.
    Upgrade4,
}

impl EquipmentSlot {
    /// Every slot in storage order.
    pub const ALL: [Self; 10] = [
        Self::Head,
        Self::Neck,
        Self::RingLeft,
        Self::RingRight,
        Self::Weapon,
        Self::Trinket,
        Self::Upgrade1,
        Self::Upgrade2,
        Self::Upgrade3,
        Self::Upgrade4,
    ];

    /// The interchangeable upgrade slots, in scan order.
    pub const UPGRADES: [Self; 4] = [Self::Upgrade1, Self::Upgrade2, Self::Upgrade3, Self::Upgrade4];

    /// Whether this is one of the four upgrade slots.
    #[inline]
    #[must_use]
    pub const fn is_upgrade(self) -> bool {
        matches!(
            self,
            Self::Upgrade1 | Self::Upgrade2 | Self::Upgrade3 | Self::Upgrade4
        )
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Head => 0,
            Self::Neck => 1,
            Self::RingLeft => 2,
            Self::RingRight => 3,
            Self::Weapon => 4,
            Self::Trinket => 5,
            Self::Upgrade1 => 6,
            Self::Upgrade2 => 7,
            Self::Upgrade3 => 8,
            Self::Upgrade4 => 9,
        }
    }
}

/// The character's equipped items.
#[derive(Clone, Debug, Default)]
pub struct EquipmentSet {
    slots: [Option<ItemInstance>; 10],
    signal: ChangeSignal,
}

impl EquipmentSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to [`ChangeTopic::EquipmentChanged`].
    pub fn subscribe(&mut self) -> ChangeReceiver {
        self.signal.subscribe()
    }

    /// Item in `slot`, if any.
    #[inline]
    #[must_use]
    pub fn get(&self, slot: EquipmentSlot) -> Option<&ItemInstance> {
        self.slots[slot.index()].as_ref()
    }

    /// Whether `slot` is occupied.
    #[inline]
    #[must_use]
    pub fn is_occupied(&self, slot: EquipmentSlot) -> bool {
        self.get(slot).is_some()
    }

    /// Puts `item` into `slot` and returns the previous occupant.
    ///
    /// Emits a notification unless both sides were empty.
    pub fn swap(
        &mut self,
        slot: EquipmentSlot,
        item: Option<ItemInstance>,
    ) -> Option<ItemInstance> {
        let changed = item.is_some() || self.is_occupied(slot);
        let previous = std::mem::replace(&mut self.slots[slot.index()], item);
        if changed {
            self.signal.emit(ChangeTopic::EquipmentChanged);
        }
        previous
    }

    /// Exchanges the occupants of two slots with a single notification.
    pub(crate) fn exchange(&mut self, a: EquipmentSlot, b: EquipmentSlot) {
        if a == b {
            return;
        }
        self.slots.swap(a.index(), b.index());
        self.signal.emit(ChangeTopic::EquipmentChanged);
    }

    /// Clears `slot` and returns what was there.
    pub fn unequip(&mut self, slot: EquipmentSlot) -> Option<ItemInstance> {
        self.swap(slot, None)
    }

    /// First empty upgrade slot in fixed order, or `None` if all are taken.
    #[must_use]
    pub fn first_empty_upgrade_slot(&self) -> Option<EquipmentSlot> {
        EquipmentSlot::UPGRADES
            .into_iter()
            .find(|&slot| !self.is_occupied(slot))
    }

    /// Every slot with its occupant, in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (EquipmentSlot, Option<&ItemInstance>)> {
        EquipmentSlot::ALL
            .into_iter()
            .map(move |slot| (slot, self.get(slot)))
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn equipped_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Sum of the stat bonuses of everything equipped.
    #[must_use]
    pub fn total_stats(&self) -> ItemStats {
        let mut total = ItemStats::default();
        for item in self.slots.iter().flatten() {
            total += item.stats;
        }
        total
    }

    /// Replaces every slot at once (used when loading a save).
    pub fn replace_contents(&mut self, slots: [Option<ItemInstance>; 10]) {
        self.slots = slots;
        self.signal.emit(ChangeTopic::EquipmentChanged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ItemCategory, ItemTemplate};
    use crate::item::{AffixKind, Rarity};
    use std::sync::Arc;

    fn chip(level: u32) -> ItemInstance {
        let template = Arc::new(
            ItemTemplate::new("chip", "Chip", ItemCategory::Upgrade)
                .equippable_in(EquipmentSlot::Upgrade1),
        );
        let stats = ItemStats {
            toughness: 2,
            ..ItemStats::default()
        };
        ItemInstance::fixed(template, level, Rarity::Common, AffixKind::None, stats)
    }

    #[test]
    fn test_swap_returns_previous() {
        let mut set = EquipmentSet::new();
        assert!(set.swap(EquipmentSlot::Upgrade2, Some(chip(1))).is_none());
        let previous = set.swap(EquipmentSlot::Upgrade2, Some(chip(2))).unwrap();
        assert_eq!(previous.item_level, 1);
        assert_eq!(set.get(EquipmentSlot::Upgrade2).unwrap().item_level, 2);
    }

    #[test]
    fn test_unequip_empty_slot_is_silent() {
        let mut set = EquipmentSet::new();
        let rx = set.subscribe();
        assert!(set.unequip(EquipmentSlot::Head).is_none());
        assert_eq!(rx.pending_count(), 0);
    }

    #[test]
    fn test_first_empty_upgrade_slot_scans_in_order() {
        let mut set = EquipmentSet::new();
        assert_eq!(set.first_empty_upgrade_slot(), Some(EquipmentSlot::Upgrade1));

        set.swap(EquipmentSlot::Upgrade1, Some(chip(1)));
        set.swap(EquipmentSlot::Upgrade3, Some(chip(1)));
        assert_eq!(set.first_empty_upgrade_slot(), Some(EquipmentSlot::Upgrade2));

        set.swap(EquipmentSlot::Upgrade2, Some(chip(1)));
        set.swap(EquipmentSlot::Upgrade4, Some(chip(1)));
        assert_eq!(set.first_empty_upgrade_slot(), None);
    }

    #[test]
    fn test_total_stats() {
        let mut set = EquipmentSet::new();
        set.swap(EquipmentSlot::Upgrade1, Some(chip(1)));
        set.swap(EquipmentSlot::Upgrade2, Some(chip(1)));
        assert_eq!(set.total_stats().toughness, 4);
        assert_eq!(set.equipped_count(), 2);
    }
}
