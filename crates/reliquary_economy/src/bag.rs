//! # Bag
//!
//! Fixed-capacity ordered array of optional item stacks.
//!
//! Slot indices are stable addresses: the transfer coordinator records them
//! at drag start and uses them at drop time. The slot vector's length always
//! equals the capacity; an empty slot is `None`.
//!
//! Every committed mutation emits [`ChangeTopic::BagChanged`] exactly once.

use crate::events::{ChangeReceiver, ChangeSignal, ChangeTopic};
use crate::item::ItemInstance;

/// Default bag capacity.
pub const DEFAULT_BAG_CAPACITY: usize = 24;

/// Largest bag capacity accepted from configuration or save data.
pub const MAX_BAG_CAPACITY: usize = 1024;

/// The occupant of a bag slot.
///
/// `count` is at least 1. The bag keeps one instance per slot, so today it
/// is always exactly 1; the field exists so the persisted format can carry
/// real stacks later without a schema change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemStack {
    /// The item.
    pub item: ItemInstance,
    /// Number of units.
    pub count: u32,
}

impl ItemStack {
    /// A stack holding one unit.
    #[inline]
    #[must_use]
    pub const fn single(item: ItemInstance) -> Self {
        Self { item, count: 1 }
    }
}

/// A player bag.
#[derive(Clone, Debug)]
pub struct Bag {
    slots: Vec<Option<ItemStack>>,
    signal: ChangeSignal,
}

impl Bag {
    /// Creates an empty bag with `capacity` slots.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            signal: ChangeSignal::new(),
        }
    }

    /// Subscribes to [`ChangeTopic::BagChanged`].
    pub fn subscribe(&mut self) -> ChangeReceiver {
        self.signal.subscribe()
    }

    /// Total number of slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn used_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Checks if every slot is occupied.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.find_empty_slot().is_none()
    }

    /// All slots in index order.
    #[inline]
    #[must_use]
    pub fn slots(&self) -> &[Option<ItemStack>] {
        &self.slots
    }

    /// Gets the stack at `index`.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ItemStack> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Gets the item at `index`.
    #[inline]
    #[must_use]
    pub fn item(&self, index: usize) -> Option<&ItemInstance> {
        self.get(index).map(|s| &s.item)
    }

    /// Whether `index` holds an item.
    #[inline]
    #[must_use]
    pub fn is_occupied(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Finds the first empty slot.
    #[must_use]
    pub fn find_empty_slot(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// Puts `item` into the first empty slot.
    ///
    /// Returns the slot index on success.
    ///
    /// # Errors
    ///
    /// Hands the item back untouched when the bag is full, so the caller
    /// can return it to where it came from.
    pub fn add(&mut self, item: ItemInstance) -> Result<usize, ItemInstance> {
        let Some(index) = self.find_empty_slot() else {
            return Err(item);
        };
        self.slots[index] = Some(ItemStack::single(item));
        self.signal.emit(ChangeTopic::BagChanged);
        Ok(index)
    }

    /// Puts a batch of items into empty slots in index order.
    ///
    /// Emits one notification if anything was placed.
    ///
    /// # Errors
    ///
    /// Returns the items that did not fit.
    pub fn add_many(&mut self, items: Vec<ItemInstance>) -> Result<(), Vec<ItemInstance>> {
        let mut placed = false;
        let mut leftover = Vec::new();

        for item in items {
            if let Some(index) = self.find_empty_slot() {
                self.slots[index] = Some(ItemStack::single(item));
                placed = true;
            } else {
                leftover.push(item);
            }
        }

        if placed {
            self.signal.emit(ChangeTopic::BagChanged);
        }
        if leftover.is_empty() {
            Ok(())
        } else {
            Err(leftover)
        }
    }

    /// Clears the slot at `index` and returns its item.
    ///
    /// Returns `None` (and emits nothing) for an empty or invalid slot.
    pub fn remove_at(&mut self, index: usize) -> Option<ItemInstance> {
        let stack = self.slots.get_mut(index)?.take()?;
        self.signal.emit(ChangeTopic::BagChanged);
        Some(stack.item)
    }

    /// Swaps the contents of two slots.
    ///
    /// No-op when the indices are equal or either is out of range.
    /// Returns whether anything moved.
    pub fn move_slots(&mut self, from: usize, to: usize) -> bool {
        if from == to || from >= self.slots.len() || to >= self.slots.len() {
            return false;
        }
        self.slots.swap(from, to);
        self.signal.emit(ChangeTopic::BagChanged);
        true
    }

    /// Replaces every slot, adjusting capacity to `slots.len()`.
    pub fn replace_contents(&mut self, slots: Vec<Option<ItemStack>>) {
        self.slots = slots;
        self.signal.emit(ChangeTopic::BagChanged);
    }

    /// Takes a slot's stack without notifying. Part of a multi-container
    /// transaction that calls [`Bag::commit`] once it is done.
    pub(crate) fn take_silent(&mut self, index: usize) -> Option<ItemStack> {
        self.slots.get_mut(index)?.take()
    }

    /// Writes a slot without notifying. The slot must exist.
    pub(crate) fn put_silent(&mut self, index: usize, stack: Option<ItemStack>) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = stack;
        }
    }

    /// Emits the change notification for a finished transaction.
    pub(crate) fn commit(&mut self) {
        self.signal.emit(ChangeTopic::BagChanged);
    }
}

impl Default for Bag {
    fn default() -> Self {
        Self::new(DEFAULT_BAG_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ItemCategory, ItemTemplate};
    use crate::item::{AffixKind, ItemStats, Rarity};
    use std::sync::Arc;

    fn gem(level: u32) -> ItemInstance {
        let template = Arc::new(ItemTemplate::new("gem", "Gem", ItemCategory::Material));
        ItemInstance::fixed(template, level, Rarity::Common, AffixKind::None, ItemStats::default())
    }

    #[test]
    fn test_add_fills_first_empty() {
        let mut bag = Bag::new(3);
        assert_eq!(bag.add(gem(1)), Ok(0));
        assert_eq!(bag.add(gem(2)), Ok(1));
        bag.remove_at(0);
        assert_eq!(bag.add(gem(3)), Ok(0));
        assert_eq!(bag.used_slots(), 2);
    }

    #[test]
    fn test_add_to_full_bag_returns_item() {
        let mut bag = Bag::new(1);
        bag.add(gem(1)).unwrap();
        let rx = bag.subscribe();

        let rejected = bag.add(gem(7)).unwrap_err();
        assert_eq!(rejected.item_level, 7);
        assert_eq!(bag.item(0).unwrap().item_level, 1);
        assert_eq!(rx.pending_count(), 0, "failed add must not notify");
    }

    #[test]
    fn test_add_many_reports_leftovers() {
        let mut bag = Bag::new(2);
        let rx = bag.subscribe();
        let leftover = bag.add_many(vec![gem(1), gem(2), gem(3)]).unwrap_err();
        assert_eq!(leftover.len(), 1);
        assert_eq!(leftover[0].item_level, 3);
        assert_eq!(rx.drain(), vec![ChangeTopic::BagChanged]);
    }

    #[test]
    fn test_move_swaps_and_ignores_bad_indices() {
        let mut bag = Bag::new(3);
        bag.add(gem(1)).unwrap();
        let rx = bag.subscribe();

        assert!(bag.move_slots(0, 2));
        assert!(bag.item(0).is_none());
        assert_eq!(bag.item(2).unwrap().item_level, 1);

        assert!(!bag.move_slots(1, 1));
        assert!(!bag.move_slots(0, 9));
        assert_eq!(rx.pending_count(), 1);
    }

    #[test]
    fn test_length_always_matches_capacity() {
        let mut bag = Bag::new(4);
        for level in 1..=6 {
            let _ = bag.add(gem(level));
            assert_eq!(bag.slots().len(), bag.capacity());
        }
        bag.remove_at(2);
        bag.move_slots(0, 3);
        bag.remove_at(99);
        assert_eq!(bag.slots().len(), 4);

        bag.replace_contents(vec![None; 6]);
        assert_eq!(bag.capacity(), 6);
        assert_eq!(bag.slots().len(), 6);
    }

    #[test]
    fn test_remove_empty_slot_is_silent() {
        let mut bag = Bag::new(2);
        let rx = bag.subscribe();
        assert!(bag.remove_at(0).is_none());
        assert_eq!(rx.pending_count(), 0);
    }
}
