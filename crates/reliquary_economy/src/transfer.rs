//! # Transfer Coordinator
//!
//! **Drag/drop state machine that moves items between containers.**
//!
//! The coordinator is the only component that mutates two containers as
//! part of one logical transaction. It holds no containers itself; every
//! call borrows them through [`Containers`] for its duration.
//!
//! ## State machine
//!
//! ```text
//!            begin_drag(origin)
//!   ┌──────┐ ───────────────────> ┌──────────────────┐
//!   │ Idle │                      │ Dragging(origin) │ ── update_drag(pos)
//!   └──────┘ <─────────────────── └──────────────────┘
//!      ▲      drop_on_bag / drop_on_equipment (marks handled)
//!      │
//!      └──── end_drag: handled     -> reset
//!                      unhandled   -> DestroyConfirmation if origin was a
//!                                     still-occupied bag slot
//! ```
//!
//! ## Failure classes
//!
//! | Failure        | Surface                                   | Mutation |
//! |----------------|-------------------------------------------|----------|
//! | capacity       | `Err(InventoryFull)`                      | none     |
//! | eligibility    | `Err(LevelTooLow)` / `Err(NotEquippable)` | none     |
//! | compatibility  | `Ok(DropOutcome::Ignored)`                | none     |

use crate::bag::{Bag, ItemStack};
use crate::catalog::ItemCategory;
use crate::equipment::{EquipmentSet, EquipmentSlot};
use crate::error::{EconomyError, EconomyResult};
use crate::item::ItemInstance;
use crate::loot::{LootContainer, LOOT_CAPACITY};
use crate::wallet::Wallet;

// ============================================================================
// COLLABORATORS
// ============================================================================

/// Provides the current character level for equip gating.
pub trait CharacterLevel {
    /// The character's level right now.
    fn character_level(&self) -> u32;
}

impl CharacterLevel for u32 {
    fn character_level(&self) -> u32 {
        *self
    }
}

/// The containers a transfer may touch.
pub struct Containers<'a> {
    /// Player bag.
    pub bag: &'a mut Bag,
    /// Character equipment.
    pub equipment: &'a mut EquipmentSet,
    /// Open loot container, if any.
    pub loot: Option<&'a mut LootContainer>,
    /// Level provider for equip gating.
    pub character: &'a dyn CharacterLevel,
}

impl<'a> Containers<'a> {
    /// Bundles the player's containers with no loot open.
    pub fn new(
        bag: &'a mut Bag,
        equipment: &'a mut EquipmentSet,
        character: &'a dyn CharacterLevel,
    ) -> Self {
        Self {
            bag,
            equipment,
            loot: None,
            character,
        }
    }

    /// Attaches an open loot container.
    #[must_use]
    pub fn with_loot(mut self, loot: &'a mut LootContainer) -> Self {
        self.loot = Some(loot);
        self
    }
}

// ============================================================================
// STATE
// ============================================================================

/// Where a drag started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragOrigin {
    /// A bag slot.
    Bag(usize),
    /// An equipment slot.
    Equipment(EquipmentSlot),
    /// A loot container slot.
    Loot(usize),
}

/// Coordinator state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DragState {
    /// No drag in progress.
    #[default]
    Idle,
    /// An item is being dragged.
    Dragging {
        /// Where the item came from.
        origin: DragOrigin,
        /// Pointer position of the ghost icon.
        ghost: (f32, f32),
    },
}

/// What a drop did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropOutcome {
    /// Two bag slots swapped contents.
    Moved {
        /// Source slot.
        from: usize,
        /// Destination slot.
        to: usize,
    },
    /// A bag item was equipped.
    Equipped(EquipReport),
    /// An equipped item went back to the bag.
    Unequipped {
        /// Slot that was cleared.
        slot: EquipmentSlot,
        /// Bag slot that received the item.
        bag_index: usize,
    },
    /// Two equipment slots exchanged occupants.
    SlotsExchanged {
        /// Slot the drag started from.
        from: EquipmentSlot,
        /// Slot the item was dropped on.
        to: EquipmentSlot,
    },
    /// A loot item moved into the bag.
    LootTaken(LootTransfer),
    /// The target does not accept the item; nothing changed.
    Ignored,
}

/// Result of a successful equip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EquipReport {
    /// Slot the item went into.
    pub slot: EquipmentSlot,
    /// Whether a previous occupant was returned to the bag.
    pub displaced: bool,
}

/// Result of moving a loot item into the bag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LootTransfer {
    /// Bag slot that received the item.
    pub bag_index: usize,
    /// Whether the loot container is now empty.
    pub depleted: bool,
}

/// Pending destructive removal of a bag item.
///
/// Returned by [`TransferCoordinator::end_drag`] when a bag item was dragged
/// out and released over nothing. Consuming it with [`confirm`] or
/// [`cancel`] resolves the prompt; dropping it is the same as cancelling.
///
/// [`confirm`]: DestroyConfirmation::confirm
/// [`cancel`]: DestroyConfirmation::cancel
#[derive(Debug, PartialEq, Eq)]
#[must_use = "the player must confirm or cancel the removal"]
pub struct DestroyConfirmation {
    bag_index: usize,
}

impl DestroyConfirmation {
    /// Bag slot the removal targets.
    #[inline]
    #[must_use]
    pub const fn bag_index(&self) -> usize {
        self.bag_index
    }

    /// Removes one unit at the captured index and returns it.
    pub fn confirm(self, bag: &mut Bag) -> Option<ItemInstance> {
        let removed = bag.remove_at(self.bag_index);
        if let Some(item) = &removed {
            tracing::info!("Destroyed {} from bag slot {}", item.display_name(), self.bag_index);
        }
        removed
    }

    /// Abandons the removal.
    pub fn cancel(self) {
        tracing::debug!("Destroy of bag slot {} cancelled", self.bag_index);
    }
}

// ============================================================================
// COORDINATOR
// ============================================================================

/// The drag/drop state machine.
#[derive(Clone, Debug, Default)]
pub struct TransferCoordinator {
    state: DragState,
    drop_handled: bool,
}

impl TransferCoordinator {
    /// Creates an idle coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> DragState {
        self.state
    }

    /// Whether a drag is in progress.
    #[inline]
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Tooltips stay hidden for the whole drag.
    #[inline]
    #[must_use]
    pub const fn tooltips_suppressed(&self) -> bool {
        self.is_dragging()
    }

    /// Origin of the current drag.
    #[must_use]
    pub const fn origin(&self) -> Option<DragOrigin> {
        match self.state {
            DragState::Dragging { origin, .. } => Some(origin),
            DragState::Idle => None,
        }
    }

    /// Ghost icon position of the current drag.
    #[must_use]
    pub const fn ghost_position(&self) -> Option<(f32, f32)> {
        match self.state {
            DragState::Dragging { ghost, .. } => Some(ghost),
            DragState::Idle => None,
        }
    }

    /// Starts dragging the item at `origin`.
    ///
    /// # Errors
    ///
    /// `AlreadyDragging` if a drag is in progress, `InvalidSlot` for an
    /// out-of-range index and `SlotEmpty` if nothing is there.
    pub fn begin_drag(&mut self, origin: DragOrigin, containers: &Containers<'_>) -> EconomyResult<()> {
        if self.is_dragging() {
            return Err(EconomyError::AlreadyDragging);
        }

        match origin {
            DragOrigin::Bag(index) => {
                if index >= containers.bag.capacity() {
                    return Err(EconomyError::InvalidSlot(index));
                }
                if !containers.bag.is_occupied(index) {
                    return Err(EconomyError::SlotEmpty);
                }
            }
            DragOrigin::Equipment(slot) => {
                if !containers.equipment.is_occupied(slot) {
                    return Err(EconomyError::SlotEmpty);
                }
            }
            DragOrigin::Loot(index) => {
                if index >= LOOT_CAPACITY {
                    return Err(EconomyError::InvalidSlot(index));
                }
                let loot = containers.loot.as_deref().ok_or(EconomyError::SlotEmpty)?;
                if loot.item(index).is_none() {
                    return Err(EconomyError::SlotEmpty);
                }
            }
        }

        self.state = DragState::Dragging {
            origin,
            ghost: (0.0, 0.0),
        };
        self.drop_handled = false;
        tracing::debug!("Drag started from {:?}", origin);
        Ok(())
    }

    /// Moves the ghost icon. No container is touched.
    ///
    /// # Errors
    ///
    /// `NotDragging` when idle.
    pub fn update_drag(&mut self, x: f32, y: f32) -> EconomyResult<()> {
        match &mut self.state {
            DragState::Dragging { ghost, .. } => {
                *ghost = (x, y);
                Ok(())
            }
            DragState::Idle => Err(EconomyError::NotDragging),
        }
    }

    /// Abandons the drag without touching any container.
    pub fn cancel_drag(&mut self) {
        self.state = DragState::Idle;
        self.drop_handled = false;
    }

    /// Drops the dragged item on bag slot `target`.
    ///
    /// Equipment items go to the first empty bag slot regardless of
    /// `target`. The coordinator is idle afterwards whatever the result.
    ///
    /// # Errors
    ///
    /// `NotDragging` when idle; otherwise the failure of the underlying
    /// transfer, with every container left unchanged.
    pub fn drop_on_bag(&mut self, containers: &mut Containers<'_>, target: usize) -> EconomyResult<DropOutcome> {
        let origin = self.finish_drop()?;
        let result = Self::apply_bag_drop(containers, origin, target);
        Self::log_outcome(origin, &result);
        result
    }

    /// Drops the dragged item on equipment slot `target`.
    ///
    /// A bag item is equipped into the slot its template declares, not
    /// necessarily `target`. The coordinator is idle afterwards whatever the
    /// result.
    ///
    /// # Errors
    ///
    /// `NotDragging` when idle; otherwise the failure of the underlying
    /// transfer, with every container left unchanged.
    pub fn drop_on_equipment(
        &mut self,
        containers: &mut Containers<'_>,
        target: EquipmentSlot,
    ) -> EconomyResult<DropOutcome> {
        let origin = self.finish_drop()?;
        let result = Self::apply_equipment_drop(containers, origin, target);
        Self::log_outcome(origin, &result);
        result
    }

    /// Releases the pointer.
    ///
    /// An unhandled drag from a still-occupied bag slot yields a
    /// [`DestroyConfirmation`]; every other case just resets.
    pub fn end_drag(&mut self, bag: &Bag) -> Option<DestroyConfirmation> {
        let origin = self.origin();
        let handled = self.drop_handled;
        self.state = DragState::Idle;
        self.drop_handled = false;

        if handled {
            return None;
        }
        match origin {
            Some(DragOrigin::Bag(index)) if bag.is_occupied(index) => {
                tracing::debug!("Bag slot {} released outside any container", index);
                Some(DestroyConfirmation { bag_index: index })
            }
            _ => None,
        }
    }

    fn finish_drop(&mut self) -> EconomyResult<DragOrigin> {
        let origin = self.origin().ok_or(EconomyError::NotDragging)?;
        self.state = DragState::Idle;
        self.drop_handled = true;
        Ok(origin)
    }

    fn apply_bag_drop(
        containers: &mut Containers<'_>,
        origin: DragOrigin,
        target: usize,
    ) -> EconomyResult<DropOutcome> {
        match origin {
            DragOrigin::Bag(from) => {
                if containers.bag.move_slots(from, target) {
                    Ok(DropOutcome::Moved { from, to: target })
                } else {
                    Ok(DropOutcome::Ignored)
                }
            }
            DragOrigin::Equipment(slot) => {
                let bag_index = unequip_to_bag(containers.bag, containers.equipment, slot)?;
                Ok(DropOutcome::Unequipped { slot, bag_index })
            }
            DragOrigin::Loot(index) => {
                let loot = containers.loot.as_deref_mut().ok_or(EconomyError::SlotEmpty)?;
                take_loot_item(loot, containers.bag, index).map(DropOutcome::LootTaken)
            }
        }
    }

    fn apply_equipment_drop(
        containers: &mut Containers<'_>,
        origin: DragOrigin,
        target: EquipmentSlot,
    ) -> EconomyResult<DropOutcome> {
        match origin {
            DragOrigin::Bag(index) => {
                equip_from_bag(containers.bag, containers.equipment, index, containers.character)
                    .map(DropOutcome::Equipped)
            }
            DragOrigin::Equipment(from) => {
                Ok(exchange_equipment(containers.equipment, from, target))
            }
            DragOrigin::Loot(_) => Ok(DropOutcome::Ignored),
        }
    }

    fn log_outcome(origin: DragOrigin, result: &EconomyResult<DropOutcome>) {
        match result {
            Ok(DropOutcome::Ignored) => {
                tracing::debug!("Drop from {:?} ignored", origin);
            }
            Ok(outcome) => {
                tracing::debug!("Drop from {:?}: {:?}", origin, outcome);
            }
            Err(err) => {
                tracing::warn!("Drop from {:?} denied: {}", origin, err);
            }
        }
    }
}

// ============================================================================
// TRANSACTIONS
// ============================================================================

/// Equips the bag item at `index`.
///
/// Upgrade-category items go to the first empty upgrade slot, or
/// `Upgrade1` when all four are taken; everything else goes to its
/// declared slot. A displaced occupant lands in the slot the new item left,
/// so a successful equip never loses an item, even with a full bag.
///
/// # Errors
///
/// `InvalidSlot` / `SlotEmpty` for a bad source, `MissingTemplate` for an
/// unresolved item, `NotEquippable` and `LevelTooLow` for eligibility
/// failures. Nothing is mutated on error.
pub fn equip_from_bag(
    bag: &mut Bag,
    equipment: &mut EquipmentSet,
    index: usize,
    character: &dyn CharacterLevel,
) -> EconomyResult<EquipReport> {
    if index >= bag.capacity() {
        return Err(EconomyError::InvalidSlot(index));
    }
    let item = bag.item(index).ok_or(EconomyError::SlotEmpty)?;
    let template = item
        .template
        .as_ref()
        .ok_or_else(|| EconomyError::MissingTemplate(item.template_id.clone()))?;
    if !template.equippable {
        return Err(EconomyError::NotEquippable(item.display_name()));
    }

    let current = character.character_level();
    if current < item.required_level {
        tracing::warn!(
            "Cannot equip {}: requires level {}, character is {}",
            item.display_name(),
            item.required_level,
            current
        );
        return Err(EconomyError::LevelTooLow {
            required: item.required_level,
            current,
        });
    }

    let slot = if template.category == ItemCategory::Upgrade {
        equipment
            .first_empty_upgrade_slot()
            .unwrap_or(EquipmentSlot::Upgrade1)
    } else {
        template
            .equip_slot
            .ok_or_else(|| EconomyError::NotEquippable(item.display_name()))?
    };
    if !template.accepts_slot(slot) {
        return Err(EconomyError::NotEquippable(item.display_name()));
    }

    let stack = bag.take_silent(index).ok_or(EconomyError::SlotEmpty)?;
    let previous = equipment.swap(slot, Some(stack.item));
    let displaced = previous.is_some();
    bag.put_silent(index, previous.map(ItemStack::single));
    bag.commit();

    Ok(EquipReport { slot, displaced })
}

/// Moves the item in `slot` into the first empty bag slot.
///
/// # Errors
///
/// `SlotEmpty` if nothing is equipped there, `InventoryFull` if the bag has
/// no room (the item stays equipped).
pub fn unequip_to_bag(bag: &mut Bag, equipment: &mut EquipmentSet, slot: EquipmentSlot) -> EconomyResult<usize> {
    if !equipment.is_occupied(slot) {
        return Err(EconomyError::SlotEmpty);
    }
    if bag.is_full() {
        return Err(EconomyError::InventoryFull {
            capacity: bag.capacity(),
        });
    }

    let item = equipment.unequip(slot).ok_or(EconomyError::SlotEmpty)?;
    match bag.add(item) {
        Ok(index) => Ok(index),
        Err(item) => {
            equipment.swap(slot, Some(item));
            Err(EconomyError::InventoryFull {
                capacity: bag.capacity(),
            })
        }
    }
}

/// Exchanges two equipment slots if the dragged item fits the target.
///
/// Returns [`DropOutcome::Ignored`] for a category mismatch, for an empty
/// origin, or when the target's occupant could not take the origin slot.
pub fn exchange_equipment(equipment: &mut EquipmentSet, from: EquipmentSlot, to: EquipmentSlot) -> DropOutcome {
    if from == to {
        return DropOutcome::Ignored;
    }
    let Some(item) = equipment.get(from) else {
        return DropOutcome::Ignored;
    };
    if !item.fits_slot(to) {
        return DropOutcome::Ignored;
    }
    if equipment.get(to).is_some_and(|occupant| !occupant.fits_slot(from)) {
        return DropOutcome::Ignored;
    }

    equipment.exchange(from, to);
    DropOutcome::SlotsExchanged { from, to }
}

/// Moves the loot item at `index` into the bag.
///
/// # Errors
///
/// `InvalidSlot` / `SlotEmpty` for a bad source, `InventoryFull` when the
/// bag has no room (the item stays in the loot).
pub fn take_loot_item(loot: &mut LootContainer, bag: &mut Bag, index: usize) -> EconomyResult<LootTransfer> {
    if index >= LOOT_CAPACITY {
        return Err(EconomyError::InvalidSlot(index));
    }
    if loot.item(index).is_none() {
        return Err(EconomyError::SlotEmpty);
    }
    if bag.is_full() {
        return Err(EconomyError::InventoryFull {
            capacity: bag.capacity(),
        });
    }

    let item = loot.take_silent(index).ok_or(EconomyError::SlotEmpty)?;
    match bag.add(item) {
        Ok(bag_index) => {
            loot.commit();
            Ok(LootTransfer {
                bag_index,
                depleted: loot.is_empty(),
            })
        }
        Err(item) => {
            loot.put_silent(index, item);
            Err(EconomyError::InventoryFull {
                capacity: bag.capacity(),
            })
        }
    }
}

/// Moves all loot currency into the wallet.
///
/// Returns the amount moved and whether the loot is now empty.
pub fn take_loot_currency(loot: &mut LootContainer, wallet: &mut Wallet) -> (u64, bool) {
    let amount = loot.take_currency();
    wallet.add(amount);
    (amount, loot.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ItemTemplate;
    use crate::events::ChangeTopic;
    use crate::item::{AffixKind, ItemStats, Rarity};
    use std::sync::Arc;
    use std::time::Duration;

    fn weapon(level: u32) -> ItemInstance {
        let template = Arc::new(
            ItemTemplate::new("sword", "Sword", ItemCategory::Equipment)
                .equippable_in(EquipmentSlot::Weapon),
        );
        ItemInstance::fixed(template, level, Rarity::Common, AffixKind::None, ItemStats::default())
    }

    fn chip(level: u32) -> ItemInstance {
        let template = Arc::new(
            ItemTemplate::new("chip", "Chip", ItemCategory::Upgrade)
                .equippable_in(EquipmentSlot::Upgrade1),
        );
        ItemInstance::fixed(template, level, Rarity::Common, AffixKind::None, ItemStats::default())
    }

    fn potion() -> ItemInstance {
        let template = Arc::new(ItemTemplate::new("potion", "Potion", ItemCategory::Consumable));
        ItemInstance::fixed(template, 1, Rarity::Common, AffixKind::None, ItemStats::default())
    }

    #[test]
    fn test_equip_swaps_into_same_bag_slot() {
        let mut bag = Bag::new(2);
        let mut equipment = EquipmentSet::new();
        bag.add(weapon(3)).unwrap();
        bag.add(weapon(7)).unwrap();

        let first = equip_from_bag(&mut bag, &mut equipment, 0, &30_u32).unwrap();
        assert_eq!(first, EquipReport { slot: EquipmentSlot::Weapon, displaced: false });
        assert!(bag.item(0).is_none());

        // bag is full again after this: the old weapon takes slot 1
        let second = equip_from_bag(&mut bag, &mut equipment, 1, &30_u32).unwrap();
        assert!(second.displaced);
        assert_eq!(equipment.get(EquipmentSlot::Weapon).unwrap().item_level, 7);
        assert_eq!(bag.item(1).unwrap().item_level, 3);
        assert_eq!(bag.used_slots(), 1);
    }

    #[test]
    fn test_equip_notifies_each_container_once() {
        let mut bag = Bag::new(1);
        let mut equipment = EquipmentSet::new();
        bag.add(weapon(1)).unwrap();
        let bag_rx = bag.subscribe();
        let eq_rx = equipment.subscribe();

        equip_from_bag(&mut bag, &mut equipment, 0, &1_u32).unwrap();
        assert_eq!(bag_rx.drain(), vec![ChangeTopic::BagChanged]);
        assert_eq!(eq_rx.drain(), vec![ChangeTopic::EquipmentChanged]);
    }

    #[test]
    fn test_equip_level_gate() {
        let mut bag = Bag::new(1);
        let mut equipment = EquipmentSet::new();
        bag.add(weapon(12)).unwrap();

        let err = equip_from_bag(&mut bag, &mut equipment, 0, &9_u32).unwrap_err();
        assert_eq!(err, EconomyError::LevelTooLow { required: 10, current: 9 });
        assert!(bag.is_occupied(0));
        assert_eq!(equipment.equipped_count(), 0);
    }

    #[test]
    fn test_equip_rejects_consumable() {
        let mut bag = Bag::new(1);
        let mut equipment = EquipmentSet::new();
        bag.add(potion()).unwrap();
        assert!(matches!(
            equip_from_bag(&mut bag, &mut equipment, 0, &30_u32),
            Err(EconomyError::NotEquippable(_))
        ));
    }

    #[test]
    fn test_upgrade_goes_to_first_free_then_displaces_first() {
        let mut bag = Bag::new(6);
        let mut equipment = EquipmentSet::new();
        for level in 1..=5 {
            bag.add(chip(level)).unwrap();
        }
        for index in 0..4 {
            let report = equip_from_bag(&mut bag, &mut equipment, index, &30_u32).unwrap();
            assert_eq!(report.slot, EquipmentSlot::UPGRADES[index]);
        }
        let report = equip_from_bag(&mut bag, &mut equipment, 4, &30_u32).unwrap();
        assert_eq!(report.slot, EquipmentSlot::Upgrade1);
        assert!(report.displaced);
        assert_eq!(bag.item(4).unwrap().item_level, 1);
    }

    #[test]
    fn test_unequip_into_full_bag_fails_cleanly() {
        let mut bag = Bag::new(1);
        let mut equipment = EquipmentSet::new();
        equipment.swap(EquipmentSlot::Weapon, Some(weapon(2)));
        bag.add(potion()).unwrap();

        let err = unequip_to_bag(&mut bag, &mut equipment, EquipmentSlot::Weapon).unwrap_err();
        assert_eq!(err, EconomyError::InventoryFull { capacity: 1 });
        assert!(equipment.is_occupied(EquipmentSlot::Weapon));
    }

    #[test]
    fn test_weapon_onto_upgrade_slot_is_ignored() {
        let mut equipment = EquipmentSet::new();
        equipment.swap(EquipmentSlot::Weapon, Some(weapon(2)));
        let rx = equipment.subscribe();

        let outcome = exchange_equipment(&mut equipment, EquipmentSlot::Weapon, EquipmentSlot::Upgrade2);
        assert_eq!(outcome, DropOutcome::Ignored);
        assert!(equipment.is_occupied(EquipmentSlot::Weapon));
        assert_eq!(rx.pending_count(), 0);
    }

    #[test]
    fn test_upgrade_slots_exchange() {
        let mut equipment = EquipmentSet::new();
        equipment.swap(EquipmentSlot::Upgrade1, Some(chip(1)));
        equipment.swap(EquipmentSlot::Upgrade3, Some(chip(3)));

        let outcome = exchange_equipment(&mut equipment, EquipmentSlot::Upgrade1, EquipmentSlot::Upgrade3);
        assert_eq!(
            outcome,
            DropOutcome::SlotsExchanged { from: EquipmentSlot::Upgrade1, to: EquipmentSlot::Upgrade3 }
        );
        assert_eq!(equipment.get(EquipmentSlot::Upgrade1).unwrap().item_level, 3);
        assert_eq!(equipment.get(EquipmentSlot::Upgrade3).unwrap().item_level, 1);
    }

    #[test]
    fn test_begin_drag_requires_item() {
        let mut bag = Bag::new(2);
        let mut equipment = EquipmentSet::new();
        let containers = Containers::new(&mut bag, &mut equipment, &1_u32);
        let mut coordinator = TransferCoordinator::new();

        assert_eq!(
            coordinator.begin_drag(DragOrigin::Bag(0), &containers),
            Err(EconomyError::SlotEmpty)
        );
        assert_eq!(
            coordinator.begin_drag(DragOrigin::Loot(0), &containers),
            Err(EconomyError::SlotEmpty)
        );
        assert!(!coordinator.is_dragging());
    }

    #[test]
    fn test_drag_state_transitions() {
        let mut bag = Bag::new(2);
        let mut equipment = EquipmentSet::new();
        bag.add(potion()).unwrap();
        let mut containers = Containers::new(&mut bag, &mut equipment, &1_u32);
        let mut coordinator = TransferCoordinator::new();

        assert_eq!(coordinator.update_drag(1.0, 1.0), Err(EconomyError::NotDragging));
        coordinator.begin_drag(DragOrigin::Bag(0), &containers).unwrap();
        assert!(coordinator.tooltips_suppressed());
        assert_eq!(
            coordinator.begin_drag(DragOrigin::Bag(0), &containers),
            Err(EconomyError::AlreadyDragging)
        );

        coordinator.update_drag(12.0, 4.5).unwrap();
        assert_eq!(coordinator.ghost_position(), Some((12.0, 4.5)));

        let outcome = coordinator.drop_on_bag(&mut containers, 1).unwrap();
        assert_eq!(outcome, DropOutcome::Moved { from: 0, to: 1 });
        assert_eq!(coordinator.state(), DragState::Idle);
        assert!(coordinator.end_drag(containers.bag).is_none());
        assert!(containers.bag.is_occupied(1));
    }

    #[test]
    fn test_unhandled_bag_drag_offers_destroy() {
        let mut bag = Bag::new(2);
        let mut equipment = EquipmentSet::new();
        bag.add(potion()).unwrap();
        let mut coordinator = TransferCoordinator::new();

        {
            let containers = Containers::new(&mut bag, &mut equipment, &1_u32);
            coordinator.begin_drag(DragOrigin::Bag(0), &containers).unwrap();
        }
        let cancelled = coordinator.end_drag(&bag).unwrap();
        cancelled.cancel();
        assert!(bag.is_occupied(0));

        {
            let containers = Containers::new(&mut bag, &mut equipment, &1_u32);
            coordinator.begin_drag(DragOrigin::Bag(0), &containers).unwrap();
        }
        let confirmation = coordinator.end_drag(&bag).unwrap();
        assert_eq!(confirmation.bag_index(), 0);
        assert!(confirmation.confirm(&mut bag).is_some());
        assert!(!bag.is_occupied(0));
    }

    #[test]
    fn test_unhandled_equipment_drag_just_resets() {
        let mut bag = Bag::new(2);
        let mut equipment = EquipmentSet::new();
        equipment.swap(EquipmentSlot::Weapon, Some(weapon(1)));
        let mut coordinator = TransferCoordinator::new();
        {
            let containers = Containers::new(&mut bag, &mut equipment, &1_u32);
            coordinator
                .begin_drag(DragOrigin::Equipment(EquipmentSlot::Weapon), &containers)
                .unwrap();
        }
        assert!(coordinator.end_drag(&bag).is_none());
        assert!(!coordinator.is_dragging());
        assert!(equipment.is_occupied(EquipmentSlot::Weapon));
    }

    #[test]
    fn test_failed_drop_still_returns_to_idle() {
        let mut bag = Bag::new(1);
        let mut equipment = EquipmentSet::new();
        bag.add(weapon(20)).unwrap();
        let mut containers = Containers::new(&mut bag, &mut equipment, &5_u32);
        let mut coordinator = TransferCoordinator::new();

        coordinator.begin_drag(DragOrigin::Bag(0), &containers).unwrap();
        let err = coordinator
            .drop_on_equipment(&mut containers, EquipmentSlot::Weapon)
            .unwrap_err();
        assert!(matches!(err, EconomyError::LevelTooLow { .. }));
        assert!(!coordinator.is_dragging());
        assert!(coordinator.end_drag(containers.bag).is_none());
        assert!(containers.bag.is_occupied(0));
    }

    #[test]
    fn test_bag_drop_past_capacity_is_ignored() {
        let mut bag = Bag::new(2);
        let mut equipment = EquipmentSet::new();
        bag.add(weapon(4)).unwrap();
        let bag_rx = bag.subscribe();
        let mut containers = Containers::new(&mut bag, &mut equipment, &1_u32);
        let mut coordinator = TransferCoordinator::new();

        coordinator.begin_drag(DragOrigin::Bag(0), &containers).unwrap();
        assert_eq!(coordinator.drop_on_bag(&mut containers, 9), Ok(DropOutcome::Ignored));
        assert!(!coordinator.is_dragging());
        assert!(coordinator.end_drag(containers.bag).is_none());
        assert!(containers.bag.is_occupied(0));
        assert!(bag_rx.drain().is_empty());
    }

    #[test]
    fn test_loot_drop_depletes_container() {
        let mut bag = Bag::new(4);
        let mut equipment = EquipmentSet::new();
        let mut wallet = Wallet::default();
        let mut loot = LootContainer::new(9, vec![potion()], Duration::from_secs(60));
        let loot_rx = loot.subscribe();

        let (amount, depleted) = take_loot_currency(&mut loot, &mut wallet);
        assert_eq!((amount, depleted), (9, false));
        assert_eq!(wallet.amount(), 9);
        assert_eq!(loot_rx.drain(), vec![ChangeTopic::LootChanged]);

        let mut containers = Containers::new(&mut bag, &mut equipment, &1_u32).with_loot(&mut loot);
        let mut coordinator = TransferCoordinator::new();
        coordinator.begin_drag(DragOrigin::Loot(0), &containers).unwrap();
        let outcome = coordinator.drop_on_bag(&mut containers, 3).unwrap();
        assert_eq!(
            outcome,
            DropOutcome::LootTaken(LootTransfer { bag_index: 0, depleted: true })
        );
        assert_eq!(
            loot_rx.drain(),
            vec![ChangeTopic::LootChanged, ChangeTopic::LootDepleted]
        );
    }

    #[test]
    fn test_loot_into_full_bag_keeps_item() {
        let mut bag = Bag::new(1);
        bag.add(potion()).unwrap();
        let mut loot = LootContainer::new(0, vec![weapon(1)], Duration::from_secs(60));

        let err = take_loot_item(&mut loot, &mut bag, 0).unwrap_err();
        assert_eq!(err, EconomyError::InventoryFull { capacity: 1 });
        assert!(loot.item(0).is_some());
    }
}
