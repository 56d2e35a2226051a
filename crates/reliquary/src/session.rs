//! # Game Session
//!
//! Explicit wiring of one player's economy: catalog, generator, world RNG,
//! player containers, corpses and the transfer coordinator. Nothing here is
//! global; the host constructs a session and calls into it from its input
//! and frame handlers.
//!
//! ```text
//!  input ──> begin_drag / update_drag / drop_on_* / end_drag
//!                              │
//!                              ▼
//!                   TransferCoordinator ──> bag, equipment, open loot
//!                              │
//!                  ChangeTopic │ (per container)
//!                              ▼
//!                       forward_changes ──> EventSender ──> UI
//!
//!  frame ──> update(dt) ──> CorpseRegistry (expiry, depletion)
//! ```

use rand_chacha::ChaCha8Rng;
use std::path::Path;
use std::time::Duration;

use reliquary_economy::{
    Catalog, ChangeReceiver, Containers, DestroyConfirmation, DragOrigin, DropOutcome,
    EconomyConfig, EconomyError, EquipmentSlot, ItemGenerator, ItemInstance, TransferCoordinator,
};

use crate::corpses::{CorpseRegistry, CorpseUpdate};
use crate::error::{GameError, GameResult};
use crate::events::{CorpseId, DespawnReason, EventSender, GameEvent};
use crate::player::PlayerInventory;

/// One player's running economy.
pub struct GameSession {
    catalog: Catalog,
    config: EconomyConfig,
    generator: ItemGenerator,
    rng: ChaCha8Rng,
    player: PlayerInventory,
    corpses: CorpseRegistry,
    coordinator: TransferCoordinator,
    open_corpse: Option<CorpseId>,
    pending_destroy: Option<DestroyConfirmation>,
    events: EventSender,
    bag_changes: ChangeReceiver,
    equipment_changes: ChangeReceiver,
    wallet_changes: ChangeReceiver,
}

impl GameSession {
    /// Creates a session for a fresh character at `level`.
    #[must_use]
    pub fn new(catalog: Catalog, config: EconomyConfig, level: u32, events: EventSender) -> Self {
        let mut player = PlayerInventory::new(config.bag_capacity, level);
        let bag_changes = player.bag.subscribe();
        let equipment_changes = player.equipment.subscribe();
        let wallet_changes = player.wallet.subscribe();

        tracing::info!(
            "Session started: {} templates, seed {}",
            catalog.len(),
            config.rng_seed
        );

        Self {
            generator: config.generator(),
            rng: config.rng(),
            corpses: CorpseRegistry::new(config.loot_lifetime()),
            catalog,
            config,
            player,
            coordinator: TransferCoordinator::new(),
            open_corpse: None,
            pending_destroy: None,
            events,
            bag_changes,
            equipment_changes,
            wallet_changes,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The item catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The economy configuration.
    #[must_use]
    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    /// The player's containers.
    #[must_use]
    pub fn player(&self) -> &PlayerInventory {
        &self.player
    }

    /// Live corpses.
    #[must_use]
    pub fn corpses(&self) -> &CorpseRegistry {
        &self.corpses
    }

    /// The drag/drop state machine.
    #[must_use]
    pub fn coordinator(&self) -> &TransferCoordinator {
        &self.coordinator
    }

    /// Corpse whose loot window is open.
    #[must_use]
    pub fn open_corpse(&self) -> Option<CorpseId> {
        self.open_corpse
    }

    /// Bag slot awaiting a destroy confirmation.
    #[must_use]
    pub fn pending_destroy(&self) -> Option<usize> {
        self.pending_destroy.as_ref().map(DestroyConfirmation::bag_index)
    }

    /// Sets the character level.
    pub fn set_level(&mut self, level: u32) {
        self.player.set_level(level);
    }

    // =========================================================================
    // Rewards
    // =========================================================================

    /// Rolls an item of `template_id` at `level` straight into the bag.
    ///
    /// # Errors
    ///
    /// `UnknownTemplate` if the id is not in the catalog, `InventoryFull`
    /// if the bag has no room (the rolled item is discarded).
    pub fn grant_item(&mut self, template_id: &str, level: u32) -> GameResult<usize> {
        let template = self
            .catalog
            .get(template_id)
            .ok_or_else(|| EconomyError::UnknownTemplate(template_id.to_string()))?;
        let item = self.generator.roll(template, level, &mut self.rng);
        let result = self.player.bag.add(item).map_err(|_| {
            GameError::from(EconomyError::InventoryFull {
                capacity: self.player.bag.capacity(),
            })
        });
        self.forward_changes();
        result
    }

    /// Adds currency to the wallet. Returns the new balance.
    pub fn grant_currency(&mut self, amount: u64) -> u64 {
        let balance = self.player.wallet.add(amount);
        self.forward_changes();
        balance
    }

    /// Spends currency. Returns the new balance.
    ///
    /// # Errors
    ///
    /// `InsufficientFunds` when the wallet cannot cover `amount`.
    pub fn spend(&mut self, amount: u64) -> GameResult<u64> {
        let result = self.player.wallet.try_spend(amount).map_err(GameError::from);
        self.forward_changes();
        result
    }

    // =========================================================================
    // Corpses
    // =========================================================================

    /// Spawns a corpse for an NPC killed at `position`.
    ///
    /// Returns `None` if the NPC dropped nothing.
    ///
    /// # Errors
    ///
    /// `UnknownLootProfile` if `profile_id` is not configured.
    pub fn npc_killed(
        &mut self,
        profile_id: &str,
        npc_level: u32,
        position: [f32; 3],
    ) -> GameResult<Option<CorpseId>> {
        let profile = self
            .config
            .loot_profile(profile_id)
            .ok_or_else(|| GameError::UnknownLootProfile(profile_id.to_string()))?;

        let Some(id) = self.corpses.spawn(
            profile,
            npc_level,
            position,
            &self.catalog,
            &self.generator,
            &mut self.rng,
        ) else {
            return Ok(None);
        };

        if let Some(corpse) = self.corpses.get(id) {
            self.events.send(GameEvent::CorpseSpawned {
                corpse: id,
                position,
                currency: corpse.loot.currency(),
                items: corpse.loot.item_count(),
            });
        }
        Ok(Some(id))
    }

    /// Opens the loot window of a corpse.
    ///
    /// # Errors
    ///
    /// `UnknownCorpse` if it does not exist.
    pub fn open_loot(&mut self, corpse: CorpseId) -> GameResult<()> {
        if self.corpses.get(corpse).is_none() {
            return Err(GameError::UnknownCorpse(corpse));
        }
        self.close_loot();
        self.open_corpse = Some(corpse);
        Ok(())
    }

    /// Closes the loot window, abandoning any drag that started in it.
    pub fn close_loot(&mut self) {
        if matches!(self.coordinator.origin(), Some(DragOrigin::Loot(_))) {
            self.coordinator.cancel_drag();
        }
        self.open_corpse = None;
    }

    /// Moves a corpse's currency into the wallet.
    ///
    /// A corpse left empty is despawned on the spot.
    ///
    /// # Errors
    ///
    /// `UnknownCorpse` if it does not exist.
    pub fn collect_gold(&mut self, corpse: CorpseId) -> GameResult<u64> {
        let loot = self
            .corpses
            .loot_mut(corpse)
            .ok_or(GameError::UnknownCorpse(corpse))?;
        let (amount, depleted) = reliquary_economy::transfer::take_loot_currency(loot, &mut self.player.wallet);
        self.forward_changes();
        if depleted {
            self.despawn_depleted(corpse);
        }
        Ok(amount)
    }

    /// Advances corpse lifetimes and reports loot changes and despawns.
    pub fn update(&mut self, elapsed: Duration) -> CorpseUpdate {
        let update = self.corpses.update(elapsed);

        for &corpse in &update.changed {
            self.events.send(GameEvent::LootChanged { corpse });
        }
        for &(corpse, reason) in &update.despawned {
            if self.open_corpse == Some(corpse) {
                self.close_loot();
            }
            self.events.send(GameEvent::CorpseDespawned { corpse, reason });
        }
        update
    }

    // =========================================================================
    // Drag and drop
    // =========================================================================

    /// Starts dragging the item at `origin`.
    ///
    /// Loot origins refer to the open loot window.
    ///
    /// # Errors
    ///
    /// As [`TransferCoordinator::begin_drag`].
    pub fn begin_drag(&mut self, origin: DragOrigin) -> GameResult<()> {
        Ok(self.with_containers(|coordinator, containers| {
            coordinator.begin_drag(origin, containers)
        })?)
    }

    /// Moves the drag ghost.
    ///
    /// # Errors
    ///
    /// `NotDragging` when idle.
    pub fn update_drag(&mut self, x: f32, y: f32) -> GameResult<()> {
        Ok(self.coordinator.update_drag(x, y)?)
    }

    /// Drops onto a bag slot.
    ///
    /// # Errors
    ///
    /// As [`TransferCoordinator::drop_on_bag`].
    pub fn drop_on_bag(&mut self, index: usize) -> GameResult<DropOutcome> {
        let result = self.with_containers(|coordinator, containers| {
            coordinator.drop_on_bag(containers, index)
        });
        self.finish_drop(result)
    }

    /// Drops onto an equipment slot.
    ///
    /// # Errors
    ///
    /// As [`TransferCoordinator::drop_on_equipment`].
    pub fn drop_on_equipment(&mut self, slot: EquipmentSlot) -> GameResult<DropOutcome> {
        let result = self.with_containers(|coordinator, containers| {
            coordinator.drop_on_equipment(containers, slot)
        });
        self.finish_drop(result)
    }

    /// Releases the pointer. Returns whether a destroy confirmation is now
    /// pending; a previous unanswered one is cancelled.
    pub fn end_drag(&mut self) -> bool {
        if let Some(previous) = self.pending_destroy.take() {
            previous.cancel();
        }

        let Some(confirmation) = self.coordinator.end_drag(&self.player.bag) else {
            return false;
        };
        let bag_index = confirmation.bag_index();
        let name = self
            .player
            .bag
            .item(bag_index)
            .map(ItemInstance::display_name)
            .unwrap_or_default();
        self.events.send(GameEvent::DestroyRequested { bag_index, name });
        self.pending_destroy = Some(confirmation);
        true
    }

    /// Confirms the pending destroy.
    pub fn confirm_destroy(&mut self) -> Option<ItemInstance> {
        let confirmation = self.pending_destroy.take()?;
        let destroyed = confirmation.confirm(&mut self.player.bag);
        if let Some(item) = &destroyed {
            self.events.send(GameEvent::ItemDestroyed {
                name: item.display_name(),
            });
        }
        self.forward_changes();
        destroyed
    }

    /// Cancels the pending destroy.
    pub fn cancel_destroy(&mut self) {
        if let Some(confirmation) = self.pending_destroy.take() {
            confirmation.cancel();
        }
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Writes the player's save file.
    ///
    /// # Errors
    ///
    /// `Serialization` or `Io`.
    pub fn save(&self, path: impl AsRef<Path>) -> GameResult<()> {
        self.player.save_to_file(path)?;
        self.events.send(GameEvent::GameSaved);
        Ok(())
    }

    /// Restores the player from a save file.
    ///
    /// Any drag or pending confirmation is abandoned first.
    ///
    /// # Errors
    ///
    /// As [`PlayerInventory::load_from_file`].
    pub fn load(&mut self, path: impl AsRef<Path>) -> GameResult<()> {
        self.coordinator.cancel_drag();
        self.cancel_destroy();
        self.player.load_from_file(path, &self.catalog)?;
        self.forward_changes();
        self.events.send(GameEvent::GameLoaded);
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn with_containers<T>(
        &mut self,
        f: impl FnOnce(&mut TransferCoordinator, &mut Containers<'_>) -> T,
    ) -> T {
        let loot = match self.open_corpse {
            Some(id) => self.corpses.loot_mut(id),
            None => None,
        };
        let mut containers = self.player.containers();
        if let Some(loot) = loot {
            containers = containers.with_loot(loot);
        }
        f(&mut self.coordinator, &mut containers)
    }

    fn finish_drop(&mut self, result: Result<DropOutcome, EconomyError>) -> GameResult<DropOutcome> {
        let looted = self.open_corpse;
        match &result {
            Ok(DropOutcome::Equipped(report)) => {
                let name = self
                    .player
                    .equipment
                    .get(report.slot)
                    .map(ItemInstance::display_name)
                    .unwrap_or_default();
                self.events.send(GameEvent::ItemEquipped {
                    slot: report.slot,
                    name,
                });
            }
            Err(err @ (EconomyError::LevelTooLow { .. } | EconomyError::NotEquippable(_))) => {
                self.events.send(GameEvent::EquipDenied {
                    reason: err.to_string(),
                });
            }
            _ => {}
        }
        self.forward_changes();
        if let (Ok(DropOutcome::LootTaken(transfer)), Some(corpse)) = (&result, looted) {
            if transfer.depleted {
                self.despawn_depleted(corpse);
            }
        }
        Ok(result?)
    }

    /// Removes a looted-out corpse right away instead of waiting for `update`.
    fn despawn_depleted(&mut self, corpse: CorpseId) {
        if self.open_corpse == Some(corpse) {
            self.close_loot();
        }
        if self.corpses.despawn(corpse).is_some() {
            self.events.send(GameEvent::LootChanged { corpse });
            self.events.send(GameEvent::CorpseDespawned {
                corpse,
                reason: DespawnReason::Depleted,
            });
        }
    }

    /// Collapses pending container notifications into one event each.
    fn forward_changes(&mut self) {
        if !self.bag_changes.drain().is_empty() {
            self.events.send(GameEvent::BagChanged {
                used_slots: self.player.bag.used_slots(),
                capacity: self.player.bag.capacity(),
            });
        }
        if !self.equipment_changes.drain().is_empty() {
            self.events.send(GameEvent::EquipmentChanged {
                totals: self.player.stat_totals(),
            });
        }
        if !self.wallet_changes.drain().is_empty() {
            self.events.send(GameEvent::WalletChanged {
                balance: self.player.wallet.amount(),
            });
        }
    }
}
