//! # Corpse Registry
//!
//! Owns every loot container in the world, keyed by corpse id.
//!
//! A corpse goes away when its lifetime runs out or when it has been
//! looted clean, whichever comes first. Leftover loot on an expired corpse
//! is discarded.

use rand::Rng;
use std::collections::BTreeMap;
use std::time::Duration;

use reliquary_economy::{
    ChangeReceiver, ChangeTopic, ItemGenerator, LootContainer, LootProfile, TemplateResolver,
};

use crate::events::{CorpseId, DespawnReason};

/// A dead NPC's loot.
#[derive(Debug)]
pub struct Corpse {
    /// World position.
    pub position: [f32; 3],
    /// Loot left on the body.
    pub loot: LootContainer,
    changes: ChangeReceiver,
}

/// Everything a registry update reported.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CorpseUpdate {
    /// Corpses whose loot changed since the last update.
    pub changed: Vec<CorpseId>,
    /// Corpses removed this update.
    pub despawned: Vec<(CorpseId, DespawnReason)>,
}

/// All live corpses.
#[derive(Debug)]
pub struct CorpseRegistry {
    corpses: BTreeMap<CorpseId, Corpse>,
    next_id: CorpseId,
    lifetime: Duration,
}

impl CorpseRegistry {
    /// Creates an empty registry whose corpses last `lifetime`.
    #[must_use]
    pub fn new(lifetime: Duration) -> Self {
        Self {
            corpses: BTreeMap::new(),
            next_id: 1,
            lifetime,
        }
    }

    /// Rolls loot for a dead NPC and places the corpse.
    ///
    /// Returns `None` when the roll produced nothing at all; no corpse is
    /// spawned for an empty drop.
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        profile: &LootProfile,
        npc_level: u32,
        position: [f32; 3],
        resolver: &dyn TemplateResolver,
        generator: &ItemGenerator,
        rng: &mut R,
    ) -> Option<CorpseId> {
        let mut loot = LootContainer::spawn(profile, npc_level, resolver, generator, rng, self.lifetime);
        if loot.is_empty() {
            tracing::debug!("NPC with profile {} dropped nothing", profile.id);
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;
        let changes = loot.subscribe();
        self.corpses.insert(
            id,
            Corpse {
                position,
                loot,
                changes,
            },
        );
        tracing::info!("Corpse {} spawned at {:?}", id, position);
        Some(id)
    }

    /// Gets a corpse.
    #[must_use]
    pub fn get(&self, id: CorpseId) -> Option<&Corpse> {
        self.corpses.get(&id)
    }

    /// Gets a corpse's loot for mutation.
    pub fn loot_mut(&mut self, id: CorpseId) -> Option<&mut LootContainer> {
        self.corpses.get_mut(&id).map(|c| &mut c.loot)
    }

    /// Number of live corpses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.corpses.len()
    }

    /// Whether no corpse is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.corpses.is_empty()
    }

    /// Ids of all live corpses.
    pub fn ids(&self) -> impl Iterator<Item = CorpseId> + '_ {
        self.corpses.keys().copied()
    }

    /// Removes a corpse immediately.
    pub fn despawn(&mut self, id: CorpseId) -> Option<Corpse> {
        self.corpses.remove(&id)
    }

    /// Ages every corpse by `elapsed` and removes the expired and the
    /// looted-out ones.
    pub fn update(&mut self, elapsed: Duration) -> CorpseUpdate {
        let mut update = CorpseUpdate::default();

        for (&id, corpse) in &mut self.corpses {
            let mut depleted = false;
            let mut changed = false;
            for topic in corpse.changes.drain() {
                match topic {
                    ChangeTopic::LootChanged => changed = true,
                    ChangeTopic::LootDepleted => depleted = true,
                    _ => {}
                }
            }
            if changed {
                update.changed.push(id);
            }

            if depleted || corpse.loot.is_empty() {
                update.despawned.push((id, DespawnReason::Depleted));
            } else if corpse.loot.tick(elapsed) {
                update.despawned.push((id, DespawnReason::Expired));
            }
        }

        for (id, reason) in &update.despawned {
            self.corpses.remove(id);
            tracing::debug!("Corpse {} despawned: {:?}", id, reason);
        }
        update
    }
}
