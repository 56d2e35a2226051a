//! # Loot Containers
//!
//! **Ephemeral bags dropped by NPCs.**
//!
//! A [`LootProfile`] describes what an NPC can drop; rolling it at the NPC's
//! level yields currency plus up to [`LOOT_CAPACITY`] items. The resulting
//! [`LootContainer`] lives for a fixed lifetime and is discarded when that
//! runs out, whatever is left inside. It is never persisted.
//!
//! ## Profile format
//!
//! ```toml
//! [[loot_profiles]]
//! id = "bandit"
//! currency_per_level = 3
//! currency_min_pct = 80
//! currency_max_pct = 120
//! min_rolls = 0
//! max_rolls = 3
//! drop_chance_bp = 3500      # 35%
//! level_variance = 2
//! templates = ["iron-sword", "lucky-charm"]
//! ```

use rand::Rng;
use serde::Deserialize;
use std::time::Duration;

use crate::catalog::TemplateResolver;
use crate::error::{EconomyError, EconomyResult};
use crate::events::{ChangeReceiver, ChangeSignal, ChangeTopic};
use crate::generator::{ItemGenerator, ItemLevelRules};
use crate::item::ItemInstance;

/// Maximum items in one loot container.
pub const LOOT_CAPACITY: usize = 3;

/// Lifetime used when the configuration does not set one.
pub const DEFAULT_LOOT_LIFETIME: Duration = Duration::from_secs(120);

/// Basis points in 100%.
const BASIS_POINTS: u32 = 10_000;

fn default_min_pct() -> u32 {
    80
}

fn default_max_pct() -> u32 {
    120
}

/// What an NPC can drop.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LootProfile {
    /// Profile id, referenced by NPC definitions.
    pub id: String,
    /// Currency per NPC level before the random multiplier.
    pub currency_per_level: u64,
    /// Lower bound of the currency multiplier, in percent.
    #[serde(default = "default_min_pct")]
    pub currency_min_pct: u32,
    /// Upper bound of the currency multiplier, in percent.
    #[serde(default = "default_max_pct")]
    pub currency_max_pct: u32,
    /// Fewest item rolls.
    #[serde(default)]
    pub min_rolls: u32,
    /// Most item rolls.
    #[serde(default)]
    pub max_rolls: u32,
    /// Chance each roll yields an item, in basis points (10000 = 100%).
    #[serde(default)]
    pub drop_chance_bp: u32,
    /// Item level spread around the NPC level.
    #[serde(default)]
    pub level_variance: u32,
    /// Template ids the rolls pick from.
    #[serde(default)]
    pub templates: Vec<String>,
}

/// Currency and items produced by one profile roll.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LootDrop {
    /// Currency amount.
    pub currency: u64,
    /// Generated items, at most [`LOOT_CAPACITY`].
    pub items: Vec<ItemInstance>,
}

impl LootProfile {
    /// Checks that the ranges in the profile make sense.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` describing the first problem found.
    pub fn validate(&self) -> EconomyResult<()> {
        if self.currency_min_pct > self.currency_max_pct {
            return Err(EconomyError::InvalidConfig(format!(
                "loot profile {}: currency_min_pct {} > currency_max_pct {}",
                self.id, self.currency_min_pct, self.currency_max_pct
            )));
        }
        if self.min_rolls > self.max_rolls {
            return Err(EconomyError::InvalidConfig(format!(
                "loot profile {}: min_rolls {} > max_rolls {}",
                self.id, self.min_rolls, self.max_rolls
            )));
        }
        if self.drop_chance_bp > BASIS_POINTS {
            return Err(EconomyError::InvalidConfig(format!(
                "loot profile {}: drop_chance_bp {} exceeds {}",
                self.id, self.drop_chance_bp, BASIS_POINTS
            )));
        }
        Ok(())
    }

    /// Rolls currency and items for an NPC of `npc_level`.
    ///
    /// Template ids that do not resolve are skipped with a warning.
    pub fn roll<R: Rng + ?Sized>(
        &self,
        npc_level: u32,
        resolver: &dyn TemplateResolver,
        generator: &ItemGenerator,
        rng: &mut R,
    ) -> LootDrop {
        let npc_level = ItemLevelRules::clamp(npc_level);

        let pct = rng.gen_range(self.currency_min_pct..=self.currency_max_pct.max(self.currency_min_pct));
        let currency = self
            .currency_per_level
            .saturating_mul(u64::from(npc_level))
            .saturating_mul(u64::from(pct))
            / 100;

        let mut items = Vec::with_capacity(LOOT_CAPACITY);
        let rolls = rng.gen_range(self.min_rolls..=self.max_rolls.max(self.min_rolls));

        for _ in 0..rolls {
            if items.len() == LOOT_CAPACITY || self.templates.is_empty() {
                break;
            }
            if rng.gen_range(0..BASIS_POINTS) >= self.drop_chance_bp {
                continue;
            }

            let template_id = &self.templates[rng.gen_range(0..self.templates.len())];
            let Some(template) = resolver.resolve(template_id) else {
                tracing::warn!(
                    "Loot profile {} references unknown template {}",
                    self.id,
                    template_id
                );
                continue;
            };

            let low = npc_level.saturating_sub(self.level_variance);
            let high = npc_level.saturating_add(self.level_variance);
            let item_level = ItemLevelRules::clamp(rng.gen_range(low..=high));
            items.push(generator.roll(&template, item_level, rng));
        }

        LootDrop { currency, items }
    }
}

/// A corpse's loot: currency plus up to three items.
#[derive(Clone, Debug)]
pub struct LootContainer {
    currency: u64,
    items: [Option<ItemInstance>; LOOT_CAPACITY],
    lifetime: Duration,
    age: Duration,
    signal: ChangeSignal,
}

impl LootContainer {
    /// Creates a container; items beyond [`LOOT_CAPACITY`] are discarded.
    #[must_use]
    pub fn new(currency: u64, items: Vec<ItemInstance>, lifetime: Duration) -> Self {
        let mut slots: [Option<ItemInstance>; LOOT_CAPACITY] = Default::default();
        for (slot, item) in slots.iter_mut().zip(items) {
            *slot = Some(item);
        }
        Self {
            currency,
            items: slots,
            lifetime,
            age: Duration::ZERO,
            signal: ChangeSignal::new(),
        }
    }

    /// Rolls `profile` at `npc_level` and wraps the result.
    pub fn spawn<R: Rng + ?Sized>(
        profile: &LootProfile,
        npc_level: u32,
        resolver: &dyn TemplateResolver,
        generator: &ItemGenerator,
        rng: &mut R,
        lifetime: Duration,
    ) -> Self {
        let drop = profile.roll(npc_level, resolver, generator, rng);
        tracing::debug!(
            "Spawned loot from {}: {} currency, {} items",
            profile.id,
            drop.currency,
            drop.items.len()
        );
        Self::new(drop.currency, drop.items, lifetime)
    }

    /// Subscribes to [`ChangeTopic::LootChanged`] and
    /// [`ChangeTopic::LootDepleted`].
    pub fn subscribe(&mut self) -> ChangeReceiver {
        self.signal.subscribe()
    }

    /// Currency still inside.
    #[inline]
    #[must_use]
    pub const fn currency(&self) -> u64 {
        self.currency
    }

    /// Item at `index`, if any.
    #[inline]
    #[must_use]
    pub fn item(&self, index: usize) -> Option<&ItemInstance> {
        self.items.get(index).and_then(Option::as_ref)
    }

    /// All item slots.
    #[must_use]
    pub fn items(&self) -> &[Option<ItemInstance>] {
        &self.items
    }

    /// Number of items still inside.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_some()).count()
    }

    /// Empty of both currency and items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.currency == 0 && self.item_count() == 0
    }

    /// Removes and returns the item at `index`.
    pub fn take_item(&mut self, index: usize) -> Option<ItemInstance> {
        let item = self.take_silent(index)?;
        self.commit();
        Some(item)
    }

    /// Removes and returns all the currency.
    pub fn take_currency(&mut self) -> u64 {
        let amount = std::mem::take(&mut self.currency);
        if amount > 0 {
            self.commit();
        }
        amount
    }

    /// Advances the container's age. Returns whether it has expired.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        self.age = self.age.saturating_add(elapsed);
        self.is_expired()
    }

    /// Whether the lifetime has run out.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.age >= self.lifetime
    }

    /// Time left before expiry.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.lifetime.saturating_sub(self.age)
    }

    pub(crate) fn take_silent(&mut self, index: usize) -> Option<ItemInstance> {
        self.items.get_mut(index)?.take()
    }

    pub(crate) fn put_silent(&mut self, index: usize, item: ItemInstance) {
        if let Some(slot) = self.items.get_mut(index) {
            *slot = Some(item);
        }
    }

    /// Emits `LootChanged`, then `LootDepleted` if nothing is left.
    pub(crate) fn commit(&mut self) {
        self.signal.emit(ChangeTopic::LootChanged);
        if self.is_empty() {
            self.signal.emit(ChangeTopic::LootDepleted);
        }
    }
}
