//! # Item Generator
//!
//! **Pure function from (template, level, rng) to a concrete item.**
//!
//! ## Pipeline
//!
//! ```text
//! requested level ──> ItemLevelRules (clamp 1..=30, required level)
//!                          │
//!                          ▼
//!                    RarityDropTable (weighted, level-gated)
//!                          │
//!                          ▼
//!                    AffixRoller (affix pick, budget split, rarity modifier)
//!                          │
//!                          ▼
//!                    PriceCalculator (integer tenths, floor 1)
//! ```
//!
//! ## Determinism
//!
//! All randomness comes from the caller's RNG. Feed the same seeded
//! `ChaCha8Rng` and the same item comes out.

use rand::Rng;
use serde::Deserialize;
use std::sync::Arc;

use crate::catalog::ItemTemplate;
use crate::item::{
    AffixAllocation, AffixKind, ItemInstance, ItemStats, Rarity, Stat, MAX_ITEM_LEVEL,
    MIN_ITEM_LEVEL,
};

// =============================================================================
// Level rules
// =============================================================================

/// Item level clamping and the required-level step function.
pub struct ItemLevelRules;

impl ItemLevelRules {
    /// Clamps a requested level into `[1, 30]`.
    #[inline]
    #[must_use]
    pub fn clamp(level: u32) -> u32 {
        level.clamp(MIN_ITEM_LEVEL, MAX_ITEM_LEVEL)
    }

    /// Character level needed to equip an item of `item_level`.
    ///
    /// | item level | required |
    /// |-----------:|---------:|
    /// |     1..=4  |        1 |
    /// |     5..=9  |        5 |
    /// |    10..=14 |       10 |
    /// |    15..=19 |       15 |
    /// |    20..    |       30 |
    #[inline]
    #[must_use]
    pub const fn required_level(item_level: u32) -> u32 {
        match item_level {
            0..=4 => 1,
            5..=9 => 5,
            10..=14 => 10,
            15..=19 => 15,
            _ => 30,
        }
    }
}

// =============================================================================
// Rarity drop table
// =============================================================================

/// Minimum item level at which each rarity can drop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RarityGates {
    /// Gate for Poor.
    pub poor: u32,
    /// Gate for Common.
    pub common: u32,
    /// Gate for Uncommon.
    pub uncommon: u32,
    /// Gate for Rare.
    pub rare: u32,
    /// Gate for Epic.
    pub epic: u32,
    /// Gate for Legendary.
    pub legendary: u32,
}

impl RarityGates {
    /// Gate for one rarity.
    #[must_use]
    pub const fn gate(&self, rarity: Rarity) -> u32 {
        match rarity {
            Rarity::Poor => self.poor,
            Rarity::Common => self.common,
            Rarity::Uncommon => self.uncommon,
            Rarity::Rare => self.rare,
            Rarity::Epic => self.epic,
            Rarity::Legendary => self.legendary,
        }
    }
}

impl Default for RarityGates {
    fn default() -> Self {
        Self {
            poor: 1,
            common: 1,
            uncommon: 3,
            rare: 8,
            epic: 15,
            legendary: 22,
        }
    }
}

/// Weighted, level-gated rarity sampling.
///
/// Weights interpolate linearly over `t = level / 30`:
///
/// | rarity    | weight              |
/// |-----------|---------------------|
/// | Poor      | `25 * (1 - 0.6t)`   |
/// | Common    | `55 * (1 - 0.3t)`   |
/// | Uncommon  | `15 * (0.5 + 0.5t)` |
/// | Rare      | `4 * (0.3 + 1.7t)`  |
/// | Epic      | `0.9 * (0.1 + 3t)`  |
/// | Legendary | `0.1 * (0.05 + 4t)` |
#[derive(Clone, Debug, Default)]
pub struct RarityDropTable {
    gates: RarityGates,
}

impl RarityDropTable {
    /// Creates a table with the given gates.
    #[must_use]
    pub const fn new(gates: RarityGates) -> Self {
        Self { gates }
    }

    /// The configured gates.
    #[must_use]
    pub const fn gates(&self) -> &RarityGates {
        &self.gates
    }

    /// Ungated weight of `rarity` at `item_level`.
    #[must_use]
    pub fn base_weight(rarity: Rarity, item_level: u32) -> f64 {
        let t = (f64::from(item_level) / f64::from(MAX_ITEM_LEVEL)).clamp(0.0, 1.0);
        match rarity {
            Rarity::Poor => 25.0 * (1.0 - 0.6 * t),
            Rarity::Common => 55.0 * (1.0 - 0.3 * t),
            Rarity::Uncommon => 15.0 * (0.5 + 0.5 * t),
            Rarity::Rare => 4.0 * (0.3 + 1.7 * t),
            Rarity::Epic => 0.9 * (0.1 + 3.0 * t),
            Rarity::Legendary => 0.1 * (0.05 + 4.0 * t),
        }
    }

    /// Effective weight: zero when the gate is above `item_level`.
    #[must_use]
    pub fn weight(&self, rarity: Rarity, item_level: u32) -> f64 {
        if self.gates.gate(rarity) > item_level {
            0.0
        } else {
            Self::base_weight(rarity, item_level)
        }
    }

    /// Effective weights in table order (Poor..Legendary).
    #[must_use]
    pub fn weights(&self, item_level: u32) -> [f64; 6] {
        Rarity::ALL.map(|r| self.weight(r, item_level))
    }

    /// Draws a rarity for `item_level`.
    ///
    /// Falls back to Common when every tier is gated out.
    pub fn sample<R: Rng + ?Sized>(&self, item_level: u32, rng: &mut R) -> Rarity {
        let weights = self.weights(item_level);
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Rarity::Common;
        }

        let roll = rng.gen::<f64>() * total;
        let mut cumulative = 0.0;
        for (rarity, weight) in Rarity::ALL.into_iter().zip(weights) {
            cumulative += weight;
            if roll < cumulative {
                return rarity;
            }
        }

        // Float rounding can leave roll == total; land on the last open tier.
        Rarity::ALL
            .into_iter()
            .zip(weights)
            .rev()
            .find(|(_, w)| *w > 0.0)
            .map_or(Rarity::Common, |(r, _)| r)
    }
}

// =============================================================================
// Affix roller
// =============================================================================

/// Affix selection, stat budgeting, and rarity modifiers.
pub struct AffixRoller;

impl AffixRoller {
    /// Picks an affix uniformly from `allowed`, or `None` if it is empty.
    pub fn choose_affix<R: Rng + ?Sized>(allowed: &[AffixKind], rng: &mut R) -> AffixKind {
        if allowed.is_empty() {
            AffixKind::None
        } else {
            allowed[rng.gen_range(0..allowed.len())]
        }
    }

    /// Spends `budget` stat points according to `affix`.
    ///
    /// Dual-stat affixes split at a point uniform in `[1, budget - 1]`.
    /// With a budget below 2 there is no valid split, so the whole budget
    /// goes to the affix's first stat.
    pub fn allocate<R: Rng + ?Sized>(
        stats: &mut ItemStats,
        affix: AffixKind,
        budget: i32,
        rng: &mut R,
    ) {
        match affix.allocation() {
            AffixAllocation::Neutral => {}
            AffixAllocation::Single(stat) => *stats.get_mut(stat) += budget,
            AffixAllocation::Dual(first, _) if budget < 2 => *stats.get_mut(first) += budget,
            AffixAllocation::Dual(first, second) => {
                let split = rng.gen_range(1..budget);
                *stats.get_mut(first) += split;
                *stats.get_mut(second) += budget - split;
            }
        }
    }

    /// Applies the rarity modifier to the stats that are currently above 0.
    pub fn apply_rarity<R: Rng + ?Sized>(stats: &mut ItemStats, rarity: Rarity, rng: &mut R) {
        let present = stats.present();
        if present.is_empty() {
            return;
        }

        match rarity {
            Rarity::Poor => {
                Self::bump_random(stats, &present, -1, rng);
                stats.muscles = stats.muscles.max(0);
                stats.intellect = stats.intellect.max(0);
                stats.crit = stats.crit.max(0);
                stats.toughness = stats.toughness.max(0);
            }
            Rarity::Common => {}
            Rarity::Uncommon => Self::bump_random(stats, &present, 1, rng),
            Rarity::Rare => Self::bump_random(stats, &present, 2, rng),
            Rarity::Epic => Self::bump_random(stats, &present, 3, rng),
            Rarity::Legendary => {
                for &stat in &present {
                    *stats.get_mut(stat) += 4;
                }
            }
        }
    }

    fn bump_random<R: Rng + ?Sized>(
        stats: &mut ItemStats,
        present: &[Stat],
        delta: i32,
        rng: &mut R,
    ) {
        let stat = present[rng.gen_range(0..present.len())];
        *stats.get_mut(stat) += delta;
    }
}

// =============================================================================
// Price calculator
// =============================================================================

/// Item value from level and rarity.
pub struct PriceCalculator;

impl PriceCalculator {
    /// `max(1, round(10 * level * multiplier))`.
    ///
    /// Multipliers are held in tenths, so `10 * level * m` is exactly
    /// `level * tenths` and no rounding is ever needed.
    #[inline]
    #[must_use]
    pub const fn value(item_level: u32, rarity: Rarity) -> u64 {
        let value = item_level as u64 * rarity.value_multiplier_tenths();
        if value == 0 {
            1
        } else {
            value
        }
    }
}

// =============================================================================
// Generator
// =============================================================================

/// Rolls concrete items from templates.
#[derive(Clone, Debug, Default)]
pub struct ItemGenerator {
    drop_table: RarityDropTable,
}

impl ItemGenerator {
    /// Creates a generator around a drop table.
    #[must_use]
    pub const fn new(drop_table: RarityDropTable) -> Self {
        Self { drop_table }
    }

    /// The rarity drop table in use.
    #[must_use]
    pub const fn drop_table(&self) -> &RarityDropTable {
        &self.drop_table
    }

    /// Rolls an item of `template` at `requested_level`.
    pub fn roll<R: Rng + ?Sized>(
        &self,
        template: &Arc<ItemTemplate>,
        requested_level: u32,
        rng: &mut R,
    ) -> ItemInstance {
        let item_level = ItemLevelRules::clamp(requested_level);
        let required_level = ItemLevelRules::required_level(item_level);
        let rarity = self.drop_table.sample(item_level, rng);

        // item_level <= 30, the conversion cannot fail.
        let budget = i32::try_from(item_level).unwrap_or(i32::MAX);
        let mut stats = ItemStats {
            toughness: budget,
            ..ItemStats::default()
        };

        let affix = AffixRoller::choose_affix(&template.allowed_affixes, rng);
        AffixRoller::allocate(&mut stats, affix, budget, rng);
        AffixRoller::apply_rarity(&mut stats, rarity, rng);

        let item = ItemInstance {
            template: Some(Arc::clone(template)),
            template_id: template.id.clone(),
            item_level,
            required_level,
            rarity,
            affix,
            stats,
            value: PriceCalculator::value(item_level, rarity),
        };
        tracing::debug!(
            "Rolled {} (lvl {}, {}) worth {}",
            item.display_name(),
            item_level,
            rarity.name(),
            item.value
        );
        item
    }
}
