//! # Item Instances
//!
//! A concrete, rolled item. Produced once by the generator (or by
//! [`ItemInstance::fixed`] for scripted items) and then moved, never copied,
//! between container slots.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::catalog::{ItemCategory, ItemTemplate};
use crate::equipment::EquipmentSlot;

/// Lowest item level.
pub const MIN_ITEM_LEVEL: u32 = 1;

/// Highest item level.
pub const MAX_ITEM_LEVEL: u32 = 30;

/// Rarity tier for items.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Rarity {
    /// Poor items (gray) - one stat point worse.
    Poor = 0,
    /// Common items (white).
    #[default]
    Common = 1,
    /// Uncommon items (green).
    Uncommon = 2,
    /// Rare items (blue).
    Rare = 3,
    /// Epic items (purple).
    Epic = 4,
    /// Legendary items (orange) - every stat boosted.
    Legendary = 5,
}

impl Rarity {
    /// All tiers in drop-table order.
    pub const ALL: [Self; 6] = [
        Self::Poor,
        Self::Common,
        Self::Uncommon,
        Self::Rare,
        Self::Epic,
        Self::Legendary,
    ];

    /// Value multiplier in tenths (Poor 0.5 = 5, Legendary 20.0 = 200).
    #[inline]
    #[must_use]
    pub const fn value_multiplier_tenths(self) -> u64 {
        match self {
            Self::Poor => 5,
            Self::Common => 10,
            Self::Uncommon => 15,
            Self::Rare => 30,
            Self::Epic => 70,
            Self::Legendary => 200,
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Poor => "Poor",
            Self::Common => "Common",
            Self::Uncommon => "Uncommon",
            Self::Rare => "Rare",
            Self::Epic => "Epic",
            Self::Legendary => "Legendary",
        }
    }
}

/// One of the four rolled stat fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stat {
    /// Strength.
    Muscles,
    /// Spell power.
    Intellect,
    /// Critical chance, in percentage points.
    Crit,
    /// Always equal to item level before rarity modifiers.
    Toughness,
}

impl Stat {
    /// All stats in field order.
    pub const ALL: [Self; 4] = [Self::Muscles, Self::Intellect, Self::Crit, Self::Toughness];
}

/// How an affix spends the stat budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AffixAllocation {
    /// No budget is spent.
    Neutral,
    /// Whole budget to one stat.
    Single(Stat),
    /// Budget split between two stats, both at least 1.
    Dual(Stat, Stat),
}

/// Named stat-budget allocation rule rolled onto an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AffixKind {
    /// No affix.
    #[default]
    None,
    /// Muscles.
    Athlete,
    /// Intellect.
    Scholar,
    /// Crit.
    Assassin,
    /// Muscles + crit.
    Champion,
    /// Intellect + crit.
    Sorcerer,
    /// Muscles + intellect.
    Paragon,
}

impl AffixKind {
    /// Stat allocation rule for this affix.
    #[must_use]
    pub const fn allocation(self) -> AffixAllocation {
        match self {
            Self::None => AffixAllocation::Neutral,
            Self::Athlete => AffixAllocation::Single(Stat::Muscles),
            Self::Scholar => AffixAllocation::Single(Stat::Intellect),
            Self::Assassin => AffixAllocation::Single(Stat::Crit),
            Self::Champion => AffixAllocation::Dual(Stat::Muscles, Stat::Crit),
            Self::Sorcerer => AffixAllocation::Dual(Stat::Intellect, Stat::Crit),
            Self::Paragon => AffixAllocation::Dual(Stat::Muscles, Stat::Intellect),
        }
    }

    /// Name suffix appended to the template's base name.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Athlete => " of the Athlete",
            Self::Scholar => " of the Scholar",
            Self::Assassin => " of the Assassin",
            Self::Champion => " of the Champion",
            Self::Sorcerer => " of the Sorcerer",
            Self::Paragon => " of the Paragon",
        }
    }
}

/// The four integer stat bonuses of an item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStats {
    /// Strength bonus.
    pub muscles: i32,
    /// Intellect bonus.
    pub intellect: i32,
    /// Crit bonus in percentage points.
    pub crit: i32,
    /// Toughness bonus.
    pub toughness: i32,
}

impl ItemStats {
    /// Reads one stat.
    #[inline]
    #[must_use]
    pub const fn get(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Muscles => self.muscles,
            Stat::Intellect => self.intellect,
            Stat::Crit => self.crit,
            Stat::Toughness => self.toughness,
        }
    }

    /// Mutable access to one stat.
    #[inline]
    pub fn get_mut(&mut self, stat: Stat) -> &mut i32 {
        match stat {
            Stat::Muscles => &mut self.muscles,
            Stat::Intellect => &mut self.intellect,
            Stat::Crit => &mut self.crit,
            Stat::Toughness => &mut self.toughness,
        }
    }

    /// Stats currently above zero, in field order.
    #[must_use]
    pub fn present(&self) -> Vec<Stat> {
        Stat::ALL.into_iter().filter(|&s| self.get(s) > 0).collect()
    }

    /// Sum of all four fields.
    #[must_use]
    pub const fn total(&self) -> i32 {
        self.muscles + self.intellect + self.crit + self.toughness
    }
}

impl std::ops::AddAssign for ItemStats {
    fn add_assign(&mut self, rhs: Self) {
        self.muscles += rhs.muscles;
        self.intellect += rhs.intellect;
        self.crit += rhs.crit;
        self.toughness += rhs.toughness;
    }
}

/// A concrete item living in exactly one container slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemInstance {
    /// Shared template, `None` when the id did not resolve on load.
    pub template: Option<Arc<ItemTemplate>>,
    /// Template id, kept even when unresolved so re-saving is lossless.
    pub template_id: String,
    /// Item level in `[1, 30]`.
    pub item_level: u32,
    /// Character level needed to equip.
    pub required_level: u32,
    /// Rolled rarity.
    pub rarity: Rarity,
    /// Rolled affix.
    pub affix: AffixKind,
    /// Rolled stat bonuses.
    pub stats: ItemStats,
    /// Monetary value, at least 1.
    pub value: u64,
}

impl ItemInstance {
    /// Builds a scripted item with fixed stats, bypassing rolling.
    ///
    /// Level is clamped and the required level and value are derived the
    /// same way the generator derives them.
    #[must_use]
    pub fn fixed(
        template: Arc<ItemTemplate>,
        item_level: u32,
        rarity: Rarity,
        affix: AffixKind,
        stats: ItemStats,
    ) -> Self {
        let item_level = crate::generator::ItemLevelRules::clamp(item_level);
        Self {
            template_id: template.id.clone(),
            template: Some(template),
            item_level,
            required_level: crate::generator::ItemLevelRules::required_level(item_level),
            rarity,
            affix,
            stats,
            value: crate::generator::PriceCalculator::value(item_level, rarity),
        }
    }

    /// Display name: base name plus affix suffix.
    #[must_use]
    pub fn display_name(&self) -> String {
        let base = self
            .template
            .as_ref()
            .map_or(self.template_id.as_str(), |t| t.base_name.as_str());
        format!("{base}{}", self.affix.suffix())
    }

    /// Template category, if resolved.
    #[must_use]
    pub fn category(&self) -> Option<ItemCategory> {
        self.template.as_ref().map(|t| t.category)
    }

    /// Whether the item can go into an equipment slot at all.
    #[must_use]
    pub fn is_equippable(&self) -> bool {
        self.template.as_ref().is_some_and(|t| t.equippable)
    }

    /// Whether this item may occupy `slot`.
    #[must_use]
    pub fn fits_slot(&self, slot: EquipmentSlot) -> bool {
        self.template.as_ref().is_some_and(|t| t.accepts_slot(slot))
    }
}
