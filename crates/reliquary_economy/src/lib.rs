//! # RELIQUARY Economy
//!
//! Items, containers and the rules for moving items between them.
//!
//! ## Design Principles
//!
//! 1. **Templates are immutable** - loaded once, shared by `Arc`
//! 2. **Deterministic generation** - all randomness through a caller-owned seeded RNG
//! 3. **Integer currency** - values and balances are `u64`, prices in integer tenths
//! 4. **No item is ever lost** - multi-container transfers either complete or leave
//!    every container as it was
//!
//! ## Layout
//!
//! ```text
//! catalog ──> generator ──> item
//!                              │
//!          ┌─────────┬─────────┼──────────┬─────────┐
//!          ▼         ▼         ▼          ▼         ▼
//!         bag    equipment   loot      wallet   persistence
//!          └─────────┴────┬────┴──────────┘
//!                         ▼
//!                      transfer
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use reliquary_economy::{Catalog, EconomyConfig, Bag};
//!
//! let config = EconomyConfig::from_toml_file("data/economy.toml")?;
//! let catalog = Catalog::from_toml_file("data/items.toml")?;
//! let mut rng = config.rng();
//!
//! let sword = catalog.get("rusty-sword").unwrap();
//! let item = config.generator().roll(sword, 10, &mut rng);
//!
//! let mut bag = Bag::new(config.bag_capacity);
//! bag.add(item).ok();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod bag;
pub mod catalog;
pub mod config;
pub mod equipment;
pub mod error;
pub mod events;
pub mod generator;
pub mod item;
pub mod loot;
pub mod persistence;
pub mod transfer;
pub mod wallet;

pub use bag::{Bag, ItemStack, DEFAULT_BAG_CAPACITY, MAX_BAG_CAPACITY};
pub use catalog::{Catalog, ItemCategory, ItemTemplate, TemplateResolver};
pub use config::EconomyConfig;
pub use equipment::{EquipmentSet, EquipmentSlot};
pub use error::{EconomyError, EconomyResult};
pub use events::{ChangeReceiver, ChangeSignal, ChangeTopic};
pub use generator::{
    AffixRoller, ItemGenerator, ItemLevelRules, PriceCalculator, RarityDropTable, RarityGates,
};
pub use item::{AffixKind, ItemInstance, ItemStats, Rarity, Stat, MAX_ITEM_LEVEL, MIN_ITEM_LEVEL};
pub use loot::{LootContainer, LootDrop, LootProfile, DEFAULT_LOOT_LIFETIME, LOOT_CAPACITY};
pub use persistence::{
    BagSnapshot, EquipmentSnapshot, ItemSnapshot, PersistenceCodec, WalletSnapshot,
    SNAPSHOT_VERSION,
};
pub use transfer::{
    CharacterLevel, Containers, DestroyConfirmation, DragOrigin, DragState, DropOutcome,
    EquipReport, LootTransfer, TransferCoordinator,
};
pub use wallet::Wallet;
