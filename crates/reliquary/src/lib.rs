//! # RELIQUARY
//!
//! Game-side wiring for the RELIQUARY item economy.
//!
//! ## Units
//!
//! | Module     | Owns                                              |
//! |------------|---------------------------------------------------|
//! | `player`   | bag, equipment, wallet, level, save files         |
//! | `corpses`  | loot containers left by dead NPCs                 |
//! | `session`  | the coordinator and routing between the above     |
//! | `events`   | outbound event bus for UI, audio and network      |
//!
//! ## Example
//!
//! ```rust,ignore
//! use reliquary::{EventBus, GameSession};
//! use reliquary_economy::{Catalog, DragOrigin, EconomyConfig, EquipmentSlot};
//!
//! let catalog = Catalog::from_toml_file("data/items.toml")?;
//! let config = EconomyConfig::from_toml_file("data/economy.toml")?;
//! let bus = EventBus::default();
//! let mut session = GameSession::new(catalog, config, 1, bus.sender());
//!
//! session.grant_item("rusty-sword", 1)?;
//! session.begin_drag(DragOrigin::Bag(0))?;
//! session.drop_on_equipment(EquipmentSlot::Weapon)?;
//! session.end_drag();
//!
//! for event in bus.receiver().drain() {
//!     ui.apply(event);
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod corpses;
pub mod error;
pub mod events;
pub mod player;
pub mod session;

pub use corpses::{Corpse, CorpseRegistry, CorpseUpdate};
pub use error::{GameError, GameResult};
pub use events::{
    CorpseId, DespawnReason, EventBus, EventReceiver, EventSender, GameEvent,
    DEFAULT_EVENT_CAPACITY,
};
pub use player::{PlayerInventory, SaveGame, SAVE_VERSION};
pub use session::GameSession;
