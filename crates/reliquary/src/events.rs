//! # RELIQUARY Event System
//!
//! Channel between the game session and everything that reacts to it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐  ChangeTopic   ┌─────────────┐   GameEvent   ┌─────────────┐
//! │ Containers  │───────────────>│ GameSession │──────────────>│  UI / Audio │
//! │ (economy)   │                │             │               │  / Network  │
//! └─────────────┘                └─────────────┘               └─────────────┘
//! ```
//!
//! Containers only say *that* they changed. The session turns that into a
//! `GameEvent` carrying what listeners need, so the UI never has to reach
//! back into the session mid-frame.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use reliquary_economy::{EquipmentSlot, ItemStats};

/// Identifier of a spawned corpse.
pub type CorpseId = u64;

/// Default channel capacity.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Why a corpse went away.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DespawnReason {
    /// Its lifetime ran out.
    Expired,
    /// Everything was looted.
    Depleted,
}

/// Events emitted by the game session.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    // =========================================================================
    // Player containers
    // =========================================================================
    /// Bag contents changed.
    BagChanged {
        /// Occupied slots after the change.
        used_slots: usize,
        /// Bag capacity.
        capacity: usize,
    },

    /// Equipment changed; carries the new stat totals for the stats panel.
    EquipmentChanged {
        /// Sum of all equipped bonuses.
        totals: ItemStats,
    },

    /// Wallet balance changed.
    WalletChanged {
        /// New balance.
        balance: u64,
    },

    // =========================================================================
    // Transfers
    // =========================================================================
    /// An item was equipped.
    ItemEquipped {
        /// Slot it went into.
        slot: EquipmentSlot,
        /// Display name.
        name: String,
    },

    /// An equip was refused.
    EquipDenied {
        /// Human-readable reason.
        reason: String,
    },

    /// A bag item was released outside any container; ask before destroying.
    DestroyRequested {
        /// Bag slot in question.
        bag_index: usize,
        /// Display name.
        name: String,
    },

    /// A bag item was destroyed after confirmation.
    ItemDestroyed {
        /// Display name.
        name: String,
    },

    // =========================================================================
    // Corpses
    // =========================================================================
    /// An NPC died and left loot.
    CorpseSpawned {
        /// New corpse id.
        corpse: CorpseId,
        /// World position.
        position: [f32; 3],
        /// Currency inside.
        currency: u64,
        /// Item count inside.
        items: usize,
    },

    /// A corpse's loot changed.
    LootChanged {
        /// Corpse id.
        corpse: CorpseId,
    },

    /// A corpse was removed.
    CorpseDespawned {
        /// Corpse id.
        corpse: CorpseId,
        /// Why.
        reason: DespawnReason,
    },

    // =========================================================================
    // Persistence
    // =========================================================================
    /// The player's state was written to disk.
    GameSaved,

    /// The player's state was restored from disk.
    GameLoaded,
}

/// Event bus for session output.
///
/// Bounded so a stalled consumer cannot grow memory without limit.
pub struct EventBus {
    sender: Sender<GameEvent>,
    receiver: Receiver<GameEvent>,
}

impl EventBus {
    /// Creates a new event bus holding at most `capacity` events in flight.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    /// Creates a sender handle (clone for multiple producers).
    #[must_use]
    pub fn sender(&self) -> EventSender {
        EventSender {
            sender: self.sender.clone(),
        }
    }

    /// Creates a receiver handle (clone for multiple consumers).
    #[must_use]
    pub fn receiver(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.receiver.clone(),
        }
    }

    /// Creates a connected sender/receiver pair.
    #[must_use]
    pub fn create_pair(capacity: usize) -> (EventSender, EventReceiver) {
        let bus = Self::new(capacity);
        (bus.sender(), bus.receiver())
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

/// Handle for sending events.
#[derive(Clone)]
pub struct EventSender {
    sender: Sender<GameEvent>,
}

impl EventSender {
    /// Sends an event (non-blocking).
    ///
    /// Returns `false` if the event was dropped.
    #[inline]
    pub fn send(&self, event: GameEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                tracing::warn!("Event channel full, dropping {:?}", event);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Handle for receiving events.
#[derive(Clone)]
pub struct EventReceiver {
    receiver: Receiver<GameEvent>,
}

impl EventReceiver {
    /// Receives all pending events (non-blocking).
    #[inline]
    #[must_use]
    pub fn drain(&self) -> Vec<GameEvent> {
        self.receiver.try_iter().collect()
    }

    /// Receives one event (non-blocking).
    #[inline]
    #[must_use]
    pub fn try_recv(&self) -> Option<GameEvent> {
        self.receiver.try_recv().ok()
    }

    /// Returns the number of pending events.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Checks if there are pending events.
    #[inline]
    #[must_use]
    pub fn has_events(&self) -> bool {
        !self.receiver.is_empty()
    }
}
