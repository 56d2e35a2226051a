//! # Change Notifications
//!
//! Every container owns a [`ChangeSignal`]: an explicit observer list of
//! channel senders. A mutation that commits emits its topic exactly once,
//! after the container state is fully updated and before the mutating call
//! returns. Topics carry no payload; listeners re-read the container.
//!
//! ```text
//! Bag::move_slots ──> state updated ──> emit(BagChanged) ──> return
//!                                             │
//!                              ┌──────────────┼──────────────┐
//!                              ▼              ▼              ▼
//!                           bag UI      equipment UI     stat bridge
//! ```

use crossbeam_channel::{unbounded, Receiver, Sender};

/// Typed change topics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeTopic {
    /// Bag slots changed.
    BagChanged,
    /// An equipment slot changed.
    EquipmentChanged,
    /// Wallet balance changed.
    WalletChanged,
    /// Loot container contents changed.
    LootChanged,
    /// Loot container is empty of both currency and items; its owner
    /// should close and despawn it.
    LootDepleted,
}

/// Observer list owned by one container.
///
/// Cloning a container does not clone its subscribers: the clone starts
/// with an empty list.
#[derive(Debug, Default)]
pub struct ChangeSignal {
    subscribers: Vec<Sender<ChangeTopic>>,
}

impl ChangeSignal {
    /// Creates a signal with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscriber and returns its receiving end.
    pub fn subscribe(&mut self) -> ChangeReceiver {
        let (sender, receiver) = unbounded();
        self.subscribers.push(sender);
        ChangeReceiver { receiver }
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Notifies every subscriber; drops the ones whose receiver is gone.
    pub fn emit(&mut self, topic: ChangeTopic) {
        self.subscribers.retain(|s| s.send(topic).is_ok());
    }
}

impl Clone for ChangeSignal {
    fn clone(&self) -> Self {
        Self::new()
    }
}

/// Receiving end of a [`ChangeSignal`] subscription.
#[derive(Clone, Debug)]
pub struct ChangeReceiver {
    receiver: Receiver<ChangeTopic>,
}

impl ChangeReceiver {
    /// Receives all pending notifications (non-blocking).
    #[must_use]
    pub fn drain(&self) -> Vec<ChangeTopic> {
        self.receiver.try_iter().collect()
    }

    /// Receives one notification (non-blocking).
    #[must_use]
    pub fn try_recv(&self) -> Option<ChangeTopic> {
        self.receiver.try_recv().ok()
    }

    /// Number of pending notifications.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }
}
