//! # Economy Error Types
//!
//! All errors that can occur in the item economy.
//!
//! Errors fall into four families:
//! - **capacity**: a container has no free slot
//! - **eligibility**: the character may not equip the item
//! - **state**: the transfer protocol was driven out of order
//! - **config/persistence**: bad TOML, bad save data, I/O

use thiserror::Error;

/// Errors that can occur in the economy system.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EconomyError {
    /// The bag has no empty slot left.
    #[error("inventory full: capacity {capacity}")]
    InventoryFull {
        /// Bag capacity.
        capacity: usize,
    },

    /// Character level is below the item's required level.
    #[error("level too low: item requires {required}, character is {current}")]
    LevelTooLow {
        /// The item's required level.
        required: u32,
        /// The character's current level.
        current: u32,
    },

    /// The item cannot be equipped at all.
    #[error("item {0} is not equippable")]
    NotEquippable(String),

    /// The item has no resolved template.
    #[error("item references missing template {0}")]
    MissingTemplate(String),

    /// The addressed slot holds nothing.
    #[error("slot is empty")]
    SlotEmpty,

    /// The addressed slot index does not exist.
    #[error("invalid slot index {0}")]
    InvalidSlot(usize),

    /// A drop or drag update arrived while no drag is in progress.
    #[error("no drag in progress")]
    NotDragging,

    /// A drag was started while another one is in progress.
    #[error("a drag is already in progress")]
    AlreadyDragging,

    /// Wallet does not hold enough currency.
    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        /// Amount requested.
        requested: u64,
        /// Amount available.
        available: u64,
    },

    /// Two templates share the same id.
    #[error("duplicate template id: {0}")]
    DuplicateTemplate(String),

    /// Template id not found in the catalog.
    #[error("unknown template: {0}")]
    UnknownTemplate(String),

    /// Snapshot was written by a newer schema.
    #[error("unsupported snapshot version {found}, newest known is {supported}")]
    UnsupportedVersion {
        /// Version found in the data.
        found: u32,
        /// Newest version this build reads.
        supported: u32,
    },

    /// Snapshot data is structurally impossible to load.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Encoding or decoding a snapshot failed.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Reading or writing a file failed.
    #[error("i/o error: {0}")]
    Io(String),
}

impl From<toml::de::Error> for EconomyError {
    fn from(err: toml::de::Error) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}

impl From<serde_json::Error> for EconomyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for EconomyError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type for economy operations.
pub type EconomyResult<T> = Result<T, EconomyError>;
