//! Error types for the game session layer.

use thiserror::Error;

use reliquary_economy::EconomyError;

use crate::events::CorpseId;

/// Errors raised by the session layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// An economy operation failed.
    #[error(transparent)]
    Economy(#[from] EconomyError),

    /// No corpse with this id exists (it may have despawned).
    #[error("unknown corpse {0}")]
    UnknownCorpse(CorpseId),

    /// No loot profile with this id is configured.
    #[error("unknown loot profile: {0}")]
    UnknownLootProfile(String),

    /// The save file was written by a newer build.
    #[error("unsupported save version {found}, newest known is {supported}")]
    UnsupportedSave {
        /// Version found in the file.
        found: u32,
        /// Newest version this build reads.
        supported: u32,
    },
}

/// Result type for session operations.
pub type GameResult<T> = Result<T, GameError>;
