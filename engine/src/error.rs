use thiserror::Error;

use crate::registry::SessionKey;

pub type Result<T> = std::result::Result<T, BattleError>;

/// Declined operations. The messages are safe to show to players as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleError {
    #[error("a battle is already in progress in {key}")]
    AlreadyInProgress { key: SessionKey },

    #[error("there is no battle running in {key}")]
    NoSuchSession { key: SessionKey },
}
