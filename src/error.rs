use thiserror::Error;

/// Errors produced by the practice core and its storage layer.
///
/// `InvalidInput` and `InvalidName` are meant for the player. The
/// persistence variants are logged and swallowed by [`crate::leaderboard::Leaderboard`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("not a valid number: {0:?}")]
    InvalidInput(String),

    #[error("name must be between 2 and 20 characters (got {len})")]
    InvalidName { len: usize },

    #[error("failed to read persisted leaderboard: {0}")]
    PersistenceRead(String),

    #[error("failed to write persisted leaderboard: {0}")]
    PersistenceWrite(String),

    #[error(transparent)]
    Storage(#[from] rusqlite::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Short message suitable for the status line of the UI.
    pub fn user_message(&self) -> String {
        match self {
            Error::InvalidInput(_) => "Please enter a valid number".to_string(),
            Error::InvalidName { len } if *len < 2 => {
                "Please enter a name with at least 2 characters".to_string()
            }
            Error::InvalidName { .. } => {
                "Please enter a name with at most 20 characters".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
