use thiserror::Error;

/// Errors raised by the ladder, store and ledger.
#[derive(Debug, Error)]
pub enum WhatsNewError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Invalid user name: {0:?}")]
    InvalidUser(String),

    /// The module identity matches neither stepping convention, so its
    /// previous version cannot be computed.
    #[error("No version ladder configured for module {0:?}")]
    UnknownModule(String),
}

impl WhatsNewError {
    /// Errors caused by caller input rather than storage failures.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidVersion(_) | Self::InvalidUser(_) | Self::UnknownModule(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, WhatsNewError>;
