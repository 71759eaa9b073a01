//! Unified error type for `ClaimsBuddy`.
//!
//! Every core operation returns [`Result`]. Validation, authorization and state
//! failures are terminal for the triggering operation and are surfaced to the
//! user as-is; store and storage failures carry the underlying message.

use thiserror::Error;

/// Application error type shared by the core, config and bot layers.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad input to a workflow; the caller corrects it and resubmits.
    #[error("{message}")]
    Validation {
        /// Client-visible explanation
        message: String,
    },

    /// Role, ownership or self-review gate failed.
    #[error("Not authorized to {action}")]
    Unauthorized {
        /// What the caller attempted
        action: String,
    },

    /// The claim is not in a state that allows the operation.
    #[error("Claim {claim_id} is already {status}")]
    InvalidState {
        /// Claim being acted on
        claim_id: i64,
        /// Its current status
        status: String,
    },

    /// No claim with this id.
    #[error("Claim {id} not found")]
    ClaimNotFound {
        /// Requested claim id
        id: i64,
    },

    /// No profile with this id.
    #[error("Profile '{id}' not found")]
    ProfileNotFound {
        /// Requested profile id
        id: String,
    },

    /// No stored report snapshot with this name.
    #[error("Report '{name}' not found")]
    SnapshotNotFound {
        /// Requested snapshot filename
        name: String,
    },

    /// Object storage returned something unusable.
    #[error("Storage error: {message}")]
    Storage {
        /// Underlying failure
        message: String,
    },

    /// Configuration could not be read or is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Underlying failure
        message: String,
    },

    /// Record store failure.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// String formatting failure while building a reply.
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Serenity/Poise framework failure.
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::Unauthorized`] describing the attempted action.
    pub fn unauthorized(action: impl Into<String>) -> Self {
        Self::Unauthorized {
            action: action.into(),
        }
    }

    /// Whether the error is a rejected request the user can correct, as opposed
    /// to an infrastructure failure.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::Unauthorized { .. }
                | Self::InvalidState { .. }
                | Self::ClaimNotFound { .. }
                | Self::ProfileNotFound { .. }
                | Self::SnapshotNotFound { .. }
        )
    }
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
