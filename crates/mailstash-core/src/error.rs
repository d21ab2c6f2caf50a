//! Error types for the core library.

use thiserror::Error;

use crate::entity::{AttachmentId, MessageId, RecipientId, ValidationError};

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Input rejected before reaching the store.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Requested page size is outside `1..=100`.
    #[error("Page size must be between 1 and 100, got {0}")]
    InvalidPageSize(u32),

    /// Account not found (by id or email).
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Message not found.
    #[error("Message not found: {0}")]
    MessageNotFound(MessageId),

    /// Recipient not found.
    #[error("Recipient not found: {0}")]
    RecipientNotFound(RecipientId),

    /// Attachment not found.
    #[error("Attachment not found: {0}")]
    AttachmentNotFound(AttachmentId),

    /// Composite email not found.
    #[error("Email not found: {0}")]
    EmailNotFound(MessageId),

    /// Creating a composite email failed and was rolled back.
    #[error("Failed to create email: {0}")]
    EmailCreationFailed(#[source] Box<Error>),

    /// Deleting a composite email failed and was rolled back.
    #[error("Failed to delete email: {0}")]
    EmailDeleteFailed(#[source] Box<Error>),

    /// A single-entity operation failed.
    #[error("Failed to {action}: {source}")]
    Operation {
        /// What was being attempted, e.g. `"create message"`.
        action: &'static str,
        /// Underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// The caller cancelled the operation.
    #[error("Operation cancelled")]
    Cancelled,

    /// The caller's deadline passed before the operation finished.
    #[error("Deadline exceeded")]
    DeadlineExceeded,

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns true for any not-found condition, looking through
    /// [`Error::Operation`] wrapping.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::AccountNotFound(_)
            | Self::MessageNotFound(_)
            | Self::RecipientNotFound(_)
            | Self::AttachmentNotFound(_)
            | Self::EmailNotFound(_) => true,
            Self::Operation { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// Returns true if the operation was cancelled or timed out, anywhere in
    /// the wrapping chain.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        match self {
            Self::Cancelled | Self::DeadlineExceeded => true,
            Self::Operation { source, .. }
            | Self::EmailCreationFailed(source)
            | Self::EmailDeleteFailed(source) => source.is_cancellation(),
            _ => false,
        }
    }

    /// Adds operation context to a store failure.
    ///
    /// Not-found, validation and cancellation errors are returned unchanged so
    /// callers can keep matching on them directly.
    #[must_use]
    pub fn during(self, action: &'static str) -> Self {
        match self {
            Self::Validation(_) | Self::Cancelled | Self::DeadlineExceeded => self,
            e if e.is_not_found() => e,
            source => Self::Operation {
                action,
                source: Box::new(source),
            },
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
