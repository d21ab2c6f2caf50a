//! Validation errors for entity input.

/// Input rejected before any store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A composite email was submitted without a message.
    MessageRequired,
    /// A composite email was submitted without recipients.
    RecipientsRequired,
    /// An update or lookup needed a record id that was never assigned.
    MissingId(&'static str),
    /// Importance is not one of Low, Normal, High.
    InvalidImportance(String),
    /// Recipient type is not one of To, Cc, Bcc.
    InvalidRecipientType(String),
    /// Account type is not one of Microsoft, Google.
    InvalidAccountType(String),
    /// Attachment size does not fit the store's integer column.
    InvalidAttachmentSize(u64),
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::MessageRequired => "message is required",
            Self::RecipientsRequired => "at least one recipient is required",
            Self::MissingId(_) => "record has no identifier",
            Self::InvalidImportance(_) => "invalid importance",
            Self::InvalidRecipientType(_) => "invalid recipient type",
            Self::InvalidAccountType(_) => "invalid account type",
            Self::InvalidAttachmentSize(_) => "attachment size out of range",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::MessageRequired => "message",
            Self::RecipientsRequired => "recipients",
            Self::MissingId(_) => "id",
            Self::InvalidImportance(_) => "importance",
            Self::InvalidRecipientType(_) => "recipient_type",
            Self::InvalidAccountType(_) => "account_type",
            Self::InvalidAttachmentSize(_) => "size",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidImportance(value)
            | Self::InvalidRecipientType(value)
            | Self::InvalidAccountType(value) => write!(f, "{} '{value}'", self.message()),
            Self::MissingId(entity) => write!(f, "{entity} {}", self.message()),
            Self::InvalidAttachmentSize(size) => write!(f, "{} ({size} bytes)", self.message()),
            Self::MessageRequired | Self::RecipientsRequired => write!(f, "{}", self.message()),
        }
    }
}

impl std::error::Error for ValidationError {}
