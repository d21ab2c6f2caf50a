//! Recipient model types.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::validation::ValidationError;
use super::{MessageId, RecipientId};

/// Role of a recipient on a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecipientType {
    /// Primary recipient.
    To,
    /// Carbon copy.
    Cc,
    /// Blind carbon copy.
    Bcc,
}

impl RecipientType {
    /// Stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::To => "To",
            Self::Cc => "Cc",
            Self::Bcc => "Bcc",
        }
    }
}

impl FromStr for RecipientType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "To" => Ok(Self::To),
            "Cc" => Ok(Self::Cc),
            "Bcc" => Ok(Self::Bcc),
            other => Err(ValidationError::InvalidRecipientType(other.to_string())),
        }
    }
}

impl std::fmt::Display for RecipientType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One addressee of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// Store-assigned id (`None` until saved).
    pub id: Option<RecipientId>,
    /// Parent message (`None` until attached to a saved message).
    pub message_id: Option<MessageId>,
    /// Recipient address.
    pub email: String,
    /// Display name.
    pub name: Option<String>,
    /// To, Cc or Bcc.
    pub recipient_type: RecipientType,
}

impl Recipient {
    /// Creates an unsaved recipient.
    #[must_use]
    pub fn new(email: impl Into<String>, recipient_type: RecipientType) -> Self {
        Self {
            id: None,
            message_id: None,
            email: email.into(),
            name: None,
            recipient_type,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
