//! Message model types.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::ValidationError;
use super::{AccountId, MessageId};

/// Message priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Importance {
    /// Low priority.
    Low,
    /// Normal priority, used when none is given.
    #[default]
    Normal,
    /// High priority.
    High,
}

impl Importance {
    /// Stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Normal => "Normal",
            Self::High => "High",
        }
    }
}

impl FromStr for Importance {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(Self::Low),
            "Normal" => Ok(Self::Normal),
            "High" => Ok(Self::High),
            other => Err(ValidationError::InvalidImportance(other.to_string())),
        }
    }
}

impl std::fmt::Display for Importance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored email message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Message {
    /// Store-assigned id (`None` until saved).
    pub id: Option<MessageId>,
    /// Owning account.
    pub account_id: AccountId,
    /// Subject line.
    pub subject: Option<String>,
    /// Full body.
    pub body: Option<String>,
    /// Short preview of the body.
    pub body_preview: Option<String>,
    /// Sender address.
    pub sender_email: String,
    /// Sender display name.
    pub sender_name: Option<String>,
    /// When the message was received.
    pub received_datetime: Option<DateTime<Utc>>,
    /// When the message was sent.
    pub sent_datetime: Option<DateTime<Utc>>,
    /// Whether this is an unsent draft.
    pub is_draft: bool,
    /// Whether the message has been read.
    pub is_read: bool,
    /// Priority. `None` means the caller did not choose one.
    pub importance: Option<Importance>,
    /// Provider conversation/thread id.
    pub conversation_id: Option<String>,
}

impl Message {
    /// Creates an unsaved message with only the required fields set.
    #[must_use]
    pub fn new(account_id: AccountId, sender_email: impl Into<String>) -> Self {
        Self {
            id: None,
            account_id,
            subject: None,
            body: None,
            body_preview: None,
            sender_email: sender_email.into(),
            sender_name: None,
            received_datetime: None,
            sent_datetime: None,
            is_draft: false,
            is_read: false,
            importance: None,
            conversation_id: None,
        }
    }

    /// Sets the subject.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the received time.
    #[must_use]
    pub fn with_received(mut self, received: DateTime<Utc>) -> Self {
        self.received_datetime = Some(received);
        self
    }

    /// Sets the importance.
    #[must_use]
    pub fn with_importance(mut self, importance: Importance) -> Self {
        self.importance = Some(importance);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_importance_parse() {
        assert_eq!("High".parse(), Ok(Importance::High));
        assert_eq!(
            "Urgent".parse::<Importance>(),
            Err(ValidationError::InvalidImportance("Urgent".into()))
        );
        assert!("".parse::<Importance>().is_err());
    }

    #[test]
    fn test_new_message_has_no_importance() {
        let message = Message::new(AccountId(1), "a@x.com").with_subject("Hi");
        assert_eq!(message.importance, None);
        assert_eq!(message.subject.as_deref(), Some("Hi"));
        assert_eq!(Importance::default(), Importance::Normal);
    }
}
