//! Composite email: a message together with its recipients and attachments.

use serde::{Deserialize, Serialize};

use super::{Attachment, Message, Recipient};

/// A message, its recipients and its attachments, created, read and deleted
/// as one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    /// The message. Required for creation.
    pub message: Option<Message>,
    /// Recipients. At least one is required for creation.
    pub recipients: Vec<Recipient>,
    /// Attachments, possibly none.
    pub attachments: Vec<Attachment>,
}

impl Email {
    /// Starts a composite around `message`.
    #[must_use]
    pub fn new(message: Message) -> Self {
        Self {
            message: Some(message),
            recipients: Vec::new(),
            attachments: Vec::new(),
        }
    }

    /// Adds a recipient.
    #[must_use]
    pub fn with_recipient(mut self, recipient: Recipient) -> Self {
        self.recipients.push(recipient);
        self
    }

    /// Adds an attachment.
    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// The message id, once the email has been stored.
    #[must_use]
    pub fn id(&self) -> Option<super::MessageId> {
        self.message.as_ref().and_then(|m| m.id)
    }
}
