//! Attachment metadata.

use serde::{Deserialize, Serialize};

use super::{AttachmentId, MessageId};

/// File attached to a message. Only metadata is stored; content lives
/// outside the database, optionally at `local_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Store-assigned id (`None` until saved).
    pub id: Option<AttachmentId>,
    /// Parent message (`None` until attached to a saved message).
    pub message_id: Option<MessageId>,
    /// File name as sent.
    pub filename: String,
    /// MIME type, e.g. `text/plain`.
    pub mime_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Where the content was saved locally, if it was.
    pub local_path: Option<String>,
}

impl Attachment {
    /// Creates unsaved attachment metadata.
    #[must_use]
    pub fn new(filename: impl Into<String>, mime_type: impl Into<String>, size: u64) -> Self {
        Self {
            id: None,
            message_id: None,
            filename: filename.into(),
            mime_type: mime_type.into(),
            size,
            local_path: None,
        }
    }

    /// Sets the local storage path.
    #[must_use]
    pub fn with_local_path(mut self, path: impl Into<String>) -> Self {
        self.local_path = Some(path.into());
        self
    }
}
