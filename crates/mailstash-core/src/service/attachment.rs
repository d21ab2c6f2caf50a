//! Attachment metadata operations.

use std::sync::Arc;

use crate::entity::{Attachment, AttachmentId, MessageId, ValidationError};
use crate::repository::AttachmentRepository;
use crate::{Context, Result};

/// Validating wrapper over an [`AttachmentRepository`].
#[derive(Clone)]
pub struct AttachmentService {
    repo: Arc<dyn AttachmentRepository>,
}

impl AttachmentService {
    /// Wrap a repository.
    #[must_use]
    pub fn new(repo: Arc<dyn AttachmentRepository>) -> Self {
        Self { repo }
    }

    /// Store attachment metadata under its `message_id`.
    ///
    /// # Errors
    ///
    /// `MissingId` when no message is named, `InvalidAttachmentSize` when the
    /// size exceeds the store's range; store failures wrapped with context.
    pub async fn create(&self, ctx: &Context, attachment: &mut Attachment) -> Result<AttachmentId> {
        if attachment.message_id.is_none() {
            return Err(ValidationError::MissingId("message").into());
        }
        if i64::try_from(attachment.size).is_err() {
            return Err(ValidationError::InvalidAttachmentSize(attachment.size).into());
        }
        self.repo
            .create(ctx, attachment)
            .await
            .map_err(|e| e.during("create attachment"))
    }

    /// Fetch attachment metadata by id.
    ///
    /// # Errors
    ///
    /// `AttachmentNotFound` when absent.
    pub async fn get(&self, ctx: &Context, id: AttachmentId) -> Result<Attachment> {
        self.repo
            .get_by_id(ctx, id)
            .await
            .map_err(|e| e.during("get attachment"))
    }

    /// Attachments of a message.
    ///
    /// # Errors
    ///
    /// Store failures wrapped with context.
    pub async fn get_by_message_id(
        &self,
        ctx: &Context,
        message_id: MessageId,
    ) -> Result<Vec<Attachment>> {
        self.repo
            .get_by_message_id(ctx, message_id)
            .await
            .map_err(|e| e.during("get attachments"))
    }

    /// Remove every attachment of a message, returning how many went.
    ///
    /// # Errors
    ///
    /// Store failures wrapped with context.
    pub async fn delete_by_message_id(&self, ctx: &Context, message_id: MessageId) -> Result<u64> {
        self.repo
            .delete_by_message_id(ctx, message_id)
            .await
            .map_err(|e| e.during("delete attachments"))
    }
}

impl std::fmt::Debug for AttachmentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachmentService").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entity::{Importance, Message};
    use crate::repository::MockAttachmentRepository;
    use crate::{Error, SqliteStore};

    #[tokio::test]
    async fn test_rejects_before_store() {
        let service = AttachmentService::new(Arc::new(MockAttachmentRepository::new()));
        let ctx = Context::new();

        let mut loose = Attachment::new("f.txt", "text/plain", 1);
        let err = service.create(&ctx, &mut loose).await.unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::MissingId(_))));

        let mut huge = Attachment::new("f.bin", "application/octet-stream", u64::MAX);
        huge.message_id = Some(MessageId(1));
        let err = service.create(&ctx, &mut huge).await.unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::InvalidAttachmentSize(_))));
    }

    #[tokio::test]
    async fn test_attachment_lifecycle() {
        let store = SqliteStore::in_memory().await.unwrap();
        let ctx = Context::new();
        let account = store
            .account_service()
            .create(&ctx, "a@x.com", "Microsoft")
            .await
            .unwrap();
        let mut message =
            Message::new(account.id.unwrap(), "s@x.com").with_importance(Importance::High);
        let message_id = store
            .message_service()
            .create(&ctx, &mut message)
            .await
            .unwrap();

        let service = store.attachment_service();
        let mut attachment = Attachment::new("f.txt", "text/plain", 100);
        attachment.message_id = Some(message_id);
        let id = service.create(&ctx, &mut attachment).await.unwrap();

        assert_eq!(service.get(&ctx, id).await.unwrap(), attachment);
        assert_eq!(service.get_by_message_id(&ctx, message_id).await.unwrap().len(), 1);
        assert_eq!(service.delete_by_message_id(&ctx, message_id).await.unwrap(), 1);

        let err = service.get(&ctx, id).await.unwrap_err();
        assert!(matches!(err, Error::AttachmentNotFound(_)));
    }
}
