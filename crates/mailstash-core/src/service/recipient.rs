//! Recipient operations.

use std::sync::Arc;

use crate::entity::{MessageId, Recipient, RecipientId, ValidationError};
use crate::repository::RecipientRepository;
use crate::{Context, Result};

/// Validating wrapper over a [`RecipientRepository`].
#[derive(Clone)]
pub struct RecipientService {
    repo: Arc<dyn RecipientRepository>,
}

impl RecipientService {
    /// Wrap a repository.
    #[must_use]
    pub fn new(repo: Arc<dyn RecipientRepository>) -> Self {
        Self { repo }
    }

    /// Store a recipient under its `message_id`.
    ///
    /// # Errors
    ///
    /// `MissingId` when the recipient names no message; store failures
    /// wrapped with context.
    pub async fn create(&self, ctx: &Context, recipient: &mut Recipient) -> Result<RecipientId> {
        if recipient.message_id.is_none() {
            return Err(ValidationError::MissingId("message").into());
        }
        self.repo
            .create(ctx, recipient)
            .await
            .map_err(|e| e.during("create recipient"))
    }

    /// Create a recipient from a type name such as `"Cc"`.
    ///
    /// # Errors
    ///
    /// `InvalidRecipientType` unless the name is `To`, `Cc` or `Bcc`.
    pub async fn create_named(
        &self,
        ctx: &Context,
        message_id: MessageId,
        email: &str,
        recipient_type: &str,
    ) -> Result<Recipient> {
        let mut recipient = Recipient::new(email, recipient_type.parse()?);
        recipient.message_id = Some(message_id);
        self.create(ctx, &mut recipient).await?;
        Ok(recipient)
    }

    /// Recipients of a message.
    ///
    /// # Errors
    ///
    /// Store failures wrapped with context.
    pub async fn get_by_message_id(
        &self,
        ctx: &Context,
        message_id: MessageId,
    ) -> Result<Vec<Recipient>> {
        self.repo
            .get_by_message_id(ctx, message_id)
            .await
            .map_err(|e| e.during("get recipients"))
    }

    /// Remove every recipient of a message. A message without recipients is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Store failures wrapped with context.
    pub async fn delete_by_message_id(&self, ctx: &Context, message_id: MessageId) -> Result<u64> {
        self.repo
            .delete_by_message_id(ctx, message_id)
            .await
            .map_err(|e| e.during("delete recipients"))
    }
}

impl std::fmt::Debug for RecipientService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipientService").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entity::{Importance, Message, RecipientType};
    use crate::repository::MockRecipientRepository;
    use crate::{Error, SqliteStore};

    #[tokio::test]
    async fn test_invalid_type_rejected_before_store() {
        let service = RecipientService::new(Arc::new(MockRecipientRepository::new()));

        let err = service
            .create_named(&Context::new(), MessageId(1), "b@x.com", "Reply-To")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidRecipientType(ref t)) if t == "Reply-To"
        ));

        let mut loose = Recipient::new("b@x.com", RecipientType::To);
        let err = service.create(&Context::new(), &mut loose).await.unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::MissingId(_))));
    }

    #[tokio::test]
    async fn test_create_list_delete() {
        let store = SqliteStore::in_memory().await.unwrap();
        let ctx = Context::new();
        let account = store
            .account_service()
            .create(&ctx, "a@x.com", "Google")
            .await
            .unwrap();
        let mut message =
            Message::new(account.id.unwrap(), "s@x.com").with_importance(Importance::Normal);
        let message_id = store
            .message_service()
            .create(&ctx, &mut message)
            .await
            .unwrap();

        let service = store.recipient_service();
        let cc = service
            .create_named(&ctx, message_id, "c@x.com", "Cc")
            .await
            .unwrap();
        assert_eq!(cc.recipient_type, RecipientType::Cc);
        assert!(cc.id.is_some());

        let listed = service.get_by_message_id(&ctx, message_id).await.unwrap();
        assert_eq!(listed, vec![cc]);

        assert_eq!(service.delete_by_message_id(&ctx, message_id).await.unwrap(), 1);
        assert_eq!(service.delete_by_message_id(&ctx, message_id).await.unwrap(), 0);
    }
}
