//! Single-message operations.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::entity::{Message, MessageId, ValidationError};
use crate::repository::MessageRepository;
use crate::{Context, Error, Result};

/// Validating wrapper over a [`MessageRepository`].
///
/// Unlike [`EmailService`](super::EmailService), importance is never
/// defaulted here: a message without one is rejected.
#[derive(Clone)]
pub struct MessageService {
    repo: Arc<dyn MessageRepository>,
}

fn validate(message: &Message) -> Result<()> {
    if message.importance.is_none() {
        return Err(ValidationError::InvalidImportance(String::new()).into());
    }
    Ok(())
}

impl MessageService {
    /// Wrap a repository.
    #[must_use]
    pub fn new(repo: Arc<dyn MessageRepository>) -> Self {
        Self { repo }
    }

    /// Store a message and assign its id.
    ///
    /// # Errors
    ///
    /// `InvalidImportance` when importance is absent; store failures wrapped
    /// with context.
    pub async fn create(&self, ctx: &Context, message: &mut Message) -> Result<MessageId> {
        validate(message)?;
        self.repo
            .create(ctx, message)
            .await
            .map_err(|e| e.during("create message"))
    }

    /// Fetch a message by id.
    ///
    /// # Errors
    ///
    /// `MessageNotFound` when absent.
    pub async fn get(&self, ctx: &Context, id: MessageId) -> Result<Message> {
        self.repo
            .get_by_id(ctx, id)
            .await
            .map_err(|e| e.during("get message"))
    }

    /// Overwrite an existing message. Never inserts.
    ///
    /// # Errors
    ///
    /// `InvalidImportance` or `MissingId` before any store call;
    /// `MessageNotFound` when no message has this id.
    pub async fn update(&self, ctx: &Context, message: &Message) -> Result<()> {
        validate(message)?;
        let id = message.id.ok_or(ValidationError::MissingId("message"))?;

        let exists = self
            .repo
            .exists(ctx, id)
            .await
            .map_err(|e| e.during("check message"))?;
        if !exists {
            warn!(message_id = %id, "Refusing to update unknown message");
            return Err(Error::MessageNotFound(id));
        }

        self.repo
            .update(ctx, message)
            .await
            .map_err(|e| e.during("update message"))?;
        debug!(message_id = %id, "Message saved");
        Ok(())
    }

    /// Delete a message row. Its recipients and attachments must already be
    /// gone; use [`EmailService::delete`](super::EmailService::delete) to
    /// remove all three together.
    ///
    /// # Errors
    ///
    /// `MessageNotFound` when absent.
    pub async fn delete(&self, ctx: &Context, id: MessageId) -> Result<()> {
        self.repo
            .delete(ctx, id)
            .await
            .map_err(|e| e.during("delete message"))
    }
}

impl std::fmt::Debug for MessageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageService").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entity::{AccountId, Importance};
    use crate::repository::MockMessageRepository;
    use crate::SqliteStore;

    async fn store() -> (SqliteStore, AccountId) {
        let store = SqliteStore::in_memory().await.unwrap();
        let account = store
            .account_service()
            .create(&Context::new(), "a@x.com", "Google")
            .await
            .unwrap();
        (store, account.id.unwrap())
    }

    #[tokio::test]
    async fn test_create_requires_importance() {
        let service = MessageService::new(Arc::new(MockMessageRepository::new()));
        let mut message = Message::new(AccountId(1), "s@x.com");

        let err = service.create(&Context::new(), &mut message).await.unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::InvalidImportance(_))));
    }

    #[tokio::test]
    async fn test_create_update_get() {
        let (store, account_id) = store().await;
        let service = store.message_service();
        let ctx = Context::new();

        let mut message =
            Message::new(account_id, "s@x.com").with_importance(Importance::Low);
        let id = service.create(&ctx, &mut message).await.unwrap();

        message.is_read = true;
        message.subject = Some("Read it".into());
        service.update(&ctx, &message).await.unwrap();

        let stored = service.get(&ctx, id).await.unwrap();
        assert!(stored.is_read);
        assert_eq!(stored.subject.as_deref(), Some("Read it"));
        assert_eq!(stored.importance, Some(Importance::Low));
    }

    #[tokio::test]
    async fn test_update_missing_message_never_inserts() {
        let mut repo = MockMessageRepository::new();
        repo.expect_exists().times(1).returning(|_, _| Ok(false));
        repo.expect_update().never();
        let service = MessageService::new(Arc::new(repo));

        let mut message =
            Message::new(AccountId(1), "s@x.com").with_importance(Importance::Normal);
        message.id = Some(MessageId(404));

        let err = service.update(&Context::new(), &message).await.unwrap_err();
        assert!(matches!(err, Error::MessageNotFound(MessageId(404))));
    }

    #[tokio::test]
    async fn test_not_found_identity_survives_wrapping() {
        let (store, _) = store().await;
        let service = store.message_service();
        let ctx = Context::new();

        let err = service.get(&ctx, MessageId(8)).await.unwrap_err();
        assert!(matches!(err, Error::MessageNotFound(MessageId(8))));

        let err = service.delete(&ctx, MessageId(8)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_store_failure_carries_action() {
        let mut repo = MockMessageRepository::new();
        repo.expect_get_by_id()
            .returning(|_, _| Err(Error::Database(sqlx::Error::PoolTimedOut)));
        let service = MessageService::new(Arc::new(repo));

        let err = service.get(&Context::new(), MessageId(1)).await.unwrap_err();
        assert!(matches!(err, Error::Operation { action: "get message", .. }));
        assert!(err.to_string().starts_with("Failed to get message: Database error"));
    }
}
