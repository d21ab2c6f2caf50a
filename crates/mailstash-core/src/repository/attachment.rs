//! Attachment metadata repository.

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use tracing::{debug, info};

use super::AttachmentRepository;
use super::row::{
    ATTACHMENT_COLUMNS, ChildTable, delete_by_message, insert_attachment, row_to_attachment,
};
use crate::entity::{Attachment, AttachmentId, MessageId, ValidationError};
use crate::{Context, Database, Error, Result};

/// `SQLite`-backed [`AttachmentRepository`].
#[derive(Debug, Clone)]
pub struct SqliteAttachmentRepository {
    pool: SqlitePool,
}

impl SqliteAttachmentRepository {
    /// Create a repository over an open database.
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[async_trait]
impl AttachmentRepository for SqliteAttachmentRepository {
    async fn create(&self, ctx: &Context, attachment: &mut Attachment) -> Result<AttachmentId> {
        let message_id = attachment
            .message_id
            .ok_or(ValidationError::MissingId("message"))?;

        let id = ctx
            .run(insert_attachment(&self.pool, message_id, attachment))
            .await?;
        attachment.id = Some(id);

        debug!(
            attachment_id = %id,
            message_id = %message_id,
            filename = %attachment.filename,
            size = attachment.size,
            "Attachment created"
        );
        Ok(id)
    }

    async fn get_by_id(&self, ctx: &Context, id: AttachmentId) -> Result<Attachment> {
        let sql = format!("SELECT {ATTACHMENT_COLUMNS} FROM attachments WHERE id = ?");
        let row = ctx
            .run(async {
                sqlx::query(&sql)
                    .bind(id.0)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(Error::from)
            })
            .await?;

        row.as_ref()
            .map(row_to_attachment)
            .transpose()?
            .ok_or(Error::AttachmentNotFound(id))
    }

    async fn get_by_message_id(
        &self,
        ctx: &Context,
        message_id: MessageId,
    ) -> Result<Vec<Attachment>> {
        let sql = format!(
            "SELECT {ATTACHMENT_COLUMNS} FROM attachments WHERE message_id = ? ORDER BY id"
        );
        let rows = ctx
            .run(async {
                sqlx::query(&sql)
                    .bind(message_id.0)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(Error::from)
            })
            .await?;

        rows.iter().map(row_to_attachment).collect()
    }

    async fn delete_by_message_id(&self, ctx: &Context, message_id: MessageId) -> Result<u64> {
        let removed = ctx
            .run(delete_by_message(&self.pool, ChildTable::Attachments, message_id))
            .await?;

        info!(message_id = %message_id, count = removed, "Attachments deleted");
        Ok(removed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entity::{Account, AccountType, Message};
    use crate::repository::{
        AccountRepository, MessageRepository, SqliteAccountRepository, SqliteMessageRepository,
    };

    async fn setup() -> (SqliteAttachmentRepository, MessageId) {
        let db = Database::in_memory().await.unwrap();
        let ctx = Context::new();
        let mut account = Account::new("owner@example.com", AccountType::Google);
        let account_id = SqliteAccountRepository::new(&db)
            .create(&ctx, &mut account)
            .await
            .unwrap();
        let mut message = Message::new(account_id, "sender@example.com");
        let message_id = SqliteMessageRepository::new(&db)
            .create(&ctx, &mut message)
            .await
            .unwrap();
        (SqliteAttachmentRepository::new(&db), message_id)
    }

    #[tokio::test]
    async fn test_create_and_get_attachment() {
        let (repo, message_id) = setup().await;
        let ctx = Context::new();

        let mut attachment = Attachment::new("report.pdf", "application/pdf", 2048)
            .with_local_path("/tmp/report.pdf");
        attachment.message_id = Some(message_id);
        let id = repo.create(&ctx, &mut attachment).await.unwrap();

        let stored = repo.get_by_id(&ctx, id).await.unwrap();
        assert_eq!(stored, attachment);

        let listed = repo.get_by_message_id(&ctx, message_id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].size, 2048);
    }

    #[tokio::test]
    async fn test_oversized_attachment_rejected() {
        let (repo, message_id) = setup().await;
        let mut attachment = Attachment::new("huge.bin", "application/octet-stream", u64::MAX);
        attachment.message_id = Some(message_id);

        let err = repo.create(&Context::new(), &mut attachment).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidAttachmentSize(u64::MAX))
        ));
    }

    #[tokio::test]
    async fn test_missing_attachment_and_empty_delete() {
        let (repo, _) = setup().await;
        let ctx = Context::new();

        let err = repo.get_by_id(&ctx, AttachmentId(5)).await.unwrap_err();
        assert!(matches!(err, Error::AttachmentNotFound(AttachmentId(5))));
        assert!(repo.get_by_message_id(&ctx, MessageId(5)).await.unwrap().is_empty());
        assert_eq!(repo.delete_by_message_id(&ctx, MessageId(5)).await.unwrap(), 0);
    }
}
