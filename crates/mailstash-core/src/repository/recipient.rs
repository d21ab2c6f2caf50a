//! Recipient storage repository.

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use tracing::{debug, info};

use super::RecipientRepository;
use super::row::{
    ChildTable, RECIPIENT_COLUMNS, delete_by_message, insert_recipient, row_to_recipient,
};
use crate::entity::{MessageId, Recipient, RecipientId, ValidationError};
use crate::{Context, Database, Error, Result};

/// `SQLite`-backed [`RecipientRepository`].
#[derive(Debug, Clone)]
pub struct SqliteRecipientRepository {
    pool: SqlitePool,
}

impl SqliteRecipientRepository {
    /// Create a repository over an open database.
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[async_trait]
impl RecipientRepository for SqliteRecipientRepository {
    async fn create(&self, ctx: &Context, recipient: &mut Recipient) -> Result<RecipientId> {
        let message_id = recipient
            .message_id
            .ok_or(ValidationError::MissingId("message"))?;

        let id = ctx
            .run(insert_recipient(&self.pool, message_id, recipient))
            .await?;
        recipient.id = Some(id);

        debug!(recipient_id = %id, message_id = %message_id, "Recipient created");
        Ok(id)
    }

    async fn get_by_id(&self, ctx: &Context, id: RecipientId) -> Result<Recipient> {
        let sql = format!("SELECT {RECIPIENT_COLUMNS} FROM recipients WHERE id = ?");
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
            .map(row_to_recipient)
            .transpose()?
            .ok_or(Error::RecipientNotFound(id))
    }

    async fn get_by_message_id(
        &self,
        ctx: &Context,
        message_id: MessageId,
    ) -> Result<Vec<Recipient>> {
        let sql =
            format!("SELECT {RECIPIENT_COLUMNS} FROM recipients WHERE message_id = ? ORDER BY id");
        let rows = ctx
            .run(async {
                sqlx::query(&sql)
                    .bind(message_id.0)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(Error::from)
            })
            .await?;

        rows.iter().map(row_to_recipient).collect()
    }

    async fn delete_by_message_id(&self, ctx: &Context, message_id: MessageId) -> Result<u64> {
        let removed = ctx
            .run(delete_by_message(&self.pool, ChildTable::Recipients, message_id))
            .await?;

        info!(message_id = %message_id, count = removed, "Recipients deleted");
        Ok(removed)
    }
}
