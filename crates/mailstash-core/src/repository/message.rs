//! Message storage repository.

use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::SqlitePool;
use tracing::{debug, info, warn};

use super::MessageRepository;
use super::row::{MESSAGE_COLUMNS, encode_timestamp, insert_message, row_to_message};
use crate::entity::{AccountId, Message, MessageId, ValidationError};
use crate::{Context, Database, Error, Result};

/// `SQLite`-backed [`MessageRepository`].
#[derive(Debug, Clone)]
pub struct SqliteMessageRepository {
    pool: SqlitePool,
}

impl SqliteMessageRepository {
    /// Create a repository over an open database.
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[async_trait]
impl MessageRepository for SqliteMessageRepository {
    async fn create(&self, ctx: &Context, message: &mut Message) -> Result<MessageId> {
        let id = ctx.run(insert_message(&self.pool, message)).await?;
        message.id = Some(id);
        info!(message_id = %id, account_id = %message.account_id, "Message created");
        Ok(id)
    }

    async fn get_by_id(&self, ctx: &Context, id: MessageId) -> Result<Message> {
        let sql = format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?");
        let row = ctx
            .run(async {
                sqlx::query(&sql)
                    .bind(id.0)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(Error::from)
            })
            .await?;

        match row {
            Some(row) => row_to_message(&row),
            None => {
                debug!(message_id = %id, "Message not found");
                Err(Error::MessageNotFound(id))
            }
        }
    }

    async fn exists(&self, ctx: &Context, id: MessageId) -> Result<bool> {
        let row = ctx
            .run(async {
                sqlx::query("SELECT COUNT(*) AS count FROM messages WHERE id = ?")
                    .bind(id.0)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(Error::from)
            })
            .await?;

        Ok(row.try_get::<i64, _>("count")? > 0)
    }

    async fn update(&self, ctx: &Context, message: &Message) -> Result<()> {
        let id = message.id.ok_or(ValidationError::MissingId("message"))?;

        let result = ctx
            .run(async {
                sqlx::query(
                    r"
                    UPDATE messages SET
                        account_id = ?, subject = ?, body = ?, body_preview = ?,
                        sender_email = ?, sender_name = ?,
                        received_datetime = ?, sent_datetime = ?,
                        is_draft = ?, is_read = ?, importance = ?, conversation_id = ?
                    WHERE id = ?
                    ",
                )
                .bind(message.account_id.0)
                .bind(message.subject.as_deref())
                .bind(message.body.as_deref())
                .bind(message.body_preview.as_deref())
                .bind(&message.sender_email)
                .bind(message.sender_name.as_deref())
                .bind(message.received_datetime.map(encode_timestamp))
                .bind(message.sent_datetime.map(encode_timestamp))
                .bind(message.is_draft)
                .bind(message.is_read)
                .bind(message.importance.unwrap_or_default().as_str())
                .bind(message.conversation_id.as_deref())
                .bind(id.0)
                .execute(&self.pool)
                .await
                .map_err(Error::from)
            })
            .await?;

        if result.rows_affected() == 0 {
            warn!(message_id = %id, "Message not found for update");
            return Err(Error::MessageNotFound(id));
        }

        debug!(message_id = %id, "Message updated");
        Ok(())
    }

    async fn delete(&self, ctx: &Context, id: MessageId) -> Result<()> {
        let result = ctx
            .run(async {
                sqlx::query("DELETE FROM messages WHERE id = ?")
                    .bind(id.0)
                    .execute(&self.pool)
                    .await
                    .map_err(Error::from)
            })
            .await?;

        if result.rows_affected() == 0 {
            warn!(message_id = %id, "Message not found for deletion");
            return Err(Error::MessageNotFound(id));
        }

        info!(message_id = %id, "Message deleted");
        Ok(())
    }

    async fn count_by_account(&self, ctx: &Context, account_id: AccountId) -> Result<u64> {
        let row = ctx
            .run(async {
                sqlx::query("SELECT COUNT(*) AS count FROM messages WHERE account_id = ?")
                    .bind(account_id.0)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(Error::from)
            })
            .await?;

        let count: i64 = row.try_get("count")?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn list_by_account(
        &self,
        ctx: &Context,
        account_id: AccountId,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<Message>> {
        // NULL receive times sort last under DESC; id breaks ties.
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE account_id = ? \
             ORDER BY received_datetime DESC, id DESC LIMIT ? OFFSET ?"
        );
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);

        let rows = ctx
            .run(async {
                sqlx::query(&sql)
                    .bind(account_id.0)
                    .bind(i64::from(limit))
                    .bind(offset)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(Error::from)
            })
            .await?;

        rows.iter().map(row_to_message).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entity::{Account, AccountType, Importance};
    use crate::repository::{AccountRepository, SqliteAccountRepository};
    use chrono::{Duration, Utc};

    async fn setup() -> (SqliteMessageRepository, AccountId) {
        let db = Database::in_memory().await.unwrap();
        let mut account = Account::new("owner@example.com", AccountType::Microsoft);
        let account_id = SqliteAccountRepository::new(&db)
            .create(&Context::new(), &mut account)
            .await
            .unwrap();
        (SqliteMessageRepository::new(&db), account_id)
    }

    #[tokio::test]
    async fn test_create_and_get_message() {
        let (repo, account_id) = setup().await;
        let ctx = Context::new();
        let received = Utc::now();

        let mut message = Message::new(account_id, "sender@example.com")
            .with_subject("Quarterly report")
            .with_received(received)
            .with_importance(Importance::High);
        let id = repo.create(&ctx, &mut message).await.unwrap();

        let stored = repo.get_by_id(&ctx, id).await.unwrap();
        assert_eq!(stored.id, Some(id));
        assert_eq!(stored.subject.as_deref(), Some("Quarterly report"));
        assert_eq!(stored.body, None);
        assert_eq!(stored.importance, Some(Importance::High));
        assert_eq!(
            stored.received_datetime.map(|t| t.timestamp_micros()),
            Some(received.timestamp_micros())
        );
    }

    #[tokio::test]
    async fn test_message_requires_existing_account() {
        let (repo, _) = setup().await;
        let mut message = Message::new(AccountId(999), "sender@example.com");

        let err = repo.create(&Context::new(), &mut message).await.unwrap_err();
        assert!(matches!(err, Error::Database(_)));
        assert_eq!(message.id, None);
    }

    #[tokio::test]
    async fn test_update_missing_message() {
        let (repo, account_id) = setup().await;
        let mut message = Message::new(account_id, "sender@example.com");
        message.id = Some(MessageId(404));

        let err = repo.update(&Context::new(), &message).await.unwrap_err();
        assert!(matches!(err, Error::MessageNotFound(MessageId(404))));
        assert!(!repo.exists(&Context::new(), MessageId(404)).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_newest_first_with_nulls_last() {
        let (repo, account_id) = setup().await;
        let ctx = Context::new();
        let now = Utc::now();

        let mut undated = Message::new(account_id, "a@example.com").with_subject("undated");
        let mut old = Message::new(account_id, "a@example.com")
            .with_subject("old")
            .with_received(now - Duration::days(2));
        let mut new = Message::new(account_id, "a@example.com")
            .with_subject("new")
            .with_received(now);
        for message in [&mut undated, &mut old, &mut new] {
            repo.create(&ctx, message).await.unwrap();
        }

        let listed = repo.list_by_account(&ctx, account_id, 10, 0).await.unwrap();
        let subjects: Vec<_> = listed.iter().filter_map(|m| m.subject.as_deref()).collect();
        assert_eq!(subjects, ["new", "old", "undated"]);

        let window = repo.list_by_account(&ctx, account_id, 1, 1).await.unwrap();
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].subject.as_deref(), Some("old"));

        assert_eq!(repo.count_by_account(&ctx, account_id).await.unwrap(), 3);
        assert_eq!(repo.count_by_account(&ctx, AccountId(77)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_equal_receive_times_order_by_id() {
        let (repo, account_id) = setup().await;
        let ctx = Context::new();
        let received = Utc::now();

        let mut first = Message::new(account_id, "a@example.com").with_received(received);
        let mut second = Message::new(account_id, "a@example.com").with_received(received);
        let first_id = repo.create(&ctx, &mut first).await.unwrap();
        let second_id = repo.create(&ctx, &mut second).await.unwrap();
        assert!(second_id > first_id);

        let listed = repo.list_by_account(&ctx, account_id, 10, 0).await.unwrap();
        let ids: Vec<_> = listed.iter().filter_map(|m| m.id).collect();
        assert_eq!(ids, [second_id, first_id]);

        let mut walked = Vec::new();
        for offset in 0..2 {
            let page = repo
                .list_by_account(&ctx, account_id, 1, offset)
                .await
                .unwrap();
            assert_eq!(page.len(), 1);
            walked.extend(page.iter().filter_map(|m| m.id));
        }
        assert_eq!(walked, [second_id, first_id]);
    }

    #[tokio::test]
    async fn test_delete_message() {
        let (repo, account_id) = setup().await;
        let ctx = Context::new();

        let mut message = Message::new(account_id, "a@example.com");
        let id = repo.create(&ctx, &mut message).await.unwrap();

        repo.delete(&ctx, id).await.unwrap();
        assert!(!repo.exists(&ctx, id).await.unwrap());

        let err = repo.delete(&ctx, id).await.unwrap_err();
        assert!(matches!(err, Error::MessageNotFound(_)));
    }
}
