//! Scoped transactions spanning the message, recipient and attachment tables.

use async_trait::async_trait;
use sqlx::sqlite::{Sqlite, SqlitePool};
use sqlx::Transaction;
use tracing::debug;

use super::row::{
    ChildTable, delete_by_message, delete_message_row, insert_attachment, insert_message,
    insert_recipient,
};
use crate::entity::{Attachment, AttachmentId, Message, MessageId, Recipient, RecipientId};
use crate::{Database, Error, Result};

/// Starts units of work against the store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionProvider: Send + Sync {
    /// Begin a new transaction.
    async fn begin(&self) -> Result<Box<dyn EmailTransaction>>;
}

/// An open transaction.
///
/// Exactly one of [`commit`](Self::commit) or [`rollback`](Self::rollback)
/// should be called. Dropping the handle without either rolls the
/// transaction back, so an abandoned (e.g. cancelled) unit of work never
/// leaves partial rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailTransaction: Send {
    /// Insert a message row, returning its new id.
    async fn insert_message(&mut self, message: &Message) -> Result<MessageId>;

    /// Insert a recipient row under `message_id`.
    async fn insert_recipient(
        &mut self,
        message_id: MessageId,
        recipient: &Recipient,
    ) -> Result<RecipientId>;

    /// Insert an attachment row under `message_id`.
    async fn insert_attachment(
        &mut self,
        message_id: MessageId,
        attachment: &Attachment,
    ) -> Result<AttachmentId>;

    /// Delete every attachment of a message, returning rows affected.
    async fn delete_attachments(&mut self, message_id: MessageId) -> Result<u64>;

    /// Delete every recipient of a message, returning rows affected.
    async fn delete_recipients(&mut self, message_id: MessageId) -> Result<u64>;

    /// Delete the message row itself, returning rows affected.
    async fn delete_message(&mut self, message_id: MessageId) -> Result<u64>;

    /// Make all writes durable.
    async fn commit(&mut self) -> Result<()>;

    /// Discard all writes.
    async fn rollback(&mut self) -> Result<()>;
}

/// [`TransactionProvider`] over a `SQLite` pool.
#[derive(Debug, Clone)]
pub struct SqliteTransactionProvider {
    pool: SqlitePool,
}

impl SqliteTransactionProvider {
    /// Create a provider over an open database.
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[async_trait]
impl TransactionProvider for SqliteTransactionProvider {
    async fn begin(&self) -> Result<Box<dyn EmailTransaction>> {
        let tx = self.pool.begin().await?;
        debug!("Transaction started");
        Ok(Box::new(SqliteEmailTransaction { tx: Some(tx) }))
    }
}

/// sqlx rolls an unfinished `Transaction` back when it is dropped.
struct SqliteEmailTransaction {
    tx: Option<Transaction<'static, Sqlite>>,
}

impl SqliteEmailTransaction {
    fn open(&mut self) -> Result<&mut Transaction<'static, Sqlite>> {
        self.tx.as_mut().ok_or_else(finished)
    }

    fn finish(&mut self) -> Result<Transaction<'static, Sqlite>> {
        self.tx.take().ok_or_else(finished)
    }
}

fn finished() -> Error {
    Error::Database(sqlx::Error::Protocol("transaction already finished".into()))
}

#[async_trait]
impl EmailTransaction for SqliteEmailTransaction {
    async fn insert_message(&mut self, message: &Message) -> Result<MessageId> {
        let tx = self.open()?;
        insert_message(&mut **tx, message).await
    }

    async fn insert_recipient(
        &mut self,
        message_id: MessageId,
        recipient: &Recipient,
    ) -> Result<RecipientId> {
        let tx = self.open()?;
        insert_recipient(&mut **tx, message_id, recipient).await
    }

    async fn insert_attachment(
        &mut self,
        message_id: MessageId,
        attachment: &Attachment,
    ) -> Result<AttachmentId> {
        let tx = self.open()?;
        insert_attachment(&mut **tx, message_id, attachment).await
    }

    async fn delete_attachments(&mut self, message_id: MessageId) -> Result<u64> {
        let tx = self.open()?;
        delete_by_message(&mut **tx, ChildTable::Attachments, message_id).await
    }

    async fn delete_recipients(&mut self, message_id: MessageId) -> Result<u64> {
        let tx = self.open()?;
        delete_by_message(&mut **tx, ChildTable::Recipients, message_id).await
    }

    async fn delete_message(&mut self, message_id: MessageId) -> Result<u64> {
        let tx = self.open()?;
        delete_message_row(&mut **tx, message_id).await
    }

    async fn commit(&mut self) -> Result<()> {
        self.finish()?.commit().await?;
        debug!("Transaction committed");
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.finish()?.rollback().await?;
        debug!("Transaction rolled back");
        Ok(())
    }
}
