//! Storage ports and their `SQLite` implementations.
//!
//! Services depend only on the traits in this module, so an alternate store
//! (or a mock) can be substituted without touching service logic. Every
//! operation takes a [`Context`](crate::Context) and aborts when it is
//! cancelled or expires.

mod account;
mod attachment;
mod message;
mod recipient;
mod row;
mod transaction;

use async_trait::async_trait;

use crate::entity::{
    Account, AccountId, Attachment, AttachmentId, Message, MessageId, Recipient, RecipientId,
};
use crate::{Context, Result};

pub use account::SqliteAccountRepository;
pub use attachment::SqliteAttachmentRepository;
pub use message::SqliteMessageRepository;
pub use recipient::SqliteRecipientRepository;
pub use transaction::{EmailTransaction, SqliteTransactionProvider, TransactionProvider};

#[cfg(test)]
pub use transaction::{MockEmailTransaction, MockTransactionProvider};

/// Account storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert `account` and store the assigned id on it.
    async fn create(&self, ctx: &Context, account: &mut Account) -> Result<AccountId>;

    /// Fetch by id. Fails with `AccountNotFound` when absent.
    async fn get_by_id(&self, ctx: &Context, id: AccountId) -> Result<Account>;

    /// Fetch by email. Fails with `AccountNotFound` when absent.
    async fn get_by_email(&self, ctx: &Context, email: &str) -> Result<Account>;

    /// Delete by id. Fails with `AccountNotFound` when nothing was deleted.
    async fn delete(&self, ctx: &Context, id: AccountId) -> Result<()>;

    /// All accounts, ordered by id.
    async fn list(&self, ctx: &Context) -> Result<Vec<Account>>;
}

/// Message storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Insert `message` and store the assigned id on it.
    async fn create(&self, ctx: &Context, message: &mut Message) -> Result<MessageId>;

    /// Fetch by id. Fails with `MessageNotFound` when absent.
    async fn get_by_id(&self, ctx: &Context, id: MessageId) -> Result<Message>;

    /// Whether a message with this id exists.
    async fn exists(&self, ctx: &Context, id: MessageId) -> Result<bool>;

    /// Overwrite every column of an existing message. Fails with
    /// `MessageNotFound` when no row matched.
    async fn update(&self, ctx: &Context, message: &Message) -> Result<()>;

    /// Delete by id. Fails with `MessageNotFound` when nothing was deleted.
    async fn delete(&self, ctx: &Context, id: MessageId) -> Result<()>;

    /// Number of messages owned by an account.
    async fn count_by_account(&self, ctx: &Context, account_id: AccountId) -> Result<u64>;

    /// One window of an account's messages, newest received first.
    async fn list_by_account(
        &self,
        ctx: &Context,
        account_id: AccountId,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<Message>>;
}

/// Recipient storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipientRepository: Send + Sync {
    /// Insert `recipient` and store the assigned id on it.
    async fn create(&self, ctx: &Context, recipient: &mut Recipient) -> Result<RecipientId>;

    /// Fetch by id. Fails with `RecipientNotFound` when absent.
    async fn get_by_id(&self, ctx: &Context, id: RecipientId) -> Result<Recipient>;

    /// All recipients of a message; empty when there are none.
    async fn get_by_message_id(&self, ctx: &Context, message_id: MessageId)
    -> Result<Vec<Recipient>>;

    /// Delete all recipients of a message, returning how many were removed.
    async fn delete_by_message_id(&self, ctx: &Context, message_id: MessageId) -> Result<u64>;
}

/// Attachment metadata storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttachmentRepository: Send + Sync {
    /// Insert `attachment` and store the assigned id on it.
    async fn create(&self, ctx: &Context, attachment: &mut Attachment) -> Result<AttachmentId>;

    /// Fetch by id. Fails with `AttachmentNotFound` when absent.
    async fn get_by_id(&self, ctx: &Context, id: AttachmentId) -> Result<Attachment>;

    /// All attachments of a message; empty when there are none.
    async fn get_by_message_id(
        &self,
        ctx: &Context,
        message_id: MessageId,
    ) -> Result<Vec<Attachment>>;

    /// Delete all attachments of a message, returning how many were removed.
    async fn delete_by_message_id(&self, ctx: &Context, message_id: MessageId) -> Result<u64>;
}
