//! `SQLite` wiring for the services.

use std::sync::Arc;

use crate::repository::{
    SqliteAccountRepository, SqliteAttachmentRepository, SqliteMessageRepository,
    SqliteRecipientRepository, SqliteTransactionProvider,
};
use crate::service::{
    AccountService, AttachmentService, EmailService, MessageService, RecipientService,
};
use crate::{Database, Result, StoreConfig};

/// All repositories over one [`Database`], handing out ready-wired services.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
    accounts: Arc<SqliteAccountRepository>,
    messages: Arc<SqliteMessageRepository>,
    recipients: Arc<SqliteRecipientRepository>,
    attachments: Arc<SqliteAttachmentRepository>,
    transactions: Arc<SqliteTransactionProvider>,
}

impl SqliteStore {
    /// Build repositories over an open database.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self {
            accounts: Arc::new(SqliteAccountRepository::new(&db)),
            messages: Arc::new(SqliteMessageRepository::new(&db)),
            recipients: Arc::new(SqliteRecipientRepository::new(&db)),
            attachments: Arc::new(SqliteAttachmentRepository::new(&db)),
            transactions: Arc::new(SqliteTransactionProvider::new(&db)),
            db,
        }
    }

    /// Open the store described by `config`.
    ///
    /// # Errors
    ///
    /// See [`Database::from_config`].
    pub async fn open(config: &StoreConfig) -> Result<Self> {
        Ok(Self::new(Database::from_config(config).await?))
    }

    /// A private in-memory store.
    ///
    /// # Errors
    ///
    /// See [`Database::in_memory`].
    pub async fn in_memory() -> Result<Self> {
        Ok(Self::new(Database::in_memory().await?))
    }

    /// The underlying database.
    #[must_use]
    pub const fn database(&self) -> &Database {
        &self.db
    }

    /// Composite email operations.
    #[must_use]
    pub fn email_service(&self) -> EmailService {
        EmailService::new(
            self.messages.clone(),
            self.recipients.clone(),
            self.attachments.clone(),
            self.transactions.clone(),
        )
    }

    /// Account operations.
    #[must_use]
    pub fn account_service(&self) -> AccountService {
        AccountService::new(self.accounts.clone())
    }

    /// Single-message operations.
    #[must_use]
    pub fn message_service(&self) -> MessageService {
        MessageService::new(self.messages.clone())
    }

    /// Recipient operations.
    #[must_use]
    pub fn recipient_service(&self) -> RecipientService {
        RecipientService::new(self.recipients.clone())
    }

    /// Attachment metadata operations.
    #[must_use]
    pub fn attachment_service(&self) -> AttachmentService {
        AttachmentService::new(self.attachments.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entity::{Email, Message, Recipient, RecipientType};
    use crate::Context;

    #[tokio::test]
    async fn test_file_store_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            database_path: Some(dir.path().join("nested").join("mail.db")),
            ..StoreConfig::default()
        };
        let ctx = Context::new();

        let store = SqliteStore::open(&config).await.unwrap();
        let account = store
            .account_service()
            .create(&ctx, "a@x.com", "Google")
            .await
            .unwrap();
        let mut email = Email::new(Message::new(account.id.unwrap(), "s@x.com"))
            .with_recipient(Recipient::new("b@x.com", RecipientType::Bcc));
        store.email_service().create(&ctx, &mut email).await.unwrap();
        store.database().close().await;

        let reopened = SqliteStore::open(&config).await.unwrap();
        let fetched = reopened
            .email_service()
            .get_by_id(&ctx, email.id().unwrap())
            .await
            .unwrap();
        assert_eq!(fetched.recipients[0].recipient_type, RecipientType::Bcc);
    }
}
