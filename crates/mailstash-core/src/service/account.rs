//! Account management.

use std::sync::Arc;

use tracing::info;

use crate::entity::{Account, AccountId, AccountType};
use crate::repository::AccountRepository;
use crate::{Context, Result};

/// Validating wrapper over an [`AccountRepository`].
#[derive(Clone)]
pub struct AccountService {
    repo: Arc<dyn AccountRepository>,
}

impl AccountService {
    /// Wrap a repository.
    #[must_use]
    pub fn new(repo: Arc<dyn AccountRepository>) -> Self {
        Self { repo }
    }

    /// Create an account from its address and provider name.
    ///
    /// # Errors
    ///
    /// `InvalidAccountType` unless `account_type` is `Microsoft` or `Google`;
    /// store failures (such as a duplicate address) wrapped with context.
    pub async fn create(&self, ctx: &Context, email: &str, account_type: &str) -> Result<Account> {
        let account_type: AccountType = account_type.parse()?;
        let mut account = Account::new(email, account_type);

        self.repo
            .create(ctx, &mut account)
            .await
            .map_err(|e| e.during("create account"))?;

        info!(email = %account.email, account_type = %account.account_type, "Account registered");
        Ok(account)
    }

    /// Fetch an account by id.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` when absent.
    pub async fn get(&self, ctx: &Context, id: AccountId) -> Result<Account> {
        self.repo
            .get_by_id(ctx, id)
            .await
            .map_err(|e| e.during("get account"))
    }

    /// Fetch an account by address.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` when absent.
    pub async fn get_by_email(&self, ctx: &Context, email: &str) -> Result<Account> {
        self.repo
            .get_by_email(ctx, email)
            .await
            .map_err(|e| e.during("get account"))
    }

    /// Delete an account. Fails while it still owns messages.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` when absent; constraint failures wrapped with context.
    pub async fn delete(&self, ctx: &Context, id: AccountId) -> Result<()> {
        self.repo
            .delete(ctx, id)
            .await
            .map_err(|e| e.during("delete account"))
    }

    /// All accounts.
    ///
    /// # Errors
    ///
    /// Store failures wrapped with context.
    pub async fn list(&self, ctx: &Context) -> Result<Vec<Account>> {
        self.repo
            .list(ctx)
            .await
            .map_err(|e| e.during("list accounts"))
    }
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entity::{Message, ValidationError};
    use crate::repository::{
        MessageRepository, MockAccountRepository, SqliteAccountRepository, SqliteMessageRepository,
    };
    use crate::{Database, Error};

    #[tokio::test]
    async fn test_create_parses_account_type() {
        let db = Database::in_memory().await.unwrap();
        let service = AccountService::new(Arc::new(SqliteAccountRepository::new(&db)));
        let ctx = Context::new();

        let account = service.create(&ctx, "a@x.com", "Google").await.unwrap();
        assert_eq!(account.account_type, AccountType::Google);

        let fetched = service.get_by_email(&ctx, "a@x.com").await.unwrap();
        assert_eq!(fetched.id, account.id);
        assert_eq!(service.list(&ctx).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_account_type_never_reaches_store() {
        let service = AccountService::new(Arc::new(MockAccountRepository::new()));

        let err = service
            .create(&Context::new(), "a@x.com", "Yahoo")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidAccountType(ref t)) if t == "Yahoo"
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_wrapped() {
        let db = Database::in_memory().await.unwrap();
        let service = AccountService::new(Arc::new(SqliteAccountRepository::new(&db)));
        let ctx = Context::new();

        service.create(&ctx, "a@x.com", "Google").await.unwrap();
        let err = service.create(&ctx, "a@x.com", "Microsoft").await.unwrap_err();
        assert!(matches!(err, Error::Operation { action: "create account", .. }));
    }

    #[tokio::test]
    async fn test_delete_account_with_messages_fails() {
        let db = Database::in_memory().await.unwrap();
        let service = AccountService::new(Arc::new(SqliteAccountRepository::new(&db)));
        let ctx = Context::new();

        let account = service.create(&ctx, "a@x.com", "Microsoft").await.unwrap();
        let account_id = account.id.unwrap();
        let mut message = Message::new(account_id, "s@x.com");
        SqliteMessageRepository::new(&db)
            .create(&ctx, &mut message)
            .await
            .unwrap();

        let err = service.delete(&ctx, account_id).await.unwrap_err();
        assert!(matches!(err, Error::Operation { action: "delete account", .. }));

        let err = service.get(&ctx, AccountId(77)).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
