//! Account storage repository.

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use tracing::{debug, info, warn};

use super::AccountRepository;
use super::row::row_to_account;
use crate::entity::{Account, AccountId};
use crate::{Context, Database, Error, Result};

/// `SQLite`-backed [`AccountRepository`].
#[derive(Debug, Clone)]
pub struct SqliteAccountRepository {
    pool: SqlitePool,
}

impl SqliteAccountRepository {
    /// Create a repository over an open database.
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[async_trait]
impl AccountRepository for SqliteAccountRepository {
    async fn create(&self, ctx: &Context, account: &mut Account) -> Result<AccountId> {
        let result = ctx
            .run(async {
                sqlx::query("INSERT INTO accounts (email, account_type) VALUES (?, ?)")
                    .bind(&account.email)
                    .bind(account.account_type.as_str())
                    .execute(&self.pool)
                    .await
                    .map_err(Error::from)
            })
            .await?;

        let id = AccountId::new(result.last_insert_rowid());
        account.id = Some(id);
        info!(account_id = %id, email = %account.email, "Account created");
        Ok(id)
    }

    async fn get_by_id(&self, ctx: &Context, id: AccountId) -> Result<Account> {
        let row = ctx
            .run(async {
                sqlx::query("SELECT id, email, account_type FROM accounts WHERE id = ?")
                    .bind(id.0)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(Error::from)
            })
            .await?;

        match row {
            Some(row) => row_to_account(&row),
            None => {
                debug!(account_id = %id, "Account not found");
                Err(Error::AccountNotFound(id.to_string()))
            }
        }
    }

    async fn get_by_email(&self, ctx: &Context, email: &str) -> Result<Account> {
        let row = ctx
            .run(async {
                sqlx::query("SELECT id, email, account_type FROM accounts WHERE email = ?")
                    .bind(email)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(Error::from)
            })
            .await?;

        row.as_ref()
            .map(row_to_account)
            .transpose()?
            .ok_or_else(|| Error::AccountNotFound(email.to_string()))
    }

    async fn delete(&self, ctx: &Context, id: AccountId) -> Result<()> {
        let result = ctx
            .run(async {
                sqlx::query("DELETE FROM accounts WHERE id = ?")
                    .bind(id.0)
                    .execute(&self.pool)
                    .await
                    .map_err(Error::from)
            })
            .await?;

        if result.rows_affected() == 0 {
            warn!(account_id = %id, "Account not found for deletion");
            return Err(Error::AccountNotFound(id.to_string()));
        }

        info!(account_id = %id, "Account deleted");
        Ok(())
    }

    async fn list(&self, ctx: &Context) -> Result<Vec<Account>> {
        let rows = ctx
            .run(async {
                sqlx::query("SELECT id, email, account_type FROM accounts ORDER BY id")
                    .fetch_all(&self.pool)
                    .await
                    .map_err(Error::from)
            })
            .await?;

        rows.iter().map(row_to_account).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entity::AccountType;

    async fn repo() -> SqliteAccountRepository {
        SqliteAccountRepository::new(&Database::in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn test_create_and_retrieve_account() {
        let repo = repo().await;
        let ctx = Context::new();

        let mut account = Account::new("test@example.com", AccountType::Google);
        let id = repo.create(&ctx, &mut account).await.unwrap();
        assert_eq!(account.id, Some(id));

        let by_id = repo.get_by_id(&ctx, id).await.unwrap();
        assert_eq!(by_id, account);

        let by_email = repo.get_by_email(&ctx, "test@example.com").await.unwrap();
        assert_eq!(by_email.id, Some(id));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = repo().await;
        let ctx = Context::new();

        let mut first = Account::new("dup@example.com", AccountType::Google);
        repo.create(&ctx, &mut first).await.unwrap();

        let mut second = Account::new("dup@example.com", AccountType::Microsoft);
        let err = repo.create(&ctx, &mut second).await.unwrap_err();
        assert!(matches!(err, Error::Database(_)));
        assert_eq!(second.id, None);
    }

    #[tokio::test]
    async fn test_missing_account() {
        let repo = repo().await;
        let ctx = Context::new();

        let err = repo.get_by_id(&ctx, AccountId(42)).await.unwrap_err();
        assert!(matches!(err, Error::AccountNotFound(_)));

        let err = repo.get_by_email(&ctx, "nobody@x.com").await.unwrap_err();
        assert!(matches!(err, Error::AccountNotFound(ref e) if e == "nobody@x.com"));

        let err = repo.delete(&ctx, AccountId(42)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_accounts() {
        let repo = repo().await;
        let ctx = Context::new();
        assert!(repo.list(&ctx).await.unwrap().is_empty());

        let mut a = Account::new("user1@example.com", AccountType::Google);
        let mut b = Account::new("user2@example.com", AccountType::Microsoft);
        repo.create(&ctx, &mut a).await.unwrap();
        repo.create(&ctx, &mut b).await.unwrap();

        let accounts = repo.list(&ctx).await.unwrap();
        assert_eq!(accounts, vec![a, b]);
    }
}
