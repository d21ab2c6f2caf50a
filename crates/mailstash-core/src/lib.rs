//! # mailstash-core
//!
//! Local storage layer for a desktop email viewer.
//!
//! This crate provides:
//! - Domain entities (accounts, messages, recipients, attachments)
//! - Repository traits with `SQLite` implementations
//! - **Email Service** - atomic create/delete of a message together with its
//!   recipients and attachments, plus paginated listings by receipt time
//! - Thin validating services for each single entity
//! - A cancellable, deadline-bound [`Context`] honoured by every store call
//!
//! # Example
//!
//! ```ignore
//! use mailstash_core::{Context, Email, Message, Recipient, RecipientType, SqliteStore};
//!
//! let store = SqliteStore::in_memory().await?;
//! let account = store.account_service().create(&ctx, "a@x.com", "Google").await?;
//!
//! let mut email = Email::new(Message::new(account.id?, "sender@x.com").with_subject("Hi"))
//!     .with_recipient(Recipient::new("b@x.com", RecipientType::To));
//! store.email_service().create(&ctx, &mut email).await?;
//!
//! let page = store.email_service().list(&ctx, account_id, 20, 1).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
mod context;
pub mod db;
pub mod entity;
mod error;
pub mod logging;
pub mod repository;
pub mod service;
mod store;

pub use config::StoreConfig;
pub use context::Context;
pub use db::Database;
pub use entity::{
    Account, AccountId, AccountType, Attachment, AttachmentId, Email, Importance, Message,
    MessageId, Recipient, RecipientId, RecipientType, ValidationError,
};
pub use error::{Error, Result};
pub use repository::{
    AccountRepository, AttachmentRepository, EmailTransaction, MessageRepository,
    RecipientRepository, TransactionProvider,
};
pub use service::{
    AccountService, AttachmentService, EmailService, MAX_PAGE_SIZE, MessageService, PageRequest,
    PaginatedEmails, RecipientService,
};
pub use store::SqliteStore;
