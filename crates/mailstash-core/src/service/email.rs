//! Composite email operations.
//!
//! An [`Email`] spans three tables. Creation and deletion touch all of them
//! inside one transaction so a failure never leaves a message without its
//! recipients (or orphaned children without a message).

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::pagination::{PageRequest, PaginatedEmails};
use crate::entity::{
    AccountId, AttachmentId, Email, Importance, Message, MessageId, RecipientId, ValidationError,
};
use crate::repository::{
    AttachmentRepository, EmailTransaction, MessageRepository, RecipientRepository,
    TransactionProvider,
};
use crate::{Context, Error, Result};

/// Ids assigned by a committed create.
struct StoredIds {
    message: MessageId,
    recipients: Vec<RecipientId>,
    attachments: Vec<AttachmentId>,
}

/// Creates, reads, lists and deletes composite emails.
#[derive(Clone)]
pub struct EmailService {
    messages: Arc<dyn MessageRepository>,
    recipients: Arc<dyn RecipientRepository>,
    attachments: Arc<dyn AttachmentRepository>,
    transactions: Arc<dyn TransactionProvider>,
}

impl EmailService {
    /// Wire the service to its storage ports.
    #[must_use]
    pub fn new(
        messages: Arc<dyn MessageRepository>,
        recipients: Arc<dyn RecipientRepository>,
        attachments: Arc<dyn AttachmentRepository>,
        transactions: Arc<dyn TransactionProvider>,
    ) -> Self {
        Self {
            messages,
            recipients,
            attachments,
            transactions,
        }
    }

    /// Store a message with its recipients and attachments atomically.
    ///
    /// An absent importance is stored as [`Importance::Normal`]. On success
    /// every record in `email` carries its assigned id and owning message id;
    /// on failure none of them are touched.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::MessageRequired`] / [`ValidationError::RecipientsRequired`]
    ///   before anything is written.
    /// - [`Error::EmailCreationFailed`] wrapping the cause once the
    ///   transaction has been rolled back.
    pub async fn create(&self, ctx: &Context, email: &mut Email) -> Result<()> {
        if email.message.is_none() {
            return Err(ValidationError::MessageRequired.into());
        }
        if email.recipients.is_empty() {
            return Err(ValidationError::RecipientsRequired.into());
        }

        let ids = ctx.run(self.insert_all(email)).await.map_err(|e| {
            error!(error = %e, "Email creation rolled back");
            Error::EmailCreationFailed(Box::new(e))
        })?;

        let message_id = ids.message;
        if let Some(message) = email.message.as_mut() {
            message.id = Some(message_id);
            message.importance.get_or_insert(Importance::Normal);
        }
        for (recipient, id) in email.recipients.iter_mut().zip(ids.recipients) {
            recipient.id = Some(id);
            recipient.message_id = Some(message_id);
        }
        for (attachment, id) in email.attachments.iter_mut().zip(ids.attachments) {
            attachment.id = Some(id);
            attachment.message_id = Some(message_id);
        }

        info!(
            message_id = %message_id,
            recipients = email.recipients.len(),
            attachments = email.attachments.len(),
            "Email created"
        );
        Ok(())
    }

    /// Load a message together with its recipients and attachments.
    ///
    /// # Errors
    ///
    /// [`Error::EmailNotFound`] when no message has this id; store failures
    /// are returned as they are.
    pub async fn get_by_id(&self, ctx: &Context, id: MessageId) -> Result<Email> {
        let message = self
            .messages
            .get_by_id(ctx, id)
            .await
            .map_err(|e| match e {
                Error::MessageNotFound(_) => Error::EmailNotFound(id),
                other => other,
            })?;

        self.assemble(ctx, id, message).await
    }

    /// One page of an account's emails, newest received first.
    ///
    /// A message whose recipients or attachments cannot be loaded is left
    /// out of the page and its id recorded in [`PaginatedEmails::skipped`].
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPageSize`] before any query when `page_size` is not in
    /// `1..=100`. Count and window queries fail the whole call.
    pub async fn list(
        &self,
        ctx: &Context,
        account_id: AccountId,
        page_size: u32,
        page: u32,
    ) -> Result<PaginatedEmails> {
        let request = PageRequest::new(page_size, page)?;

        let total_count = self.messages.count_by_account(ctx, account_id).await?;
        let messages = self
            .messages
            .list_by_account(ctx, account_id, request.page_size(), request.offset())
            .await?;

        let mut emails = Vec::with_capacity(messages.len());
        let mut skipped = Vec::new();
        for message in messages {
            let Some(id) = message.id else {
                continue;
            };
            match self.assemble(ctx, id, message).await {
                Ok(email) => emails.push(email),
                Err(e) if e.is_cancellation() => return Err(e),
                Err(e) => {
                    warn!(message_id = %id, error = %e, "Skipping email with unreadable details");
                    skipped.push(id);
                }
            }
        }

        debug!(
            account_id = %account_id,
            page = request.page(),
            returned = emails.len(),
            skipped = skipped.len(),
            "Listed emails"
        );

        Ok(PaginatedEmails {
            emails,
            total_count,
            page: request.page(),
            page_size: request.page_size(),
            total_pages: request.total_pages(total_count),
            skipped,
        })
    }

    /// Number of emails an account owns.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub async fn list_count(&self, ctx: &Context, account_id: AccountId) -> Result<u64> {
        self.messages.count_by_account(ctx, account_id).await
    }

    /// Delete a message with its recipients and attachments atomically.
    ///
    /// # Errors
    ///
    /// [`Error::EmailNotFound`] when no message has this id (nothing is
    /// removed), otherwise [`Error::EmailDeleteFailed`] wrapping the cause.
    pub async fn delete(&self, ctx: &Context, id: MessageId) -> Result<()> {
        ctx.run(self.delete_all(id)).await.map_err(|e| match e {
            Error::MessageNotFound(_) => {
                warn!(message_id = %id, "Email not found for deletion");
                Error::EmailNotFound(id)
            }
            other => {
                error!(message_id = %id, error = %other, "Email deletion rolled back");
                Error::EmailDeleteFailed(Box::new(other))
            }
        })?;

        info!(message_id = %id, "Email deleted");
        Ok(())
    }

    async fn assemble(&self, ctx: &Context, id: MessageId, message: Message) -> Result<Email> {
        let recipients = self.recipients.get_by_message_id(ctx, id).await?;
        let attachments = self.attachments.get_by_message_id(ctx, id).await?;
        Ok(Email {
            message: Some(message),
            recipients,
            attachments,
        })
    }

    async fn insert_all(&self, email: &Email) -> Result<StoredIds> {
        let mut tx = self.transactions.begin().await?;
        let outcome = write_email(tx.as_mut(), email).await;
        finish(tx, outcome).await
    }

    async fn delete_all(&self, id: MessageId) -> Result<()> {
        let mut tx = self.transactions.begin().await?;
        let outcome = remove_email(tx.as_mut(), id).await;
        finish(tx, outcome).await
    }
}

impl std::fmt::Debug for EmailService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailService").finish_non_exhaustive()
    }
}

async fn write_email(tx: &mut dyn EmailTransaction, email: &Email) -> Result<StoredIds> {
    let message = email
        .message
        .as_ref()
        .ok_or(ValidationError::MessageRequired)?;
    let message_id = tx.insert_message(message).await?;

    let mut recipients = Vec::with_capacity(email.recipients.len());
    for recipient in &email.recipients {
        recipients.push(tx.insert_recipient(message_id, recipient).await?);
    }

    let mut attachments = Vec::with_capacity(email.attachments.len());
    for attachment in &email.attachments {
        attachments.push(tx.insert_attachment(message_id, attachment).await?);
    }

    Ok(StoredIds {
        message: message_id,
        recipients,
        attachments,
    })
}

async fn remove_email(tx: &mut dyn EmailTransaction, id: MessageId) -> Result<()> {
    tx.delete_attachments(id).await?;
    tx.delete_recipients(id).await?;
    if tx.delete_message(id).await? == 0 {
        return Err(Error::MessageNotFound(id));
    }
    Ok(())
}

/// Commit on success, roll back on failure. A failed rollback is logged and
/// the write error returned.
async fn finish<T: Send>(mut tx: Box<dyn EmailTransaction>, outcome: Result<T>) -> Result<T> {
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = tx.rollback().await {
                warn!(error = %rollback, "Rollback failed");
            }
            Err(e)
        }
    }
}
