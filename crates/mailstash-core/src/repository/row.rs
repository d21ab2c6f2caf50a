//! Column encoding shared by the `SQLite` repositories.
//!
//! Each insert helper takes any `SQLite` executor so the same statement runs
//! against the pool or inside a transaction.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{Sqlite, SqliteRow};
use sqlx::{Executor, Row};

use crate::entity::{
    Account, AccountId, Attachment, AttachmentId, Message, MessageId, Recipient, RecipientId,
    ValidationError,
};
use crate::Result;

pub(super) const MESSAGE_COLUMNS: &str = "id, account_id, subject, body, body_preview, \
    sender_email, sender_name, received_datetime, sent_datetime, is_draft, is_read, \
    importance, conversation_id";

pub(super) const RECIPIENT_COLUMNS: &str = "id, message_id, email, name, recipient_type";

pub(super) const ATTACHMENT_COLUMNS: &str =
    "id, message_id, filename, mime_type, size, local_path";

/// Timestamps are stored in UTC with a fixed width so that text order is
/// chronological order.
pub(super) fn encode_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_timestamp(row: &SqliteRow, column: &str) -> sqlx::Result<Option<DateTime<Utc>>> {
    row.try_get::<Option<String>, _>(column)?
        .map(|text| {
            DateTime::parse_from_rfc3339(&text)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| sqlx::Error::ColumnDecode {
                    index: column.to_string(),
                    source: Box::new(e),
                })
        })
        .transpose()
}

fn decode_enum<T>(row: &SqliteRow, column: &str) -> sqlx::Result<T>
where
    T: FromStr<Err = ValidationError>,
{
    let text: String = row.try_get(column)?;
    text.parse().map_err(|e: ValidationError| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

pub(super) fn row_to_account(row: &SqliteRow) -> Result<Account> {
    Ok(Account {
        id: Some(AccountId::new(row.try_get("id")?)),
        email: row.try_get("email")?,
        account_type: decode_enum(row, "account_type")?,
    })
}

pub(super) fn row_to_message(row: &SqliteRow) -> Result<Message> {
    Ok(Message {
        id: Some(MessageId::new(row.try_get("id")?)),
        account_id: AccountId::new(row.try_get("account_id")?),
        subject: row.try_get("subject")?,
        body: row.try_get("body")?,
        body_preview: row.try_get("body_preview")?,
        sender_email: row.try_get("sender_email")?,
        sender_name: row.try_get("sender_name")?,
        received_datetime: decode_timestamp(row, "received_datetime")?,
        sent_datetime: decode_timestamp(row, "sent_datetime")?,
        is_draft: row.try_get("is_draft")?,
        is_read: row.try_get("is_read")?,
        importance: Some(decode_enum(row, "importance")?),
        conversation_id: row.try_get("conversation_id")?,
    })
}

pub(super) fn row_to_recipient(row: &SqliteRow) -> Result<Recipient> {
    Ok(Recipient {
        id: Some(RecipientId::new(row.try_get("id")?)),
        message_id: Some(MessageId::new(row.try_get("message_id")?)),
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        recipient_type: decode_enum(row, "recipient_type")?,
    })
}

pub(super) fn row_to_attachment(row: &SqliteRow) -> Result<Attachment> {
    let size: i64 = row.try_get("size")?;
    Ok(Attachment {
        id: Some(AttachmentId::new(row.try_get("id")?)),
        message_id: Some(MessageId::new(row.try_get("message_id")?)),
        filename: row.try_get("filename")?,
        mime_type: row.try_get("mime_type")?,
        size: u64::try_from(size).map_err(|e| sqlx::Error::ColumnDecode {
            index: "size".to_string(),
            source: Box::new(e),
        })?,
        local_path: row.try_get("local_path")?,
    })
}

/// Insert a message row. An absent importance is stored as Normal.
pub(super) async fn insert_message<'e, E>(executor: E, message: &Message) -> Result<MessageId>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r"
        INSERT INTO messages (
            account_id, subject, body, body_preview, sender_email, sender_name,
            received_datetime, sent_datetime, is_draft, is_read, importance, conversation_id
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
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
    .execute(executor)
    .await?;

    Ok(MessageId::new(result.last_insert_rowid()))
}

/// Insert a recipient row under `message_id`.
pub(super) async fn insert_recipient<'e, E>(
    executor: E,
    message_id: MessageId,
    recipient: &Recipient,
) -> Result<RecipientId>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r"
        INSERT INTO recipients (message_id, email, name, recipient_type)
        VALUES (?, ?, ?, ?)
        ",
    )
    .bind(message_id.0)
    .bind(&recipient.email)
    .bind(recipient.name.as_deref())
    .bind(recipient.recipient_type.as_str())
    .execute(executor)
    .await?;

    Ok(RecipientId::new(result.last_insert_rowid()))
}

/// Insert an attachment row under `message_id`.
pub(super) async fn insert_attachment<'e, E>(
    executor: E,
    message_id: MessageId,
    attachment: &Attachment,
) -> Result<AttachmentId>
where
    E: Executor<'e, Database = Sqlite>,
{
    let size = i64::try_from(attachment.size)
        .map_err(|_| ValidationError::InvalidAttachmentSize(attachment.size))?;

    let result = sqlx::query(
        r"
        INSERT INTO attachments (message_id, filename, mime_type, size, local_path)
        VALUES (?, ?, ?, ?, ?)
        ",
    )
    .bind(message_id.0)
    .bind(&attachment.filename)
    .bind(&attachment.mime_type)
    .bind(size)
    .bind(attachment.local_path.as_deref())
    .execute(executor)
    .await?;

    Ok(AttachmentId::new(result.last_insert_rowid()))
}

pub(super) async fn delete_by_message<'e, E>(
    executor: E,
    table: ChildTable,
    message_id: MessageId,
) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(table.delete_sql())
        .bind(message_id.0)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub(super) async fn delete_message_row<'e, E>(executor: E, id: MessageId) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM messages WHERE id = ?")
        .bind(id.0)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// Tables whose rows belong to a message.
#[derive(Debug, Clone, Copy)]
pub(super) enum ChildTable {
    Recipients,
    Attachments,
}

impl ChildTable {
    const fn delete_sql(self) -> &'static str {
        match self {
            Self::Recipients => "DELETE FROM recipients WHERE message_id = ?",
            Self::Attachments => "DELETE FROM attachments WHERE message_id = ?",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_text_sorts_chronologically() {
        let earlier = Utc.with_ymd_and_hms(2024, 1, 9, 23, 59, 59).single();
        let later = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).single();
        let (Some(earlier), Some(later)) = (earlier, later) else {
            panic!("valid dates");
        };

        let a = encode_timestamp(earlier);
        let b = encode_timestamp(later);
        assert!(a < b);
        assert_eq!(a, "2024-01-09T23:59:59.000000Z");
    }
}
