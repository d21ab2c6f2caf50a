//! Domain entities.
//!
//! Records are plain data. Identifiers are `None` until the store assigns
//! them; enumerations parse from their stored string form and reject
//! anything outside their fixed value set.

mod account;
mod attachment;
mod email;
mod message;
mod recipient;
mod validation;

pub use account::{Account, AccountType};
pub use attachment::Attachment;
pub use email::Email;
pub use message::{Importance, Message};
pub use recipient::{Recipient, RecipientType};
pub use validation::ValidationError;

/// Declares an `i64` row identifier newtype.
macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        pub struct $name(pub i64);

        impl $name {
            /// Wrap a raw row id.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

row_id!(
    /// Unique identifier for an account.
    AccountId
);
row_id!(
    /// Unique identifier for a message.
    MessageId
);
row_id!(
    /// Unique identifier for a recipient row.
    RecipientId
);
row_id!(
    /// Unique identifier for an attachment row.
    AttachmentId
);
