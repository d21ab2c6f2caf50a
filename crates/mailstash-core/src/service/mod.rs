//! Business operations over the storage ports.

mod account;
mod attachment;
mod email;
mod message;
mod pagination;
mod recipient;

pub use account::AccountService;
pub use attachment::AttachmentService;
pub use email::EmailService;
pub use message::MessageService;
pub use pagination::{MAX_PAGE_SIZE, PageRequest, PaginatedEmails};
pub use recipient::RecipientService;
