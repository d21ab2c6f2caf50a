//! Account model types.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::AccountId;
use super::validation::ValidationError;

/// Mail provider behind an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    /// Microsoft (Outlook / Exchange Online).
    Microsoft,
    /// Google (Gmail).
    Google,
}

impl AccountType {
    /// Stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Microsoft => "Microsoft",
            Self::Google => "Google",
        }
    }
}

impl FromStr for AccountType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Microsoft" => Ok(Self::Microsoft),
            "Google" => Ok(Self::Google),
            other => Err(ValidationError::InvalidAccountType(other.to_string())),
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mailbox owner. Owns zero or more messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Store-assigned id (`None` until saved).
    pub id: Option<AccountId>,
    /// Email address, unique across accounts.
    pub email: String,
    /// Provider type.
    pub account_type: AccountType,
}

impl Account {
    /// Creates an unsaved account.
    #[must_use]
    pub fn new(email: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            id: None,
            email: email.into(),
            account_type,
        }
    }
}
