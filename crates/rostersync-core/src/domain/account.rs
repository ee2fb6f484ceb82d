//! Account domain entity
//!
//! An [`Account`] is a person known to a directory, identified solely by
//! email address. Two accounts with the same (case-insensitive) email are the
//! same entity regardless of their name fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::newtypes::Email;

/// Accounts keyed by email address
///
/// Ordered so that reports and logs are deterministic.
pub type AccountMap = BTreeMap<Email, Account>;

/// A directory account
///
/// Immutable once created: accounts are produced when raw user records are
/// mapped into a snapshot and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Identity key
    email: Email,
    /// Given (first) name, empty when the source record did not carry one
    given_name: String,
    /// Surname (family name), empty when the source record did not carry one
    surname: String,
}

impl Account {
    /// Creates an account known only by its email address
    ///
    /// Group member listings usually carry nothing but the address.
    pub fn new(email: Email) -> Self {
        Self {
            email,
            given_name: String::new(),
            surname: String::new(),
        }
    }

    /// Creates an account with name fields populated
    pub fn with_name(
        email: Email,
        given_name: impl Into<String>,
        surname: impl Into<String>,
    ) -> Self {
        Self {
            email,
            given_name: given_name.into(),
            surname: surname.into(),
        }
    }

    /// Returns the account's email address
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Returns the given name
    pub fn given_name(&self) -> &str {
        &self.given_name
    }

    /// Returns the surname
    pub fn surname(&self) -> &str {
        &self.surname
    }

    /// Returns "given surname", or the email when no name is known
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.given_name, self.surname);
        let name = name.trim();
        if name.is_empty() {
            self.email.to_string()
        } else {
            name.to_string()
        }
    }
}

/// Collects accounts into an [`AccountMap`]
///
/// When the same email appears more than once the last account wins.
pub fn account_map<I>(accounts: I) -> AccountMap
where
    I: IntoIterator<Item = Account>,
{
    accounts
        .into_iter()
        .map(|account| (account.email.clone(), account))
        .collect()
}
