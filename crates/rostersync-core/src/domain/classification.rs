//! Email classification
//!
//! Records what kind of directory object owns each known address. Built once
//! per snapshot and read-only afterwards.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::newtypes::Email;

/// Kind of directory object an email address belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailKind {
    /// Primary address of a user
    User,
    /// Address of a group
    Group,
    /// Secondary address or alias of a user
    Alias,
}

impl std::fmt::Display for EmailKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EmailKind::User => "user",
            EmailKind::Group => "group",
            EmailKind::Alias => "alias",
        };
        write!(f, "{}", s)
    }
}

/// Email address to [`EmailKind`] table
///
/// A primary user address always takes precedence: once an address is
/// recorded as [`EmailKind::User`] it is never downgraded, whatever order
/// the remaining addresses are recorded in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailClassification {
    kinds: HashMap<Email, EmailKind>,
}

impl EmailClassification {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a group address
    pub fn record_group(&mut self, email: Email) {
        self.record(email, EmailKind::Group);
    }

    /// Records a secondary address or alias of a user
    pub fn record_alias(&mut self, email: Email) {
        self.record(email, EmailKind::Alias);
    }

    /// Records a primary user address, overwriting any earlier kind
    pub fn record_primary(&mut self, email: Email) {
        self.kinds.insert(email, EmailKind::User);
    }

    fn record(&mut self, email: Email, kind: EmailKind) {
        match self.kinds.get(&email) {
            Some(EmailKind::User) => {}
            _ => {
                self.kinds.insert(email, kind);
            }
        }
    }

    /// Returns the kind recorded for an address
    pub fn get(&self, email: &Email) -> Option<EmailKind> {
        self.kinds.get(email).copied()
    }

    /// Returns true if the address is known at all
    pub fn contains(&self, email: &Email) -> bool {
        self.kinds.contains_key(email)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Number of addresses of the given kind
    pub fn count(&self, kind: EmailKind) -> usize {
        self.kinds.values().filter(|k| **k == kind).count()
    }
}
