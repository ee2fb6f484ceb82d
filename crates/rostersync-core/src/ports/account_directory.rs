//! Account directory port
//!
//! A read-only view over one side of a reconciliation: the accounts it holds
//! and, optionally, what it knows about other addresses. Directory snapshots
//! and target-side team listings both implement it.

use crate::domain::{AccountMap, Email, EmailKind};

/// Port trait for a read-only account listing
pub trait IAccountDirectory: Send + Sync {
    /// Returns every account, keyed by email
    ///
    /// Repeated calls return the same table.
    fn accounts(&self) -> &AccountMap;

    /// Returns the kind of directory object that owns an address
    ///
    /// Directories that do not classify addresses return `None`.
    fn email_classification(&self, _email: &Email) -> Option<EmailKind> {
        None
    }
}

impl IAccountDirectory for AccountMap {
    fn accounts(&self) -> &AccountMap {
        self
    }
}
