//! Email resolver port
//!
//! Answers "does this address still exist in the authority directory?".
//! The sync engine can consult it right before removing an account, so that
//! an account renamed or re-created after the snapshot was taken is kept.

use crate::domain::Email;

/// Port trait for live address lookups
#[async_trait::async_trait]
pub trait IEmailResolver: Send + Sync {
    /// Returns true if the address belongs to any user, group or alias
    async fn exists(&self, email: &Email) -> anyhow::Result<bool>;
}
