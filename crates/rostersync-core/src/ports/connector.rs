//! Connector port (driven/secondary port)
//!
//! The write side of a reconciliation: the target system whose team
//! membership is brought in line with the authority directory.

use crate::domain::Email;

/// Port trait for mutating the target team
///
/// Implementations report failures per call; the sync engine logs them and
/// carries on with the remaining accounts.
#[async_trait::async_trait]
pub trait IConnector: Send + Sync {
    /// Short name used in log fields, e.g. `"slack"`
    fn name(&self) -> &str {
        "connector"
    }

    /// Removes one member from the target team
    async fn remove_member(&self, email: &Email) -> anyhow::Result<()>;
}
