//! RosterSync Sync - Deprovisioning engine
//!
//! Provides:
//! - Set difference of a target roster against an authority directory
//! - Removal of every target account the authority no longer knows
//! - Dry runs, optional live confirmation and an operation log
//!
//! ## Modules
//!
//! - [`engine`] - Sync engine, deprovision set computation and run reports

pub mod engine;

pub use engine::{compute_deprovision_set, SyncEngine, SyncOptions, SyncOutcome, SyncReport};

use rostersync_core::domain::Email;
use rostersync_directory::DirectoryError;
use thiserror::Error;

/// Errors that can occur during a sync run
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// A directory snapshot could not be built
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// The connector failed to remove one account
    #[error("Failed to remove {email}: {message}")]
    ConnectorOperationFailed { email: Email, message: String },

    /// The live confirmation lookup failed for one account
    #[error("Could not confirm {email} before removal: {message}")]
    ConfirmationFailed { email: Email, message: String },

    /// Confirmation is enabled but no resolver was supplied
    #[error("sync.confirm_before_remove is set but no confirmation resolver is configured")]
    ConfirmationUnavailable,

    /// The run finished but some accounts could not be removed
    #[error("{} removal(s) failed: {}", .failed.len(), join_emails(.failed))]
    PartialFailure { failed: Vec<Email> },
}

impl SyncError {
    /// The account a per-account failure refers to
    pub fn email(&self) -> Option<&Email> {
        match self {
            SyncError::ConnectorOperationFailed { email, .. }
            | SyncError::ConfirmationFailed { email, .. } => Some(email),
            _ => None,
        }
    }
}

fn join_emails(emails: &[Email]) -> String {
    emails
        .iter()
        .map(Email::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
