//! Operation log entities
//!
//! Every mutation the sync engine issues against the target directory is
//! recorded as an [`OperationEntry`]. The log is what operators read after a
//! run, and what tests assert against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::newtypes::{Email, RunId};

/// Mutations issued against the target directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Remove a member from the target team
    MembersRemove,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Operation::MembersRemove => "MembersRemove",
        };
        write!(f, "{}", s)
    }
}

/// Outcome of a recorded operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationResult {
    /// The connector applied the operation
    Success,
    /// The connector rejected or failed the operation
    Failed {
        /// Human-readable error message
        message: String,
    },
    /// Dry run: the operation would have been issued
    Planned,
    /// The operation was deliberately not issued
    Skipped {
        /// Why the operation was withheld
        reason: String,
    },
}

impl OperationResult {
    /// Creates a failed result with the given message
    pub fn failed(message: impl Into<String>) -> Self {
        OperationResult::Failed {
            message: message.into(),
        }
    }

    /// Creates a skipped result with the given reason
    pub fn skipped(reason: impl Into<String>) -> Self {
        OperationResult::Skipped {
            reason: reason.into(),
        }
    }

    /// Returns true if the operation was applied
    pub fn is_success(&self) -> bool {
        matches!(self, OperationResult::Success)
    }

    /// Returns true if the operation failed
    pub fn is_failed(&self) -> bool {
        matches!(self, OperationResult::Failed { .. })
    }
}

/// A single entry in the operation log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationEntry {
    /// When the operation was attempted
    timestamp: DateTime<Utc>,
    /// Run that issued the operation
    run_id: Option<RunId>,
    /// What was done
    operation: Operation,
    /// Account the operation applies to
    subject: Email,
    /// How it went
    result: OperationResult,
    /// Additional structured details
    details: Value,
}

impl OperationEntry {
    /// Creates a new entry timestamped now
    pub fn new(operation: Operation, subject: Email, result: OperationResult) -> Self {
        Self {
            timestamp: Utc::now(),
            run_id: None,
            operation,
            subject,
            result,
            details: Value::Null,
        }
    }

    /// Returns when the operation was attempted
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the run ID if present
    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    /// Returns the operation
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Returns the subject email
    pub fn subject(&self) -> &Email {
        &self.subject
    }

    /// Returns the result
    pub fn result(&self) -> &OperationResult {
        &self.result
    }

    /// Returns the additional details
    pub fn details(&self) -> &Value {
        &self.details
    }

    /// Compact `Operation:subject` form, e.g. `MembersRemove:c@example.com`
    pub fn summary(&self) -> String {
        format!("{}:{}", self.operation, self.subject)
    }

    /// Sets the run ID
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Sets additional details
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}
