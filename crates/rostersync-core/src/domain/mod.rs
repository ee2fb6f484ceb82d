//! Domain entities and business logic
//!
//! This module contains the core domain types for RosterSync:
//! - Newtypes for validated identifiers (emails, group keys, page tokens)
//! - Accounts and groups
//! - Email classification
//! - Operation log entries
//! - Domain-specific error types

pub mod account;
pub mod classification;
pub mod errors;
pub mod group;
pub mod newtypes;
pub mod operation;

// Re-export commonly used types
pub use account::{account_map, Account, AccountMap};
pub use classification::{EmailClassification, EmailKind};
pub use errors::DomainError;
pub use group::Group;
pub use newtypes::*;
pub use operation::{Operation, OperationEntry, OperationResult};
