//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! mostly validation failures when raw directory values are mapped
//! into domain newtypes.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid email address format
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    /// Invalid group key (empty or blank)
    #[error("Invalid group key: {0}")]
    InvalidGroupKey(String),

    /// Invalid pagination token
    #[error("Invalid page token: {0}")]
    InvalidPageToken(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// ID parsing error
    #[error("Invalid ID format: {0}")]
    InvalidId(String),
}
