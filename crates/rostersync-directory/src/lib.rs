//! RosterSync Directory - Snapshots of a vendor identity directory
//!
//! Turns a paginated [`IDirectoryProvider`] into an immutable, fully
//! resolved view of one directory:
//! - Pagination is drained into complete listings
//! - Every distinct listing is fetched at most once per snapshot
//! - Nested groups and organization-wide members are flattened without
//!   ever recursing into a group twice
//!
//! ## Modules
//!
//! - [`paging`] - Drains continuation-token listings into one sequence
//! - [`cache`] - Single-flight memoization of provider listings
//! - [`records`] - Mapping of raw provider records into domain types
//! - [`resolver`] - Recursive, cycle-safe group membership expansion
//! - [`snapshot`] - Account catalog and email classification of one directory
//! - [`memory`] - In-memory provider for offline runs and tests
//!
//! [`IDirectoryProvider`]: rostersync_core::ports::IDirectoryProvider

pub mod cache;
pub mod memory;
pub mod paging;
pub mod records;
pub mod resolver;
pub mod snapshot;

pub use cache::{CacheKey, CachingDirectoryProvider};
pub use memory::InMemoryDirectoryProvider;
pub use paging::PagingAccumulator;
pub use resolver::GroupResolver;
pub use snapshot::DirectorySnapshot;

use rostersync_core::ports::ProviderError;
use thiserror::Error;

/// Errors that can occur while building or reading a directory snapshot
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// A page of a listing could not be fetched; the snapshot is unusable
    #[error("Fetching {operation} failed: {source}")]
    ProviderFetchFailed {
        /// Listing that failed, e.g. `"members:tokyo@example.com"`
        operation: String,
        /// Provider-level cause
        source: ProviderError,
    },

    /// The memo table holds a listing of the wrong kind for its key
    #[error("Cache invariant violated for key {key}")]
    CacheInvariantViolation { key: String },

    /// A group member of a kind the resolver does not handle
    ///
    /// Never returned; resolution logs it and continues.
    #[error("Unknown member type '{kind}' in group {parent}")]
    UnknownMemberType { kind: String, parent: String },
}

impl DirectoryError {
    /// Returns true if the failure came from rejected credentials
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            DirectoryError::ProviderFetchFailed { source, .. } if source.is_auth_error()
        )
    }
}

/// Result type alias for directory operations
pub type DirectoryResult<T> = Result<T, DirectoryError>;
