//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the domain core
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IDirectoryProvider`] - Paginated reads from a vendor directory
//! - [`IAccountDirectory`] - Read-only account table of one reconciliation side
//! - [`IEmailResolver`] - Live "does this address exist" lookups
//! - [`IConnector`] - Membership mutations on the target system

pub mod account_directory;
pub mod connector;
pub mod directory_provider;
pub mod email_resolver;

pub use account_directory::IAccountDirectory;
pub use connector::IConnector;
pub use directory_provider::{
    DirectoryGroup, DirectoryMember, DirectoryUser, IDirectoryProvider, Page, ProviderError,
    ProviderResult, UserEmail, UserName,
};
pub use email_resolver::IEmailResolver;
