//! Directory provider port (driven/secondary port)
//!
//! This module defines the interface for reading a vendor identity directory.
//! Every listing is paginated with an opaque continuation token; callers
//! drain pages until the provider stops returning a token.
//!
//! ## Design Notes
//!
//! - Uses a dedicated [`ProviderError`] instead of `anyhow::Error` because
//!   callers need to tell authentication failures apart from transport
//!   failures when reporting them.
//! - Uses `#[async_trait]` for async trait methods.
//! - [`DirectoryUser`], [`DirectoryGroup`] and [`DirectoryMember`] are
//!   port-level DTOs that decode from the vendor's JSON shape. They are
//!   mapped into domain entities by the directory crate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::newtypes::PageToken;

// ============================================================================
// ProviderError
// ============================================================================

/// Errors surfaced by a directory provider
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Credentials are missing, invalid or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Credentials are valid but lack the required scope
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Network-level failure (DNS, connect, TLS, timeout, 5xx)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The vendor throttled the request
    #[error("Rate limited, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    /// The requested group or organization does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The response could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Returns true for failures that re-authenticating would fix
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            ProviderError::Unauthorized(_) | ProviderError::Forbidden(_)
        )
    }

    /// Returns true for failures that re-running later may fix
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            ProviderError::Transport(_) | ProviderError::RateLimited { .. }
        )
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::InvalidResponse(err.to_string())
    }
}

/// Result type alias for provider calls
pub type ProviderResult<T> = Result<T, ProviderError>;

// ============================================================================
// Page
// ============================================================================

/// One page of a paginated listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page, in provider order
    pub items: Vec<T>,
    /// Token for the next page (None on the last page)
    pub next_token: Option<PageToken>,
}

impl<T> Page<T> {
    /// Creates a page followed by another page
    pub fn new(items: Vec<T>, next_token: Option<PageToken>) -> Self {
        Self { items, next_token }
    }

    /// Creates the final page of a listing
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: None,
        }
    }

    /// Returns true if more pages follow
    pub fn has_more(&self) -> bool {
        self.next_token.is_some()
    }
}

// ============================================================================
// DirectoryUser
// ============================================================================

/// Name of a directory user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserName {
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
}

/// One entry of a user's address list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEmail {
    pub address: String,
    /// Set by vendors that flag the primary entry inside the list
    #[serde(default)]
    pub primary: bool,
}

impl UserEmail {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            primary: false,
        }
    }
}

/// A user record as returned by the provider
///
/// `emails` usually repeats the primary address; `aliases` lists additional
/// addresses that deliver to the same mailbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryUser {
    pub primary_email: String,
    #[serde(default)]
    pub name: UserName,
    #[serde(default)]
    pub emails: Vec<UserEmail>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl DirectoryUser {
    /// Creates a user record with only a primary address
    pub fn new(primary_email: impl Into<String>) -> Self {
        Self {
            primary_email: primary_email.into(),
            name: UserName::default(),
            emails: Vec::new(),
            aliases: Vec::new(),
        }
    }

    /// Sets the name fields
    pub fn with_name(mut self, given_name: impl Into<String>, family_name: impl Into<String>) -> Self {
        self.name = UserName {
            given_name: given_name.into(),
            family_name: family_name.into(),
        };
        self
    }

    /// Appends addresses to the email list
    pub fn with_emails<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.emails
            .extend(emails.into_iter().map(|e| UserEmail::new(e)));
        self
    }

    /// Appends aliases
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Every address other than the primary one: list entries, then aliases
    ///
    /// Raw strings; duplicates and the primary itself may appear.
    pub fn secondary_addresses(&self) -> impl Iterator<Item = &str> {
        self.emails
            .iter()
            .map(|e| e.address.as_str())
            .chain(self.aliases.iter().map(String::as_str))
    }
}

// ============================================================================
// DirectoryGroup
// ============================================================================

/// A group record as returned by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryGroup {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub external_id: Option<String>,
}

impl DirectoryGroup {
    pub fn new(id: impl Into<String>, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: name.into(),
            external_id: None,
        }
    }
}

// ============================================================================
// DirectoryMember
// ============================================================================

/// A group member as returned by the provider
///
/// Decodes from `{"type": "USER" | "GROUP" | "CUSTOMER", "email": .., "id": ..}`.
/// Any other `type` decodes to [`DirectoryMember::Unknown`] instead of
/// failing, so one odd record does not abort a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MemberRecord", into = "MemberRecord")]
pub enum DirectoryMember {
    /// A single user, by address
    User { email: String },
    /// A nested group, by address
    Group { email: String },
    /// Every user of an organization (customer), by organization ID
    Customer { id: String },
    /// A member kind this crate does not understand
    Unknown { kind: String, id: String, email: String },
}

impl DirectoryMember {
    pub fn user(email: impl Into<String>) -> Self {
        DirectoryMember::User {
            email: email.into(),
        }
    }

    pub fn group(email: impl Into<String>) -> Self {
        DirectoryMember::Group {
            email: email.into(),
        }
    }

    pub fn customer(id: impl Into<String>) -> Self {
        DirectoryMember::Customer { id: id.into() }
    }

    /// Vendor name of the member kind
    pub fn kind(&self) -> &str {
        match self {
            DirectoryMember::User { .. } => "USER",
            DirectoryMember::Group { .. } => "GROUP",
            DirectoryMember::Customer { .. } => "CUSTOMER",
            DirectoryMember::Unknown { kind, .. } => kind,
        }
    }
}

/// Flat wire shape of a member record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct MemberRecord {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    email: String,
}

impl From<MemberRecord> for DirectoryMember {
    fn from(record: MemberRecord) -> Self {
        match record.kind.to_ascii_uppercase().as_str() {
            "USER" => DirectoryMember::User {
                email: record.email,
            },
            "GROUP" => DirectoryMember::Group {
                email: record.email,
            },
            "CUSTOMER" => DirectoryMember::Customer { id: record.id },
            _ => DirectoryMember::Unknown {
                kind: record.kind,
                id: record.id,
                email: record.email,
            },
        }
    }
}

impl From<DirectoryMember> for MemberRecord {
    fn from(member: DirectoryMember) -> Self {
        match member {
            DirectoryMember::User { email } => MemberRecord {
                kind: "USER".to_string(),
                email,
                ..Default::default()
            },
            DirectoryMember::Group { email } => MemberRecord {
                kind: "GROUP".to_string(),
                email,
                ..Default::default()
            },
            DirectoryMember::Customer { id } => MemberRecord {
                kind: "CUSTOMER".to_string(),
                id,
                ..Default::default()
            },
            DirectoryMember::Unknown { kind, id, email } => MemberRecord { kind, id, email },
        }
    }
}

// ============================================================================
// IDirectoryProvider trait
// ============================================================================

/// Port trait for reading a vendor directory
///
/// Each method returns a single page. Pass `None` to fetch the first page
/// and the previous page's `next_token` to continue.
///
/// ## Implementation Notes
///
/// - Implementations must not retry internally; a failed page is reported
///   as-is and the caller decides what is fatal.
/// - Authentication failures map to [`ProviderError::Unauthorized`] or
///   [`ProviderError::Forbidden`], network failures to
///   [`ProviderError::Transport`].
#[async_trait::async_trait]
pub trait IDirectoryProvider: Send + Sync {
    /// Short name used in log fields, e.g. `"google"`
    fn name(&self) -> &str {
        "directory"
    }

    /// Lists users of the directory's own organization
    async fn list_users(&self, page_token: Option<PageToken>) -> ProviderResult<Page<DirectoryUser>>;

    /// Lists groups
    async fn list_groups(
        &self,
        page_token: Option<PageToken>,
    ) -> ProviderResult<Page<DirectoryGroup>>;

    /// Lists direct members of a group
    ///
    /// # Arguments
    /// * `group_key` - Group email or ID
    /// * `page_token` - Continuation token, `None` for the first page
    async fn list_group_members(
        &self,
        group_key: &str,
        page_token: Option<PageToken>,
    ) -> ProviderResult<Page<DirectoryMember>>;

    /// Lists every user of an organization (customer)
    async fn list_org_users(
        &self,
        org_id: &str,
        page_token: Option<PageToken>,
    ) -> ProviderResult<Page<DirectoryUser>>;
}
