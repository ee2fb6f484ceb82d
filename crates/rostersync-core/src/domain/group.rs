//! Group domain entity

use serde::{Deserialize, Serialize};

use super::account::{Account, AccountMap};
use super::newtypes::Email;

/// A directory group with its flattened membership
///
/// `members` holds every account reachable from the group, including those
/// inherited through nested groups and organization-wide members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    group_id: String,
    group_email: String,
    group_name: String,
    /// External correlation ID assigned by the vendor, if any
    correlation_id: Option<String>,
    members: AccountMap,
}

impl Group {
    /// Creates a group with no members
    pub fn new(
        group_id: impl Into<String>,
        group_email: impl Into<String>,
        group_name: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            group_email: group_email.into(),
            group_name: group_name.into(),
            correlation_id: None,
            members: AccountMap::new(),
        }
    }

    /// Sets the external correlation ID
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Replaces the member table
    pub fn with_members(mut self, members: AccountMap) -> Self {
        self.members = members;
        self
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn group_email(&self) -> &str {
        &self.group_email
    }

    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    /// Returns the flattened member table
    pub fn members(&self) -> &AccountMap {
        &self.members
    }

    /// Returns the member with the given email, if any
    pub fn member(&self, email: &Email) -> Option<&Account> {
        self.members.get(email)
    }

    /// Returns true if the email is a (possibly inherited) member
    pub fn has_member(&self, email: &Email) -> bool {
        self.members.contains_key(email)
    }
}
