//! Group membership resolution
//!
//! Expands a group into the flat set of accounts reachable from it:
//!
//! ```text
//! tokyo ──┬── USER a
//!         ├── GROUP minato ── USER b
//!         └── GROUP meguro ── USER c      => {a, b, c}
//! ```
//!
//! - `USER` members are added directly
//! - `GROUP` members are expanded recursively, each at most once per
//!   top-level [`GroupResolver::resolve`] call, so cycles terminate
//! - `CUSTOMER` members contribute every user of that organization, with
//!   all of their addresses
//! - Anything else is logged and skipped
//!
//! Merging is by email; when two paths reach the same address the last one
//! seen wins.
//!
//! The walk is sequential and depth-first. Listings come from the shared
//! [`CachingDirectoryProvider`], so a group reached through many paths is
//! still fetched upstream only once.

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};
use rostersync_core::domain::{Account, AccountMap, Group};
use rostersync_core::ports::{DirectoryGroup, DirectoryMember};
use tracing::{debug, instrument, warn};

use crate::cache::CachingDirectoryProvider;
use crate::records::{parse_email, user_accounts};
use crate::{DirectoryError, DirectoryResult};

/// Flattens nested group membership
#[derive(Debug, Clone)]
pub struct GroupResolver {
    cache: Arc<CachingDirectoryProvider>,
}

impl GroupResolver {
    pub fn new(cache: Arc<CachingDirectoryProvider>) -> Self {
        Self { cache }
    }

    /// Returns every account reachable from the group
    ///
    /// # Arguments
    ///
    /// * `group_key` - Email (or ID) of the group to expand
    ///
    /// # Errors
    ///
    /// Fails if any listing on the way cannot be fetched. Unknown member
    /// kinds and already-visited groups are skipped, not errors.
    #[instrument(skip(self), fields(provider = self.cache.provider_name()))]
    pub async fn resolve(&self, group_key: &str) -> DirectoryResult<AccountMap> {
        let mut visited = HashSet::new();
        visited.insert(group_identity(group_key));

        let mut members = AccountMap::new();
        self.expand(group_key, &mut visited, &mut members).await?;

        debug!(
            groups_visited = visited.len(),
            accounts = members.len(),
            "Resolved group"
        );
        Ok(members)
    }

    /// Resolves a provider group record into a domain [`Group`]
    pub async fn resolve_group(&self, group: &DirectoryGroup) -> DirectoryResult<Group> {
        let key = if group.email.is_empty() {
            group.id.as_str()
        } else {
            group.email.as_str()
        };
        let members = self.resolve(key).await?;

        let mut resolved =
            Group::new(group.id.clone(), group.email.clone(), group.name.clone()).with_members(members);
        if let Some(correlation_id) = &group.external_id {
            resolved = resolved.with_correlation_id(correlation_id.clone());
        }
        Ok(resolved)
    }

    fn expand<'a>(
        &'a self,
        group_key: &'a str,
        visited: &'a mut HashSet<String>,
        members: &'a mut AccountMap,
    ) -> BoxFuture<'a, DirectoryResult<()>> {
        async move {
            let listing = self.cache.group_members(group_key).await?;

            for member in listing.iter() {
                match member {
                    DirectoryMember::User { email } => {
                        if let Some(email) = parse_email(email, group_key) {
                            members.insert(email.clone(), Account::new(email));
                        }
                    }
                    DirectoryMember::Group { email } => {
                        let identity = group_identity(email);
                        if identity.is_empty() {
                            warn!(group = group_key, "Skipping nested group without address");
                            continue;
                        }
                        if !visited.insert(identity) {
                            warn!(
                                group = group_key,
                                nested = email.as_str(),
                                "Skipping already visited group"
                            );
                            continue;
                        }
                        self.expand(email, visited, members).await?;
                    }
                    DirectoryMember::Customer { id } => {
                        let users = self.cache.org_users(id).await?;
                        for user in users.iter() {
                            for account in user_accounts(user) {
                                members.insert(account.email().clone(), account);
                            }
                        }
                    }
                    DirectoryMember::Unknown { kind, .. } => {
                        let err = DirectoryError::UnknownMemberType {
                            kind: kind.clone(),
                            parent: group_key.to_string(),
                        };
                        warn!(error = %err, "Skipping group member");
                    }
                }
            }

            Ok(())
        }
        .boxed()
    }
}

fn group_identity(group_key: &str) -> String {
    group_key.trim().to_ascii_lowercase()
}
