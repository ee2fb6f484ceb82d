//! Memoizing provider wrapper
//!
//! [`CachingDirectoryProvider`] sits between a raw [`IDirectoryProvider`] and
//! everything that reads a snapshot. Each distinct listing is drained once
//! and kept for the lifetime of the wrapper: there is no invalidation and no
//! TTL. A fresh view of the directory means a fresh wrapper.
//!
//! ## Concurrency
//!
//! Each key owns a [`OnceCell`]. Concurrent first reads of the same key
//! wait on the cell, so exactly one upstream drain runs and every caller
//! gets the same listing. A failed drain leaves the cell empty.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use rostersync_core::config::DirectoryConfig;
use rostersync_core::ports::{DirectoryGroup, DirectoryMember, DirectoryUser, IDirectoryProvider};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::paging::PagingAccumulator;
use crate::{DirectoryError, DirectoryResult};

/// Identity of a memoized listing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    AllUsers,
    AllGroups,
    /// Members of a group, keyed by lowercased group email or ID
    GroupMembers(String),
    /// Users of an organization, keyed by organization ID
    OrgUsers(String),
}

impl CacheKey {
    /// Key for a group's member listing
    pub fn group_members(group_key: &str) -> Self {
        CacheKey::GroupMembers(group_key.trim().to_ascii_lowercase())
    }

    pub fn org_users(org_id: &str) -> Self {
        CacheKey::OrgUsers(org_id.trim().to_string())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::AllUsers => write!(f, "users"),
            CacheKey::AllGroups => write!(f, "groups"),
            CacheKey::GroupMembers(group) => write!(f, "members:{}", group),
            CacheKey::OrgUsers(org) => write!(f, "org:{}", org),
        }
    }
}

#[derive(Debug, Clone)]
enum CachedListing {
    Users(Arc<Vec<DirectoryUser>>),
    Groups(Arc<Vec<DirectoryGroup>>),
    Members(Arc<Vec<DirectoryMember>>),
}

/// Memoizing, single-flight wrapper around a directory provider
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use rostersync_directory::{CachingDirectoryProvider, InMemoryDirectoryProvider};
///
/// # async fn example() -> rostersync_directory::DirectoryResult<()> {
/// let provider = Arc::new(InMemoryDirectoryProvider::new());
/// let cache = CachingDirectoryProvider::new(provider);
///
/// let first = cache.group_members("tokyo@example.com").await?;
/// let second = cache.group_members("tokyo@example.com").await?; // no upstream call
/// assert!(Arc::ptr_eq(&first, &second));
/// # Ok(())
/// # }
/// ```
pub struct CachingDirectoryProvider {
    provider: Arc<dyn IDirectoryProvider>,
    pager: PagingAccumulator,
    entries: DashMap<CacheKey, Arc<OnceCell<CachedListing>>>,
}

impl CachingDirectoryProvider {
    /// Wraps a provider with the default page limit
    pub fn new(provider: Arc<dyn IDirectoryProvider>) -> Self {
        Self::with_pager(provider, PagingAccumulator::default())
    }

    pub fn with_pager(provider: Arc<dyn IDirectoryProvider>, pager: PagingAccumulator) -> Self {
        Self {
            provider,
            pager,
            entries: DashMap::new(),
        }
    }

    pub fn from_config(provider: Arc<dyn IDirectoryProvider>, config: &DirectoryConfig) -> Self {
        Self::with_pager(provider, PagingAccumulator::from_config(config))
    }

    /// Name of the wrapped provider
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Returns true once the listing for `key` has been stored
    pub fn is_cached(&self, key: &CacheKey) -> bool {
        self.entries
            .get(key)
            .map(|cell| cell.initialized())
            .unwrap_or(false)
    }

    /// Number of listings stored so far
    pub fn cached_len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    /// Every user of the directory's own organization
    pub async fn all_users(&self) -> DirectoryResult<Arc<Vec<DirectoryUser>>> {
        let key = CacheKey::AllUsers;
        let provider = self.provider.as_ref();
        let fetch = async {
            let users = self
                .pager
                .collect("users", move |token| provider.list_users(token))
                .await?;
            Ok(CachedListing::Users(Arc::new(users)))
        };

        match self.get_or_fetch(&key, fetch).await? {
            CachedListing::Users(users) => Ok(users),
            _ => Err(invariant_violation(&key)),
        }
    }

    /// Every group of the directory
    pub async fn all_groups(&self) -> DirectoryResult<Arc<Vec<DirectoryGroup>>> {
        let key = CacheKey::AllGroups;
        let provider = self.provider.as_ref();
        let fetch = async {
            let groups = self
                .pager
                .collect("groups", move |token| provider.list_groups(token))
                .await?;
            Ok(CachedListing::Groups(Arc::new(groups)))
        };

        match self.get_or_fetch(&key, fetch).await? {
            CachedListing::Groups(groups) => Ok(groups),
            _ => Err(invariant_violation(&key)),
        }
    }

    /// Direct members of a group
    ///
    /// The key is matched case-insensitively, so `Tokyo@example.com` and
    /// `tokyo@example.com` share one upstream fetch.
    pub async fn group_members(&self, group_key: &str) -> DirectoryResult<Arc<Vec<DirectoryMember>>> {
        let key = CacheKey::group_members(group_key);
        let operation = key.to_string();
        let provider = self.provider.as_ref();
        let fetch = async {
            let members = self
                .pager
                .collect(&operation, move |token| {
                    provider.list_group_members(group_key, token)
                })
                .await?;
            Ok(CachedListing::Members(Arc::new(members)))
        };

        match self.get_or_fetch(&key, fetch).await? {
            CachedListing::Members(members) => Ok(members),
            _ => Err(invariant_violation(&key)),
        }
    }

    /// Every user of an organization
    pub async fn org_users(&self, org_id: &str) -> DirectoryResult<Arc<Vec<DirectoryUser>>> {
        let key = CacheKey::org_users(org_id);
        let operation = key.to_string();
        let provider = self.provider.as_ref();
        let fetch = async {
            let users = self
                .pager
                .collect(&operation, move |token| provider.list_org_users(org_id, token))
                .await?;
            Ok(CachedListing::Users(Arc::new(users)))
        };

        match self.get_or_fetch(&key, fetch).await? {
            CachedListing::Users(users) => Ok(users),
            _ => Err(invariant_violation(&key)),
        }
    }

    async fn get_or_fetch<Fut>(&self, key: &CacheKey, fetch: Fut) -> DirectoryResult<CachedListing>
    where
        Fut: Future<Output = DirectoryResult<CachedListing>>,
    {
        // The map guard is released before awaiting the cell.
        let cell = Arc::clone(self.entries.entry(key.clone()).or_default().value());

        let listing = cell
            .get_or_try_init(|| async {
                debug!(key = %key, provider = self.provider.name(), "Cache miss, fetching");
                fetch.await
            })
            .await?;

        Ok(listing.clone())
    }
}

impl fmt::Debug for CachingDirectoryProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachingDirectoryProvider")
            .field("provider", &self.provider.name())
            .field("pager", &self.pager)
            .field("cached", &self.cached_len())
            .finish()
    }
}

fn invariant_violation(key: &CacheKey) -> DirectoryError {
    DirectoryError::CacheInvariantViolation {
        key: key.to_string(),
    }
}
