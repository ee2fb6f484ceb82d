//! In-memory directory provider
//!
//! Serves a fixed set of users, groups, members and organization users with
//! real pagination. Useful for offline dry runs against an exported
//! directory and as the provider behind most tests.
//!
//! Every page request is counted per listing, using the same names as
//! [`CacheKey`](crate::CacheKey) (`users`, `groups`, `members:<group>`,
//! `org:<id>`), so tests can assert how often the upstream was hit.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use rostersync_core::config::DirectoryConfig;
use rostersync_core::domain::PageToken;
use rostersync_core::ports::{
    DirectoryGroup, DirectoryMember, DirectoryUser, IDirectoryProvider, Page, ProviderError,
    ProviderResult,
};

use crate::cache::CacheKey;

/// Directory provider backed by in-memory tables
#[derive(Debug)]
pub struct InMemoryDirectoryProvider {
    name: String,
    page_size: usize,
    users: Vec<DirectoryUser>,
    groups: Vec<DirectoryGroup>,
    /// Member listings keyed by lowercased group email and by group ID
    members: HashMap<String, Vec<DirectoryMember>>,
    org_users: HashMap<String, Vec<DirectoryUser>>,
    requests: Mutex<HashMap<String, usize>>,
}

impl Default for InMemoryDirectoryProvider {
    fn default() -> Self {
        Self {
            name: "memory".to_string(),
            page_size: DirectoryConfig::default().page_size as usize,
            users: Vec::new(),
            groups: Vec::new(),
            members: HashMap::new(),
            org_users: HashMap::new(),
            requests: Mutex::new(HashMap::new()),
        }
    }
}

impl InMemoryDirectoryProvider {
    /// Creates an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty provider paging by `directory.page_size`
    pub fn from_config(config: &DirectoryConfig) -> Self {
        Self::new().with_page_size(config.page_size as usize)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the number of items per page (at least 1)
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_user(mut self, user: DirectoryUser) -> Self {
        self.users.push(user);
        self
    }

    pub fn with_users(mut self, users: impl IntoIterator<Item = DirectoryUser>) -> Self {
        self.users.extend(users);
        self
    }

    /// Adds a group and its direct members
    ///
    /// Members can then be listed by the group's email or its ID.
    pub fn with_group(
        mut self,
        group: DirectoryGroup,
        members: impl IntoIterator<Item = DirectoryMember>,
    ) -> Self {
        let members: Vec<DirectoryMember> = members.into_iter().collect();
        if !group.email.is_empty() {
            self.members
                .insert(normalize(&group.email), members.clone());
        }
        self.members.insert(normalize(&group.id), members);
        self.groups.push(group);
        self
    }

    /// Adds a member listing for a key that is not a listed group
    pub fn with_members(
        mut self,
        group_key: &str,
        members: impl IntoIterator<Item = DirectoryMember>,
    ) -> Self {
        self.members
            .insert(normalize(group_key), members.into_iter().collect());
        self
    }

    /// Adds the users of an organization
    pub fn with_org(mut self, org_id: impl Into<String>, users: impl IntoIterator<Item = DirectoryUser>) -> Self {
        self.org_users
            .insert(org_id.into(), users.into_iter().collect());
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Page requests served for one listing, e.g. `"members:tokyo@example.com"`
    pub fn request_count(&self, listing: &str) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(listing)
            .copied()
            .unwrap_or(0)
    }

    /// Page requests served across all listings
    pub fn total_requests(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .sum()
    }

    fn record_request(&self, key: &CacheKey) {
        let mut requests = self.requests.lock().unwrap_or_else(|e| e.into_inner());
        *requests.entry(key.to_string()).or_insert(0) += 1;
    }

    fn paginate<T: Clone>(&self, items: &[T], token: Option<PageToken>) -> ProviderResult<Page<T>> {
        let start = match token {
            None => 0,
            Some(token) => token.as_str().parse::<usize>().map_err(|_| {
                ProviderError::InvalidResponse(format!("unknown page token '{}'", token))
            })?,
        };
        if start > items.len() {
            return Err(ProviderError::InvalidResponse(format!(
                "page token {} is past the end of the listing",
                start
            )));
        }

        let end = (start + self.page_size).min(items.len());
        let next_token = if end < items.len() {
            let token = PageToken::new(end.to_string())
                .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
            Some(token)
        } else {
            None
        };

        Ok(Page::new(items[start..end].to_vec(), next_token))
    }
}

fn normalize(key: &str) -> String {
    key.trim().to_ascii_lowercase()
}

#[async_trait]
impl IDirectoryProvider for InMemoryDirectoryProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_users(&self, page_token: Option<PageToken>) -> ProviderResult<Page<DirectoryUser>> {
        self.record_request(&CacheKey::AllUsers);
        self.paginate(&self.users, page_token)
    }

    async fn list_groups(
        &self,
        page_token: Option<PageToken>,
    ) -> ProviderResult<Page<DirectoryGroup>> {
        self.record_request(&CacheKey::AllGroups);
        self.paginate(&self.groups, page_token)
    }

    async fn list_group_members(
        &self,
        group_key: &str,
        page_token: Option<PageToken>,
    ) -> ProviderResult<Page<DirectoryMember>> {
        self.record_request(&CacheKey::group_members(group_key));
        let members = self
            .members
            .get(&normalize(group_key))
            .ok_or_else(|| ProviderError::NotFound(format!("group {}", group_key)))?;
        self.paginate(members, page_token)
    }

    async fn list_org_users(
        &self,
        org_id: &str,
        page_token: Option<PageToken>,
    ) -> ProviderResult<Page<DirectoryUser>> {
        self.record_request(&CacheKey::org_users(org_id));
        let users = self
            .org_users
            .get(org_id.trim())
            .ok_or_else(|| ProviderError::NotFound(format!("organization {}", org_id)))?;
        self.paginate(users, page_token)
    }
}
