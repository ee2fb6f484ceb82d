//! Shared fixtures and test doubles for directory integration tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rostersync_core::domain::PageToken;
use rostersync_core::ports::{
    DirectoryGroup, DirectoryMember, DirectoryUser, IDirectoryProvider, Page, ProviderError,
    ProviderResult,
};
use rostersync_directory::InMemoryDirectoryProvider;

/// Builds a user the way the fixture directory names them
pub fn user(label: &str, primary: &str, other_emails: &[&str], aliases: &[&str]) -> DirectoryUser {
    let mut emails = vec![primary];
    emails.extend_from_slice(other_emails);
    DirectoryUser::new(primary)
        .with_name(format!("gn-{}", label), format!("fn-{}", label))
        .with_emails(emails)
        .with_aliases(aliases.iter().copied())
}

pub fn fixture_users() -> Vec<DirectoryUser> {
    vec![
        user("a", "a@example.com", &[], &[]),
        user(
            "b",
            "b@example.com",
            &["b2@example.com", "b@example.net"],
            &["b3@example.com"],
        ),
        user("c", "c@example.com", &[], &[]),
        user("d", "d@example.com", &[], &["d@example.org", "d2@example.com"]),
    ]
}

/// Four users and four groups:
///
/// - tokyo = {a, minato, meguro}
/// - minato = {b}
/// - meguro = {c}
/// - all = CUSTOMER mock_customer (every user)
pub fn fixture_directory() -> InMemoryDirectoryProvider {
    InMemoryDirectoryProvider::new()
        .with_name("fixture")
        .with_page_size(2)
        .with_users(fixture_users())
        .with_group(
            DirectoryGroup::new("tokyo", "tokyo@example.com", "Tokyo"),
            [
                DirectoryMember::user("a@example.com"),
                DirectoryMember::group("minato@example.com"),
                DirectoryMember::group("meguro@example.com"),
            ],
        )
        .with_group(
            DirectoryGroup::new("minato", "minato@example.com", "Minato"),
            [DirectoryMember::user("b@example.com")],
        )
        .with_group(
            DirectoryGroup::new("meguro", "meguro@example.com", "Meguro"),
            [DirectoryMember::user("c@example.com")],
        )
        .with_group(
            DirectoryGroup::new("all", "all@example.com", "All"),
            [DirectoryMember::customer("mock_customer")],
        )
        .with_org("mock_customer", fixture_users())
}

/// Directory with a two-group cycle: a = {x, b}, b = {y, a}
pub fn cyclic_directory() -> InMemoryDirectoryProvider {
    InMemoryDirectoryProvider::new()
        .with_group(
            DirectoryGroup::new("a", "a-team@example.com", "A"),
            [
                DirectoryMember::user("x@example.com"),
                DirectoryMember::group("b-team@example.com"),
            ],
        )
        .with_group(
            DirectoryGroup::new("b", "b-team@example.com", "B"),
            [
                DirectoryMember::user("y@example.com"),
                DirectoryMember::group("a-team@example.com"),
            ],
        )
}

/// Directory with a ring of `len` groups, each containing one user and the next group
pub fn ring_directory(len: usize) -> InMemoryDirectoryProvider {
    let mut provider = InMemoryDirectoryProvider::new();
    for i in 0..len {
        provider = provider.with_group(
            DirectoryGroup::new(
                format!("g{}", i),
                format!("g{}@example.com", i),
                format!("G{}", i),
            ),
            [
                DirectoryMember::user(format!("u{}@example.com", i)),
                DirectoryMember::group(format!("g{}@example.com", (i + 1) % len)),
            ],
        );
    }
    provider
}

/// Provider that fails chosen listings and delays every page
///
/// Delegates to an inner in-memory provider otherwise, and counts calls per
/// method so concurrent coalescing can be asserted.
pub struct ScriptedProvider {
    inner: InMemoryDirectoryProvider,
    failures: HashMap<String, ProviderError>,
    delay: Duration,
    member_calls: AtomicUsize,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(inner: InMemoryDirectoryProvider) -> Self {
        Self {
            inner,
            failures: HashMap::new(),
            delay: Duration::ZERO,
            member_calls: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Makes the listing named `listing` (`users`, `groups`, `members:<key>`) fail
    pub fn failing(mut self, listing: &str, error: ProviderError) -> Self {
        self.failures.insert(listing.to_string(), error);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn member_calls(&self) -> usize {
        self.member_calls.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn enter(&self, listing: String) -> ProviderResult<()> {
        self.calls.lock().unwrap().push(listing.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.failures.get(&listing) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl IDirectoryProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn list_users(&self, page_token: Option<PageToken>) -> ProviderResult<Page<DirectoryUser>> {
        self.enter("users".to_string()).await?;
        self.inner.list_users(page_token).await
    }

    async fn list_groups(&self, page_token: Option<PageToken>) -> ProviderResult<Page<DirectoryGroup>> {
        self.enter("groups".to_string()).await?;
        self.inner.list_groups(page_token).await
    }

    async fn list_group_members(
        &self,
        group_key: &str,
        page_token: Option<PageToken>,
    ) -> ProviderResult<Page<DirectoryMember>> {
        self.member_calls.fetch_add(1, Ordering::SeqCst);
        self.enter(format!("members:{}", group_key.to_ascii_lowercase()))
            .await?;
        self.inner.list_group_members(group_key, page_token).await
    }

    async fn list_org_users(
        &self,
        org_id: &str,
        page_token: Option<PageToken>,
    ) -> ProviderResult<Page<DirectoryUser>> {
        self.enter(format!("org:{}", org_id)).await?;
        self.inner.list_org_users(org_id, page_token).await
    }
}

pub fn shared<P: IDirectoryProvider + 'static>(provider: P) -> Arc<P> {
    Arc::new(provider)
}
