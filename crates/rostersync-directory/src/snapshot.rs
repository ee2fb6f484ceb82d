//! Directory snapshots
//!
//! A [`DirectorySnapshot`] is the read-only view of one directory that the
//! sync engine consumes. It is built once:
//!
//! 1. `all_users()` becomes the account catalog, keyed by primary email
//! 2. `all_groups()` and every user's addresses become the email
//!    classification table
//!
//! and never changes afterwards. Each snapshot owns its own cache, so two
//! snapshots (one per vendor) never share state. To see newer data, build a
//! new snapshot.

use std::sync::Arc;

use async_trait::async_trait;
use rostersync_core::config::DirectoryConfig;
use rostersync_core::domain::{AccountMap, Email, EmailClassification, EmailKind, Group, GroupKey};
use rostersync_core::ports::{DirectoryGroup, IAccountDirectory, IDirectoryProvider, IEmailResolver};
use tracing::{info, instrument};

use crate::cache::CachingDirectoryProvider;
use crate::records::{parse_email, secondary_emails, user_account};
use crate::resolver::GroupResolver;
use crate::DirectoryResult;

/// Immutable account catalog and email classification of one directory
#[derive(Debug)]
pub struct DirectorySnapshot {
    cache: Arc<CachingDirectoryProvider>,
    resolver: GroupResolver,
    accounts: AccountMap,
    classification: EmailClassification,
    groups: Arc<Vec<DirectoryGroup>>,
}

impl DirectorySnapshot {
    /// Builds a snapshot by reading every user and group from `provider`
    ///
    /// # Errors
    ///
    /// Any failed listing aborts the build; no partial snapshot is returned.
    pub async fn build(
        provider: Arc<dyn IDirectoryProvider>,
        config: &DirectoryConfig,
    ) -> DirectoryResult<Self> {
        let cache = Arc::new(CachingDirectoryProvider::from_config(provider, config));
        Self::from_cache(cache).await
    }

    /// Builds a snapshot over an existing (possibly pre-warmed) cache
    #[instrument(skip_all, fields(provider = cache.provider_name()))]
    pub async fn from_cache(cache: Arc<CachingDirectoryProvider>) -> DirectoryResult<Self> {
        let users = cache.all_users().await?;
        let groups = cache.all_groups().await?;

        let mut accounts = AccountMap::new();
        let mut classification = EmailClassification::new();

        for group in groups.iter() {
            if group.email.is_empty() {
                continue;
            }
            if let Some(email) = parse_email(&group.email, &group.id) {
                classification.record_group(email);
            }
        }

        for user in users.iter() {
            let Some(account) = user_account(user) else {
                continue;
            };
            for alias in secondary_emails(user) {
                classification.record_alias(alias);
            }
            classification.record_primary(account.email().clone());
            accounts.insert(account.email().clone(), account);
        }

        info!(
            accounts = accounts.len(),
            groups = groups.len(),
            aliases = classification.count(EmailKind::Alias),
            "Directory snapshot built"
        );

        Ok(Self {
            resolver: GroupResolver::new(Arc::clone(&cache)),
            cache,
            accounts,
            classification,
            groups,
        })
    }

    /// Accounts keyed by primary email
    pub fn accounts(&self) -> &AccountMap {
        &self.accounts
    }

    pub fn classification(&self) -> &EmailClassification {
        &self.classification
    }

    /// Kind of directory object that owns `email`, if any
    pub fn email_classification(&self, email: &Email) -> Option<EmailKind> {
        self.classification.get(email)
    }

    /// Returns true if `email` is any known user, group or alias address
    pub fn contains_email(&self, email: &Email) -> bool {
        self.classification.contains(email)
    }

    /// Group records in provider order
    pub fn groups(&self) -> &[DirectoryGroup] {
        &self.groups
    }

    /// Looks up a group by ID or email and resolves its membership
    ///
    /// The first group in provider order that matches wins.
    pub async fn group(&self, key: &GroupKey) -> DirectoryResult<Option<Group>> {
        let Some(record) = self
            .groups
            .iter()
            .find(|g| key.matches(&g.id, &g.email))
        else {
            return Ok(None);
        };
        self.resolver.resolve_group(record).await.map(Some)
    }

    /// Flattened members of the group at `group_key`
    pub async fn group_members(&self, group_key: &str) -> DirectoryResult<AccountMap> {
        self.resolver.resolve(group_key).await
    }

    pub fn resolver(&self) -> &GroupResolver {
        &self.resolver
    }

    pub fn cache(&self) -> &CachingDirectoryProvider {
        &self.cache
    }
}

impl IAccountDirectory for DirectorySnapshot {
    fn accounts(&self) -> &AccountMap {
        &self.accounts
    }

    fn email_classification(&self, email: &Email) -> Option<EmailKind> {
        self.classification.get(email)
    }
}

/// Answers from the snapshot's classification table, never from upstream
#[async_trait]
impl IEmailResolver for DirectorySnapshot {
    async fn exists(&self, email: &Email) -> anyhow::Result<bool> {
        Ok(self.contains_email(email))
    }
}
