//! Shared test doubles for sync integration tests

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rostersync_core::config::Config;
use rostersync_core::domain::{account_map, Account, AccountMap, Email, PageToken};
use rostersync_core::ports::{
    DirectoryGroup, DirectoryMember, DirectoryUser, IConnector, IDirectoryProvider,
    IEmailResolver, Page, ProviderError, ProviderResult,
};
use rostersync_sync::SyncEngine;

pub fn email(s: &str) -> Email {
    Email::new(s).unwrap()
}

pub fn accounts(emails: &[&str]) -> AccountMap {
    account_map(emails.iter().map(|e| Account::new(email(e))))
}

/// Connector that records `Operation:subject` for every call
///
/// Addresses passed to [`RecordingConnector::failing_on`] fail instead.
#[derive(Default)]
pub struct RecordingConnector {
    log: Mutex<Vec<String>>,
    failures: HashSet<Email>,
}

impl RecordingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, addresses: &[&str]) -> Self {
        self.failures.extend(addresses.iter().map(|a| email(a)));
        self
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    /// Compares the recorded log with `expected`, ignoring order
    pub fn assert_logs(&self, expected: &[&str]) {
        let mut actual = self.log();
        actual.sort();
        let mut expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
        expected.sort();
        assert_eq!(actual, expected);
    }
}

#[async_trait]
impl IConnector for RecordingConnector {
    fn name(&self) -> &str {
        "recording"
    }

    async fn remove_member(&self, email: &Email) -> anyhow::Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("MembersRemove:{}", email));
        if self.failures.contains(email) {
            anyhow::bail!("member {} is locked", email);
        }
        Ok(())
    }
}

/// Resolver with scripted answers; unknown addresses are errors
#[derive(Default)]
pub struct ScriptedResolver {
    answers: HashMap<Email, bool>,
    lookups: Mutex<Vec<Email>>,
}

impl ScriptedResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, address: &str, exists: bool) -> Self {
        self.answers.insert(email(address), exists);
        self
    }

    pub fn lookups(&self) -> Vec<Email> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl IEmailResolver for ScriptedResolver {
    async fn exists(&self, email: &Email) -> anyhow::Result<bool> {
        self.lookups.lock().unwrap().push(email.clone());
        self.answers
            .get(email)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("lookup of {} timed out", email))
    }
}

/// Engine over plain account catalogs: (authority, target)
pub fn engine(
    authority: &[&str],
    target: &[&str],
    connector: Arc<RecordingConnector>,
    config: &Config,
) -> SyncEngine {
    SyncEngine::new(
        Arc::new(accounts(authority)),
        Arc::new(accounts(target)),
        connector,
        config,
    )
}

/// Directory provider whose every call is rejected as unauthorized
pub struct RejectingProvider;

#[async_trait]
impl IDirectoryProvider for RejectingProvider {
    async fn list_users(
        &self,
        _page_token: Option<PageToken>,
    ) -> ProviderResult<Page<DirectoryUser>> {
        Err(revoked())
    }

    async fn list_groups(
        &self,
        _page_token: Option<PageToken>,
    ) -> ProviderResult<Page<DirectoryGroup>> {
        Err(revoked())
    }

    async fn list_group_members(
        &self,
        _group_key: &str,
        _page_token: Option<PageToken>,
    ) -> ProviderResult<Page<DirectoryMember>> {
        Err(revoked())
    }

    async fn list_org_users(
        &self,
        _org_id: &str,
        _page_token: Option<PageToken>,
    ) -> ProviderResult<Page<DirectoryUser>> {
        Err(revoked())
    }
}

fn revoked() -> ProviderError {
    ProviderError::Unauthorized("refresh token revoked".to_string())
}
