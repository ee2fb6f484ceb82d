//! Integration tests for optional removal safeguards
//!
//! - Live confirmation keeps accounts the resolver still finds
//! - Confirmation lookup failures count as failures, not removals
//! - Known group and alias addresses can be kept

use std::sync::Arc;

use rostersync_core::config::{Config, ConfigBuilder};
use rostersync_core::domain::{AccountMap, Email, EmailKind, OperationResult};
use rostersync_core::ports::IAccountDirectory;
use rostersync_sync::{SyncEngine, SyncError};

use crate::common::{self, RecordingConnector, ScriptedResolver};

fn confirming() -> Config {
    ConfigBuilder::new().sync_confirm_before_remove(true).build()
}

#[tokio::test]
async fn test_confirmation_keeps_accounts_that_still_exist() {
    let connector = Arc::new(RecordingConnector::new());
    let resolver = Arc::new(
        ScriptedResolver::new()
            .answer("c@example.com", true)
            .answer("d@example.com", false),
    );
    let engine = common::engine(
        &["a@example.com"],
        &["a@example.com", "c@example.com", "d@example.com"],
        connector.clone(),
        &confirming(),
    )
    .with_confirmation(resolver.clone());

    let report = engine.sync().await.unwrap();

    connector.assert_logs(&["MembersRemove:d@example.com"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].email().as_str(), "c@example.com");
    assert_eq!(
        resolver.lookups(),
        vec![common::email("c@example.com"), common::email("d@example.com")]
    );
}

#[tokio::test]
async fn test_confirmation_error_is_a_failure() {
    let connector = Arc::new(RecordingConnector::new());
    let resolver = Arc::new(ScriptedResolver::new().answer("d@example.com", false));
    let engine = common::engine(
        &[],
        &["c@example.com", "d@example.com"],
        connector.clone(),
        &confirming(),
    )
    .with_confirmation(resolver);

    let report = engine.sync().await.unwrap();

    connector.assert_logs(&["MembersRemove:d@example.com"]);
    assert!(matches!(
        &report.failures[..],
        [SyncError::ConfirmationFailed { email, .. }] if email.as_str() == "c@example.com"
    ));
    assert!(!report.is_fully_applied());
}

#[tokio::test]
async fn test_confirmation_disabled_ignores_resolver() {
    let connector = Arc::new(RecordingConnector::new());
    let resolver = Arc::new(ScriptedResolver::new().answer("c@example.com", true));
    let engine = common::engine(
        &[],
        &["c@example.com"],
        connector.clone(),
        &Config::default(),
    )
    .with_confirmation(resolver.clone());

    engine.sync().await.unwrap();

    connector.assert_logs(&["MembersRemove:c@example.com"]);
    assert!(resolver.lookups().is_empty());
}

/// Authority catalog that also classifies a few non-account addresses
struct ClassifyingDirectory {
    accounts: AccountMap,
    kinds: Vec<(Email, EmailKind)>,
}

impl IAccountDirectory for ClassifyingDirectory {
    fn accounts(&self) -> &AccountMap {
        &self.accounts
    }

    fn email_classification(&self, email: &Email) -> Option<EmailKind> {
        self.kinds
            .iter()
            .find(|(known, _)| known == email)
            .map(|(_, kind)| *kind)
    }
}

fn classifying_authority() -> Arc<ClassifyingDirectory> {
    Arc::new(ClassifyingDirectory {
        accounts: common::accounts(&["a@example.com"]),
        kinds: vec![
            (common::email("team@example.com"), EmailKind::Group),
            (common::email("a2@example.com"), EmailKind::Alias),
        ],
    })
}

#[tokio::test]
async fn test_skip_known_addresses() {
    let connector = Arc::new(RecordingConnector::new());
    let config = ConfigBuilder::new().sync_skip_known_addresses(true).build();
    let engine = SyncEngine::new(
        classifying_authority(),
        Arc::new(common::accounts(&[
            "a@example.com",
            "a2@example.com",
            "team@example.com",
            "z@example.com",
        ])),
        connector.clone(),
        &config,
    );

    let report = engine.sync().await.unwrap();

    connector.assert_logs(&["MembersRemove:z@example.com"]);
    assert_eq!(report.skipped.len(), 2);
    let skipped: Vec<OperationResult> = engine
        .operation_log()
        .into_iter()
        .filter(|e| !e.result().is_success())
        .map(|e| e.result().clone())
        .collect();
    assert_eq!(
        skipped,
        vec![
            OperationResult::skipped("address is an alias in authority directory"),
            OperationResult::skipped("address is a group in authority directory"),
        ]
    );
}

#[tokio::test]
async fn test_known_addresses_removed_by_default() {
    let connector = Arc::new(RecordingConnector::new());
    let engine = SyncEngine::new(
        classifying_authority(),
        Arc::new(common::accounts(&["a2@example.com", "team@example.com"])),
        connector.clone(),
        &Config::default(),
    );

    engine.sync().await.unwrap();

    connector.assert_logs(&[
        "MembersRemove:a2@example.com",
        "MembersRemove:team@example.com",
    ]);
}
