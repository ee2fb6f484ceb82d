//! Integration tests for DirectorySnapshot
//!
//! Builds a snapshot of the fixture directory and checks the account
//! catalog, email classification, group lookup and failure behavior.

use std::sync::Arc;

use rostersync_core::config::DirectoryConfig;
use rostersync_core::domain::{Email, EmailKind, GroupKey};
use rostersync_core::ports::{IAccountDirectory, ProviderError};
use rostersync_directory::{DirectoryError, DirectorySnapshot};

use crate::common::{self, ScriptedProvider};

fn email(s: &str) -> Email {
    Email::new(s).unwrap()
}

async fn fixture_snapshot() -> DirectorySnapshot {
    DirectorySnapshot::build(
        common::shared(common::fixture_directory()),
        &DirectoryConfig::default(),
    )
    .await
    .expect("fixture snapshot should build")
}

#[tokio::test]
async fn test_accounts_keyed_by_primary_email() {
    let snapshot = fixture_snapshot().await;

    let keys: Vec<&str> = snapshot.accounts().keys().map(Email::as_str).collect();
    assert_eq!(
        keys,
        vec!["a@example.com", "b@example.com", "c@example.com", "d@example.com"]
    );

    let b = &snapshot.accounts()[&email("b@example.com")];
    assert_eq!(b.given_name(), "gn-b");
    assert_eq!(b.surname(), "fn-b");
}

#[tokio::test]
async fn test_email_classification() {
    let snapshot = fixture_snapshot().await;

    let cases = [
        ("a@example.com", Some(EmailKind::User)),
        ("b@example.com", Some(EmailKind::User)),
        ("b2@example.com", Some(EmailKind::Alias)),
        ("b@example.net", Some(EmailKind::Alias)),
        ("b3@example.com", Some(EmailKind::Alias)),
        ("d@example.org", Some(EmailKind::Alias)),
        ("tokyo@example.com", Some(EmailKind::Group)),
        ("all@example.com", Some(EmailKind::Group)),
        ("nobody@example.com", None),
    ];
    for (address, expected) in cases {
        assert_eq!(
            snapshot.email_classification(&email(address)),
            expected,
            "{address}"
        );
    }

    // Lookups are case-insensitive.
    assert_eq!(
        snapshot.email_classification(&email("B3@EXAMPLE.COM")),
        Some(EmailKind::Alias)
    );
}

#[tokio::test]
async fn test_snapshot_as_account_directory() {
    let snapshot = fixture_snapshot().await;
    let directory: &dyn IAccountDirectory = &snapshot;

    assert_eq!(directory.accounts().len(), 4);
    assert_eq!(
        directory.email_classification(&email("minato@example.com")),
        Some(EmailKind::Group)
    );
}

#[tokio::test]
async fn test_group_lookup_by_id_and_email() {
    let snapshot = fixture_snapshot().await;

    let by_id = snapshot
        .group(&GroupKey::new("tokyo").unwrap())
        .await
        .unwrap()
        .expect("tokyo by id");
    let by_email = snapshot
        .group(&GroupKey::new("TOKYO@example.com").unwrap())
        .await
        .unwrap()
        .expect("tokyo by email");

    assert_eq!(by_id, by_email);
    assert_eq!(by_id.group_name(), "Tokyo");
    let members: Vec<&str> = by_id.members().keys().map(Email::as_str).collect();
    assert_eq!(members, vec!["a@example.com", "b@example.com", "c@example.com"]);
}

#[tokio::test]
async fn test_group_members_of_customer_group() {
    let snapshot = fixture_snapshot().await;
    let all = snapshot.group_members("all@example.com").await.unwrap();

    assert_eq!(all.len(), 9);
    for account in snapshot.accounts().values() {
        assert!(all.contains_key(account.email()));
    }
}

#[tokio::test]
async fn test_auth_failure_aborts_build() {
    let provider = Arc::new(
        ScriptedProvider::new(common::fixture_directory())
            .failing("groups", ProviderError::Unauthorized("token expired".to_string())),
    );

    let err = DirectorySnapshot::build(provider.clone(), &DirectoryConfig::default())
        .await
        .unwrap_err();

    assert!(err.is_auth_error());
    assert!(matches!(
        err,
        DirectoryError::ProviderFetchFailed { ref operation, .. } if operation == "groups"
    ));
}

#[tokio::test]
async fn test_transport_failure_is_distinct_from_auth() {
    let provider = Arc::new(
        ScriptedProvider::new(common::fixture_directory())
            .failing("users", ProviderError::Transport("dns".to_string())),
    );

    let err = DirectorySnapshot::build(provider.clone(), &DirectoryConfig::default())
        .await
        .unwrap_err();

    assert!(!err.is_auth_error());
    match err {
        DirectoryError::ProviderFetchFailed { source, .. } => assert!(source.is_transport_error()),
        other => panic!("unexpected error: {other:?}"),
    }
    // Users are read first, so groups were never requested.
    assert_eq!(provider.calls(), vec!["users".to_string()]);
}

#[tokio::test]
async fn test_page_limit_from_config() {
    let config = DirectoryConfig {
        page_size: 2,
        max_pages: 1,
    };

    // Four users at two per page need two pages.
    let err = DirectorySnapshot::build(common::shared(common::fixture_directory()), &config)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DirectoryError::ProviderFetchFailed {
            source: ProviderError::InvalidResponse(_),
            ..
        }
    ));
}
