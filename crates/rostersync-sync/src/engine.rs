//! Deprovisioning sync engine
//!
//! The [`SyncEngine`] brings a target roster in line with an authority
//! directory by removing every target account the authority no longer has.
//! It never adds accounts: authority accounts missing from the target are
//! left for provisioning, which happens elsewhere.
//!
//! ## Sync Flow
//!
//! 1. **Diff**: `target.keys - authority.keys`, in target order
//! 2. **Filter** (optional): keep addresses the authority knows as a group
//!    or alias, and addresses a live resolver still finds
//! 3. **Apply**: one connector call per remaining account, or a `Planned`
//!    log entry in dry-run mode
//! 4. **Report**: removed, planned, skipped and failed accounts
//!
//! A failed removal never stops the run. Failures are collected and the
//! report tells "fully applied" apart from "applied with failures".

use std::sync::{Arc, Mutex};
use std::time::Instant;

use rostersync_core::config::{Config, SyncConfig};
use rostersync_core::domain::{
    Account, AccountMap, Email, EmailKind, Operation, OperationEntry, OperationResult, RunId,
};
use rostersync_core::ports::{IAccountDirectory, IConnector, IDirectoryProvider, IEmailResolver};
use rostersync_directory::DirectorySnapshot;
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::SyncError;

// ============================================================================
// Deprovision set
// ============================================================================

/// Accounts present in `target` but absent from `authority`
///
/// Returned in `target` iteration order. Accounts only the authority has
/// are not included.
pub fn compute_deprovision_set(target: &AccountMap, authority: &AccountMap) -> Vec<Account> {
    target
        .values()
        .filter(|account| !authority.contains_key(account.email()))
        .cloned()
        .collect()
}

// ============================================================================
// SyncOptions
// ============================================================================

/// Behavior switches for a sync run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Log the plan without calling the connector
    pub dry_run: bool,
    /// Ask the confirmation resolver before each removal
    pub confirm_before_remove: bool,
    /// Keep addresses the authority classifies as group or alias
    pub skip_known_addresses: bool,
}

impl From<&SyncConfig> for SyncOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            dry_run: config.dry_run,
            confirm_before_remove: config.confirm_before_remove,
            skip_known_addresses: config.skip_known_addresses,
        }
    }
}

// ============================================================================
// SyncReport
// ============================================================================

/// Overall result of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Every planned removal succeeded (or there was nothing to do)
    FullyApplied,
    /// Some removals failed
    AppliedWithFailures { failed: usize },
}

/// Summary of a completed sync run
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Identifier shared by every operation entry of this run
    pub run_id: RunId,
    /// Accounts the connector removed
    pub removed: Vec<Account>,
    /// Accounts that would have been removed (dry run only)
    pub planned: Vec<Account>,
    /// Accounts deliberately kept
    pub skipped: Vec<Account>,
    /// Per-account failures, in processing order
    pub failures: Vec<SyncError>,
    pub dry_run: bool,
    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,
}

impl SyncReport {
    fn new(run_id: RunId, dry_run: bool) -> Self {
        Self {
            run_id,
            removed: Vec::new(),
            planned: Vec::new(),
            skipped: Vec::new(),
            failures: Vec::new(),
            dry_run,
            duration_ms: 0,
        }
    }

    pub fn outcome(&self) -> SyncOutcome {
        if self.failures.is_empty() {
            SyncOutcome::FullyApplied
        } else {
            SyncOutcome::AppliedWithFailures {
                failed: self.failures.len(),
            }
        }
    }

    pub fn is_fully_applied(&self) -> bool {
        self.outcome() == SyncOutcome::FullyApplied
    }

    /// Accounts whose removal failed
    pub fn failed_emails(&self) -> Vec<Email> {
        self.failures
            .iter()
            .filter_map(SyncError::email)
            .cloned()
            .collect()
    }

    /// Converts a run with failures into [`SyncError::PartialFailure`]
    pub fn into_result(self) -> Result<SyncReport, SyncError> {
        if self.failures.is_empty() {
            Ok(self)
        } else {
            Err(SyncError::PartialFailure {
                failed: self.failed_emails(),
            })
        }
    }
}

// ============================================================================
// SyncEngine
// ============================================================================

/// Removes target accounts that the authority directory no longer has
///
/// ## Dependencies
///
/// - `authority`: Source of truth for who stays provisioned
/// - `target`: Current roster of the system being cleaned up
/// - `connector`: Mutations on the target system
/// - `confirmation`: Optional live lookup consulted before each removal
pub struct SyncEngine {
    authority: Arc<dyn IAccountDirectory>,
    target: Arc<dyn IAccountDirectory>,
    connector: Arc<dyn IConnector>,
    confirmation: Option<Arc<dyn IEmailResolver>>,
    options: SyncOptions,
    operation_log: Mutex<Vec<OperationEntry>>,
}

impl SyncEngine {
    /// Creates a new `SyncEngine` with the given dependencies
    ///
    /// # Arguments
    /// * `authority` - Authority account catalog (IAccountDirectory)
    /// * `target` - Target account catalog (IAccountDirectory)
    /// * `connector` - Target-side mutations (IConnector)
    /// * `config` - Application configuration for sync settings
    pub fn new(
        authority: Arc<dyn IAccountDirectory>,
        target: Arc<dyn IAccountDirectory>,
        connector: Arc<dyn IConnector>,
        config: &Config,
    ) -> Self {
        Self {
            authority,
            target,
            connector,
            confirmation: None,
            options: SyncOptions::from(&config.sync),
            operation_log: Mutex::new(Vec::new()),
        }
    }

    /// Builds both directory snapshots, then the engine
    ///
    /// The authority snapshot also serves as the confirmation resolver, so
    /// `sync.confirm_before_remove` works without extra wiring. Use
    /// [`SyncEngine::with_confirmation`] to confirm against a live
    /// directory instead.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Directory`] if either snapshot fails to build.
    pub async fn from_providers(
        authority: Arc<dyn IDirectoryProvider>,
        target: Arc<dyn IDirectoryProvider>,
        connector: Arc<dyn IConnector>,
        config: &Config,
    ) -> Result<Self, SyncError> {
        let authority = Arc::new(DirectorySnapshot::build(authority, &config.directory).await?);
        let target = Arc::new(DirectorySnapshot::build(target, &config.directory).await?);

        let engine = Self::new(authority.clone(), target, connector, config);
        Ok(engine.with_confirmation(authority))
    }

    /// Sets the resolver consulted when `confirm_before_remove` is on
    pub fn with_confirmation(mut self, resolver: Arc<dyn IEmailResolver>) -> Self {
        self.confirmation = Some(resolver);
        self
    }

    /// Overrides the options taken from the configuration
    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> SyncOptions {
        self.options
    }

    /// Accounts that a run would try to remove, before any filtering
    pub fn deprovision_set(&self) -> Vec<Account> {
        compute_deprovision_set(self.target.accounts(), self.authority.accounts())
    }

    /// Every operation recorded so far, across runs
    pub fn operation_log(&self) -> Vec<OperationEntry> {
        self.operation_log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Runs one reconciliation
    ///
    /// # Returns
    /// A [`SyncReport`]; per-account failures are inside it, not returned
    /// as `Err`.
    ///
    /// # Errors
    /// Returns [`SyncError::ConfirmationUnavailable`] before touching the
    /// target if confirmation is enabled without a resolver.
    #[tracing::instrument(skip(self), fields(connector = self.connector.name()))]
    pub async fn sync(&self) -> Result<SyncReport, SyncError> {
        let start = Instant::now();

        let confirmation = match (self.options.confirm_before_remove, &self.confirmation) {
            (false, _) => None,
            (true, Some(resolver)) => Some(resolver.as_ref()),
            (true, None) => return Err(SyncError::ConfirmationUnavailable),
        };

        let run_id = RunId::new();
        let mut report = SyncReport::new(run_id, self.options.dry_run);
        let candidates = self.deprovision_set();

        info!(
            %run_id,
            target = self.target.accounts().len(),
            authority = self.authority.accounts().len(),
            candidates = candidates.len(),
            dry_run = self.options.dry_run,
            "Starting sync"
        );

        for account in candidates {
            let email = account.email().clone();

            if let Some(reason) = self.known_address_reason(&email) {
                debug!(email = %email, reason, "Keeping account");
                self.record(run_id, &email, OperationResult::skipped(reason));
                report.skipped.push(account);
                continue;
            }

            if let Some(resolver) = confirmation {
                match resolver.exists(&email).await {
                    Ok(false) => {}
                    Ok(true) => {
                        info!(email = %email, "Account still exists in authority, keeping");
                        self.record(
                            run_id,
                            &email,
                            OperationResult::skipped("still exists in authority directory"),
                        );
                        report.skipped.push(account);
                        continue;
                    }
                    Err(e) => {
                        let message = format!("{e:#}");
                        error!(email = %email, error = %message, "Confirmation lookup failed");
                        self.record(run_id, &email, OperationResult::failed(message.clone()));
                        report
                            .failures
                            .push(SyncError::ConfirmationFailed { email, message });
                        continue;
                    }
                }
            }

            if self.options.dry_run {
                info!(email = %email, "Would remove member");
                self.record(run_id, &email, OperationResult::Planned);
                report.planned.push(account);
                continue;
            }

            match self.connector.remove_member(&email).await {
                Ok(()) => {
                    info!(email = %email, "Removed member");
                    self.record(run_id, &email, OperationResult::Success);
                    report.removed.push(account);
                }
                Err(e) => {
                    let message = format!("{e:#}");
                    error!(email = %email, error = %message, "Failed to remove member");
                    self.record(run_id, &email, OperationResult::failed(message.clone()));
                    report
                        .failures
                        .push(SyncError::ConnectorOperationFailed { email, message });
                }
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;

        match report.outcome() {
            SyncOutcome::FullyApplied => info!(
                %run_id,
                removed = report.removed.len(),
                planned = report.planned.len(),
                skipped = report.skipped.len(),
                duration_ms = report.duration_ms,
                "Sync completed"
            ),
            SyncOutcome::AppliedWithFailures { failed } => warn!(
                %run_id,
                removed = report.removed.len(),
                skipped = report.skipped.len(),
                failed,
                duration_ms = report.duration_ms,
                "Sync completed with failures"
            ),
        }

        Ok(report)
    }

    fn known_address_reason(&self, email: &Email) -> Option<&'static str> {
        if !self.options.skip_known_addresses {
            return None;
        }
        match self.authority.email_classification(email)? {
            EmailKind::Group => Some("address is a group in authority directory"),
            EmailKind::Alias => Some("address is an alias in authority directory"),
            EmailKind::User => None,
        }
    }

    fn record(&self, run_id: RunId, email: &Email, result: OperationResult) {
        let entry = OperationEntry::new(Operation::MembersRemove, email.clone(), result)
            .with_run_id(run_id)
            .with_details(json!({
                "connector": self.connector.name(),
                "dry_run": self.options.dry_run,
            }));
        self.operation_log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry);
    }
}
