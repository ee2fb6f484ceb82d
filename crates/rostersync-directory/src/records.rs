//! Mapping of raw provider records into domain types
//!
//! Provider DTOs carry addresses as plain strings. Everything past this
//! module works with validated [`Email`]s, so malformed addresses are dropped
//! here, once, with a warning.

use rostersync_core::domain::{Account, Email};
use rostersync_core::ports::DirectoryUser;
use tracing::warn;

/// Parses a raw address, logging and discarding it if malformed
///
/// `context` names where the address came from, e.g. the owning user.
pub fn parse_email(raw: &str, context: &str) -> Option<Email> {
    match Email::new(raw) {
        Ok(email) => Some(email),
        Err(e) => {
            warn!(address = raw, context, error = %e, "Dropping malformed address");
            None
        }
    }
}

/// Maps a user record to its primary [`Account`], with name fields
pub fn user_account(user: &DirectoryUser) -> Option<Account> {
    let email = parse_email(&user.primary_email, "primaryEmail")?;
    Some(Account::with_name(
        email,
        user.name.given_name.clone(),
        user.name.family_name.clone(),
    ))
}

/// Valid secondary addresses and aliases of a user, primary excluded
///
/// Order follows the record; duplicates are removed.
pub fn secondary_emails(user: &DirectoryUser) -> Vec<Email> {
    let primary = Email::new(&user.primary_email).ok();
    let mut out: Vec<Email> = Vec::new();
    for raw in user.secondary_addresses() {
        let Some(email) = parse_email(raw, &user.primary_email) else {
            continue;
        };
        if Some(&email) != primary.as_ref() && !out.contains(&email) {
            out.push(email);
        }
    }
    out
}

/// Every account a user contributes to an organization-wide membership
///
/// The primary account carries the name fields; secondary addresses and
/// aliases become bare accounts.
pub fn user_accounts(user: &DirectoryUser) -> Vec<Account> {
    user_account(user)
        .into_iter()
        .chain(secondary_emails(user).into_iter().map(Account::new))
        .collect()
}
