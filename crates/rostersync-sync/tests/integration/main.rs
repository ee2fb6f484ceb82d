//! Integration tests for rostersync-sync
//!
//! Drives the sync engine against in-memory account catalogs and a
//! recording connector, and end to end against in-memory directories.

mod common;

mod test_hardening;
