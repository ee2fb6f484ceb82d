//! RosterSync Core - Domain types and port definitions
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `Account`, `Group`, `EmailClassification`, `OperationEntry`
//! - **Port definitions** - Traits for adapters: `IDirectoryProvider`, `IAccountDirectory`,
//!   `IEmailResolver`, `IConnector`
//! - **Configuration** - YAML-backed settings for directory reads and sync runs
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure data types with no I/O. Ports define
//! trait interfaces that the directory and sync crates consume, and that
//! vendor adapters implement.

pub mod config;
pub mod domain;
pub mod ports;
