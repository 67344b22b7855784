//! # Database module — MySQL connection pool management
//!
//! This module provides the shared MySQL connection pool used by the project
//! catalog.
//!
//! ## Design
//!
//! The pool is a **lazy, process-wide singleton** managed by a
//! [`Lifecycle`](crate::lifecycle::Lifecycle). The first call to
//! `ensure_initialized` reads the `MYSQL_*` settings, validates them as a unit and
//! opens a pool with up to 5 connections. Concurrent callers share that one attempt,
//! and `shutdown` closes the pool exactly once.
//!
//! ## Re-exports
//!
//! - [`Database`] — the lifecycle-managed pool.
//! - [`connection_pool`] — builds a [`Database`] for a settings source.
//! - [`MySqlConnector`] — the [`Connector`](crate::lifecycle::Connector) behind it.

mod pool;

pub use pool::{connection_pool, Database, MySqlConnector};
