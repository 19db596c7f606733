//! Reconcile `PostgreSQL` role privileges for a schema-migration pipeline.
//!
//! After migrations run, the admin/migrator role and the application role can
//! end up with mismatched privileges depending on which role created which
//! object. This crate issues the grant statements that bring both roles back
//! to a fully-granted state, treating every failure as non-fatal: a partially
//! granted database is preferable to a broken migration history.
#![warn(missing_docs)]

/// Privilege statement catalog and execution with identifier-quoting fallback.
pub mod grants;
/// Orchestration of grant passes across the admin and application roles.
pub mod reconciler;
/// Role configuration and resolution with misconfiguration fallback.
pub mod roles;
