/// Statement catalog and role-identifier rendering.
pub mod statements;

/// Diesel-backed statement runner for live `PostgreSQL` connections.
pub mod pg;

use serde::{Deserialize, Serialize};
use std::fmt;

use log::{debug, info, warn};

use crate::grants::statements::{broad_sequence, render_role, GrantKind, RoleQuoting};

/// Capability to execute one raw SQL statement against the target database.
///
/// This is the only database surface the reconciliation logic needs. The
/// production implementation lives in [`pg`]; tests substitute a scripted
/// fake.
pub trait SqlRunner {
    /// Run `sql` to completion, returning the database's error message on
    /// failure.
    fn execute(&mut self, sql: &str) -> Result<(), String>;
}

/// Result of one statement after the quoting fallback has been exhausted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementResult {
    /// The statement ran, recording which quoting form the server accepted.
    Granted {
        /// Quoting form of the attempt that succeeded.
        quoting: RoleQuoting,
    },
    /// Both the quoted and the unquoted attempt failed.
    Failed {
        /// Error from the quoted attempt.
        quoted_error: String,
        /// Error from the unquoted retry.
        unquoted_error: String,
    },
}

/// One statement's kind and result within a grant pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementOutcome {
    /// Which privilege statement was attempted.
    pub kind: GrantKind,
    /// How the attempt (and its fallback retry) ended.
    pub result: StatementResult,
}

impl StatementOutcome {
    /// True when the statement ultimately succeeded.
    pub fn is_granted(&self) -> bool {
        matches!(self.result, StatementResult::Granted { .. })
    }
}

/// Coarse classification of a whole grant pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrantStatus {
    /// Every statement succeeded.
    FullyGranted,
    /// Some statements succeeded, some failed.
    PartiallyGranted,
    /// Every statement failed.
    Failed,
}

impl fmt::Display for GrantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrantStatus::FullyGranted => write!(f, "fully granted"),
            GrantStatus::PartiallyGranted => write!(f, "partially granted"),
            GrantStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Aggregated outcome of one grant pass for one role.
///
/// Never treated as a hard failure by the caller; it exists so operators and
/// tests can observe exactly which grants took effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrantOutcome {
    /// Role the pass targeted.
    pub role: String,
    /// Schema the pass targeted.
    pub schema: String,
    /// Per-statement outcomes, in issue order.
    pub statements: Vec<StatementOutcome>,
}

impl RoleGrantOutcome {
    /// Classify the pass as fully granted, partially granted, or failed.
    pub fn status(&self) -> GrantStatus {
        let granted = self.statements.iter().filter(|s| s.is_granted()).count();
        if granted == self.statements.len() {
            GrantStatus::FullyGranted
        } else if granted == 0 {
            GrantStatus::Failed
        } else {
            GrantStatus::PartiallyGranted
        }
    }

    /// True when every statement in the pass succeeded.
    pub fn fully_granted(&self) -> bool {
        self.status() == GrantStatus::FullyGranted
    }
}

/// Attempt one statement with the role quoted, retrying once unquoted.
///
/// Mixed-case or reserved-word role names require quoting, while some
/// managed environments only accept the bare form, so neither form can be
/// assumed; the quoted form is preferred because it is correct for the
/// larger set of identifiers. A failure of both attempts is logged and
/// reported, never propagated.
pub fn execute_with_quoting_fallback<R: SqlRunner>(
    runner: &mut R,
    kind: &GrantKind,
    schema: &str,
    role: &str,
) -> StatementResult {
    let quoted_sql = kind.sql(schema, &render_role(role, RoleQuoting::Quoted));
    debug!("issuing: {quoted_sql}");
    let quoted_error = match runner.execute(&quoted_sql) {
        Ok(()) => {
            info!("granted {kind} to \"{role}\"");
            return StatementResult::Granted {
                quoting: RoleQuoting::Quoted,
            };
        }
        Err(error) => error,
    };

    warn!("{kind} for \"{role}\" failed ({quoted_error}); retrying with unquoted identifier");
    let unquoted_sql = kind.sql(schema, &render_role(role, RoleQuoting::Unquoted));
    debug!("issuing: {unquoted_sql}");
    match runner.execute(&unquoted_sql) {
        Ok(()) => {
            info!("granted {kind} to {role} (unquoted)");
            StatementResult::Granted {
                quoting: RoleQuoting::Unquoted,
            }
        }
        Err(unquoted_error) => {
            warn!("{kind} for {role} failed in both quoting forms; continuing ({unquoted_error})");
            StatementResult::Failed {
                quoted_error,
                unquoted_error,
            }
        }
    }
}

/// Run an ordered sequence of grant statements for one role.
///
/// Every statement is attempted regardless of earlier failures in the same
/// pass; a failed grant must never abort the remainder of the run.
pub fn run_grant_pass<R: SqlRunner>(
    runner: &mut R,
    role: &str,
    schema: &str,
    kinds: &[GrantKind],
) -> RoleGrantOutcome {
    let statements = kinds
        .iter()
        .map(|kind| StatementOutcome {
            kind: kind.clone(),
            result: execute_with_quoting_fallback(runner, kind, schema, role),
        })
        .collect();

    let outcome = RoleGrantOutcome {
        role: role.to_string(),
        schema: schema.to_string(),
        statements,
    };
    info!(
        "grant pass for '{}' on schema '{}': {}",
        outcome.role,
        outcome.schema,
        outcome.status()
    );
    outcome
}

/// The full five-statement pass: schema usage, existing tables, existing
/// sequences, and the default-privilege rules for future tables and
/// sequences.
pub fn grant_role_privileges<R: SqlRunner>(
    runner: &mut R,
    role: &str,
    schema: &str,
) -> RoleGrantOutcome {
    run_grant_pass(runner, role, schema, &broad_sequence())
}
