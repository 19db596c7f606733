use serde::{Deserialize, Serialize};

use log::{info, warn};

use crate::grants::statements::{default_privilege_sequence, legacy_table_sequence};
use crate::grants::{grant_role_privileges, run_grant_pass, RoleGrantOutcome, SqlRunner};
use crate::roles::{resolve_roles, ReconcileConfig, ResolvedRoles};

/// Everything one reconciliation run did, for observability and testing.
///
/// A report is returned unconditionally; no statement failure escalates into
/// an error from [`apply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// The resolved role pair the run targeted.
    pub roles: ResolvedRoles,
    /// Broad pass for the app role; `None` when skipped because the app role
    /// resolved equal to the admin role.
    pub app_pass: Option<RoleGrantOutcome>,
    /// Broad pass for the admin role, always run as a safety net.
    pub admin_pass: RoleGrantOutcome,
    /// Re-applied default-privilege rules for the app role, run last so that
    /// objects the currently-executing (migrator) role creates later remain
    /// visible to the app role.
    pub future_objects_pass: RoleGrantOutcome,
}

impl ReconcileReport {
    /// Iterate over every pass that actually executed.
    pub fn passes(&self) -> impl Iterator<Item = &RoleGrantOutcome> {
        self.app_pass
            .iter()
            .chain([&self.admin_pass, &self.future_objects_pass])
    }

    /// True when every statement of every executed pass succeeded.
    pub fn fully_granted(&self) -> bool {
        self.passes().all(RoleGrantOutcome::fully_granted)
    }
}

/// Reconcile privileges for both roles: the broad mutual pass.
///
/// Order: resolve roles; grant to the app role unless it resolved equal to
/// the admin role; always grant to the admin role; finally re-apply the
/// default-privilege rules for the app role.
///
/// Precondition: default-privilege rules only affect objects created by the
/// role executing them, so the future-object-visibility guarantee for the
/// app role holds only when this runs on the admin/migrator connection. This
/// is the caller's responsibility and is not enforced here.
pub fn apply<R: SqlRunner>(runner: &mut R, config: &ReconcileConfig) -> ReconcileReport {
    let roles = resolve_roles(config);
    info!(
        "reconciling privileges on schema '{}' for admin '{}' and app '{}'",
        config.schema, roles.admin, roles.app
    );

    let app_pass = if roles.app_is_admin() {
        info!(
            "app role resolved equal to admin role '{}'; single pass covers both",
            roles.admin
        );
        None
    } else {
        Some(grant_role_privileges(runner, &roles.app, &config.schema))
    };

    let admin_pass = grant_role_privileges(runner, &roles.admin, &config.schema);

    // The earlier passes ran their default-privilege statements too, but
    // those only bind to the executing role's future objects. Re-applying
    // them for the app role here, on what is assumed to be the migrator
    // connection, keeps tables the migrator creates later visible to the app.
    let future_objects_pass = run_grant_pass(
        runner,
        &roles.app,
        &config.schema,
        &default_privilege_sequence(),
    );

    let report = ReconcileReport {
        roles,
        app_pass,
        admin_pass,
        future_objects_pass,
    };
    if report.fully_granted() {
        info!("privilege reconciliation complete: fully granted");
    } else {
        warn!("privilege reconciliation complete with failures; see statement log above");
    }
    report
}

/// The historical narrow fix: grant on one named table to the app role, plus
/// the default-privilege rules.
///
/// Superseded by [`apply`]'s schema-wide pass, but still issued so databases
/// that only ever received this fix stay covered.
pub fn apply_legacy_table_fix<R: SqlRunner>(
    runner: &mut R,
    config: &ReconcileConfig,
) -> RoleGrantOutcome {
    let roles = resolve_roles(config);
    info!(
        "applying single-table fix on '{}.{}' for '{}'",
        config.schema, config.legacy_table, roles.app
    );
    run_grant_pass(
        runner,
        &roles.app,
        &config.schema,
        &legacy_table_sequence(&config.legacy_table),
    )
}

/// The undo half of the migration interface: a deliberate permanent no-op.
///
/// Privileges are monotonically cumulative; revoking them in an undo step
/// can break sibling deployments that rely on the grants, so they are left
/// in place even when the forward step is conceptually rolled back.
pub fn revert(config: &ReconcileConfig) {
    info!(
        "skipping privilege revocation on schema '{}' for safety; grants are left in place",
        config.schema
    );
}
