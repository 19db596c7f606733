use serde::{Deserialize, Serialize};
use std::fmt;

use log::info;

/// Role targeted when no admin role is declared.
pub const DEFAULT_ADMIN_ROLE: &str = "postgres";

/// Role targeted when the declared app role is absent or misconfigured.
pub const DEFAULT_APP_ROLE: &str = "app_user";

/// Well-known superuser-equivalent role name.
///
/// Some deployment environments populate the app-role setting with this
/// value by mistake; a declared app role equal to it is treated as
/// misconfiguration.
pub const SUPERUSER_ROLE: &str = "postgres";

/// Configuration for one reconciliation run.
///
/// Callers construct this from their own environment-reading layer; the
/// library never reads environment variables itself. Absent role values are
/// permitted and trigger the defaulting in [`resolve_roles`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Declared admin/migrator role, if any.
    pub admin_role: Option<String>,
    /// Declared application role, if any.
    pub app_role: Option<String>,
    /// Schema whose privileges are reconciled.
    pub schema: String,
    /// Table targeted by the historical single-table fix.
    pub legacy_table: String,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        ReconcileConfig {
            admin_role: None,
            app_role: None,
            schema: "public".to_string(),
            legacy_table: "tenants".to_string(),
        }
    }
}

/// Why the declared app role was rejected in favor of [`DEFAULT_APP_ROLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppRoleFallback {
    /// No app role was declared (or the declared value was blank).
    Missing,
    /// The declared app role was the well-known superuser name.
    MatchedSuperuser,
    /// The declared app role was identical to the resolved admin role.
    MatchedAdminRole,
}

impl fmt::Display for AppRoleFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppRoleFallback::Missing => write!(f, "no app role declared"),
            AppRoleFallback::MatchedSuperuser => {
                write!(f, "declared app role is the superuser role")
            }
            AppRoleFallback::MatchedAdminRole => {
                write!(f, "declared app role is the admin role")
            }
        }
    }
}

/// The concrete role pair a reconciliation run targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRoles {
    /// Admin/migrator role.
    pub admin: String,
    /// Application role.
    pub app: String,
    /// Set when the declared app role was rejected and the default used.
    pub app_fallback: Option<AppRoleFallback>,
}

impl ResolvedRoles {
    /// True when both semantic roles resolved to the same identifier, in
    /// which case a single grant pass covers both.
    pub fn app_is_admin(&self) -> bool {
        self.app == self.admin
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Resolve the declared role configuration into a concrete role pair.
///
/// The admin role defaults to [`DEFAULT_ADMIN_ROLE`]. The declared app role
/// is accepted only when present, not blank, not the superuser name, and not
/// equal to the resolved admin role; otherwise [`DEFAULT_APP_ROLE`] is used
/// and a diagnostic line is logged. Resolution never fails.
pub fn resolve_roles(config: &ReconcileConfig) -> ResolvedRoles {
    let admin = non_blank(config.admin_role.as_ref())
        .unwrap_or(DEFAULT_ADMIN_ROLE)
        .to_string();

    let declared = non_blank(config.app_role.as_ref());
    let (app, app_fallback) = match declared {
        Some(role) if role != SUPERUSER_ROLE && role != admin => (role.to_string(), None),
        rejected => {
            let reason = match rejected {
                None => AppRoleFallback::Missing,
                Some(role) if role == SUPERUSER_ROLE => AppRoleFallback::MatchedSuperuser,
                Some(_) => AppRoleFallback::MatchedAdminRole,
            };
            info!(
                "app role '{}' rejected ({reason}); targeting '{DEFAULT_APP_ROLE}' instead",
                rejected.unwrap_or("<unset>")
            );
            (DEFAULT_APP_ROLE.to_string(), Some(reason))
        }
    };

    ResolvedRoles {
        admin,
        app,
        app_fallback,
    }
}
