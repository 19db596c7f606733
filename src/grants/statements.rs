use serde::{Deserialize, Serialize};
use std::fmt;

/// A privilege statement issued during a reconciliation pass.
///
/// The broad pass issues the first five kinds in order; `Table` is the
/// historical single-table fix that the broad pass supersedes but does not
/// replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrantKind {
    /// `GRANT USAGE ON SCHEMA ...`
    SchemaUsage,
    /// `GRANT ALL PRIVILEGES ON ALL TABLES IN SCHEMA ...`
    AllTables,
    /// `GRANT ALL PRIVILEGES ON ALL SEQUENCES IN SCHEMA ...`
    AllSequences,
    /// `ALTER DEFAULT PRIVILEGES ... GRANT ALL ON TABLES`, covering tables
    /// the executing role creates in the future.
    DefaultTables,
    /// `ALTER DEFAULT PRIVILEGES ... GRANT ALL ON SEQUENCES`.
    DefaultSequences,
    /// `GRANT ALL PRIVILEGES ON TABLE <schema>.<table>` for one named table.
    Table(String),
}

impl GrantKind {
    /// Render the statement for `schema`, granting to an already-rendered
    /// role identifier.
    ///
    /// Only trusted deployment configuration is interpolated here: the role
    /// (rendered by [`render_role`]), the schema, and for `Table` the table
    /// name. None of these originate from end-user input.
    pub fn sql(&self, schema: &str, role_sql: &str) -> String {
        match self {
            GrantKind::SchemaUsage => {
                format!("GRANT USAGE ON SCHEMA {schema} TO {role_sql}")
            }
            GrantKind::AllTables => {
                format!("GRANT ALL PRIVILEGES ON ALL TABLES IN SCHEMA {schema} TO {role_sql}")
            }
            GrantKind::AllSequences => {
                format!("GRANT ALL PRIVILEGES ON ALL SEQUENCES IN SCHEMA {schema} TO {role_sql}")
            }
            GrantKind::DefaultTables => {
                format!("ALTER DEFAULT PRIVILEGES IN SCHEMA {schema} GRANT ALL ON TABLES TO {role_sql}")
            }
            GrantKind::DefaultSequences => {
                format!(
                    "ALTER DEFAULT PRIVILEGES IN SCHEMA {schema} GRANT ALL ON SEQUENCES TO {role_sql}"
                )
            }
            GrantKind::Table(table) => {
                format!("GRANT ALL PRIVILEGES ON TABLE {schema}.{table} TO {role_sql}")
            }
        }
    }
}

impl fmt::Display for GrantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrantKind::SchemaUsage => write!(f, "USAGE ON SCHEMA"),
            GrantKind::AllTables => write!(f, "ALL PRIVILEGES ON ALL TABLES"),
            GrantKind::AllSequences => write!(f, "ALL PRIVILEGES ON ALL SEQUENCES"),
            GrantKind::DefaultTables => write!(f, "DEFAULT PRIVILEGES ON TABLES"),
            GrantKind::DefaultSequences => write!(f, "DEFAULT PRIVILEGES ON SEQUENCES"),
            GrantKind::Table(table) => write!(f, "ALL PRIVILEGES ON TABLE {table}"),
        }
    }
}

/// The ordered statement sequence of one broad grant pass.
pub fn broad_sequence() -> [GrantKind; 5] {
    [
        GrantKind::SchemaUsage,
        GrantKind::AllTables,
        GrantKind::AllSequences,
        GrantKind::DefaultTables,
        GrantKind::DefaultSequences,
    ]
}

/// The default-privilege rules alone, re-applied by the driver so objects
/// the migrator creates later stay visible to the app role.
pub fn default_privilege_sequence() -> [GrantKind; 2] {
    [GrantKind::DefaultTables, GrantKind::DefaultSequences]
}

/// The historical narrow pass: one named table plus the default-privilege
/// rules.
pub fn legacy_table_sequence(table: &str) -> [GrantKind; 3] {
    [
        GrantKind::Table(table.to_string()),
        GrantKind::DefaultTables,
        GrantKind::DefaultSequences,
    ]
}

/// How the role identifier is rendered into the statement text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleQuoting {
    /// Double-quoted identifier; handles mixed case and reserved words.
    Quoted,
    /// Bare identifier.
    Unquoted,
}

impl fmt::Display for RoleQuoting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleQuoting::Quoted => write!(f, "quoted"),
            RoleQuoting::Unquoted => write!(f, "unquoted"),
        }
    }
}

/// Render a role identifier in the requested quoting form.
///
/// Quoting doubles any embedded double quote, the standard identifier
/// escape.
pub fn render_role(role: &str, quoting: RoleQuoting) -> String {
    match quoting {
        RoleQuoting::Quoted => format!("\"{}\"", role.replace('"', "\"\"")),
        RoleQuoting::Unquoted => role.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_role_quotes_and_escapes() {
        assert_eq!(render_role("app_user", RoleQuoting::Unquoted), "app_user");
        assert_eq!(
            render_role("App_User", RoleQuoting::Quoted),
            "\"App_User\""
        );
        assert_eq!(
            render_role("odd\"name", RoleQuoting::Quoted),
            "\"odd\"\"name\""
        );
    }

    #[test]
    fn broad_sequence_is_ordered_usage_tables_sequences_defaults() {
        let kinds = broad_sequence();
        assert_eq!(
            kinds,
            [
                GrantKind::SchemaUsage,
                GrantKind::AllTables,
                GrantKind::AllSequences,
                GrantKind::DefaultTables,
                GrantKind::DefaultSequences,
            ]
        );
    }

    #[test]
    fn sql_renders_each_statement_kind() {
        let role = render_role("app_user", RoleQuoting::Unquoted);
        assert_eq!(
            GrantKind::SchemaUsage.sql("public", &role),
            "GRANT USAGE ON SCHEMA public TO app_user"
        );
        assert_eq!(
            GrantKind::AllTables.sql("public", &role),
            "GRANT ALL PRIVILEGES ON ALL TABLES IN SCHEMA public TO app_user"
        );
        assert_eq!(
            GrantKind::AllSequences.sql("public", &role),
            "GRANT ALL PRIVILEGES ON ALL SEQUENCES IN SCHEMA public TO app_user"
        );
        assert_eq!(
            GrantKind::DefaultTables.sql("public", &role),
            "ALTER DEFAULT PRIVILEGES IN SCHEMA public GRANT ALL ON TABLES TO app_user"
        );
        assert_eq!(
            GrantKind::DefaultSequences.sql("public", &role),
            "ALTER DEFAULT PRIVILEGES IN SCHEMA public GRANT ALL ON SEQUENCES TO app_user"
        );
        assert_eq!(
            GrantKind::Table("tenants".to_string()).sql("public", &role),
            "GRANT ALL PRIVILEGES ON TABLE public.tenants TO app_user"
        );
    }

    #[test]
    fn quoted_role_renders_into_statement() {
        let role = render_role("App_User", RoleQuoting::Quoted);
        assert_eq!(
            GrantKind::SchemaUsage.sql("public", &role),
            "GRANT USAGE ON SCHEMA public TO \"App_User\""
        );
    }
}
