#![allow(dead_code)]

use grantfix::grants::SqlRunner;
use grantfix::roles::ReconcileConfig;

/// Records every statement and fails those containing a denied fragment.
pub(crate) struct ScriptedRunner {
    pub(crate) executed: Vec<String>,
    deny: Vec<String>,
}

impl ScriptedRunner {
    pub(crate) fn permissive() -> Self {
        ScriptedRunner {
            executed: Vec::new(),
            deny: Vec::new(),
        }
    }

    /// Statements containing `fragment` will fail.
    pub(crate) fn deny(mut self, fragment: &str) -> Self {
        self.deny.push(fragment.to_string());
        self
    }

    pub(crate) fn executed_containing(&self, fragment: &str) -> usize {
        self.executed.iter().filter(|s| s.contains(fragment)).count()
    }
}

impl SqlRunner for ScriptedRunner {
    fn execute(&mut self, sql: &str) -> Result<(), String> {
        self.executed.push(sql.to_string());
        if self.deny.iter().any(|fragment| sql.contains(fragment)) {
            Err(format!("permission denied for relation in `{sql}`"))
        } else {
            Ok(())
        }
    }
}

pub(crate) fn config(admin: Option<&str>, app: Option<&str>) -> ReconcileConfig {
    ReconcileConfig {
        admin_role: admin.map(ToString::to_string),
        app_role: app.map(ToString::to_string),
        ..ReconcileConfig::default()
    }
}
