//! CLI entry point for `grantfix`.

use std::process;

use clap::Parser;
use grantfix::grants::{pg, SqlRunner};
use grantfix::reconciler;
use grantfix::roles::ReconcileConfig;

#[derive(Parser)]
#[command(
    name = "grantfix",
    about = "Reconcile PostgreSQL role privileges after schema migrations (best-effort: grant failures are logged, never fatal)"
)]
struct Cli {
    /// PostgreSQL connection URL (falls back to DATABASE_URL)
    #[arg(long)]
    db_url: Option<String>,

    /// Admin/migrator role (falls back to DB_USER_ADMIN)
    #[arg(long)]
    admin_role: Option<String>,

    /// Application role (falls back to DB_USER_SERVER)
    #[arg(long)]
    app_role: Option<String>,

    /// Schema whose privileges are reconciled
    #[arg(long, default_value = "public")]
    schema: String,

    /// Table targeted by the historical single-table fix
    #[arg(long, default_value = "tenants")]
    table: String,

    /// Skip the historical single-table fix
    #[arg(long)]
    skip_table_fix: bool,

    /// Print the statements instead of executing them
    #[arg(long)]
    dry_run: bool,

    /// Write the reconciliation report to stdout as JSON
    #[arg(long)]
    report_json: bool,

    /// Print verbose diagnostics
    #[arg(long)]
    verbose: bool,
}

/// Prints each statement instead of executing it.
struct PrintingRunner;

impl SqlRunner for PrintingRunner {
    fn execute(&mut self, sql: &str) -> Result<(), String> {
        println!("{sql};");
        Ok(())
    }
}

fn env_non_blank(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn main() {
    let cli = Cli::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();

    // Environment reading stays in this layer; the library only sees
    // already-resolved (or absent) values.
    let config = ReconcileConfig {
        admin_role: cli.admin_role.or_else(|| env_non_blank("DB_USER_ADMIN")),
        app_role: cli.app_role.or_else(|| env_non_blank("DB_USER_SERVER")),
        schema: cli.schema,
        legacy_table: cli.table,
    };

    if cli.dry_run {
        let mut runner = PrintingRunner;
        run(&mut runner, &config, cli.skip_table_fix, cli.report_json);
        return;
    }

    let Some(db_url) = cli.db_url.or_else(|| env_non_blank("DATABASE_URL")) else {
        eprintln!("No database URL provided (use --db-url or DATABASE_URL)");
        process::exit(2);
    };

    match pg::connect_with_retry(&db_url, 30) {
        Ok(mut conn) => run(&mut conn, &config, cli.skip_table_fix, cli.report_json),
        Err(e) => {
            eprintln!("Error connecting to database: {e}");
            process::exit(2);
        }
    }
}

fn run<R: SqlRunner>(runner: &mut R, config: &ReconcileConfig, skip_table_fix: bool, json: bool) {
    if !skip_table_fix {
        reconciler::apply_legacy_table_fix(runner, config);
    }

    let report = reconciler::apply(runner, config);

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => eprintln!("Error rendering report: {e}"),
        }
    }
}
