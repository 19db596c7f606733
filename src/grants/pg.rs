use std::thread;
use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::Connection;
use log::debug;

use crate::grants::SqlRunner;

impl SqlRunner for PgConnection {
    fn execute(&mut self, sql: &str) -> Result<(), String> {
        self.batch_execute(sql).map_err(|e| e.to_string())
    }
}

/// Establish a `PostgreSQL` connection, retrying while the server comes up.
///
/// Migration steps frequently race a freshly started database; one attempt
/// every 200ms for `attempts` tries covers that window.
pub fn connect_with_retry(database_url: &str, attempts: u32) -> Result<PgConnection, String> {
    let mut last_error = String::new();
    for attempt in 0..attempts {
        match PgConnection::establish(database_url) {
            Ok(conn) => return Ok(conn),
            Err(error) => {
                last_error = error.to_string();
                debug!("connection attempt {} failed: {last_error}", attempt + 1);
                thread::sleep(Duration::from_millis(200));
            }
        }
    }
    Err(format!(
        "failed to connect after {attempts} attempts: {last_error}"
    ))
}
