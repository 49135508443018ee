use sqlx::Executor;
use std::path::Path;
use tracing::{error, info};

use crate::error::{DatabaseError, DbResult};
use crate::unit_of_work;
use crate::Database;

/// Runs `.sql` scripts (schema, seed data) statement by statement.
pub struct SqlFileExecutor {
    db: Database,
}

impl SqlFileExecutor {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn execute_sql_file(&self, path: impl AsRef<Path>) -> DbResult<usize> {
        let path = path.as_ref();
        let script = tokio::fs::read_to_string(path).await?;
        info!(path = %path.display(), "Executing SQL file");
        self.execute_sql_script(&script).await
    }

    /// Executes every statement of `script` in one unit of work and returns
    /// how many ran. Execution stops at the first failing statement.
    pub async fn execute_sql_script(&self, script: &str) -> DbResult<usize> {
        let statements = split_statements(script);

        unit_of_work::run(self.db.pool(), None, move |conn| {
            Box::pin(async move {
                for statement in &statements {
                    info!(statement = %statement, "Executing command");
                    if let Err(e) = (&mut *conn).execute(statement.as_str()).await {
                        error!(error = %e, "Error while executing sql file");
                        return Err(DatabaseError::Script {
                            statement: statement.clone(),
                            source: e,
                        });
                    }
                }
                Ok(statements.len())
            })
        })
        .await
    }
}

/// Splits a script on `;`, dropping full-line `--` comments and empty
/// statements. Semicolons inside string literals are not supported.
pub fn split_statements(script: &str) -> Vec<String> {
    let without_comments = script
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");

    without_comments
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
