//! Transaction scope for a single repository operation.
//!
//! Internal mode (no connection supplied): a pooled connection is acquired
//! for the call, a transaction is opened, and it is committed when the
//! operation returns `Ok` or rolled back when it returns `Err`. The
//! connection goes back to the pool on every exit path, including the
//! returned future being dropped mid-flight, in which case the open
//! transaction is rolled back by its drop handler.
//!
//! External mode (caller supplies a connection): the operation runs on that
//! connection as-is and the caller keeps ownership of its transaction.
//!
//! ```ignore
//! let count = unit_of_work::run(db.pool(), None, |conn| {
//!     Box::pin(async move {
//!         let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM drivers")
//!             .fetch_one(&mut *conn)
//!             .await?;
//!         Ok(row.0)
//!     })
//! })
//! .await?;
//! ```

use futures::future::BoxFuture;
use sqlx::{AnyConnection, AnyPool};
use tracing::{debug, warn};

use crate::error::{DatabaseError, DbResult};

/// Runs `operation` inside exactly one transaction boundary.
///
/// Errors returned by `operation` come back unchanged. A failing rollback is
/// logged and never replaces the original error.
pub async fn run<T, F>(
    pool: &AnyPool,
    conn: Option<&mut AnyConnection>,
    operation: F,
) -> DbResult<T>
where
    T: Send,
    F: for<'c> FnOnce(&'c mut AnyConnection) -> BoxFuture<'c, DbResult<T>> + Send,
{
    if let Some(conn) = conn {
        return operation(conn).await;
    }

    let mut tx = pool.begin().await.map_err(DatabaseError::Connection)?;
    debug!("Opened unit of work");

    match operation(&mut *tx).await {
        Ok(value) => {
            tx.commit().await?;
            debug!("Committed unit of work");
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed after operation error");
            } else {
                debug!(error = %err, "Rolled back unit of work");
            }
            Err(err)
        }
    }
}
