// Repository pattern for database operations

pub mod violation;

pub use violation::{ViolationQueries, ViolationRepository};

use sqlx::{AnyConnection, AnyPool, Row};
use std::marker::PhantomData;
use tracing::debug;

use crate::error::{DatabaseError, DbResult};
use crate::models::{Driver, Offense, Record, SpeedCamera, Violation, ID_COLUMN};
use crate::unit_of_work;
use crate::value::{bind_values, placeholders, row_to_map, RowMap, SqlValue};
use crate::Database;

const SQLITE_BACKEND: &str = "SQLite";

pub type DriverRepository = CrudRepository<Driver>;
pub type OffenseRepository = CrudRepository<Offense>;
pub type SpeedCameraRepository = CrudRepository<SpeedCamera>;

/// Table-agnostic CRUD over any [`Record`].
///
/// Every operation runs through [`unit_of_work::run`]. The plain methods
/// open their own transaction; the `_on` variants take an optional
/// caller-owned connection and leave its transaction alone.
pub struct CrudRepository<R: Record> {
    db: Database,
    table: String,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Clone for CrudRepository<R> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            table: self.table.clone(),
            _record: PhantomData,
        }
    }
}

impl<R: Record> CrudRepository<R> {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            table: R::table_name(),
            _record: PhantomData,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub async fn find_all(&self) -> DbResult<Vec<R>> {
        self.find_all_on(None).await
    }

    pub async fn find_all_on(&self, conn: Option<&mut AnyConnection>) -> DbResult<Vec<R>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {}",
            self.select_list(),
            self.table,
            ID_COLUMN
        );
        debug!(table = %self.table, sql = %sql, "find_all");

        let rows = fetch_row_maps(self.db.pool(), conn, sql, Vec::new()).await?;
        rows.iter().map(R::from_row).collect()
    }

    pub async fn find_by_id(&self, id: i64) -> DbResult<Option<R>> {
        self.find_by_id_on(None, id).await
    }

    pub async fn find_by_id_on(
        &self,
        conn: Option<&mut AnyConnection>,
        id: i64,
    ) -> DbResult<Option<R>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?",
            self.select_list(),
            self.table,
            ID_COLUMN
        );
        debug!(table = %self.table, id, "find_by_id");

        let rows = fetch_row_maps(self.db.pool(), conn, sql, vec![SqlValue::Int(id)]).await?;
        rows.first().map(R::from_row).transpose()
    }

    /// Returns the id the store generated, when the driver reports one.
    pub async fn insert(&self, record: &R) -> DbResult<Option<i64>> {
        self.insert_on(None, record).await
    }

    pub async fn insert_on(
        &self,
        conn: Option<&mut AnyConnection>,
        record: &R,
    ) -> DbResult<Option<i64>> {
        let values = record.values();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            R::column_names().join(", "),
            placeholders(&values)
        );
        debug!(table = %self.table, sql = %sql, "insert");

        unit_of_work::run(self.db.pool(), conn, move |conn| {
            Box::pin(async move {
                let result = bind_values(sqlx::query(&sql), values)
                    .execute(&mut *conn)
                    .await?;
                let id = match result.last_insert_id() {
                    Some(id) => Some(id),
                    // the SQLite bridge never reports the rowid
                    None if conn.backend_name() == SQLITE_BACKEND => {
                        let row = sqlx::query("SELECT last_insert_rowid()")
                            .fetch_one(&mut *conn)
                            .await?;
                        Some(row.try_get::<i64, _>(0)?)
                    }
                    None => None,
                };
                Ok::<_, DatabaseError>(id)
            })
        })
        .await
    }

    /// Inserts all records with a single statement. An empty slice does not
    /// touch the store.
    pub async fn insert_many(&self, records: &[R]) -> DbResult<()> {
        self.insert_many_on(None, records).await
    }

    pub async fn insert_many_on(
        &self,
        conn: Option<&mut AnyConnection>,
        records: &[R],
    ) -> DbResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut tuples = Vec::with_capacity(records.len());
        let mut values = Vec::with_capacity(records.len() * R::FIELDS.len());
        for record in records {
            let record_values = record.values();
            tuples.push(format!("({})", placeholders(&record_values)));
            values.extend(record_values);
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            self.table,
            R::column_names().join(", "),
            tuples.join(", ")
        );
        debug!(table = %self.table, rows = records.len(), "insert_many");

        unit_of_work::run(self.db.pool(), conn, move |conn| {
            Box::pin(async move {
                bind_values(sqlx::query(&sql), values)
                    .execute(&mut *conn)
                    .await?;
                Ok::<_, DatabaseError>(())
            })
        })
        .await
    }

    /// Overwrites every non-id column of row `id` with the values of `record`.
    pub async fn update(&self, id: i64, record: &R) -> DbResult<()> {
        self.update_on(None, id, record).await
    }

    pub async fn update_on(
        &self,
        conn: Option<&mut AnyConnection>,
        id: i64,
        record: &R,
    ) -> DbResult<()> {
        let mut values = record.values();
        let assignments = R::FIELDS
            .iter()
            .zip(&values)
            .map(|(field, value)| {
                let placeholder = if value.is_null() { "NULL" } else { "?" };
                format!("{} = {}", field.name, placeholder)
            })
            .collect::<Vec<_>>()
            .join(", ");
        values.push(SqlValue::Int(id));

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            self.table, assignments, ID_COLUMN
        );
        debug!(table = %self.table, id, "update");

        unit_of_work::run(self.db.pool(), conn, move |conn| {
            Box::pin(async move {
                bind_values(sqlx::query(&sql), values)
                    .execute(&mut *conn)
                    .await?;
                Ok::<_, DatabaseError>(())
            })
        })
        .await
    }

    /// Echoes `id` back whether or not a row was removed.
    pub async fn delete(&self, id: i64) -> DbResult<i64> {
        self.delete_on(None, id).await
    }

    pub async fn delete_on(&self, conn: Option<&mut AnyConnection>, id: i64) -> DbResult<i64> {
        let sql = format!("DELETE FROM {} WHERE {} = ?", self.table, ID_COLUMN);
        debug!(table = %self.table, id, "delete");

        unit_of_work::run(self.db.pool(), conn, move |conn| {
            Box::pin(async move {
                sqlx::query(&sql).bind(id).execute(&mut *conn).await?;
                Ok::<_, DatabaseError>(id)
            })
        })
        .await
    }

    /// Runs an arbitrary read query with bound parameters.
    pub async fn execute_query(&self, sql: &str, params: Vec<SqlValue>) -> DbResult<Vec<RowMap>> {
        fetch_row_maps(self.db.pool(), None, sql.to_string(), params).await
    }

    fn select_list(&self) -> String {
        std::iter::once(ID_COLUMN.to_string())
            .chain(R::FIELDS.iter().map(|f| f.select_expr()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Shared read path: runs `sql` inside a unit of work and returns each row
/// keyed by column name. No rows yields an empty vector.
pub(crate) async fn fetch_row_maps(
    pool: &AnyPool,
    conn: Option<&mut AnyConnection>,
    sql: String,
    params: Vec<SqlValue>,
) -> DbResult<Vec<RowMap>> {
    unit_of_work::run(pool, conn, move |conn| {
        Box::pin(async move {
            let rows = bind_values(sqlx::query(&sql), params)
                .fetch_all(&mut *conn)
                .await?;
            rows.iter().map(row_to_map).collect::<DbResult<Vec<_>>>()
        })
    })
    .await
}

/// Repository manager that provides access to all repositories
#[derive(Clone)]
pub struct RepositoryManager {
    db: Database,
}

impl RepositoryManager {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn drivers(&self) -> DriverRepository {
        DriverRepository::new(self.db.clone())
    }

    pub fn offenses(&self) -> OffenseRepository {
        OffenseRepository::new(self.db.clone())
    }

    pub fn speed_cameras(&self) -> SpeedCameraRepository {
        SpeedCameraRepository::new(self.db.clone())
    }

    pub fn violations(&self) -> ViolationRepository {
        ViolationRepository::new(self.db.clone())
    }
}
