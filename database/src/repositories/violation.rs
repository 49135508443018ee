//! Violation repository and its analytical read queries.
//!
//! The queries stick to SQL understood by both MySQL 8 and SQLite 3.25+.
//! Aggregates are cast explicitly because MySQL returns `SUM` and `ROUND`
//! results as DECIMAL, which the runtime-selected driver cannot decode.

use async_trait::async_trait;

use super::CrudRepository;
use crate::error::DbResult;
use crate::models::Violation;
use crate::value::RowMap;

pub type ViolationRepository = CrudRepository<Violation>;

const DRIVER_OFFENSE_DETAIL_SQL: &str = r#"
    SELECT d.first_name,
           d.last_name,
           d.registration_number,
           v.id_ AS violation_id,
           o.description,
           o.penalty_points,
           o.fine_amount,
           CAST(SUM(o.penalty_points) OVER (PARTITION BY d.id_) AS SIGNED) AS total_points,
           CAST(SUM(o.fine_amount) OVER (PARTITION BY d.id_) AS SIGNED) AS total_amount
    FROM violations v
             JOIN drivers d ON v.driver_id = d.id_
             JOIN offenses o ON v.offense_id = o.id_
    WHERE d.registration_number = ?
    ORDER BY v.id_
"#;

const DRIVER_POINTS_RANKING_SQL: &str = r#"
    SELECT d.id_,
           d.first_name,
           d.last_name,
           CAST(SUM(o.penalty_points) AS SIGNED) AS total_points
    FROM violations v
             JOIN offenses o ON v.offense_id = o.id_
             JOIN drivers d ON v.driver_id = d.id_
    GROUP BY d.id_, d.first_name, d.last_name
    ORDER BY total_points DESC, d.id_
"#;

const CAMERA_POPULARITY_SQL: &str = r#"
    SELECT s.location,
           COUNT(v.speed_camera_id) AS total_count
    FROM speed_cameras s
             LEFT JOIN violations v ON v.speed_camera_id = s.id_
    GROUP BY s.id_, s.location
    ORDER BY total_count DESC, s.id_
"#;

const SUMMARY_STATISTICS_SQL: &str = r#"
    SELECT COUNT(v.driver_id) AS total_drivers,
           COUNT(v.offense_id) AS total_offenses,
           CAST(SUM(o.penalty_points) AS SIGNED) AS total_points,
           CAST(ROUND(AVG(o.penalty_points), 2) AS DOUBLE) AS average_points,
           CAST(SUM(o.fine_amount) AS SIGNED) AS total_fine_amount,
           MAX(o.fine_amount) AS max_fine_amount,
           MIN(o.fine_amount) AS min_fine_amount
    FROM violations v
             JOIN offenses o ON v.offense_id = o.id_
"#;

/// Read-only reporting queries over recorded violations.
///
/// Each method returns plain row maps; turning them into report types is
/// the caller's job.
#[async_trait]
pub trait ViolationQueries: Send + Sync {
    /// Every offense of one driver, with per-driver running totals of points
    /// and fines on each row.
    async fn driver_offense_detail(&self, registration_number: &str) -> DbResult<Vec<RowMap>>;

    /// Total penalty points per driver, highest first.
    async fn driver_points_ranking(&self) -> DbResult<Vec<RowMap>>;

    /// Violation count per camera location, highest first. Cameras without
    /// violations are included with a count of zero.
    async fn camera_popularity(&self) -> DbResult<Vec<RowMap>>;

    /// Single-row aggregate over all violations and their offenses.
    async fn summary_statistics(&self) -> DbResult<Vec<RowMap>>;
}

#[async_trait]
impl ViolationQueries for ViolationRepository {
    async fn driver_offense_detail(&self, registration_number: &str) -> DbResult<Vec<RowMap>> {
        self.execute_query(DRIVER_OFFENSE_DETAIL_SQL, vec![registration_number.into()])
            .await
    }

    async fn driver_points_ranking(&self) -> DbResult<Vec<RowMap>> {
        self.execute_query(DRIVER_POINTS_RANKING_SQL, Vec::new()).await
    }

    async fn camera_popularity(&self) -> DbResult<Vec<RowMap>> {
        self.execute_query(CAMERA_POPULARITY_SQL, Vec::new()).await
    }

    async fn summary_statistics(&self) -> DbResult<Vec<RowMap>> {
        self.execute_query(SUMMARY_STATISTICS_SQL, Vec::new()).await
    }
}
