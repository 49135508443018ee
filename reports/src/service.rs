use roadwatch_database::{DbResult, RowMap, ViolationQueries};
use tracing::{debug, info};

use crate::dto::{CameraPopularityRow, DriverOffenseReportRow, SummaryStatisticsRow, TopDriverRow};

/// Builds report rows from the violation queries.
///
/// Empty results are logged and returned as empty vectors; only store and
/// decode failures surface as errors.
pub struct ViolationService<Q> {
    queries: Q,
}

impl<Q: ViolationQueries> ViolationService<Q> {
    pub fn new(queries: Q) -> Self {
        Self { queries }
    }

    pub async fn get_offenses_by_driver(
        &self,
        registration_number: &str,
    ) -> DbResult<Vec<DriverOffenseReportRow>> {
        let rows = self
            .queries
            .driver_offense_detail(registration_number)
            .await?;
        if rows.is_empty() {
            info!("Driver {} has no violations", registration_number);
            return Ok(Vec::new());
        }
        map_rows(&rows, DriverOffenseReportRow::from_row)
    }

    pub async fn get_top_drivers_by_points(&self) -> DbResult<Vec<TopDriverRow>> {
        let rows = self.queries.driver_points_ranking().await?;
        if rows.is_empty() {
            info!("No driver points");
            return Ok(Vec::new());
        }
        map_rows(&rows, TopDriverRow::from_row)
    }

    pub async fn get_speed_camera_statistic(&self) -> DbResult<Vec<CameraPopularityRow>> {
        let rows = self.queries.camera_popularity().await?;
        if rows.is_empty() {
            info!("Speed cameras have no data");
            return Ok(Vec::new());
        }
        map_rows(&rows, CameraPopularityRow::from_row)
    }

    /// The aggregate query yields one row even over an empty store; that row
    /// is returned as-is with zero counts and no sums.
    pub async fn get_summary_statistics(&self) -> DbResult<Vec<SummaryStatisticsRow>> {
        let rows = self.queries.summary_statistics().await?;
        let summaries = map_rows(&rows, SummaryStatisticsRow::from_row)?;
        if summaries.iter().all(|s| s.total_drivers == 0) {
            info!("No violations to summarize");
        }
        Ok(summaries)
    }
}

fn map_rows<T>(rows: &[RowMap], convert: fn(&RowMap) -> DbResult<T>) -> DbResult<Vec<T>> {
    debug!(rows = rows.len(), "Mapping report rows");
    rows.iter().map(convert).collect()
}
