use roadwatch_database::{DbResult, RowAccess, RowMap};
use serde::{Deserialize, Serialize};

/// One offense of a driver together with that driver's totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverOffenseReportRow {
    pub first_name: String,
    pub last_name: String,
    pub description: String,
    pub penalty_points: i64,
    pub fine_amount: i64,
    pub total_points: i64,
    pub total_amount: i64,
}

impl DriverOffenseReportRow {
    pub fn from_row(row: &RowMap) -> DbResult<Self> {
        Ok(Self {
            first_name: row.get_string("first_name")?,
            last_name: row.get_string("last_name")?,
            description: row.get_string("description")?,
            penalty_points: row.get_i64("penalty_points")?,
            fine_amount: row.get_i64("fine_amount")?,
            total_points: row.get_i64("total_points")?,
            total_amount: row.get_i64("total_amount")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopDriverRow {
    pub first_name: String,
    pub last_name: String,
    pub total_points: i64,
}

impl TopDriverRow {
    pub fn from_row(row: &RowMap) -> DbResult<Self> {
        Ok(Self {
            first_name: row.get_string("first_name")?,
            last_name: row.get_string("last_name")?,
            total_points: row.get_i64("total_points")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraPopularityRow {
    pub location: String,
    pub total_count: i64,
}

impl CameraPopularityRow {
    pub fn from_row(row: &RowMap) -> DbResult<Self> {
        Ok(Self {
            location: row.get_string("location")?,
            total_count: row.get_i64("total_count")?,
        })
    }
}

/// Aggregates over every recorded violation.
///
/// The sums and extremes are `None` when there is nothing to aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatisticsRow {
    pub total_drivers: i64,
    pub total_offenses: i64,
    pub total_points: Option<i64>,
    pub average_points: Option<f64>,
    pub total_fine_amount: Option<i64>,
    pub max_fine_amount: Option<i64>,
    pub min_fine_amount: Option<i64>,
}

impl SummaryStatisticsRow {
    pub fn from_row(row: &RowMap) -> DbResult<Self> {
        Ok(Self {
            total_drivers: row.get_i64("total_drivers")?,
            total_offenses: row.get_i64("total_offenses")?,
            total_points: row.opt_i64("total_points")?,
            average_points: row.opt_f64("average_points")?,
            total_fine_amount: row.opt_i64("total_fine_amount")?,
            max_fine_amount: row.opt_i64("max_fine_amount")?,
            min_fine_amount: row.opt_i64("min_fine_amount")?,
        })
    }
}
