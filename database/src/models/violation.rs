use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Field, FieldKind, Record, ID_COLUMN};
use crate::error::DbResult;
use crate::value::{RowAccess, RowMap, SqlValue};

/// A recorded violation. The three references are plain ids; the store's
/// foreign keys decide whether they must exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub id: Option<i64>,
    pub violation_date: NaiveDate,
    pub driver_id: i64,
    pub speed_camera_id: i64,
    pub offense_id: i64,
}

impl Violation {
    pub fn new(
        violation_date: NaiveDate,
        driver_id: i64,
        speed_camera_id: i64,
        offense_id: i64,
    ) -> Self {
        Self {
            id: None,
            violation_date,
            driver_id,
            speed_camera_id,
            offense_id,
        }
    }
}

impl Record for Violation {
    const TYPE_NAME: &'static str = "Violation";
    const FIELDS: &'static [Field] = &[
        Field::new("violation_date", FieldKind::Date),
        Field::new("driver_id", FieldKind::Integer),
        Field::new("speed_camera_id", FieldKind::Integer),
        Field::new("offense_id", FieldKind::Integer),
    ];

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.violation_date.into(),
            self.driver_id.into(),
            self.speed_camera_id.into(),
            self.offense_id.into(),
        ]
    }

    fn from_row(row: &RowMap) -> DbResult<Self> {
        Ok(Self {
            id: row.opt_i64(ID_COLUMN)?,
            violation_date: row.get_date("violation_date")?,
            driver_id: row.get_i64("driver_id")?,
            speed_camera_id: row.get_i64("speed_camera_id")?,
            offense_id: row.get_i64("offense_id")?,
        })
    }
}
