use serde::{Deserialize, Serialize};

use super::{Field, FieldKind, Record, ID_COLUMN};
use crate::error::DbResult;
use crate::value::{RowAccess, RowMap, SqlValue};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedCamera {
    pub id: Option<i64>,
    pub location: String,
    /// Speed limit enforced by the camera, in km/h
    pub allowed_speed: i64,
}

impl SpeedCamera {
    pub fn new(location: impl Into<String>, allowed_speed: i64) -> Self {
        Self {
            id: None,
            location: location.into(),
            allowed_speed,
        }
    }
}

impl Record for SpeedCamera {
    const TYPE_NAME: &'static str = "SpeedCamera";
    const FIELDS: &'static [Field] = &[
        Field::new("location", FieldKind::Text),
        Field::new("allowed_speed", FieldKind::Integer),
    ];

    fn values(&self) -> Vec<SqlValue> {
        vec![self.location.as_str().into(), self.allowed_speed.into()]
    }

    fn from_row(row: &RowMap) -> DbResult<Self> {
        Ok(Self {
            id: row.opt_i64(ID_COLUMN)?,
            location: row.get_string("location")?,
            allowed_speed: row.get_i64("allowed_speed")?,
        })
    }
}
