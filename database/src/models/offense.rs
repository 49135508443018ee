use serde::{Deserialize, Serialize};

use super::{Field, FieldKind, Record, ID_COLUMN};
use crate::error::DbResult;
use crate::value::{RowAccess, RowMap, SqlValue};

/// Catalogue entry describing one kind of traffic offense and its penalty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offense {
    pub id: Option<i64>,
    pub description: String,
    pub penalty_points: i64,
    pub fine_amount: i64,
}

impl Offense {
    pub fn new(description: impl Into<String>, penalty_points: i64, fine_amount: i64) -> Self {
        Self {
            id: None,
            description: description.into(),
            penalty_points,
            fine_amount,
        }
    }
}

impl Record for Offense {
    const TYPE_NAME: &'static str = "Offense";
    const FIELDS: &'static [Field] = &[
        Field::new("description", FieldKind::Text),
        Field::new("penalty_points", FieldKind::Integer),
        Field::new("fine_amount", FieldKind::Integer),
    ];

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.description.as_str().into(),
            self.penalty_points.into(),
            self.fine_amount.into(),
        ]
    }

    fn from_row(row: &RowMap) -> DbResult<Self> {
        Ok(Self {
            id: row.opt_i64(ID_COLUMN)?,
            description: row.get_string("description")?,
            penalty_points: row.get_i64("penalty_points")?,
            fine_amount: row.get_i64("fine_amount")?,
        })
    }
}
