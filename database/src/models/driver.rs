use serde::{Deserialize, Serialize};

use super::{Field, FieldKind, Record, ID_COLUMN};
use crate::error::DbResult;
use crate::value::{RowAccess, RowMap, SqlValue};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    /// Identifier external callers look drivers up by
    pub registration_number: String,
}

impl Driver {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        registration_number: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            registration_number: registration_number.into(),
        }
    }
}

impl Record for Driver {
    const TYPE_NAME: &'static str = "Driver";
    const FIELDS: &'static [Field] = &[
        Field::new("first_name", FieldKind::Text),
        Field::new("last_name", FieldKind::Text),
        Field::new("registration_number", FieldKind::Text),
    ];

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.first_name.as_str().into(),
            self.last_name.as_str().into(),
            self.registration_number.as_str().into(),
        ]
    }

    fn from_row(row: &RowMap) -> DbResult<Self> {
        Ok(Self {
            id: row.opt_i64(ID_COLUMN)?,
            first_name: row.get_string("first_name")?,
            last_name: row.get_string("last_name")?,
            registration_number: row.get_string("registration_number")?,
        })
    }
}
