// Persisted records for roadwatch

pub mod driver;
pub mod offense;
pub mod speed_camera;
pub mod violation;

pub use driver::*;
pub use offense::*;
pub use speed_camera::*;
pub use violation::*;

use crate::error::DbResult;
use crate::value::{RowMap, SqlValue};

/// Primary key column shared by every table.
pub const ID_COLUMN: &str = "id_";

/// How a field is stored and read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Text,
    /// Calendar date; read back as text because not every driver exposes a date type
    Date,
}

/// One non-id column of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl Field {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }

    /// Expression used for this column in a select list.
    pub fn select_expr(&self) -> String {
        match self.kind {
            FieldKind::Date => format!("CAST({0} AS CHAR) AS {0}", self.name),
            FieldKind::Integer | FieldKind::Text => self.name.to_string(),
        }
    }
}

/// Schema descriptor every persisted record provides.
///
/// `FIELDS` lists the non-id columns in declaration order; `values` must
/// return one value per field in that same order.
pub trait Record: Sized + Send + Sync + Unpin + 'static {
    const TYPE_NAME: &'static str;
    const FIELDS: &'static [Field];

    fn values(&self) -> Vec<SqlValue>;

    fn from_row(row: &RowMap) -> DbResult<Self>;

    fn table_name() -> String {
        table_name_for(Self::TYPE_NAME)
    }

    fn column_names() -> Vec<&'static str> {
        Self::FIELDS.iter().map(|f| f.name).collect()
    }
}

/// `SpeedCamera` -> `speed_cameras`
pub fn table_name_for(type_name: &str) -> String {
    pluralize(&underscore(type_name))
}

fn underscore(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '-' {
            out.push('_');
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).map_or(false, |n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}

fn pluralize(word: &str) -> String {
    const SIBILANT_ENDINGS: [&str; 5] = ["s", "x", "z", "ch", "sh"];

    if let Some(stem) = word.strip_suffix('y') {
        let before_y = stem.chars().last();
        if before_y.map_or(false, |c| !"aeiou".contains(c)) {
            return format!("{}ies", stem);
        }
    }
    if SIBILANT_ENDINGS.iter().any(|end| word.ends_with(end)) {
        return format!("{}es", word);
    }
    format!("{}s", word)
}
