use thiserror::Error;

pub type DbResult<T> = Result<T, DatabaseError>;

/// Errors raised by the storage layer.
///
/// Missing rows are not errors: lookups return `Option` and queries return
/// empty vectors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Required settings are absent or malformed
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Pool exhausted, store unreachable, or no transaction could be opened
    #[error("Connection error: {0}")]
    Connection(#[source] sqlx::Error),

    /// The store rejected a statement
    #[error("Query failed: {0}")]
    Query(#[from] sqlx::Error),

    /// A row could not be mapped onto a record or report type
    #[error("Failed to decode column '{column}': {message}")]
    Decode { column: String, message: String },

    /// A statement from a SQL script failed; remaining statements were skipped
    #[error("Script statement failed: {statement} - {source}")]
    Script {
        statement: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DatabaseError {
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn decode<C: Into<String>, M: Into<String>>(column: C, message: M) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// True for failures that happened before any statement reached the store.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}
