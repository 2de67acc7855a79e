use axum::http::StatusCode;
use tracing::{error, warn};

/// Failures of the data layer. A missing row is not one of them: lookups
/// return `Option` and mutations return the affected-row count.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("{table} already has a row with {column} = {id}")]
    Conflict {
        table: &'static str,
        column: &'static str,
        id: i64,
    },
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DataError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Logs `e` and turns it into a handler rejection.
pub(crate) fn reject(e: DataError) -> (StatusCode, String) {
    match &e {
        DataError::Validation(_) | DataError::Conflict { .. } => warn!(error = %e, "request rejected"),
        _ => error!(error = %e, "data layer failure"),
    }
    e.into()
}

impl From<DataError> for (StatusCode, String) {
    fn from(e: DataError) -> Self {
        (e.status(), e.to_string())
    }
}
