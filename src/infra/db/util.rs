use sqlx::error::DatabaseError;

use crate::application::repos::RepoError;

// Postgres SQLSTATE codes that map to something other than a plain
// persistence failure.
const QUERY_CANCELED: &str = "57014";
const INVALID_TEXT_REPRESENTATION: &str = "22P02";
const INVALID_PARAMETER_VALUE: &str = "22023";
const UNDEFINED_TABLE: &str = "42P01";

pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::RowNotFound => RepoError::NotFound,
        sqlx::Error::PoolTimedOut => RepoError::Timeout,
        sqlx::Error::Database(db) => map_database_error(db.as_ref()),
        other => RepoError::from_persistence(other),
    }
}

fn map_database_error(db: &dyn DatabaseError) -> RepoError {
    match db.code().as_deref() {
        Some(QUERY_CANCELED) => RepoError::Timeout,
        Some(INVALID_TEXT_REPRESENTATION | INVALID_PARAMETER_VALUE) => RepoError::InvalidInput {
            message: db.message().to_string(),
        },
        Some(UNDEFINED_TABLE) => RepoError::from_persistence(format!(
            "{} (have migrations been applied?)",
            db.message()
        )),
        _ => RepoError::from_persistence(db.message()),
    }
}
