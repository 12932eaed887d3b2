use thiserror::Error;

pub type DatabaseResult<T> = std::result::Result<T, DatabaseError>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("sqlx migrate error: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),
    #[error("sqlx error: {0}")]
    SqlxError(#[from] sqlx::Error),
    #[error("json error: {0}")]
    SerdeError(#[from] serde_json::Error),
    #[error("unique constraint violated: {0}")]
    Conflict(&'static str),
    #[error("referenced {0} does not exist")]
    MissingReference(&'static str),
    #[error("quiz {0} has neither a question list nor an inline question")]
    MalformedQuiz(uuid::Uuid),
}
