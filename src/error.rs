//! Error type shared by the store, the pipeline and the CLI.

use thiserror::Error;

pub type RelocateResult<T> = Result<T, RelocateError>;

#[derive(Debug, Error)]
pub enum RelocateError {
    #[error("database connection failed: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error(
        "data row {audio_id} is assigned to user id {} which is not in the user table",
        .user_id.map_or_else(|| "NULL".to_string(), |id| id.to_string())
    )]
    UnknownAssignedUser { audio_id: i64, user_id: Option<i64> },

    #[error("source username '{0}' not found in user table")]
    UnknownSource(String),

    #[error("transcript for data_id {data_id} points at offset {offset}, but only {len} data rows were loaded")]
    PositionOutOfRange { data_id: i64, offset: i64, len: usize },

    #[error("target username '{0}' not found in user table; nothing was relocated")]
    UnknownTarget(String),

    #[error("username '{username}' matches several user ids: {ids:?}")]
    AmbiguousUser { username: String, ids: Vec<i64> },

    #[error("projection on table '{0}' needs at least one column")]
    EmptyProjection(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RelocateError::UnknownTarget("carol".to_string());
        assert!(err.to_string().contains("carol"));

        let err = RelocateError::PositionOutOfRange {
            data_id: 7,
            offset: 6,
            len: 2,
        };
        assert!(err.to_string().contains("data_id 7"));
        assert!(err.to_string().contains("only 2"));

        let err = RelocateError::UnknownAssignedUser {
            audio_id: 3,
            user_id: None,
        };
        assert!(err.to_string().contains("user id NULL"));

        let err = RelocateError::AmbiguousUser {
            username: "bob".to_string(),
            ids: vec![2, 5],
        };
        assert!(err.to_string().contains("[2, 5]"));
    }
}
