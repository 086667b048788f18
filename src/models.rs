//! Typed rows for each projection the relocation pipeline reads.
//!
//! Field names match the physical column names so `sqlx::FromRow` can map
//! them by name on both MySQL and SQLite.

/// One row of `SELECT id, username FROM user`
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
}

/// One row of `SELECT data_id, transcription FROM segmentation`
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SegmentationRow {
    pub data_id: i64,
    pub transcription: Option<String>,
}

/// One row of `SELECT id, project_id, assigned_user_id, is_marked_for_review FROM data`
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct DataRow {
    pub id: i64,
    pub project_id: i64,
    pub assigned_user_id: Option<i64>,
    /// Stored as TINYINT(1) in MySQL; NULL reads as not marked
    pub is_marked_for_review: Option<i64>,
}

impl DataRow {
    pub fn is_marked_for_review(&self) -> bool {
        self.is_marked_for_review.unwrap_or(0) != 0
    }
}
