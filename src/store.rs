use sea_query::SimpleExpr;

use crate::config::CommitMode;
use crate::error::RelocateResult;
use crate::models::{DataRow, SegmentationRow, UserRow};

/// Read/write access to the Audino tables the relocation touches.
///
/// Implemented by the MySQL and SQLite wrappers. All methods block until the
/// driver returns; errors are propagated without retries.
pub trait RecordStore {
    /// SELECT id, username FROM user
    fn fetch_users(&self) -> RelocateResult<Vec<UserRow>>;

    /// SELECT data_id, transcription FROM segmentation
    fn fetch_transcriptions(&self) -> RelocateResult<Vec<SegmentationRow>>;

    /// SELECT id, project_id, assigned_user_id, is_marked_for_review FROM data [WHERE filter]
    fn fetch_data(&self, filter: Option<SimpleExpr>) -> RelocateResult<Vec<DataRow>>;

    /// Point every listed data row at `user_id`, returning the number of rows changed
    fn update_assigned_user(
        &self,
        audio_ids: &[i64],
        user_id: i64,
        commit_mode: CommitMode,
    ) -> RelocateResult<u64>;
}
