use crate::error::RelocateResult;
use crate::queries::{select_columns, SqlBackend};
use crate::schema::Segmentation;

/// SELECT data_id, transcription FROM segmentation
pub fn select_transcriptions(backend: SqlBackend) -> RelocateResult<String> {
    select_columns(
        backend,
        Segmentation::Table,
        &[Segmentation::DataId, Segmentation::Transcription],
        None,
    )
}
