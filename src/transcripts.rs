use crate::error::RelocateResult;
use crate::models::SegmentationRow;
use crate::store::RecordStore;

/// Empty-transcript flags per segmentation row, kept in read order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptStatus {
    pub data_ids: Vec<i64>,
    pub empty_flags: Vec<bool>,
}

/// A transcript is empty when nothing but whitespace is left after trimming.
/// NULL counts as empty.
pub fn is_empty_transcript(transcription: Option<&str>) -> bool {
    transcription.map_or(true, |text| text.trim().is_empty())
}

impl TranscriptStatus {
    pub fn from_rows(rows: impl IntoIterator<Item = SegmentationRow>) -> Self {
        let mut status = Self::default();
        for row in rows {
            status.data_ids.push(row.data_id);
            status
                .empty_flags
                .push(is_empty_transcript(row.transcription.as_deref()));
        }
        status
    }

    /// (data_id, is_empty) pairs in read order
    pub fn iter(&self) -> impl Iterator<Item = (i64, bool)> + '_ {
        self.data_ids
            .iter()
            .copied()
            .zip(self.empty_flags.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.data_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data_ids.is_empty()
    }
}

/// Read (data_id, transcription) pairs from the segmentation table
pub fn extract_transcript_status(store: &impl RecordStore) -> RelocateResult<TranscriptStatus> {
    let rows = store.fetch_transcriptions()?;
    let status = TranscriptStatus::from_rows(rows);
    log::info!(
        "Loaded {} transcripts ({} empty)",
        status.len(),
        status.empty_flags.iter().filter(|empty| **empty).count()
    );
    Ok(status)
}
