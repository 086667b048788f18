use sea_query::SimpleExpr;
use std::collections::HashMap;

use crate::config::JoinMode;
use crate::error::{RelocateError, RelocateResult};
use crate::models::DataRow;
use crate::store::RecordStore;
use crate::transcripts::TranscriptStatus;
use crate::users::UserIndex;

/// One data row with its owner's username and transcript state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioAttributes {
    pub audio_id: i64,
    pub project_id: i64,
    pub assigned_user: String,
    pub is_marked_for_review: bool,
    pub is_empty_transcript: bool,
}

/// Join data rows with usernames and transcript flags.
///
/// Every record starts out with an empty transcript. Transcript statuses are
/// then applied in read order, so when several segmentation rows point at the
/// same record the last one decides.
pub fn join_attributes(
    rows: Vec<DataRow>,
    users: &UserIndex,
    status: &TranscriptStatus,
    join_mode: JoinMode,
) -> RelocateResult<Vec<AudioAttributes>> {
    let mut attributes = rows
        .into_iter()
        .map(|row| {
            let assigned_user = row
                .assigned_user_id
                .and_then(|user_id| users.username(user_id))
                .ok_or(RelocateError::UnknownAssignedUser {
                    audio_id: row.id,
                    user_id: row.assigned_user_id,
                })?;

            Ok(AudioAttributes {
                audio_id: row.id,
                project_id: row.project_id,
                assigned_user: assigned_user.to_string(),
                is_marked_for_review: row.is_marked_for_review(),
                is_empty_transcript: true,
            })
        })
        .collect::<RelocateResult<Vec<_>>>()?;

    match join_mode {
        JoinMode::Keyed => apply_keyed(&mut attributes, status),
        JoinMode::Positional => apply_positional(&mut attributes, status)?,
    }

    Ok(attributes)
}

fn apply_keyed(attributes: &mut [AudioAttributes], status: &TranscriptStatus) {
    let offsets: HashMap<i64, usize> = attributes
        .iter()
        .enumerate()
        .map(|(offset, record)| (record.audio_id, offset))
        .collect();

    for (data_id, is_empty) in status.iter() {
        match offsets.get(&data_id) {
            Some(&offset) => attributes[offset].is_empty_transcript = is_empty,
            None => log::debug!("Transcript for data_id {} has no loaded data row", data_id),
        }
    }
}

/// Positional matching: data_id N updates the record at offset N - 1.
fn apply_positional(
    attributes: &mut [AudioAttributes],
    status: &TranscriptStatus,
) -> RelocateResult<()> {
    let len = attributes.len();
    for (data_id, is_empty) in status.iter() {
        let offset = data_id - 1;
        let record = match usize::try_from(offset).ok().filter(|offset| *offset < len) {
            Some(offset) => &mut attributes[offset],
            None => {
                return Err(RelocateError::PositionOutOfRange {
                    data_id,
                    offset,
                    len,
                })
            }
        };
        if record.audio_id != data_id {
            log::warn!(
                "Positional join: transcript for data_id {} applied to audio {}",
                data_id,
                record.audio_id
            );
        }
        record.is_empty_transcript = is_empty;
    }
    Ok(())
}

/// Read the data table and join it with the user index and transcript flags
pub fn load_audio_attributes(
    store: &impl RecordStore,
    users: &UserIndex,
    status: &TranscriptStatus,
    join_mode: JoinMode,
    filter: Option<SimpleExpr>,
) -> RelocateResult<Vec<AudioAttributes>> {
    let rows = store.fetch_data(filter)?;
    log::info!("Loaded {} data rows ({:?} transcript join)", rows.len(), join_mode);
    join_attributes(rows, users, status, join_mode)
}
