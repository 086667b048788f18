//! Moves records from source users to a target user.
//!
//! The run is: load users, transcript flags and data rows; join and group
//! them by owner; select the source users' records that still need work;
//! resolve the target; update `data.assigned_user_id`.

use std::collections::HashSet;
use std::fmt;

use crate::attributes::{load_audio_attributes, AudioAttributes};
use crate::config::{CommitMode, JoinMode, RelocationConfig};
use crate::error::{RelocateError, RelocateResult};
use crate::grouping::{group_by_user, UserAttributes};
use crate::queries::data::project_filter;
use crate::store::RecordStore;
use crate::transcripts::extract_transcript_status;
use crate::users::{build_user_index, UserIndex};

/// Everything read from the database for one run
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub users: UserIndex,
    pub attributes: Vec<AudioAttributes>,
    pub groups: UserAttributes,
}

/// Records picked for relocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub audio_ids: Vec<i64>,
    /// Reviewed records with an empty transcript that stay where they are
    pub skipped: usize,
}

/// Outcome of a relocation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationReport {
    pub sources: Vec<String>,
    pub target: String,
    pub target_id: i64,
    pub selected: Vec<i64>,
    pub skipped: usize,
    pub updated: u64,
    pub dry_run: bool,
}

impl fmt::Display for RelocationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.dry_run { "would move" } else { "moved" };
        write!(
            f,
            "{} -> {} (id {}): {} {} records, {} rows updated, {} reviewed-and-empty skipped",
            self.sources.join(","),
            self.target,
            self.target_id,
            verb,
            self.selected.len(),
            self.updated,
            self.skipped
        )
    }
}

/// Read the three tables and build the per-user record lists
pub fn load_snapshot(
    store: &impl RecordStore,
    join_mode: JoinMode,
    project_id: Option<i64>,
) -> RelocateResult<Snapshot> {
    let users = build_user_index(store)?;
    let status = extract_transcript_status(store)?;
    let attributes = load_audio_attributes(
        store,
        &users,
        &status,
        join_mode,
        project_id.map(project_filter),
    )?;
    let groups = group_by_user(&attributes);

    Ok(Snapshot {
        users,
        attributes,
        groups,
    })
}

/// Pick every record of the source users except reviewed ones with an empty transcript.
///
/// A source that exists in the user table but owns no records contributes
/// nothing, so repeating a finished relocation selects nothing.
pub fn select_for_relocation(
    groups: &UserAttributes,
    sources: &[String],
    users: &UserIndex,
) -> RelocateResult<Selection> {
    let mut selection = Selection::default();
    let mut seen = HashSet::new();

    for source in sources {
        if !users.contains_username(source) {
            return Err(RelocateError::UnknownSource(source.clone()));
        }
        if !seen.insert(source.as_str()) {
            log::warn!("Source user '{}' listed more than once", source);
            continue;
        }

        let records = groups.get(source).map(Vec::as_slice).unwrap_or_default();
        for record in records {
            if record.needs_relocation() {
                selection.audio_ids.push(record.audio_id);
            } else {
                selection.skipped += 1;
            }
        }
        log::info!("Source user '{}' owns {} records", source, records.len());
    }

    Ok(selection)
}

/// Find the user id of the target username
pub fn resolve_target(users: &UserIndex, target: &str) -> RelocateResult<i64> {
    users
        .resolve(target)?
        .ok_or_else(|| RelocateError::UnknownTarget(target.to_string()))
}

/// Select, resolve and update.
///
/// The target is resolved before any statement runs, so an unknown target
/// leaves the database untouched. With `dry_run` nothing is written.
pub fn relocate_records(
    store: &impl RecordStore,
    snapshot: &Snapshot,
    sources: &[String],
    target: &str,
    commit_mode: CommitMode,
    dry_run: bool,
) -> RelocateResult<RelocationReport> {
    let selection = select_for_relocation(&snapshot.groups, sources, &snapshot.users)?;
    let target_id = resolve_target(&snapshot.users, target)?;

    let updated = if dry_run {
        log::info!("Dry run: would move audio ids {:?}", selection.audio_ids);
        0
    } else if selection.audio_ids.is_empty() {
        log::info!("Nothing to relocate");
        0
    } else {
        log::info!(
            "Moving {} records to '{}' (id {}), commit mode {:?}",
            selection.audio_ids.len(),
            target,
            target_id,
            commit_mode
        );
        store.update_assigned_user(&selection.audio_ids, target_id, commit_mode)?
    };

    Ok(RelocationReport {
        sources: sources.to_vec(),
        target: target.to_string(),
        target_id,
        selected: selection.audio_ids,
        skipped: selection.skipped,
        updated,
        dry_run,
    })
}

/// Full run driven by the `[relocation]` config section
pub fn run_relocation(
    store: &impl RecordStore,
    config: &RelocationConfig,
    dry_run: bool,
) -> RelocateResult<RelocationReport> {
    config.validate()?;
    let target = config.to_user.as_deref().unwrap_or_default();

    let snapshot = load_snapshot(store, config.join_mode(), config.project_id)?;
    let report = relocate_records(
        store,
        &snapshot,
        &config.from_users,
        target,
        config.commit_mode(),
        dry_run,
    )?;
    log::info!("{}", report);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::UserAudio;
    use crate::models::{DataRow, SegmentationRow, UserRow};
    use sea_query::SimpleExpr;
    use std::cell::RefCell;

    /// In-memory store recording the updates it receives
    #[derive(Default)]
    struct MemoryStore {
        users: Vec<UserRow>,
        transcripts: Vec<SegmentationRow>,
        data: RefCell<Vec<DataRow>>,
        updates: RefCell<Vec<(Vec<i64>, i64, CommitMode)>>,
    }

    impl RecordStore for MemoryStore {
        fn fetch_users(&self) -> RelocateResult<Vec<UserRow>> {
            Ok(self.users.clone())
        }

        fn fetch_transcriptions(&self) -> RelocateResult<Vec<SegmentationRow>> {
            Ok(self.transcripts.clone())
        }

        fn fetch_data(&self, _filter: Option<SimpleExpr>) -> RelocateResult<Vec<DataRow>> {
            Ok(self.data.borrow().clone())
        }

        fn update_assigned_user(
            &self,
            audio_ids: &[i64],
            user_id: i64,
            commit_mode: CommitMode,
        ) -> RelocateResult<u64> {
            let mut data = self.data.borrow_mut();
            let mut affected = 0;
            for row in data.iter_mut().filter(|row| audio_ids.contains(&row.id)) {
                row.assigned_user_id = Some(user_id);
                affected += 1;
            }
            self.updates
                .borrow_mut()
                .push((audio_ids.to_vec(), user_id, commit_mode));
            Ok(affected)
        }
    }

    fn alice_and_bob() -> MemoryStore {
        MemoryStore {
            users: vec![
                UserRow {
                    id: 1,
                    username: "alice".to_string(),
                },
                UserRow {
                    id: 2,
                    username: "bob".to_string(),
                },
            ],
            transcripts: vec![
                SegmentationRow {
                    data_id: 1,
                    transcription: Some(String::new()),
                },
                SegmentationRow {
                    data_id: 2,
                    transcription: Some("hello".to_string()),
                },
            ],
            data: RefCell::new(vec![
                DataRow {
                    id: 1,
                    project_id: 10,
                    assigned_user_id: Some(1),
                    is_marked_for_review: Some(1),
                },
                DataRow {
                    id: 2,
                    project_id: 10,
                    assigned_user_id: Some(1),
                    is_marked_for_review: Some(0),
                },
            ]),
            ..Default::default()
        }
    }

    fn sources(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_reviewed_empty_records_are_never_selected() {
        let users = UserIndex::from_rows(vec![UserRow {
            id: 1,
            username: "alice".to_string(),
        }]);
        let mut groups = UserAttributes::new();
        groups.insert(
            "alice".to_string(),
            vec![
                UserAudio {
                    audio_id: 1,
                    project_id: 1,
                    is_marked_for_review: true,
                    is_empty_transcript: true,
                },
                UserAudio {
                    audio_id: 2,
                    project_id: 1,
                    is_marked_for_review: true,
                    is_empty_transcript: false,
                },
                UserAudio {
                    audio_id: 3,
                    project_id: 1,
                    is_marked_for_review: false,
                    is_empty_transcript: true,
                },
            ],
        );

        let selection = select_for_relocation(&groups, &sources(&["alice"]), &users).unwrap();
        assert_eq!(selection.audio_ids, vec![2, 3]);
        assert_eq!(selection.skipped, 1);
    }

    #[test]
    fn test_unknown_source_is_an_error() {
        let users = UserIndex::default();
        let err = select_for_relocation(&UserAttributes::new(), &sources(&["ghost"]), &users)
            .unwrap_err();
        assert!(matches!(err, RelocateError::UnknownSource(name) if name == "ghost"));
    }

    #[test]
    fn test_scenario_moves_only_transcribed_record() {
        let store = alice_and_bob();
        let snapshot = load_snapshot(&store, JoinMode::Keyed, None).unwrap();
        let report = relocate_records(
            &store,
            &snapshot,
            &sources(&["alice"]),
            "bob",
            CommitMode::PerStatement,
            false,
        )
        .unwrap();

        assert_eq!(report.selected, vec![2]);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.target_id, 2);
        assert_eq!(report.updated, 1);

        let data = store.data.borrow();
        assert_eq!(data[0].assigned_user_id, Some(1));
        assert_eq!(data[1].assigned_user_id, Some(2));
    }

    #[test]
    fn test_unknown_target_writes_nothing() {
        let store = alice_and_bob();
        let snapshot = load_snapshot(&store, JoinMode::Keyed, None).unwrap();
        let err = relocate_records(
            &store,
            &snapshot,
            &sources(&["alice"]),
            "carol",
            CommitMode::PerStatement,
            false,
        )
        .unwrap_err();

        assert!(matches!(err, RelocateError::UnknownTarget(name) if name == "carol"));
        assert!(store.updates.borrow().is_empty());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let store = alice_and_bob();
        let snapshot = load_snapshot(&store, JoinMode::Keyed, None).unwrap();
        let report = relocate_records(
            &store,
            &snapshot,
            &sources(&["alice"]),
            "bob",
            CommitMode::Transaction,
            true,
        )
        .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.selected, vec![2]);
        assert_eq!(report.updated, 0);
        assert!(store.updates.borrow().is_empty());
        assert!(report.to_string().contains("would move 1 records"));
    }

    #[test]
    fn test_second_run_is_a_no_op() {
        let store = alice_and_bob();
        let config = RelocationConfig {
            from_users: sources(&["alice"]),
            to_user: Some("bob".to_string()),
            ..Default::default()
        };

        let first = run_relocation(&store, &config, false).unwrap();
        assert_eq!(first.updated, 1);

        let second = run_relocation(&store, &config, false).unwrap();
        assert!(second.selected.is_empty());
        assert_eq!(second.updated, 0);
        assert_eq!(store.updates.borrow().len(), 1);
    }

    #[test]
    fn test_commit_mode_is_passed_to_store() {
        let store = alice_and_bob();
        let config = RelocationConfig {
            from_users: sources(&["alice"]),
            to_user: Some("bob".to_string()),
            commit_mode: Some(CommitMode::Transaction),
            ..Default::default()
        };
        run_relocation(&store, &config, false).unwrap();

        let updates = store.updates.borrow();
        assert_eq!(updates[0], (vec![2], 2, CommitMode::Transaction));
    }
}
