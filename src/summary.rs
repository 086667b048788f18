use std::fmt;

use crate::grouping::UserAttributes;

/// Per-user record counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub username: String,
    pub total: usize,
    /// Records a relocation would move
    pub movable: usize,
    /// Reviewed records with an empty transcript
    pub reviewed_empty: usize,
}

impl fmt::Display for UserSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<24} {:>8} {:>8} {:>8}",
            self.username, self.total, self.movable, self.reviewed_empty
        )
    }
}

/// Column header matching the `Display` layout of [`UserSummary`]
pub fn summary_header() -> String {
    format!(
        "{:<24} {:>8} {:>8} {:>8}",
        "username", "total", "movable", "skipped"
    )
}

/// Count records per user, sorted by username
pub fn summarize(groups: &UserAttributes) -> Vec<UserSummary> {
    let mut summaries: Vec<UserSummary> = groups
        .iter()
        .map(|(username, records)| {
            let movable = records.iter().filter(|r| r.needs_relocation()).count();
            UserSummary {
                username: username.clone(),
                total: records.len(),
                movable,
                reviewed_empty: records.len() - movable,
            }
        })
        .collect();
    summaries.sort_by(|a, b| a.username.cmp(&b.username));
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::UserAudio;

    fn audio(audio_id: i64, reviewed: bool, empty: bool) -> UserAudio {
        UserAudio {
            audio_id,
            project_id: 1,
            is_marked_for_review: reviewed,
            is_empty_transcript: empty,
        }
    }

    #[test]
    fn test_summarize_counts_and_sorts() {
        let mut groups = UserAttributes::new();
        groups.insert("zed".to_string(), vec![audio(1, false, false)]);
        groups.insert(
            "alice".to_string(),
            vec![audio(2, true, true), audio(3, true, false), audio(4, false, true)],
        );

        let summaries = summarize(&groups);
        assert_eq!(summaries.len(), 2);
        assert_eq!(
            summaries[0],
            UserSummary {
                username: "alice".to_string(),
                total: 3,
                movable: 2,
                reviewed_empty: 1,
            }
        );
        assert_eq!(summaries[1].username, "zed");
        assert!(summaries[0].to_string().starts_with("alice"));
        assert_eq!(summaries[0].to_string().len(), summary_header().len());
    }
}
