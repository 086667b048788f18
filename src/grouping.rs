use std::collections::HashMap;

use crate::attributes::AudioAttributes;

/// A record inside a user's group; the owner is the group key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserAudio {
    pub audio_id: i64,
    pub project_id: i64,
    pub is_marked_for_review: bool,
    pub is_empty_transcript: bool,
}

impl UserAudio {
    /// Reviewed records without any transcript stay with their owner
    pub fn needs_relocation(&self) -> bool {
        !(self.is_marked_for_review && self.is_empty_transcript)
    }
}

impl From<&AudioAttributes> for UserAudio {
    fn from(attributes: &AudioAttributes) -> Self {
        Self {
            audio_id: attributes.audio_id,
            project_id: attributes.project_id,
            is_marked_for_review: attributes.is_marked_for_review,
            is_empty_transcript: attributes.is_empty_transcript,
        }
    }
}

/// Username -> that user's records in read order
pub type UserAttributes = HashMap<String, Vec<UserAudio>>;

/// Group records by assigned username, keeping read order inside each group
pub fn group_by_user(attributes: &[AudioAttributes]) -> UserAttributes {
    let mut groups = UserAttributes::new();
    for record in attributes {
        groups
            .entry(record.assigned_user.clone())
            .or_default()
            .push(UserAudio::from(record));
    }
    groups
}
