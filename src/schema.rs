use sea_query::Iden;

/// User table - annotators and admins
#[derive(Iden, Clone, Copy, Debug)]
pub enum User {
    Table,
    Id,
    Username,
    RoleId,
}

/// Segmentation table - transcribed regions of an audio item
#[derive(Iden, Clone, Copy, Debug)]
pub enum Segmentation {
    Table,
    Id,
    DataId,
    Transcription,
}

/// Data table - one row per audio item, owned by an assigned user
#[derive(Iden, Clone, Copy, Debug)]
pub enum Data {
    Table,
    Id,
    ProjectId,
    AssignedUserId,
    IsMarkedForReview,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_names() {
        assert_eq!(User::Table.to_string(), "user");
        assert_eq!(User::RoleId.to_string(), "role_id");
        assert_eq!(Segmentation::Table.to_string(), "segmentation");
        assert_eq!(Segmentation::DataId.to_string(), "data_id");
        assert_eq!(Data::Table.to_string(), "data");
        assert_eq!(Data::AssignedUserId.to_string(), "assigned_user_id");
        assert_eq!(Data::IsMarkedForReview.to_string(), "is_marked_for_review");
    }
}
