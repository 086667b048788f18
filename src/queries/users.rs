use crate::error::RelocateResult;
use crate::queries::{select_columns, SqlBackend};
use crate::schema::User;

/// SELECT id, username FROM user
pub fn select_ids_and_usernames(backend: SqlBackend) -> RelocateResult<String> {
    select_columns(backend, User::Table, &[User::Id, User::Username], None)
}
