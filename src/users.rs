use std::collections::BTreeMap;

use crate::error::{RelocateError, RelocateResult};
use crate::models::UserRow;
use crate::store::RecordStore;

/// User id -> username, built once from the user table and read-only afterwards
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserIndex {
    names: BTreeMap<i64, String>,
}

impl UserIndex {
    /// Build from rows in read order; a repeated id keeps the last username seen
    pub fn from_rows(rows: impl IntoIterator<Item = UserRow>) -> Self {
        let mut names = BTreeMap::new();
        for row in rows {
            names.insert(row.id, row.username);
        }
        Self { names }
    }

    pub fn username(&self, user_id: i64) -> Option<&str> {
        self.names.get(&user_id).map(String::as_str)
    }

    /// All ids whose username equals `username`, in ascending id order
    pub fn ids_for(&self, username: &str) -> Vec<i64> {
        self.names
            .iter()
            .filter(|(_, name)| name.as_str() == username)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn contains_username(&self, username: &str) -> bool {
        self.names.values().any(|name| name == username)
    }

    /// Resolve a username to its single user id
    ///
    /// Returns `Ok(None)` when no user carries the name.
    pub fn resolve(&self, username: &str) -> RelocateResult<Option<i64>> {
        let ids = self.ids_for(username);
        match ids.as_slice() {
            [] => Ok(None),
            [id] => Ok(Some(*id)),
            _ => Err(RelocateError::AmbiguousUser {
                username: username.to_string(),
                ids,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Read (id, username) pairs from the user table
pub fn build_user_index(store: &impl RecordStore) -> RelocateResult<UserIndex> {
    let rows = store.fetch_users()?;
    let index = UserIndex::from_rows(rows);
    log::info!("Loaded {} users", index.len());
    Ok(index)
}
