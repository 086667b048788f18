//! SQLite store for local copies of the Audino tables.
//!
//! Mirrors `db_mysql.rs`: a blocking wrapper that owns a current-thread
//! runtime and a single-connection pool.

use sea_query::SimpleExpr;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions, SqliteRow};
use std::future::Future;
use std::path::Path;
use tokio::runtime::Runtime;

use crate::config::CommitMode;
use crate::error::{RelocateError, RelocateResult};
use crate::models::{DataRow, SegmentationRow, UserRow};
use crate::queries::{data, segmentation, users, SqlBackend};
use crate::store::RecordStore;

const BACKEND: SqlBackend = SqlBackend::Sqlite;

/// Synchronous SQLite database wrapper that owns a runtime for blocking operations.
pub struct SyncDb {
    pool: SqlitePool,
    runtime: Runtime,
}

impl SyncDb {
    /// Open an existing SQLite database file
    pub fn open(db_path: &Path) -> RelocateResult<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let pool = runtime.block_on(open_database_connection(db_path))?;
        log::info!("SQLite database: {}", db_path.display());
        Ok(Self { pool, runtime })
    }

    /// Block on an async future using the embedded runtime
    pub fn block_on<F, T>(&self, fut: F) -> RelocateResult<T>
    where
        F: Future<Output = RelocateResult<T>>,
    {
        self.runtime.block_on(fut)
    }

    /// Get a reference to the underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool and wait for the connection to shut down
    pub fn close(self) {
        self.runtime.block_on(self.pool.close());
    }
}

/// Open a single-connection pool on an existing database file
pub async fn open_database_connection(db_path: &Path) -> RelocateResult<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(false)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(RelocateError::Connection)
}

async fn fetch_all<T>(pool: &SqlitePool, sql: &str) -> RelocateResult<Vec<T>>
where
    T: for<'r> sqlx::FromRow<'r, SqliteRow> + Send + Unpin,
{
    log::debug!("{}", sql);
    let rows = sqlx::query_as::<_, T>(sql).fetch_all(pool).await?;
    Ok(rows)
}

async fn execute_updates(
    conn: &mut SqliteConnection,
    audio_ids: &[i64],
    user_id: i64,
) -> RelocateResult<u64> {
    let mut affected = 0;
    for audio_id in audio_ids {
        let sql = data::update_assigned_user(BACKEND, *audio_id, user_id);
        log::debug!("{}", sql);
        affected += sqlx::query(&sql).execute(&mut *conn).await?.rows_affected();
    }
    Ok(affected)
}

/// Update each row in its own autocommitted statement
pub async fn update_assigned_user_per_statement(
    pool: &SqlitePool,
    audio_ids: &[i64],
    user_id: i64,
) -> RelocateResult<u64> {
    let mut conn = pool.acquire().await?;
    execute_updates(&mut conn, audio_ids, user_id).await
}

/// Update all rows inside one transaction, rolling back on the first failure
pub async fn update_assigned_user_in_transaction(
    pool: &SqlitePool,
    audio_ids: &[i64],
    user_id: i64,
) -> RelocateResult<u64> {
    let mut tx = pool.begin().await?;
    let result = execute_updates(&mut tx, audio_ids, user_id).await;

    match result {
        Ok(affected) => {
            tx.commit().await?;
            Ok(affected)
        }
        Err(err) => {
            tx.rollback().await?;
            Err(err)
        }
    }
}

impl RecordStore for SyncDb {
    fn fetch_users(&self) -> RelocateResult<Vec<UserRow>> {
        let sql = users::select_ids_and_usernames(BACKEND)?;
        self.block_on(fetch_all(self.pool(), &sql))
    }

    fn fetch_transcriptions(&self) -> RelocateResult<Vec<SegmentationRow>> {
        let sql = segmentation::select_transcriptions(BACKEND)?;
        self.block_on(fetch_all(self.pool(), &sql))
    }

    fn fetch_data(&self, filter: Option<SimpleExpr>) -> RelocateResult<Vec<DataRow>> {
        let sql = data::select_attributes(BACKEND, filter)?;
        self.block_on(fetch_all(self.pool(), &sql))
    }

    fn update_assigned_user(
        &self,
        audio_ids: &[i64],
        user_id: i64,
        commit_mode: CommitMode,
    ) -> RelocateResult<u64> {
        match commit_mode {
            CommitMode::PerStatement => self.block_on(update_assigned_user_per_statement(
                self.pool(),
                audio_ids,
                user_id,
            )),
            CommitMode::Transaction => self.block_on(update_assigned_user_in_transaction(
                self.pool(),
                audio_ids,
                user_id,
            )),
        }
    }
}
