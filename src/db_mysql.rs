//! MySQL store for the live Audino database
//!
//! Same structure as the SQLite store in db.rs, but connecting with
//! host/user/password/database/port parameters through a MySqlPool.

use sea_query::SimpleExpr;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlPool, MySqlPoolOptions, MySqlRow};
use std::future::Future;
use tokio::runtime::Runtime;

use crate::config::{CommitMode, ConnectionConfig};
use crate::error::{RelocateError, RelocateResult};
use crate::models::{DataRow, SegmentationRow, UserRow};
use crate::queries::{data, segmentation, users, SqlBackend};
use crate::store::RecordStore;

const BACKEND: SqlBackend = SqlBackend::Mysql;

/// Synchronous MySQL database wrapper that owns a runtime for blocking operations.
/// Follows the rust-postgres pattern of embedding runtime in the connection.
pub struct SyncDbMysql {
    pool: MySqlPool,
    runtime: Runtime,
}

impl SyncDbMysql {
    /// Connect to a MySQL database with embedded runtime
    pub fn connect(config: &ConnectionConfig) -> RelocateResult<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let pool = runtime.block_on(open_mysql_connection(config))?;
        log::info!(
            "Connected to MySQL {}@{}:{}/{}",
            config.user,
            config.host,
            config.port,
            config.database
        );
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
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Close the pool and wait for the connection to shut down
    pub fn close(self) {
        self.runtime.block_on(self.pool.close());
    }
}

/// Build connect options without putting the password into a URL
pub fn connect_options(config: &ConnectionConfig) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.database)
}

/// Open a single-connection MySQL pool
pub async fn open_mysql_connection(config: &ConnectionConfig) -> RelocateResult<MySqlPool> {
    MySqlPoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options(config))
        .await
        .map_err(RelocateError::Connection)
}

async fn fetch_all<T>(pool: &MySqlPool, sql: &str) -> RelocateResult<Vec<T>>
where
    T: for<'r> sqlx::FromRow<'r, MySqlRow> + Send + Unpin,
{
    log::debug!("{}", sql);
    let rows = sqlx::query_as::<_, T>(sql).fetch_all(pool).await?;
    Ok(rows)
}

async fn execute_updates(
    conn: &mut MySqlConnection,
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

/// Update each row in its own autocommitted statement (MySQL)
pub async fn update_assigned_user_per_statement_mysql(
    pool: &MySqlPool,
    audio_ids: &[i64],
    user_id: i64,
) -> RelocateResult<u64> {
    let mut conn = pool.acquire().await?;
    execute_updates(&mut conn, audio_ids, user_id).await
}

/// Update all rows inside one transaction, rolling back on the first failure (MySQL)
pub async fn update_assigned_user_in_transaction_mysql(
    pool: &MySqlPool,
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

impl RecordStore for SyncDbMysql {
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
            CommitMode::PerStatement => self.block_on(update_assigned_user_per_statement_mysql(
                self.pool(),
                audio_ids,
                user_id,
            )),
            CommitMode::Transaction => self.block_on(update_assigned_user_in_transaction_mysql(
                self.pool(),
                audio_ids,
                user_id,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_options_keep_parameters() {
        let config = ConnectionConfig {
            host: "172.18.0.2".to_string(),
            user: "audino".to_string(),
            password: "audino".to_string(),
            database: "audino".to_string(),
            port: 3306,
        };
        let options = connect_options(&config);
        assert_eq!(options.get_host(), "172.18.0.2");
        assert_eq!(options.get_port(), 3306);
        assert_eq!(options.get_username(), "audino");
        assert_eq!(options.get_database(), Some("audino"));
    }
}
