//! SQL text builders for the three Audino tables.
//!
//! Every builder takes the target [`SqlBackend`] so the same statement can be
//! rendered with MySQL quoting for the live database and SQLite quoting for
//! local copies.

use sea_query::{
    Iden, MysqlQueryBuilder, Query, QueryStatementWriter, SimpleExpr, SqliteQueryBuilder,
};

use crate::error::{RelocateError, RelocateResult};

pub mod data;
pub mod segmentation;
pub mod users;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlBackend {
    Mysql,
    Sqlite,
}

impl SqlBackend {
    /// Render a statement with this backend's quoting and literal rules
    pub fn build<S: QueryStatementWriter>(self, statement: &S) -> String {
        match self {
            SqlBackend::Mysql => statement.to_string(MysqlQueryBuilder),
            SqlBackend::Sqlite => statement.to_string(SqliteQueryBuilder),
        }
    }
}

/// SELECT <columns> FROM <table> [WHERE <filter>]
///
/// No ORDER BY is added; rows come back in whatever order the database
/// returns them. Raw predicates can be passed as `Expr::cust("...")`.
pub fn select_columns<T>(
    backend: SqlBackend,
    table: T,
    columns: &[T],
    filter: Option<SimpleExpr>,
) -> RelocateResult<String>
where
    T: Iden + Copy + 'static,
{
    if columns.is_empty() {
        return Err(RelocateError::EmptyProjection(table.to_string()));
    }

    let mut query = Query::select();
    query.columns(columns.iter().copied()).from(table);
    if let Some(filter) = filter {
        query.and_where(filter);
    }

    Ok(backend.build(&query))
}
