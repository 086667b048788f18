use sea_query::{Expr, Query, SimpleExpr};

use crate::error::RelocateResult;
use crate::queries::{select_columns, SqlBackend};
use crate::schema::Data;

/// SELECT id, project_id, assigned_user_id, is_marked_for_review FROM data [WHERE <filter>]
pub fn select_attributes(backend: SqlBackend, filter: Option<SimpleExpr>) -> RelocateResult<String> {
    select_columns(
        backend,
        Data::Table,
        &[
            Data::Id,
            Data::ProjectId,
            Data::AssignedUserId,
            Data::IsMarkedForReview,
        ],
        filter,
    )
}

/// project_id = ?
pub fn project_filter(project_id: i64) -> SimpleExpr {
    Expr::col(Data::ProjectId).eq(project_id)
}

/// UPDATE data SET assigned_user_id = ? WHERE id = ?
pub fn update_assigned_user(backend: SqlBackend, audio_id: i64, user_id: i64) -> String {
    let statement = Query::update()
        .table(Data::Table)
        .value(Data::AssignedUserId, user_id)
        .and_where(Expr::col(Data::Id).eq(audio_id))
        .to_owned();
    backend.build(&statement)
}
