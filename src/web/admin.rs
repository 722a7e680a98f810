//! Staff-only management surface. Unlike the user-facing handlers these
//! operate across owners, so they query the schema directly and answer
//! in JSON rather than rendered pages.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use serde::Deserialize;
use serde_json::json;

use crate::entities::{diary_entry, DiaryEntry};
use crate::error::{AppError, AppResult};
use crate::repo;
use crate::storage::MediaStore;

pub async fn list_users(
    Extension(db): Extension<DatabaseConnection>,
) -> AppResult<Response> {
    let users = repo::users::list_with_entry_counts(&db).await?;
    let users: Vec<_> = users
        .into_iter()
        .map(|(u, entry_count)| {
            json!({
                "id": u.id,
                "username": u.username,
                "email": u.email,
                "is_staff": u.is_staff,
                "is_superuser": u.is_superuser,
                "date_joined": u.date_joined,
                "entry_count": entry_count,
            })
        })
        .collect();
    Ok(Json(users).into_response())
}

#[derive(Debug, Deserialize)]
pub struct AdminEntriesQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    pub user_id: Option<i32>,
}

fn default_page() -> u64 {
    1
}

const ADMIN_PAGE_SIZE: u64 = 25;

pub async fn list_entries(
    Extension(db): Extension<DatabaseConnection>,
    Query(query): Query<AdminEntriesQuery>,
) -> AppResult<Response> {
    let mut select = DiaryEntry::find();
    if let Some(user_id) = query.user_id {
        select = select.filter(diary_entry::Column::UserId.eq(user_id));
    }
    let paginator = select
        .order_by_desc(diary_entry::Column::CreatedAt)
        .paginate(&db, ADMIN_PAGE_SIZE);

    let total = paginator.num_items().await?;
    let total_pages = paginator.num_pages().await?;
    let entries = paginator.fetch_page(query.page.max(1) - 1).await?;

    Ok(Json(json!({
        "entries": entries,
        "total": total,
        "page": query.page,
        "total_pages": total_pages,
    }))
    .into_response())
}

pub async fn delete_entry(
    Extension(db): Extension<DatabaseConnection>,
    Extension(store): Extension<MediaStore>,
    Path(entry_id): Path<i32>,
) -> AppResult<Response> {
    let entry = DiaryEntry::find_by_id(entry_id)
        .one(&db)
        .await?
        .ok_or(AppError::NotFound)?;

    let images = repo::images::for_entry(&db, entry.id).await?;
    entry.delete(&db).await?;
    for image in &images {
        store.delete(&image.file_path).await;
    }

    metrics::gauge!("memind_entries_total").decrement(1.0);
    Ok((StatusCode::OK, Json(json!({"message": "Entry deleted"}))).into_response())
}
