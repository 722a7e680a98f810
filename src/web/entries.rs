use std::collections::HashMap;

use axum::{
    extract::{Extension, Multipart, Path, Query},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{NaiveDateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::entities::diary_entry::Mood;
use crate::error::{AppError, AppResult};
use crate::flash;
use crate::forms::{EntryForm, FieldErrors};
use crate::render::Pages;
use crate::repo::{self, entries::EntryFilter};
use crate::storage::MediaStore;
use crate::web::middleware::CurrentUser;
use crate::web::{entry_context, mood_options, read_multipart_form, UploadedImage};

#[derive(Debug, Deserialize)]
pub struct DiaryQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub mood: String,
    #[serde(default)]
    pub favorite: String,
    #[serde(default = "default_page")]
    pub page: u64,
}

fn default_page() -> u64 {
    1
}

pub async fn diary(
    Extension(db): Extension<DatabaseConnection>,
    Extension(pages): Extension<Pages>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<DiaryQuery>,
    cookies: Cookies,
) -> AppResult<Response> {
    // The raw mood value goes into the filter as-is: a garbage value
    // matches no rows, same as an unused mood would.
    let filter = EntryFilter {
        search: Some(query.search.clone()).filter(|s| !s.is_empty()),
        mood: Some(query.mood.clone()).filter(|s| !s.is_empty()),
        favorites_only: query.favorite == "true",
    };

    let now = Utc::now().naive_utc();
    let listing = repo::entries::list(&db, user.id, &filter, query.page).await?;
    // Stats always describe the whole owned set, whatever the filter says.
    let stats = repo::entries::stats(&db, user.id, now).await?;

    let entries: Vec<Value> = listing.entries.iter().map(entry_context).collect();
    let page = pages.render(
        "diary",
        Some(&user),
        flash::take(&cookies),
        json!({
            "entries": entries,
            "page": listing.page,
            "total_pages": listing.total_pages,
            "has_prev": listing.page > 1,
            "has_next": listing.page < listing.total_pages,
            "prev_page": listing.page.saturating_sub(1),
            "next_page": listing.page + 1,
            "search": query.search,
            "mood_filter": query.mood,
            "favorite_filter": query.favorite,
            "moods": mood_options(Mood::parse(&query.mood)),
            "stats": stats,
        }),
    )?;
    Ok(page.into_response())
}

fn form_values(fields: &HashMap<String, String>) -> Value {
    json!({
        "title": fields.get("title"),
        "content": fields.get("content"),
        "tags": fields.get("tags"),
        "is_favorite": matches!(fields.get("is_favorite").map(String::as_str), Some("on")),
    })
}

fn render_entry_form(
    pages: &Pages,
    user: &CurrentUser,
    action: &str,
    entry_id: Option<i32>,
    values: Value,
    selected_mood: Option<Mood>,
    errors: &FieldErrors,
) -> AppResult<Response> {
    let page = pages.render(
        "entry_form",
        Some(user),
        None,
        json!({
            "action": action,
            "entry_id": entry_id,
            "values": values,
            "moods": mood_options(selected_mood),
            "errors": errors,
        }),
    )?;
    Ok(page.into_response())
}

pub async fn create_page(
    Extension(pages): Extension<Pages>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Response> {
    render_entry_form(
        &pages,
        &user,
        "Create",
        None,
        json!({}),
        None,
        &FieldErrors::new(),
    )
}

async fn attach_images(
    db: &DatabaseConnection,
    store: &MediaStore,
    entry_id: i32,
    files: &[UploadedImage],
    now: NaiveDateTime,
) -> AppResult<()> {
    for file in files {
        let relative = MediaStore::entry_image_path(now.date(), Uuid::new_v4(), &file.file_name);
        store.save(&relative, &file.bytes).await?;
        repo::images::insert(db, entry_id, &relative, "", now).await?;
    }
    Ok(())
}

pub async fn create(
    Extension(db): Extension<DatabaseConnection>,
    Extension(store): Extension<MediaStore>,
    Extension(pages): Extension<Pages>,
    Extension(user): Extension<CurrentUser>,
    cookies: Cookies,
    multipart: Multipart,
) -> AppResult<Response> {
    let (fields, files) = read_multipart_form(multipart, "images").await?;

    let form = match EntryForm::parse(&fields) {
        Ok(form) => form,
        Err(errors) => {
            let selected = fields.get("mood").and_then(|m| Mood::parse(m));
            return render_entry_form(
                &pages,
                &user,
                "Create",
                None,
                form_values(&fields),
                selected,
                &errors,
            );
        }
    };

    let now = Utc::now().naive_utc();
    // Entry first, then its images; the entry write always completes
    // before any image row exists.
    let entry = repo::entries::insert(&db, user.id, &form, now).await?;
    attach_images(&db, &store, entry.id, &files, now).await?;

    tracing::Span::current()
        .record("action", "create_entry")
        .record("user_id", user.id);
    metrics::counter!("memind_entries_created_total").increment(1);
    metrics::gauge!("memind_entries_total").increment(1.0);

    flash::success(&cookies, "Entry created successfully!");
    Ok(Redirect::to(&format!("/entry/{}/", entry.id)).into_response())
}

pub async fn detail(
    Extension(db): Extension<DatabaseConnection>,
    Extension(pages): Extension<Pages>,
    Extension(user): Extension<CurrentUser>,
    Path(entry_id): Path<i32>,
    cookies: Cookies,
) -> AppResult<Response> {
    let entry = repo::entries::find_owned(&db, user.id, entry_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let images = repo::images::for_entry(&db, entry.id).await?;

    let images: Vec<Value> = images
        .iter()
        .map(|img| {
            json!({
                "id": img.id,
                "url": format!("/media/{}", img.file_path),
                "caption": img.caption,
            })
        })
        .collect();

    let page = pages.render(
        "entry_detail",
        Some(&user),
        flash::take(&cookies),
        json!({
            "entry": entry_context(&entry),
            "images": images,
        }),
    )?;
    Ok(page.into_response())
}

pub async fn edit_page(
    Extension(db): Extension<DatabaseConnection>,
    Extension(pages): Extension<Pages>,
    Extension(user): Extension<CurrentUser>,
    Path(entry_id): Path<i32>,
) -> AppResult<Response> {
    let entry = repo::entries::find_owned(&db, user.id, entry_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let values = json!({
        "title": entry.title,
        "content": entry.content,
        "tags": entry.tags,
        "is_favorite": entry.is_favorite,
    });
    render_entry_form(
        &pages,
        &user,
        "Edit",
        Some(entry.id),
        values,
        entry.mood,
        &FieldErrors::new(),
    )
}

pub async fn edit(
    Extension(db): Extension<DatabaseConnection>,
    Extension(store): Extension<MediaStore>,
    Extension(pages): Extension<Pages>,
    Extension(user): Extension<CurrentUser>,
    Path(entry_id): Path<i32>,
    cookies: Cookies,
    multipart: Multipart,
) -> AppResult<Response> {
    let entry = repo::entries::find_owned(&db, user.id, entry_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let (fields, files) = read_multipart_form(multipart, "images").await?;

    let form = match EntryForm::parse(&fields) {
        Ok(form) => form,
        Err(errors) => {
            let selected = fields.get("mood").and_then(|m| Mood::parse(m));
            return render_entry_form(
                &pages,
                &user,
                "Edit",
                Some(entry.id),
                form_values(&fields),
                selected,
                &errors,
            );
        }
    };

    let now = Utc::now().naive_utc();
    let entry = repo::entries::update(&db, entry, &form, now).await?;
    // New images are appended; existing ones are left alone.
    attach_images(&db, &store, entry.id, &files, now).await?;

    flash::success(&cookies, "Entry updated successfully!");
    Ok(Redirect::to(&format!("/entry/{}/", entry.id)).into_response())
}

pub async fn delete_page(
    Extension(db): Extension<DatabaseConnection>,
    Extension(pages): Extension<Pages>,
    Extension(user): Extension<CurrentUser>,
    Path(entry_id): Path<i32>,
) -> AppResult<Response> {
    let entry = repo::entries::find_owned(&db, user.id, entry_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let page = pages.render(
        "entry_delete",
        Some(&user),
        None,
        json!({"entry": entry_context(&entry)}),
    )?;
    Ok(page.into_response())
}

pub async fn delete(
    Extension(db): Extension<DatabaseConnection>,
    Extension(store): Extension<MediaStore>,
    Extension(user): Extension<CurrentUser>,
    Path(entry_id): Path<i32>,
    cookies: Cookies,
) -> AppResult<Response> {
    let entry = repo::entries::find_owned(&db, user.id, entry_id)
        .await?
        .ok_or(AppError::NotFound)?;

    // Image rows cascade with the entry; stored files need explicit
    // cleanup, so collect their paths first.
    let images = repo::images::for_entry(&db, entry.id).await?;
    repo::entries::delete(&db, entry).await?;
    for image in &images {
        store.delete(&image.file_path).await;
    }

    metrics::gauge!("memind_entries_total").decrement(1.0);
    flash::success(&cookies, "Entry deleted");
    Ok(Redirect::to("/diary/").into_response())
}

pub async fn toggle_favorite(
    Extension(db): Extension<DatabaseConnection>,
    Extension(user): Extension<CurrentUser>,
    Path(entry_id): Path<i32>,
    cookies: Cookies,
) -> AppResult<Response> {
    let entry = repo::entries::find_owned(&db, user.id, entry_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let entry = repo::entries::toggle_favorite(&db, entry, Utc::now().naive_utc()).await?;
    if entry.is_favorite {
        flash::success(&cookies, "Entry added to favorites");
    } else {
        flash::info(&cookies, "Entry removed from favorites");
    }
    Ok(Redirect::to(&format!("/entry/{}/", entry.id)).into_response())
}
