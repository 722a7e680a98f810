use axum::{
    extract::{Extension, Multipart},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::error::AppResult;
use crate::flash;
use crate::forms::{FieldErrors, ProfileForm};
use crate::render::Pages;
use crate::repo;
use crate::storage::MediaStore;
use crate::web::middleware::CurrentUser;
use crate::web::{entry_context, read_multipart_form};

fn profile_context(profile: &crate::entities::user_profile::Model) -> Value {
    json!({
        "bio": profile.bio,
        "avatar_url": profile.avatar_path.as_ref().map(|p| format!("/media/{p}")),
        "birth_date": profile.birth_date.map(|d| d.format("%Y-%m-%d").to_string()),
        "created_at": profile.created_at.format("%Y-%m-%d").to_string(),
    })
}

pub async fn view(
    Extension(db): Extension<DatabaseConnection>,
    Extension(pages): Extension<Pages>,
    Extension(user): Extension<CurrentUser>,
    cookies: Cookies,
) -> AppResult<Response> {
    let now = Utc::now().naive_utc();
    let profile = repo::profiles::get_or_create(&db, user.id, now).await?;
    let recent = repo::entries::recent(&db, user.id, 5).await?;
    let stats = repo::entries::stats(&db, user.id, now).await?;
    let activity = repo::entries::activity(&db, user.id, now).await?;

    let recent: Vec<Value> = recent.iter().map(entry_context).collect();
    let page = pages.render(
        "profile",
        Some(&user),
        flash::take(&cookies),
        json!({
            "profile": profile_context(&profile),
            "recent_entries": recent,
            "stats": stats,
            "activity": activity,
        }),
    )?;
    Ok(page.into_response())
}

fn render_edit_form(
    pages: &Pages,
    user: &CurrentUser,
    values: Value,
    errors: &FieldErrors,
) -> AppResult<Response> {
    let page = pages.render(
        "profile_edit",
        Some(user),
        None,
        json!({"values": values, "errors": errors}),
    )?;
    Ok(page.into_response())
}

pub async fn edit_page(
    Extension(db): Extension<DatabaseConnection>,
    Extension(pages): Extension<Pages>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Response> {
    let profile = repo::profiles::get_or_create(&db, user.id, Utc::now().naive_utc()).await?;
    let values = json!({
        "bio": profile.bio,
        "birth_date": profile.birth_date.map(|d| d.format("%Y-%m-%d").to_string()),
    });
    render_edit_form(&pages, &user, values, &FieldErrors::new())
}

pub async fn edit(
    Extension(db): Extension<DatabaseConnection>,
    Extension(store): Extension<MediaStore>,
    Extension(pages): Extension<Pages>,
    Extension(user): Extension<CurrentUser>,
    cookies: Cookies,
    multipart: Multipart,
) -> AppResult<Response> {
    let now = Utc::now().naive_utc();
    let profile = repo::profiles::get_or_create(&db, user.id, now).await?;

    let (fields, mut files) = read_multipart_form(multipart, "avatar").await?;

    let form = match ProfileForm::parse(&fields) {
        Ok(form) => form,
        Err(errors) => {
            let values = json!({
                "bio": fields.get("bio"),
                "birth_date": fields.get("birth_date"),
            });
            return render_edit_form(&pages, &user, values, &errors);
        }
    };

    // A new avatar replaces the stored file as well as the reference.
    let avatar_path = match files.pop() {
        Some(file) => {
            let relative = MediaStore::avatar_path(Uuid::new_v4(), &file.file_name);
            store.save(&relative, &file.bytes).await?;
            if let Some(old) = &profile.avatar_path {
                store.delete(old).await;
            }
            Some(relative)
        }
        None => None,
    };

    repo::profiles::update(&db, profile, &form, avatar_path).await?;

    flash::success(&cookies, "Profile updated!");
    Ok(Redirect::to("/profile/").into_response())
}
