use axum::{
    extract::{Extension, Path},
    http::Method,
    response::{IntoResponse, Redirect, Response},
};
use sea_orm::DatabaseConnection;
use tower_cookies::Cookies;

use crate::error::{AppError, AppResult};
use crate::flash;
use crate::repo;
use crate::storage::MediaStore;
use crate::web::middleware::CurrentUser;

/// Deletes a single image on POST; every method ends up back on the
/// parent entry's detail page.
pub async fn delete(
    method: Method,
    Extension(db): Extension<DatabaseConnection>,
    Extension(store): Extension<MediaStore>,
    Extension(user): Extension<CurrentUser>,
    Path(image_id): Path<i32>,
    cookies: Cookies,
) -> AppResult<Response> {
    let (image, parent) = repo::images::find_owned(&db, user.id, image_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if method == Method::POST {
        let file_path = image.file_path.clone();
        repo::images::delete(&db, image).await?;
        store.delete(&file_path).await;
        flash::success(&cookies, "Photo deleted");
    }

    Ok(Redirect::to(&format!("/entry/{}/", parent.id)).into_response())
}
