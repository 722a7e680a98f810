use axum::{
    body::Body,
    extract::{Extension, Path},
    http::header,
    response::{IntoResponse, Response},
};

use crate::error::{AppError, AppResult};
use crate::storage::MediaStore;

/// Serves a stored media file. Missing files and paths that escape the
/// media root both look like a plain 404.
pub async fn serve(
    Extension(store): Extension<MediaStore>,
    Path(path): Path<String>,
) -> AppResult<Response> {
    let data = store.read(&path).await.map_err(|_| AppError::NotFound)?;
    let content_type = mime_guess::from_path(&path).first_or_octet_stream();

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
        ],
        Body::from(data),
    )
        .into_response())
}
