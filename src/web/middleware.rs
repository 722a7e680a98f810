use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use sea_orm::{DatabaseConnection, DbErr};
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::entities::user;
use crate::error::AppError;
use crate::repo;

pub const SESSION_COOKIE: &str = "memind_session";

/// The authenticated identity injected into request extensions.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
    pub is_staff: bool,
}

impl From<user::Model> for CurrentUser {
    fn from(u: user::Model) -> Self {
        CurrentUser {
            id: u.id,
            username: u.username,
            is_staff: u.is_staff,
        }
    }
}

/// Resolves the session cookie to an identity, if any. Public handlers
/// use this directly; protected routes go through `require_auth`.
pub async fn identify(
    db: &DatabaseConnection,
    cookies: &Cookies,
) -> Result<Option<CurrentUser>, DbErr> {
    let Some(cookie) = cookies.get(SESSION_COOKIE) else {
        return Ok(None);
    };
    let Ok(token) = Uuid::parse_str(cookie.value()) else {
        return Ok(None);
    };
    let user = repo::sessions::find_identity(db, token, Utc::now().naive_utc()).await?;
    Ok(user.map(CurrentUser::from))
}

pub async fn require_auth(
    Extension(db): Extension<DatabaseConnection>,
    cookies: Cookies,
    mut request: Request,
    next: Next,
) -> Response {
    match identify(&db, &cookies).await {
        Ok(Some(user)) => {
            tracing::Span::current().record("user_id", user.id);
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Ok(None) => Redirect::to("/login/").into_response(),
        Err(e) => AppError::from(e).into_response(),
    }
}

/// Layered inside `require_auth`. Non-staff get the same 404 a missing
/// page would.
pub async fn require_staff(
    Extension(user): Extension<CurrentUser>,
    request: Request,
    next: Next,
) -> Response {
    if user.is_staff {
        next.run(request).await
    } else {
        AppError::NotFound.into_response()
    }
}
