//! Landing and static informational pages.

use axum::{
    extract::Extension,
    response::{IntoResponse, Redirect, Response},
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use tower_cookies::Cookies;

use crate::error::AppResult;
use crate::flash;
use crate::render::Pages;
use crate::web::middleware::identify;

pub async fn home(
    Extension(db): Extension<DatabaseConnection>,
    Extension(pages): Extension<Pages>,
    cookies: Cookies,
) -> AppResult<Response> {
    if identify(&db, &cookies).await?.is_some() {
        return Ok(Redirect::to("/diary/").into_response());
    }
    let page = pages.render("home", None, flash::take(&cookies), json!({}))?;
    Ok(page.into_response())
}

async fn static_page(
    db: &DatabaseConnection,
    pages: &Pages,
    cookies: &Cookies,
    template: &str,
) -> AppResult<Response> {
    let user = identify(db, cookies).await?;
    let page = pages.render(template, user.as_ref(), flash::take(cookies), json!({}))?;
    Ok(page.into_response())
}

pub async fn about(
    Extension(db): Extension<DatabaseConnection>,
    Extension(pages): Extension<Pages>,
    cookies: Cookies,
) -> AppResult<Response> {
    static_page(&db, &pages, &cookies, "about").await
}

pub async fn tips(
    Extension(db): Extension<DatabaseConnection>,
    Extension(pages): Extension<Pages>,
    cookies: Cookies,
) -> AppResult<Response> {
    static_page(&db, &pages, &cookies, "tips").await
}

pub async fn roadmap(
    Extension(db): Extension<DatabaseConnection>,
    Extension(pages): Extension<Pages>,
    cookies: Cookies,
) -> AppResult<Response> {
    static_page(&db, &pages, &cookies, "roadmap").await
}

pub async fn why_diary(
    Extension(db): Extension<DatabaseConnection>,
    Extension(pages): Extension<Pages>,
    cookies: Cookies,
) -> AppResult<Response> {
    static_page(&db, &pages, &cookies, "why_diary").await
}

pub async fn health_check() -> &'static str {
    "OK"
}
