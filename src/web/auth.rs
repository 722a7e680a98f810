use std::collections::HashMap;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{Extension, Form},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde_json::json;
use tower_cookies::{Cookie, Cookies};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::flash;
use crate::forms::{LoginForm, RegisterForm};
use crate::render::Pages;
use crate::repo;
use crate::web::middleware::{identify, SESSION_COOKIE};

fn set_session_cookie(cookies: &Cookies, token: Uuid) {
    let mut cookie = Cookie::new(SESSION_COOKIE, token.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookies.add(cookie);
}

fn clear_session_cookie(cookies: &Cookies) {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookies.remove(cookie);
}

async fn open_session(
    db: &DatabaseConnection,
    cookies: &Cookies,
    user_id: i32,
) -> AppResult<()> {
    let session = repo::sessions::create(db, user_id, Utc::now().naive_utc()).await?;
    set_session_cookie(cookies, session.token);
    Ok(())
}

pub async fn register_page(
    Extension(db): Extension<DatabaseConnection>,
    Extension(pages): Extension<Pages>,
    cookies: Cookies,
) -> AppResult<Response> {
    if identify(&db, &cookies).await?.is_some() {
        return Ok(Redirect::to("/diary/").into_response());
    }
    let page = pages.render(
        "register",
        None,
        flash::take(&cookies),
        json!({"values": {}, "errors": {}}),
    )?;
    Ok(page.into_response())
}

pub async fn register(
    Extension(db): Extension<DatabaseConnection>,
    Extension(pages): Extension<Pages>,
    cookies: Cookies,
    Form(fields): Form<HashMap<String, String>>,
) -> AppResult<Response> {
    if identify(&db, &cookies).await?.is_some() {
        return Ok(Redirect::to("/diary/").into_response());
    }

    let mut parsed = RegisterForm::parse(&fields);
    if let Ok(form) = &parsed {
        if repo::users::find_by_username(&db, &form.username).await?.is_some() {
            let mut errors = crate::forms::FieldErrors::new();
            errors.insert("username".to_string(), "Username is already taken".to_string());
            parsed = Err(errors);
        }
    }

    let form = match parsed {
        Ok(form) => form,
        Err(errors) => {
            let page = pages.render(
                "register",
                None,
                None,
                json!({
                    "values": {
                        "username": fields.get("username"),
                        "email": fields.get("email"),
                    },
                    "errors": errors,
                }),
            )?;
            return Ok(page.into_response());
        }
    };

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(form.password.as_bytes(), &salt)
        .map_err(|_| AppError::PasswordHash)?
        .to_string();

    let now = Utc::now().naive_utc();
    let user = match repo::users::insert(&db, &form.username, &form.email, &password_hash, now)
        .await
    {
        Ok(user) => user,
        // Lost the race against a concurrent registration.
        Err(e) if repo::users::is_duplicate_key(&e) => {
            let page = pages.render(
                "register",
                None,
                None,
                json!({
                    "values": {"username": form.username, "email": form.email},
                    "errors": {"username": "Username is already taken"},
                }),
            )?;
            return Ok(page.into_response());
        }
        Err(e) => return Err(e.into()),
    };

    // Every account gets its (empty) profile up front.
    repo::profiles::get_or_create(&db, user.id, now).await?;

    tracing::Span::current()
        .record("action", "register_user")
        .record("user_id", user.id);
    metrics::counter!("memind_users_registered_total").increment(1);
    metrics::gauge!("memind_users_total").increment(1.0);

    open_session(&db, &cookies, user.id).await?;
    flash::success(&cookies, "Welcome to MeMind!");
    Ok(Redirect::to("/diary/").into_response())
}

pub async fn login_page(
    Extension(db): Extension<DatabaseConnection>,
    Extension(pages): Extension<Pages>,
    cookies: Cookies,
) -> AppResult<Response> {
    if identify(&db, &cookies).await?.is_some() {
        return Ok(Redirect::to("/diary/").into_response());
    }
    let page = pages.render(
        "login",
        None,
        flash::take(&cookies),
        json!({"values": {}, "errors": {}}),
    )?;
    Ok(page.into_response())
}

pub async fn login(
    Extension(db): Extension<DatabaseConnection>,
    Extension(pages): Extension<Pages>,
    cookies: Cookies,
    Form(fields): Form<HashMap<String, String>>,
) -> AppResult<Response> {
    if identify(&db, &cookies).await?.is_some() {
        return Ok(Redirect::to("/diary/").into_response());
    }

    // One generic message for every failure mode so credentials cannot be
    // probed field by field.
    let rejection = |values: serde_json::Value| -> AppResult<Response> {
        let page = pages.render(
            "login",
            None,
            None,
            json!({
                "values": values,
                "errors": {},
                "auth_error": "Invalid username or password",
            }),
        )?;
        Ok(page.into_response())
    };

    let Ok(form) = LoginForm::parse(&fields) else {
        return rejection(json!({"username": fields.get("username")}));
    };

    let Some(user) = repo::users::find_by_username(&db, &form.username).await? else {
        return rejection(json!({"username": form.username}));
    };

    let Ok(parsed_hash) = PasswordHash::new(&user.password_hash) else {
        return Err(AppError::PasswordHash);
    };
    if Argon2::default()
        .verify_password(form.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        tracing::Span::current()
            .record("action", "login_failed")
            .record("error", "invalid_credentials");
        return rejection(json!({"username": form.username}));
    }

    tracing::Span::current()
        .record("action", "login_user")
        .record("user_id", user.id);

    open_session(&db, &cookies, user.id).await?;
    flash::success(&cookies, &format!("Welcome back, {}!", user.username));
    Ok(Redirect::to("/diary/").into_response())
}

pub async fn logout(
    Extension(db): Extension<DatabaseConnection>,
    cookies: Cookies,
) -> AppResult<Response> {
    if let Some(cookie) = cookies.get(SESSION_COOKIE) {
        if let Ok(token) = Uuid::parse_str(cookie.value()) {
            repo::sessions::delete(&db, token).await?;
        }
    }
    clear_session_cookie(&cookies);
    flash::info(&cookies, "You have signed out");
    Ok(Redirect::to("/").into_response())
}
