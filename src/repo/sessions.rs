//! Session token to identity lookup. Tokens are opaque UUIDs stored
//! server-side; expiry is enforced on every lookup.

use chrono::{Duration, NaiveDateTime};
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait, Set};
use uuid::Uuid;

use crate::entities::{session, user, Session, User};

pub const SESSION_TTL_DAYS: i64 = 14;

pub async fn create(
    db: &DatabaseConnection,
    user_id: i32,
    now: NaiveDateTime,
) -> Result<session::Model, DbErr> {
    let new_session = session::ActiveModel {
        token: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        created_at: Set(now),
        expires_at: Set(now + Duration::days(SESSION_TTL_DAYS)),
    };
    new_session.insert(db).await
}

/// Resolves a token to its user, treating expired sessions as absent.
pub async fn find_identity(
    db: &DatabaseConnection,
    token: Uuid,
    now: NaiveDateTime,
) -> Result<Option<user::Model>, DbErr> {
    let Some(found) = Session::find_by_id(token).one(db).await? else {
        return Ok(None);
    };
    if found.expires_at <= now {
        found.delete(db).await?;
        return Ok(None);
    }
    User::find_by_id(found.user_id).one(db).await
}

pub async fn delete(db: &DatabaseConnection, token: Uuid) -> Result<(), DbErr> {
    Session::delete_by_id(token).exec(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[tokio::test]
    async fn expired_session_is_treated_as_absent() {
        let now = at("2026-08-27 12:00:00");
        let stale = session::Model {
            token: Uuid::new_v4(),
            user_id: 1,
            created_at: at("2026-08-01 12:00:00"),
            expires_at: at("2026-08-15 12:00:00"),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stale.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let identity = find_identity(&db, stale.token, now).await.unwrap();
        assert!(identity.is_none());
    }

    #[tokio::test]
    async fn live_session_resolves_its_user() {
        let now = at("2026-08-27 12:00:00");
        let live = session::Model {
            token: Uuid::new_v4(),
            user_id: 7,
            created_at: at("2026-08-20 12:00:00"),
            expires_at: at("2026-09-03 12:00:00"),
        };
        let owner = user::Model {
            id: 7,
            username: "ann".to_string(),
            email: "ann@x.com".to_string(),
            password_hash: "hash".to_string(),
            is_staff: false,
            is_superuser: false,
            date_joined: at("2026-08-01 00:00:00"),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[live.clone()]])
            .append_query_results([[owner.clone()]])
            .into_connection();

        let identity = find_identity(&db, live.token, now).await.unwrap();
        assert_eq!(identity, Some(owner));
    }
}
