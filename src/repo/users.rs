use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};

use crate::entities::{diary_entry, user, DiaryEntry, User};

pub async fn find_by_id(db: &DatabaseConnection, id: i32) -> Result<Option<user::Model>, DbErr> {
    User::find_by_id(id).one(db).await
}

pub async fn find_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<user::Model>, DbErr> {
    User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await
}

pub async fn insert(
    db: &DatabaseConnection,
    username: &str,
    email: &str,
    password_hash: &str,
    now: NaiveDateTime,
) -> Result<user::Model, DbErr> {
    let new_user = user::ActiveModel {
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash.to_string()),
        is_staff: Set(false),
        is_superuser: Set(false),
        date_joined: Set(now),
        ..Default::default()
    };
    new_user.insert(db).await
}

/// Postgres unique violations surface as code 23505; the username column
/// is the only unique constraint that user input can hit.
pub fn is_duplicate_key(err: &DbErr) -> bool {
    err.to_string()
        .contains("duplicate key value violates unique constraint")
}

/// Management listing: every user with how many entries they own.
pub async fn list_with_entry_counts(
    db: &DatabaseConnection,
) -> Result<Vec<(user::Model, u64)>, DbErr> {
    let users = User::find().all(db).await?;
    let mut out = Vec::with_capacity(users.len());
    for u in users {
        let count = DiaryEntry::find()
            .filter(diary_entry::Column::UserId.eq(u.id))
            .count(db)
            .await?;
        out.push((u, count));
    }
    Ok(out)
}
