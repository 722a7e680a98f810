use chrono::NaiveDateTime;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, Set,
};

use crate::entities::{user_profile, UserProfile};
use crate::forms::ProfileForm;

/// Atomic read-or-insert: an insert that yields on conflict, then a
/// select. Two concurrent first accesses cannot create two profiles.
pub async fn get_or_create(
    db: &DatabaseConnection,
    user_id: i32,
    now: NaiveDateTime,
) -> Result<user_profile::Model, DbErr> {
    let empty = user_profile::ActiveModel {
        user_id: Set(user_id),
        bio: Set(String::new()),
        avatar_path: Set(None),
        birth_date: Set(None),
        created_at: Set(now),
        ..Default::default()
    };
    UserProfile::insert(empty)
        .on_conflict(
            OnConflict::column(user_profile::Column::UserId)
                .do_nothing()
                .to_owned(),
        )
        .do_nothing()
        .exec(db)
        .await?;

    UserProfile::find()
        .filter(user_profile::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("profile for user {user_id}")))
}

/// Applies a validated edit. `avatar_path` of `None` keeps the current
/// avatar; `Some` replaces the reference.
pub async fn update(
    db: &DatabaseConnection,
    profile: user_profile::Model,
    form: &ProfileForm,
    avatar_path: Option<String>,
) -> Result<user_profile::Model, DbErr> {
    let mut active = profile.into_active_model();
    active.bio = Set(form.bio.clone());
    active.birth_date = Set(form.birth_date);
    if let Some(path) = avatar_path {
        active.avatar_path = Set(Some(path));
    }
    active.update(db).await
}
