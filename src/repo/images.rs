use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::entities::{diary_entry, entry_image, EntryImage};
use crate::repo::entries;

pub async fn for_entry(
    db: &DatabaseConnection,
    entry_id: i32,
) -> Result<Vec<entry_image::Model>, DbErr> {
    EntryImage::find()
        .filter(entry_image::Column::EntryId.eq(entry_id))
        .order_by_desc(entry_image::Column::UploadedAt)
        .all(db)
        .await
}

pub async fn insert(
    db: &DatabaseConnection,
    entry_id: i32,
    file_path: &str,
    caption: &str,
    now: NaiveDateTime,
) -> Result<entry_image::Model, DbErr> {
    let new_image = entry_image::ActiveModel {
        entry_id: Set(entry_id),
        file_path: Set(file_path.to_string()),
        caption: Set(caption.to_string()),
        uploaded_at: Set(now),
        ..Default::default()
    };
    new_image.insert(db).await
}

/// Ownership is resolved transitively: the image is the requester's only
/// if its parent entry is. Returns the parent too, for the redirect back.
pub async fn find_owned(
    db: &DatabaseConnection,
    user_id: i32,
    image_id: i32,
) -> Result<Option<(entry_image::Model, diary_entry::Model)>, DbErr> {
    let Some(image) = EntryImage::find_by_id(image_id).one(db).await? else {
        return Ok(None);
    };
    let Some(parent) = entries::find_owned(db, user_id, image.entry_id).await? else {
        return Ok(None);
    };
    Ok(Some((image, parent)))
}

pub async fn delete(db: &DatabaseConnection, image: entry_image::Model) -> Result<(), DbErr> {
    image.delete(db).await?;
    Ok(())
}
