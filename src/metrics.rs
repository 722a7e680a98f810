use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

use crate::entities::{DiaryEntry, EntryImage, User};

/// Seeds the totals gauges from the schema at startup; handlers keep
/// them current afterwards.
pub async fn init_metrics(db: &DatabaseConnection) {
    let user_count = User::find().count(db).await.unwrap_or(0);
    metrics::gauge!("memind_users_total").set(user_count as f64);

    let entry_count = DiaryEntry::find().count(db).await.unwrap_or(0);
    metrics::gauge!("memind_entries_total").set(entry_count as f64);

    let image_count = EntryImage::find().count(db).await.unwrap_or(0);
    metrics::gauge!("memind_entry_images_total").set(image_count as f64);

    tracing::info!(
        "Initialized metrics: Users={}, Entries={}, Images={}",
        user_count,
        entry_count,
        image_count
    );
}
