//! Diary entry repository: owner-scoped lookups, the filtered listing
//! behind /diary/, and the counts shown next to it.

use chrono::{Duration, NaiveDateTime, NaiveTime};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
    Set,
};
use serde::Serialize;

use crate::entities::diary_entry;
use crate::entities::DiaryEntry;
use crate::forms::EntryForm;

pub const PAGE_SIZE: u64 = 10;

/// Filters from the list view's query string; they compose conjunctively.
/// The mood is kept as the raw submitted value: an unrecognized mood
/// matches no rows rather than being dropped.
#[derive(Clone, Debug, Default)]
pub struct EntryFilter {
    pub search: Option<String>,
    pub mood: Option<String>,
    pub favorites_only: bool,
}

#[derive(Debug, Serialize)]
pub struct EntryPage {
    pub entries: Vec<diary_entry::Model>,
    pub page: u64,
    pub total_pages: u64,
}

/// Computed from the unfiltered owned set, independent of filters/paging.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct EntryStats {
    pub total: u64,
    pub favorites: u64,
    pub today: u64,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct ActivityBucket {
    pub label: String,
    pub count: u64,
}

fn owned_by(user_id: i32) -> Select<DiaryEntry> {
    DiaryEntry::find().filter(diary_entry::Column::UserId.eq(user_id))
}

/// Ownership-scoped lookup; a wrong owner is indistinguishable from a
/// missing row.
pub async fn find_owned(
    db: &DatabaseConnection,
    user_id: i32,
    entry_id: i32,
) -> Result<Option<diary_entry::Model>, DbErr> {
    DiaryEntry::find_by_id(entry_id)
        .filter(diary_entry::Column::UserId.eq(user_id))
        .one(db)
        .await
}

/// LIKE wildcards in user input must match literally.
pub fn escape_like(query: &str) -> String {
    query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn apply_filter(mut select: Select<DiaryEntry>, filter: &EntryFilter) -> Select<DiaryEntry> {
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(search));
        select = select.filter(
            Condition::any()
                .add(Expr::col(diary_entry::Column::Title).ilike(pattern.clone()))
                .add(Expr::col(diary_entry::Column::Content).ilike(pattern.clone()))
                .add(Expr::col(diary_entry::Column::Tags).ilike(pattern)),
        );
    }
    if let Some(mood) = filter.mood.as_deref() {
        select = select.filter(diary_entry::Column::Mood.eq(mood));
    }
    if filter.favorites_only {
        select = select.filter(diary_entry::Column::IsFavorite.eq(true));
    }
    select
}

/// Newest-first page of the requester's entries. A page past the end is
/// empty, not an error.
pub async fn list(
    db: &DatabaseConnection,
    user_id: i32,
    filter: &EntryFilter,
    page: u64,
) -> Result<EntryPage, DbErr> {
    let page = page.max(1);
    let paginator = apply_filter(owned_by(user_id), filter)
        .order_by_desc(diary_entry::Column::CreatedAt)
        .paginate(db, PAGE_SIZE);

    // An empty result set still renders as page 1 of 1.
    let total_pages = paginator.num_pages().await?.max(1);
    let entries = paginator.fetch_page(page - 1).await?;

    Ok(EntryPage {
        entries,
        page,
        total_pages,
    })
}

pub async fn stats(
    db: &DatabaseConnection,
    user_id: i32,
    now: NaiveDateTime,
) -> Result<EntryStats, DbErr> {
    let total = owned_by(user_id).count(db).await?;
    let favorites = owned_by(user_id)
        .filter(diary_entry::Column::IsFavorite.eq(true))
        .count(db)
        .await?;

    let midnight = now.date().and_time(NaiveTime::MIN);
    let today = owned_by(user_id)
        .filter(diary_entry::Column::CreatedAt.gte(midnight))
        .filter(diary_entry::Column::CreatedAt.lt(midnight + Duration::days(1)))
        .count(db)
        .await?;

    Ok(EntryStats {
        total,
        favorites,
        today,
    })
}

pub async fn recent(
    db: &DatabaseConnection,
    user_id: i32,
    limit: u64,
) -> Result<Vec<diary_entry::Model>, DbErr> {
    owned_by(user_id)
        .order_by_desc(diary_entry::Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await
}

/// Six fixed 30-day windows ending at decreasing offsets from `now`,
/// most recent first. Deliberately not calendar-aligned.
pub fn activity_windows(now: NaiveDateTime) -> Vec<(NaiveDateTime, NaiveDateTime)> {
    (1..=6)
        .map(|i| {
            (
                now - Duration::days(30 * i),
                now - Duration::days(30 * (i - 1)),
            )
        })
        .collect()
}

pub async fn activity(
    db: &DatabaseConnection,
    user_id: i32,
    now: NaiveDateTime,
) -> Result<Vec<ActivityBucket>, DbErr> {
    let mut buckets = Vec::with_capacity(6);
    for (start, end) in activity_windows(now) {
        let count = owned_by(user_id)
            .filter(diary_entry::Column::CreatedAt.gte(start))
            .filter(diary_entry::Column::CreatedAt.lt(end))
            .count(db)
            .await?;
        buckets.push(ActivityBucket {
            label: start.format("%B %Y").to_string(),
            count,
        });
    }
    Ok(buckets)
}

pub async fn insert(
    db: &DatabaseConnection,
    user_id: i32,
    form: &EntryForm,
    now: NaiveDateTime,
) -> Result<diary_entry::Model, DbErr> {
    let new_entry = diary_entry::ActiveModel {
        user_id: Set(user_id),
        title: Set(form.title.clone()),
        content: Set(form.content.clone()),
        mood: Set(form.mood),
        tags: Set(form.tags.clone()),
        is_favorite: Set(form.is_favorite),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    new_entry.insert(db).await
}

/// `created_at` is immutable; only the editable fields and `updated_at`
/// change.
pub async fn update(
    db: &DatabaseConnection,
    entry: diary_entry::Model,
    form: &EntryForm,
    now: NaiveDateTime,
) -> Result<diary_entry::Model, DbErr> {
    let mut active = entry.into_active_model();
    active.title = Set(form.title.clone());
    active.content = Set(form.content.clone());
    active.mood = Set(form.mood);
    active.tags = Set(form.tags.clone());
    active.is_favorite = Set(form.is_favorite);
    active.updated_at = Set(now);
    active.update(db).await
}

pub async fn toggle_favorite(
    db: &DatabaseConnection,
    entry: diary_entry::Model,
    now: NaiveDateTime,
) -> Result<diary_entry::Model, DbErr> {
    let flipped = !entry.is_favorite;
    let mut active = entry.into_active_model();
    active.is_favorite = Set(flipped);
    active.updated_at = Set(now);
    active.update(db).await
}

/// Image rows go with the entry via FK cascade; stored files are the
/// caller's to clean up.
pub async fn delete(db: &DatabaseConnection, entry: diary_entry::Model) -> Result<(), DbErr> {
    entry.delete(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::diary_entry::Mood;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
        let mut row = BTreeMap::new();
        row.insert("num_items", Value::from(n));
        row
    }

    #[test]
    fn like_escaping_makes_wildcards_literal() {
        assert_eq!(escape_like("50%_done"), "50\\%\\_done");
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }

    #[test]
    fn activity_windows_are_contiguous_30_day_spans() {
        let now = at("2026-08-27 09:30:00");
        let windows = activity_windows(now);
        assert_eq!(windows.len(), 6);
        // Most recent window ends exactly at now.
        assert_eq!(windows[0].1, now);
        for (start, end) in &windows {
            assert_eq!(*end - *start, Duration::days(30));
        }
        // Each window ends where the previous one starts: no gaps, no
        // calendar alignment.
        for pair in windows.windows(2) {
            assert_eq!(pair[1].1, pair[0].0);
        }
    }

    #[tokio::test]
    async fn stats_come_from_three_unfiltered_counts() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(12)]])
            .append_query_results([vec![count_row(4)]])
            .append_query_results([vec![count_row(2)]])
            .into_connection();

        let stats = stats(&db, 1, at("2026-08-27 10:00:00")).await.unwrap();
        assert_eq!(
            stats,
            EntryStats {
                total: 12,
                favorites: 4,
                today: 2
            }
        );
    }

    #[tokio::test]
    async fn lookups_are_scoped_to_the_owner() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<diary_entry::Model>::new()])
            .into_connection();

        let found = find_owned(&db, 7, 3).await.unwrap();
        assert!(found.is_none());

        // The query must constrain both the id and the owning user.
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("user_id"));
        assert!(log.contains("diary_entries"));
    }

    #[tokio::test]
    async fn list_composes_filters_and_pages_by_ten() {
        let filter = EntryFilter {
            search: Some("win".to_string()),
            mood: Some("happy".to_string()),
            favorites_only: true,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(23)]])
            .append_query_results([Vec::<diary_entry::Model>::new()])
            .into_connection();

        let page = list(&db, 7, &filter, 1).await.unwrap();
        assert_eq!(page.total_pages, 3);

        // One conjunctive query: owner scope, case-insensitive search,
        // mood, favorites, and a page-sized LIMIT.
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("user_id"));
        assert!(log.contains("ILIKE"));
        assert!(log.contains("mood"));
        assert!(log.contains("is_favorite"));
        assert!(log.contains("LIMIT"));
    }

    #[tokio::test]
    async fn unknown_mood_filter_reaches_the_query_unchanged() {
        let filter = EntryFilter {
            search: None,
            mood: Some("furious".to_string()),
            favorites_only: false,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(0)]])
            .append_query_results([Vec::<diary_entry::Model>::new()])
            .into_connection();

        let page = list(&db, 1, &filter, 1).await.unwrap();
        assert!(page.entries.is_empty());

        // Filtering by the raw value means garbage matches nothing,
        // not everything.
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("furious"));
    }

    #[tokio::test]
    async fn toggle_favorite_flips_the_flag() {
        let entry = diary_entry::Model {
            id: 3,
            user_id: 1,
            title: String::new(),
            content: "Day one".to_string(),
            mood: Some(Mood::Happy),
            tags: "work,win".to_string(),
            is_favorite: false,
            created_at: at("2026-08-27 08:00:00"),
            updated_at: at("2026-08-27 08:00:00"),
        };
        let flipped = diary_entry::Model {
            is_favorite: true,
            updated_at: at("2026-08-27 09:00:00"),
            ..entry.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[flipped.clone()]])
            .into_connection();

        let updated = toggle_favorite(&db, entry, at("2026-08-27 09:00:00"))
            .await
            .unwrap();
        assert!(updated.is_favorite);
    }
}
