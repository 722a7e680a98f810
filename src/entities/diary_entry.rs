use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Fixed set of moods an entry can be tagged with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Deserialize, Serialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    #[sea_orm(string_value = "happy")]
    Happy,
    #[sea_orm(string_value = "sad")]
    Sad,
    #[sea_orm(string_value = "excited")]
    Excited,
    #[sea_orm(string_value = "calm")]
    Calm,
    #[sea_orm(string_value = "anxious")]
    Anxious,
    #[sea_orm(string_value = "grateful")]
    Grateful,
    #[sea_orm(string_value = "tired")]
    Tired,
    #[sea_orm(string_value = "motivated")]
    Motivated,
}

impl Mood {
    pub const ALL: [Mood; 8] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Excited,
        Mood::Calm,
        Mood::Anxious,
        Mood::Grateful,
        Mood::Tired,
        Mood::Motivated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Excited => "excited",
            Mood::Calm => "calm",
            Mood::Anxious => "anxious",
            Mood::Grateful => "grateful",
            Mood::Tired => "tired",
            Mood::Motivated => "motivated",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mood::Happy => "😊 Happy",
            Mood::Sad => "😢 Sad",
            Mood::Excited => "🤩 Excited",
            Mood::Calm => "😌 Calm",
            Mood::Anxious => "😰 Anxious",
            Mood::Grateful => "🙏 Grateful",
            Mood::Tired => "😴 Tired",
            Mood::Motivated => "💪 Motivated",
        }
    }

    pub fn parse(value: &str) -> Option<Mood> {
        Mood::ALL.iter().copied().find(|m| m.as_str() == value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "diary_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub mood: Option<Mood>,
    pub tags: String,
    pub is_favorite: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Model {
    /// Splits the comma-separated tag string into trimmed, non-empty tags.
    pub fn tags_list(&self) -> Vec<&str> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::entry_image::Entity")]
    EntryImage,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::entry_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EntryImage.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mood_round_trips_through_parse() {
        for mood in Mood::ALL {
            assert_eq!(Mood::parse(mood.as_str()), Some(mood));
        }
        assert_eq!(Mood::parse("angry"), None);
        assert_eq!(Mood::parse(""), None);
    }

    #[test]
    fn tags_list_trims_and_skips_empty() {
        let entry = Model {
            id: 1,
            user_id: 1,
            title: String::new(),
            content: "text".into(),
            mood: None,
            tags: " work , win,, personal ".into(),
            is_favorite: false,
            created_at: Default::default(),
            updated_at: Default::default(),
        };
        assert_eq!(entry.tags_list(), vec!["work", "win", "personal"]);

        let empty = Model { tags: String::new(), ..entry };
        assert!(empty.tags_list().is_empty());
    }
}
