use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "entry_images")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub entry_id: i32,
    /// Path relative to the media root, served under /media/.
    pub file_path: String,
    pub caption: String,
    pub uploaded_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::diary_entry::Entity",
        from = "Column::EntryId",
        to = "super::diary_entry::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    DiaryEntry,
}

impl Related<super::diary_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DiaryEntry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
