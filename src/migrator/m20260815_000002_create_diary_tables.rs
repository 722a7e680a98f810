use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Diary Entries Table
        manager
            .create_table(
                Table::create()
                    .table(DiaryEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DiaryEntries::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DiaryEntries::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(DiaryEntries::Title)
                            .string_len(200)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(DiaryEntries::Content).text().not_null())
                    .col(ColumnDef::new(DiaryEntries::Mood).string_len(20).null())
                    .col(
                        ColumnDef::new(DiaryEntries::Tags)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(DiaryEntries::IsFavorite)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(DiaryEntries::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(DiaryEntries::UpdatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-diary_entry-user_id")
                            .from(DiaryEntries::Table, DiaryEntries::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Listing is always per-user, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx-diary_entries-user_id-created_at")
                    .table(DiaryEntries::Table)
                    .col(DiaryEntries::UserId)
                    .col(DiaryEntries::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Entry Images Table
        manager
            .create_table(
                Table::create()
                    .table(EntryImages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EntryImages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EntryImages::EntryId).integer().not_null())
                    .col(ColumnDef::new(EntryImages::FilePath).string().not_null())
                    .col(
                        ColumnDef::new(EntryImages::Caption)
                            .string_len(200)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(EntryImages::UploadedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-entry_image-entry_id")
                            .from(EntryImages::Table, EntryImages::EntryId)
                            .to(DiaryEntries::Table, DiaryEntries::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EntryImages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DiaryEntries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DiaryEntries {
    Table,
    Id,
    UserId,
    Title,
    Content,
    Mood,
    Tags,
    IsFavorite,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum EntryImages {
    Table,
    Id,
    EntryId,
    FilePath,
    Caption,
    UploadedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
