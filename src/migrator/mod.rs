use sea_orm_migration::prelude::*;

mod m20260815_000001_create_users;
mod m20260815_000002_create_diary_tables;
mod m20260815_000003_create_user_profiles;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260815_000001_create_users::Migration),
            Box::new(m20260815_000002_create_diary_tables::Migration),
            Box::new(m20260815_000003_create_user_profiles::Migration),
        ]
    }
}
