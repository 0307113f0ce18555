use sea_orm_migration::{prelude::*, schema::*};

use super::m20260810_000001_create_users::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profile::Table)
                    .if_not_exists()
                    .col(uuid(Profile::Id).primary_key())
                    .col(uuid(Profile::UserId).not_null().unique_key())
                    .col(string_len(Profile::FirstName, 255).not_null().default(""))
                    .col(string_len(Profile::LastName, 255).not_null().default(""))
                    .col(date_null(Profile::BirthDate))
                    .col(string_len_null(Profile::Gender, 1))
                    .col(string_len_null(Profile::Email, 255))
                    .col(
                        timestamp_with_time_zone(Profile::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Profile::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profile_user")
                            .from(Profile::Table, Profile::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Profile::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Profile {
    Table,
    Id,
    UserId,
    FirstName,
    LastName,
    BirthDate,
    Gender,
    Email,
    CreatedAt,
    UpdatedAt,
}
