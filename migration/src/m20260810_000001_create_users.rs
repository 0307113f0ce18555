use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(uuid(User::Id).primary_key())
                    .col(string_len(User::PhoneNumber, 255).not_null().unique_key())
                    .col(string_len_null(User::Username, 255).unique_key())
                    .col(string_len_null(User::Email, 255).unique_key())
                    // Nullable: accounts without a usable password cannot
                    // authenticate by password at all.
                    .col(string_len_null(User::PasswordHash, 255))
                    .col(boolean(User::IsActive).not_null().default(true))
                    .col(boolean(User::IsAdmin).not_null().default(false))
                    .col(boolean(User::IsSuperuser).not_null().default(false))
                    .col(
                        timestamp_with_time_zone(User::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(User::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum User {
    Table,
    Id,
    PhoneNumber,
    Username,
    Email,
    PasswordHash,
    IsActive,
    IsAdmin,
    IsSuperuser,
    CreatedAt,
    UpdatedAt,
}
