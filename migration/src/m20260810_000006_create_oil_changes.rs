use sea_orm_migration::{prelude::*, schema::*};

use super::m20260810_000001_create_users::User;
use super::m20260810_000005_create_services::Service;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OilChange::Table)
                    .if_not_exists()
                    .col(uuid(OilChange::Id).primary_key())
                    // Unique: at most one oil change per service.
                    .col(uuid(OilChange::ServiceId).not_null().unique_key())
                    .col(uuid(OilChange::UserId).not_null())
                    .col(string_len(OilChange::OilType, 255).not_null())
                    .col(integer_null(OilChange::OilLifetimeDistance))
                    .col(integer_null(OilChange::NextChangeMileage))
                    .col(date_null(OilChange::NextServiceDate))
                    .col(text_null(OilChange::Description))
                    .col(
                        timestamp_with_time_zone(OilChange::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(OilChange::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_oil_change_service")
                            .from(OilChange::Table, OilChange::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_oil_change_user")
                            .from(OilChange::Table, OilChange::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OilChange::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum OilChange {
    Table,
    Id,
    ServiceId,
    UserId,
    OilType,
    OilLifetimeDistance,
    NextChangeMileage,
    NextServiceDate,
    Description,
    CreatedAt,
    UpdatedAt,
}
