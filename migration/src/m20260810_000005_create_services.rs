use sea_orm_migration::{prelude::*, schema::*};

use super::m20260810_000001_create_users::User;
use super::m20260810_000004_create_vehicles::Vehicle;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Service::Table)
                    .if_not_exists()
                    .col(uuid(Service::Id).primary_key())
                    .col(uuid(Service::UserId).not_null())
                    .col(uuid(Service::VehicleId).not_null())
                    .col(date(Service::ServiceDate).not_null())
                    .col(integer(Service::Mileage).not_null())
                    .col(text_null(Service::Description))
                    .col(
                        timestamp_with_time_zone(Service::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Service::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_user")
                            .from(Service::Table, Service::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_vehicle")
                            .from(Service::Table, Service::VehicleId)
                            .to(Vehicle::Table, Vehicle::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Service::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Service {
    Table,
    Id,
    UserId,
    VehicleId,
    ServiceDate,
    Mileage,
    Description,
    CreatedAt,
    UpdatedAt,
}
