use sea_orm_migration::{prelude::*, schema::*};

use super::m20260810_000001_create_users::User;
use super::m20260810_000003_create_taxonomy::VehicleModel;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vehicle::Table)
                    .if_not_exists()
                    .col(uuid(Vehicle::Id).primary_key())
                    .col(uuid(Vehicle::UserId).not_null())
                    .col(uuid(Vehicle::ModelId).not_null())
                    .col(string_len(Vehicle::Name, 255).not_null())
                    .col(string_len(Vehicle::Color, 255).not_null())
                    .col(integer(Vehicle::Year).not_null())
                    .col(string_len(Vehicle::PlateNumber, 255).not_null())
                    .col(integer(Vehicle::Mileage).not_null())
                    .col(date_null(Vehicle::InsuranceDate))
                    .col(
                        timestamp_with_time_zone(Vehicle::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Vehicle::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicle_user")
                            .from(Vehicle::Table, Vehicle::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicle_model")
                            .from(Vehicle::Table, Vehicle::ModelId)
                            .to(VehicleModel::Table, VehicleModel::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vehicle::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Vehicle {
    Table,
    Id,
    UserId,
    ModelId,
    Name,
    Color,
    Year,
    PlateNumber,
    Mileage,
    InsuranceDate,
    CreatedAt,
    UpdatedAt,
}
