use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VehicleType::Table)
                    .if_not_exists()
                    .col(uuid(VehicleType::Id).primary_key())
                    .col(string_len(VehicleType::Name, 255).not_null())
                    .to_owned(),
            )
            .await?;

        // RESTRICT keeps the application-level cascade guards honest even
        // if a child row lands between the guard's count and the delete.
        manager
            .create_table(
                Table::create()
                    .table(Brand::Table)
                    .if_not_exists()
                    .col(uuid(Brand::Id).primary_key())
                    .col(string_len(Brand::Name, 255).not_null())
                    .col(uuid(Brand::TypeId).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_brand_type")
                            .from(Brand::Table, Brand::TypeId)
                            .to(VehicleType::Table, VehicleType::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VehicleModel::Table)
                    .if_not_exists()
                    .col(uuid(VehicleModel::Id).primary_key())
                    .col(string_len(VehicleModel::Name, 255).not_null())
                    .col(uuid(VehicleModel::BrandId).not_null())
                    .col(uuid(VehicleModel::TypeId).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_model_brand")
                            .from(VehicleModel::Table, VehicleModel::BrandId)
                            .to(Brand::Table, Brand::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_model_type")
                            .from(VehicleModel::Table, VehicleModel::TypeId)
                            .to(VehicleType::Table, VehicleType::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VehicleModel::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Brand::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(VehicleType::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum VehicleType {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
pub enum Brand {
    Table,
    Id,
    Name,
    TypeId,
}

#[derive(DeriveIden)]
pub enum VehicleModel {
    Table,
    Id,
    Name,
    BrandId,
    TypeId,
}
