pub use sea_orm_migration::prelude::*;

mod m20260810_000001_create_users;
mod m20260810_000002_create_profiles;
mod m20260810_000003_create_taxonomy;
mod m20260810_000004_create_vehicles;
mod m20260810_000005_create_services;
mod m20260810_000006_create_oil_changes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260810_000001_create_users::Migration),
            Box::new(m20260810_000002_create_profiles::Migration),
            Box::new(m20260810_000003_create_taxonomy::Migration),
            Box::new(m20260810_000004_create_vehicles::Migration),
            Box::new(m20260810_000005_create_services::Migration),
            Box::new(m20260810_000006_create_oil_changes::Migration),
        ]
    }
}
