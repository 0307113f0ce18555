//! Ownership-scoped data access.
//!
//! Vehicles and services are only ever read through these accessors, which
//! are constructed from the caller's identity and filter every query on it.
//! A row owned by someone else comes back as `NotFound`, indistinguishable
//! from a row that does not exist.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entities::{service, vehicle};
use crate::error::{AppError, AppResult};

pub struct OwnedVehicles<'a> {
    db: &'a DatabaseConnection,
    owner: Uuid,
}

impl<'a> OwnedVehicles<'a> {
    pub fn new(db: &'a DatabaseConnection, owner: Uuid) -> Self {
        Self { db, owner }
    }

    pub async fn list(&self) -> AppResult<Vec<vehicle::Model>> {
        Ok(vehicle::Entity::find()
            .filter(vehicle::Column::UserId.eq(self.owner))
            .all(self.db)
            .await?)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<vehicle::Model> {
        vehicle::Entity::find_by_id(id)
            .filter(vehicle::Column::UserId.eq(self.owner))
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))
    }
}

pub struct OwnedServices<'a> {
    db: &'a DatabaseConnection,
    owner: Uuid,
}

impl<'a> OwnedServices<'a> {
    pub fn new(db: &'a DatabaseConnection, owner: Uuid) -> Self {
        Self { db, owner }
    }

    pub async fn list(&self) -> AppResult<Vec<service::Model>> {
        Ok(service::Entity::find()
            .filter(service::Column::UserId.eq(self.owner))
            .all(self.db)
            .await?)
    }

    pub async fn list_for_vehicle(&self, vehicle_id: Uuid) -> AppResult<Vec<service::Model>> {
        Ok(service::Entity::find()
            .filter(service::Column::UserId.eq(self.owner))
            .filter(service::Column::VehicleId.eq(vehicle_id))
            .all(self.db)
            .await?)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<service::Model> {
        service::Entity::find_by_id(id)
            .filter(service::Column::UserId.eq(self.owner))
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Service not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;

    #[tokio::test]
    async fn vehicle_lookup_filters_on_the_owner() {
        let owner = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<vehicle::Model>::new()])
            .into_connection();

        let err = OwnedVehicles::new(&db, owner)
            .get(Uuid::new_v4())
            .await
            .unwrap_err();

        match err {
            AppError::NotFound(msg) => assert_eq!(msg, "Vehicle not found"),
            other => panic!("unexpected error: {other:?}"),
        }

        // The query itself must carry the owner, not just the row id.
        let issued = format!("{:?}", db.into_transaction_log());
        assert!(issued.contains(r#""vehicle"."user_id""#));
        assert!(issued.contains(&owner.to_string()));
    }

    #[tokio::test]
    async fn service_lookup_filters_on_the_owner() {
        let owner = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<service::Model>::new()])
            .into_connection();

        let err = OwnedServices::new(&db, owner)
            .get(Uuid::new_v4())
            .await
            .unwrap_err();

        match err {
            AppError::NotFound(msg) => assert_eq!(msg, "Service not found"),
            other => panic!("unexpected error: {other:?}"),
        }

        let issued = format!("{:?}", db.into_transaction_log());
        assert!(issued.contains(r#""service"."user_id""#));
        assert!(issued.contains(&owner.to_string()));
    }

    #[tokio::test]
    async fn listing_always_carries_the_owner_filter() {
        let owner = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<service::Model>::new()])
            .into_connection();

        let rows = OwnedServices::new(&db, owner).list().await.unwrap();
        assert!(rows.is_empty());

        let issued = format!("{:?}", db.into_transaction_log());
        assert!(issued.contains(r#""service"."user_id""#));
    }
}
