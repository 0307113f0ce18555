use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::entities::{oil_change, service};
use crate::error::{AppError, AppResult};
use crate::handlers::oil_changes::OilChangeResponse;
use crate::repo::{OwnedServices, OwnedVehicles};
use crate::utils::jwt::Claims;
use crate::utils::validate;

#[derive(Debug, Deserialize)]
pub struct CreateServiceRequest {
    pub vehicle_id: Uuid,
    pub service_date: NaiveDate,
    pub mileage: i32,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateVehicleServiceRequest {
    pub service_date: NaiveDate,
    pub mileage: i32,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateServiceRequest {
    pub service_date: NaiveDate,
    pub mileage: i32,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ServiceResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub vehicle_id: Uuid,
    pub service_date: NaiveDate,
    pub mileage: i32,
    pub description: Option<String>,
    pub oil_change: Option<OilChangeResponse>,
}

impl ServiceResponse {
    fn new(s: service::Model, oil_change: Option<oil_change::Model>) -> Self {
        ServiceResponse {
            id: s.id,
            user_id: s.user_id,
            vehicle_id: s.vehicle_id,
            service_date: s.service_date,
            mileage: s.mileage,
            description: s.description,
            oil_change: oil_change.map(OilChangeResponse::from),
        }
    }
}

async fn with_oil_change(state: &AppState, s: service::Model) -> AppResult<ServiceResponse> {
    let oil_change = oil_change::Entity::find()
        .filter(oil_change::Column::ServiceId.eq(s.id))
        .one(&state.db)
        .await?;

    Ok(ServiceResponse::new(s, oil_change))
}

/// List the caller's services, each with its nested oil change
pub async fn list_services(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<ServiceResponse>>> {
    let services = OwnedServices::new(&state.db, claims.sub).list().await?;

    let mut responses = Vec::new();
    for s in services {
        responses.push(with_oil_change(&state, s).await?);
    }

    Ok(Json(responses))
}

/// Get one of the caller's services
pub async fn get_service(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ServiceResponse>> {
    let service = OwnedServices::new(&state.db, claims.sub).get(id).await?;
    Ok(Json(with_oil_change(&state, service).await?))
}

async fn insert_service(
    state: &AppState,
    caller: Uuid,
    vehicle_id: Uuid,
    service_date: NaiveDate,
    mileage: i32,
    description: Option<String>,
) -> AppResult<service::Model> {
    validate::service_date(service_date)?;
    validate::service_mileage(mileage)?;

    // The vehicle is resolved through the caller's scope; logging a service
    // against someone else's vehicle looks identical to a missing vehicle.
    OwnedVehicles::new(&state.db, caller).get(vehicle_id).await?;

    let created = service::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(caller),
        vehicle_id: Set(vehicle_id),
        service_date: Set(service_date),
        mileage: Set(mileage),
        description: Set(description),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok(created)
}

/// Log a service against one of the caller's vehicles
pub async fn create_service(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateServiceRequest>,
) -> AppResult<Json<ServiceResponse>> {
    let created = insert_service(
        &state,
        claims.sub,
        payload.vehicle_id,
        payload.service_date,
        payload.mileage,
        payload.description,
    )
    .await?;

    Ok(Json(ServiceResponse::new(created, None)))
}

/// Update one of the caller's services
pub async fn update_service(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateServiceRequest>,
) -> AppResult<Json<ServiceResponse>> {
    validate::service_date(payload.service_date)?;
    validate::service_mileage(payload.mileage)?;

    let service = OwnedServices::new(&state.db, claims.sub).get(id).await?;

    let mut active: service::ActiveModel = service.into();
    active.service_date = Set(payload.service_date);
    active.mileage = Set(payload.mileage);
    active.description = Set(payload.description);
    active.updated_at = Set(Utc::now().into());

    let updated = active.update(&state.db).await?;
    Ok(Json(with_oil_change(&state, updated).await?))
}

/// Delete one of the caller's services. Blocked while an oil change still
/// references it.
pub async fn delete_service(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let service = OwnedServices::new(&state.db, claims.sub).get(id).await?;

    let txn = state.db.begin().await?;

    let oil_changes = oil_change::Entity::find()
        .filter(oil_change::Column::ServiceId.eq(service.id))
        .count(&txn)
        .await?;

    if oil_changes > 0 {
        return Err(AppError::DeleteBlocked(
            "Cannot delete service with oil changes".to_string(),
        ));
    }

    service::Entity::delete_by_id(service.id).exec(&txn).await?;
    txn.commit().await?;

    Ok(Json(serde_json::json!({ "message": "Service deleted" })))
}

// ============ Nested under a vehicle ============

/// List services for one of the caller's vehicles
pub async fn list_vehicle_services(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(vehicle_id): Path<Uuid>,
) -> AppResult<Json<Vec<ServiceResponse>>> {
    OwnedVehicles::new(&state.db, claims.sub).get(vehicle_id).await?;

    let services = OwnedServices::new(&state.db, claims.sub)
        .list_for_vehicle(vehicle_id)
        .await?;

    let mut responses = Vec::new();
    for s in services {
        responses.push(with_oil_change(&state, s).await?);
    }

    Ok(Json(responses))
}

/// Log a service against the vehicle named in the path
pub async fn create_vehicle_service(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(vehicle_id): Path<Uuid>,
    Json(payload): Json<CreateVehicleServiceRequest>,
) -> AppResult<Json<ServiceResponse>> {
    let created = insert_service(
        &state,
        claims.sub,
        vehicle_id,
        payload.service_date,
        payload.mileage,
        payload.description,
    )
    .await?;

    Ok(Json(ServiceResponse::new(created, None)))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    use super::*;
    use crate::test_support;

    fn claims_for(user_id: Uuid) -> Claims {
        Claims {
            sub: user_id,
            phone_number: "+15551230000".to_string(),
            is_admin: false,
            exp: 0,
            iat: 0,
        }
    }

    fn service_row(id: Uuid, user_id: Uuid) -> service::Model {
        service::Model {
            id,
            user_id,
            vehicle_id: Uuid::new_v4(),
            service_date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            mileage: 42_000,
            description: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn service_with_an_oil_change_cannot_be_deleted() {
        let user_id = Uuid::new_v4();
        let service_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![service_row(service_id, user_id)]])
            .append_query_results([vec![BTreeMap::from([(
                "num_items",
                Value::BigInt(Some(1)),
            )])]])
            .into_connection();
        let state = test_support::state(db);

        let err = delete_service(State(state), Extension(claims_for(user_id)), Path(service_id))
            .await
            .unwrap_err();

        match err {
            AppError::DeleteBlocked(msg) => {
                assert_eq!(msg, "Cannot delete service with oil changes")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn someone_elses_service_reads_as_missing() {
        // The owner filter excludes the row, so the lookup comes back empty.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<service::Model>::new()])
            .into_connection();
        let state = test_support::state(db);

        let err = get_service(
            State(state),
            Extension(claims_for(Uuid::new_v4())),
            Path(Uuid::new_v4()),
        )
        .await
        .unwrap_err();

        match err {
            AppError::NotFound(msg) => assert_eq!(msg, "Service not found"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
