use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, ModelTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::entities::{vehicle, vehicle_model};
use crate::error::{AppError, AppResult};
use crate::repo::OwnedVehicles;
use crate::utils::jwt::Claims;
use crate::utils::validate;

#[derive(Debug, Deserialize)]
pub struct CreateVehicleRequest {
    pub name: String,
    pub model_id: Uuid,
    pub color: String,
    pub year: i32,
    pub plate_number: String,
    pub mileage: i32,
    pub insurance_date: Option<NaiveDate>,
}

// No owner field: the owner is always the authenticated caller and is
// never accepted from the client.
#[derive(Debug, Deserialize)]
pub struct UpdateVehicleRequest {
    pub name: String,
    pub model_id: Uuid,
    pub color: String,
    pub year: i32,
    pub plate_number: String,
    pub mileage: i32,
    pub insurance_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub model_id: Uuid,
    pub name: String,
    pub color: String,
    pub year: i32,
    pub plate_number: String,
    pub mileage: i32,
    pub insurance_date: Option<NaiveDate>,
}

impl From<vehicle::Model> for VehicleResponse {
    fn from(v: vehicle::Model) -> Self {
        VehicleResponse {
            id: v.id,
            user_id: v.user_id,
            model_id: v.model_id,
            name: v.name,
            color: v.color,
            year: v.year,
            plate_number: v.plate_number,
            mileage: v.mileage,
            insurance_date: v.insurance_date,
        }
    }
}

async fn find_model(state: &AppState, model_id: Uuid) -> AppResult<vehicle_model::Model> {
    vehicle_model::Entity::find_by_id(model_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid vehicle model".to_string()))
}

/// List the caller's vehicles
pub async fn list_vehicles(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<VehicleResponse>>> {
    let vehicles = OwnedVehicles::new(&state.db, claims.sub).list().await?;

    Ok(Json(
        vehicles.into_iter().map(VehicleResponse::from).collect(),
    ))
}

/// Get one of the caller's vehicles
pub async fn get_vehicle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<VehicleResponse>> {
    let vehicle = OwnedVehicles::new(&state.db, claims.sub).get(id).await?;
    Ok(Json(VehicleResponse::from(vehicle)))
}

/// Register a vehicle for the caller
pub async fn create_vehicle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateVehicleRequest>,
) -> AppResult<Json<VehicleResponse>> {
    validate::vehicle_mileage(payload.mileage)?;
    find_model(&state, payload.model_id).await?;

    let created = vehicle::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(claims.sub),
        model_id: Set(payload.model_id),
        name: Set(payload.name),
        color: Set(payload.color),
        year: Set(payload.year),
        plate_number: Set(payload.plate_number),
        mileage: Set(payload.mileage),
        insurance_date: Set(payload.insurance_date),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok(Json(VehicleResponse::from(created)))
}

/// Update one of the caller's vehicles
pub async fn update_vehicle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVehicleRequest>,
) -> AppResult<Json<VehicleResponse>> {
    validate::vehicle_mileage(payload.mileage)?;
    find_model(&state, payload.model_id).await?;

    let vehicle = OwnedVehicles::new(&state.db, claims.sub).get(id).await?;

    let mut active: vehicle::ActiveModel = vehicle.into();
    active.model_id = Set(payload.model_id);
    active.name = Set(payload.name);
    active.color = Set(payload.color);
    active.year = Set(payload.year);
    active.plate_number = Set(payload.plate_number);
    active.mileage = Set(payload.mileage);
    active.insurance_date = Set(payload.insurance_date);
    active.updated_at = Set(Utc::now().into());

    let updated = active.update(&state.db).await?;
    Ok(Json(VehicleResponse::from(updated)))
}

/// Delete one of the caller's vehicles
pub async fn delete_vehicle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let vehicle = OwnedVehicles::new(&state.db, claims.sub).get(id).await?;

    vehicle.delete(&state.db).await?;

    Ok(Json(serde_json::json!({ "message": "Vehicle deleted" })))
}
