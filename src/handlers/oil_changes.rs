use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::entities::oil_change;
use crate::error::{AppError, AppResult};
use crate::repo::OwnedServices;
use crate::utils::jwt::Claims;

#[derive(Debug, Deserialize)]
pub struct OilChangePayload {
    pub oil_type: String,
    pub oil_lifetime_distance: Option<i32>,
    pub next_change_mileage: Option<i32>,
    pub next_service_date: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OilChangeResponse {
    pub id: Uuid,
    pub service_id: Uuid,
    pub oil_type: String,
    pub oil_lifetime_distance: Option<i32>,
    pub next_change_mileage: Option<i32>,
    pub next_service_date: Option<NaiveDate>,
    pub description: Option<String>,
}

impl From<oil_change::Model> for OilChangeResponse {
    fn from(oc: oil_change::Model) -> Self {
        OilChangeResponse {
            id: oc.id,
            service_id: oc.service_id,
            oil_type: oc.oil_type,
            oil_lifetime_distance: oc.oil_lifetime_distance,
            next_change_mileage: oc.next_change_mileage,
            next_service_date: oc.next_service_date,
            description: oc.description,
        }
    }
}

async fn find_oil_change(
    state: &AppState,
    service_id: Uuid,
    id: Uuid,
) -> AppResult<oil_change::Model> {
    oil_change::Entity::find_by_id(id)
        .filter(oil_change::Column::ServiceId.eq(service_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Oil change not found".to_string()))
}

/// List the oil change attached to a service (zero or one)
pub async fn list_oil_changes(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(service_id): Path<Uuid>,
) -> AppResult<Json<Vec<OilChangeResponse>>> {
    OwnedServices::new(&state.db, claims.sub).get(service_id).await?;

    let oil_changes = oil_change::Entity::find()
        .filter(oil_change::Column::ServiceId.eq(service_id))
        .all(&state.db)
        .await?;

    Ok(Json(
        oil_changes.into_iter().map(OilChangeResponse::from).collect(),
    ))
}

pub async fn get_oil_change(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((service_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<OilChangeResponse>> {
    OwnedServices::new(&state.db, claims.sub).get(service_id).await?;

    let oc = find_oil_change(&state, service_id, id).await?;
    Ok(Json(OilChangeResponse::from(oc)))
}

/// Attach an oil change to a service; a service holds at most one
pub async fn create_oil_change(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(service_id): Path<Uuid>,
    Json(payload): Json<OilChangePayload>,
) -> AppResult<Json<OilChangeResponse>> {
    let service = OwnedServices::new(&state.db, claims.sub).get(service_id).await?;

    let existing = oil_change::Entity::find()
        .filter(oil_change::Column::ServiceId.eq(service.id))
        .one(&state.db)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(
            "Service already has an oil change".to_string(),
        ));
    }

    let created = oil_change::ActiveModel {
        id: Set(Uuid::new_v4()),
        service_id: Set(service.id),
        user_id: Set(claims.sub),
        oil_type: Set(payload.oil_type),
        oil_lifetime_distance: Set(payload.oil_lifetime_distance),
        next_change_mileage: Set(payload.next_change_mileage),
        next_service_date: Set(payload.next_service_date),
        description: Set(payload.description),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok(Json(OilChangeResponse::from(created)))
}

pub async fn update_oil_change(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((service_id, id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<OilChangePayload>,
) -> AppResult<Json<OilChangeResponse>> {
    OwnedServices::new(&state.db, claims.sub).get(service_id).await?;

    let oc = find_oil_change(&state, service_id, id).await?;

    let mut active: oil_change::ActiveModel = oc.into();
    active.oil_type = Set(payload.oil_type);
    active.oil_lifetime_distance = Set(payload.oil_lifetime_distance);
    active.next_change_mileage = Set(payload.next_change_mileage);
    active.next_service_date = Set(payload.next_service_date);
    active.description = Set(payload.description);
    // Updates are stamped with the acting user.
    active.user_id = Set(claims.sub);
    active.updated_at = Set(Utc::now().into());

    let updated = active.update(&state.db).await?;
    Ok(Json(OilChangeResponse::from(updated)))
}

pub async fn delete_oil_change(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((service_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<serde_json::Value>> {
    OwnedServices::new(&state.db, claims.sub).get(service_id).await?;

    let oc = find_oil_change(&state, service_id, id).await?;
    oc.delete(&state.db).await?;

    Ok(Json(serde_json::json!({ "message": "Oil change deleted" })))
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;
    use crate::entities::service;
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

    fn oil_change_row(service_id: Uuid, user_id: Uuid) -> oil_change::Model {
        oil_change::Model {
            id: Uuid::new_v4(),
            service_id,
            user_id,
            oil_type: "5W-30".to_string(),
            oil_lifetime_distance: Some(10_000),
            next_change_mileage: None,
            next_service_date: None,
            description: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn payload() -> OilChangePayload {
        OilChangePayload {
            oil_type: "5W-30".to_string(),
            oil_lifetime_distance: Some(10_000),
            next_change_mileage: None,
            next_service_date: None,
            description: None,
        }
    }

    #[tokio::test]
    async fn second_oil_change_on_a_service_is_a_conflict() {
        let user_id = Uuid::new_v4();
        let service_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![service_row(service_id, user_id)]])
            .append_query_results([vec![oil_change_row(service_id, user_id)]])
            .into_connection();
        let state = test_support::state(db);

        let err = create_oil_change(
            State(state),
            Extension(claims_for(user_id)),
            Path(service_id),
            Json(payload()),
        )
        .await
        .unwrap_err();

        match err {
            AppError::Conflict(msg) => assert_eq!(msg, "Service already has an oil change"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn parent_service_owned_by_someone_else_is_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<service::Model>::new()])
            .into_connection();
        let state = test_support::state(db);

        let err = create_oil_change(
            State(state),
            Extension(claims_for(Uuid::new_v4())),
            Path(Uuid::new_v4()),
            Json(payload()),
        )
        .await
        .unwrap_err();

        match err {
            AppError::NotFound(msg) => assert_eq!(msg, "Service not found"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
