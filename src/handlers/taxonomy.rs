use axum::{
    Json,
    extract::{Path, State},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::entities::{brand, vehicle, vehicle_model, vehicle_type};
use crate::error::{AppError, AppResult};
use crate::utils::validate;

// ============ Types ============

#[derive(Debug, Deserialize)]
pub struct TypePayload {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct TypeResponse {
    pub id: Uuid,
    pub name: String,
    // Derived at query time, never stored.
    pub brand_count: u64,
}

pub async fn list_types(State(state): State<AppState>) -> AppResult<Json<Vec<TypeResponse>>> {
    let types = vehicle_type::Entity::find().all(&state.db).await?;

    let mut responses = Vec::new();
    for t in types {
        let brand_count = brand::Entity::find()
            .filter(brand::Column::TypeId.eq(t.id))
            .count(&state.db)
            .await?;

        responses.push(TypeResponse {
            id: t.id,
            name: t.name,
            brand_count,
        });
    }

    Ok(Json(responses))
}

pub async fn get_type(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TypeResponse>> {
    let t = vehicle_type::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Type not found".to_string()))?;

    let brand_count = brand::Entity::find()
        .filter(brand::Column::TypeId.eq(t.id))
        .count(&state.db)
        .await?;

    Ok(Json(TypeResponse {
        id: t.id,
        name: t.name,
        brand_count,
    }))
}

pub async fn create_type(
    State(state): State<AppState>,
    Json(payload): Json<TypePayload>,
) -> AppResult<Json<TypeResponse>> {
    validate::taxonomy_name(&payload.name)?;

    let created = vehicle_type::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
    }
    .insert(&state.db)
    .await?;

    Ok(Json(TypeResponse {
        id: created.id,
        name: created.name,
        brand_count: 0,
    }))
}

pub async fn update_type(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TypePayload>,
) -> AppResult<Json<TypeResponse>> {
    validate::taxonomy_name(&payload.name)?;

    let t = vehicle_type::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Type not found".to_string()))?;

    let mut active: vehicle_type::ActiveModel = t.into();
    active.name = Set(payload.name);
    let updated = active.update(&state.db).await?;

    let brand_count = brand::Entity::find()
        .filter(brand::Column::TypeId.eq(updated.id))
        .count(&state.db)
        .await?;

    Ok(Json(TypeResponse {
        id: updated.id,
        name: updated.name,
        brand_count,
    }))
}

/// Delete a type. Blocked while brands still reference it, symmetric with
/// the brand and model guards.
pub async fn delete_type(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let txn = state.db.begin().await?;

    let brands = brand::Entity::find()
        .filter(brand::Column::TypeId.eq(id))
        .count(&txn)
        .await?;

    if brands > 0 {
        return Err(AppError::DeleteBlocked(
            "Cannot delete type with brands".to_string(),
        ));
    }

    let result = vehicle_type::Entity::delete_by_id(id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Type not found".to_string()));
    }

    txn.commit().await?;
    Ok(Json(serde_json::json!({ "message": "Type deleted" })))
}

// ============ Brands ============

#[derive(Debug, Deserialize)]
pub struct BrandPayload {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct BrandResponse {
    pub id: Uuid,
    pub name: String,
    pub type_id: Uuid,
    pub model_count: u64,
}

async fn find_type(state: &AppState, type_id: Uuid) -> AppResult<vehicle_type::Model> {
    vehicle_type::Entity::find_by_id(type_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Type not found".to_string()))
}

/// Find a brand under the type named in the path; a brand under a different
/// type is not visible here.
async fn find_brand(state: &AppState, type_id: Uuid, id: Uuid) -> AppResult<brand::Model> {
    brand::Entity::find_by_id(id)
        .filter(brand::Column::TypeId.eq(type_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Brand not found".to_string()))
}

pub async fn list_brands(
    State(state): State<AppState>,
    Path(type_id): Path<Uuid>,
) -> AppResult<Json<Vec<BrandResponse>>> {
    find_type(&state, type_id).await?;

    let brands = brand::Entity::find()
        .filter(brand::Column::TypeId.eq(type_id))
        .all(&state.db)
        .await?;

    let mut responses = Vec::new();
    for b in brands {
        let model_count = vehicle_model::Entity::find()
            .filter(vehicle_model::Column::BrandId.eq(b.id))
            .count(&state.db)
            .await?;

        responses.push(BrandResponse {
            id: b.id,
            name: b.name,
            type_id: b.type_id,
            model_count,
        });
    }

    Ok(Json(responses))
}

pub async fn get_brand(
    State(state): State<AppState>,
    Path((type_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<BrandResponse>> {
    let b = find_brand(&state, type_id, id).await?;

    let model_count = vehicle_model::Entity::find()
        .filter(vehicle_model::Column::BrandId.eq(b.id))
        .count(&state.db)
        .await?;

    Ok(Json(BrandResponse {
        id: b.id,
        name: b.name,
        type_id: b.type_id,
        model_count,
    }))
}

pub async fn create_brand(
    State(state): State<AppState>,
    Path(type_id): Path<Uuid>,
    Json(payload): Json<BrandPayload>,
) -> AppResult<Json<BrandResponse>> {
    validate::taxonomy_name(&payload.name)?;
    find_type(&state, type_id).await?;

    let created = brand::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        type_id: Set(type_id),
    }
    .insert(&state.db)
    .await?;

    Ok(Json(BrandResponse {
        id: created.id,
        name: created.name,
        type_id: created.type_id,
        model_count: 0,
    }))
}

pub async fn update_brand(
    State(state): State<AppState>,
    Path((type_id, id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<BrandPayload>,
) -> AppResult<Json<BrandResponse>> {
    validate::taxonomy_name(&payload.name)?;

    let b = find_brand(&state, type_id, id).await?;

    let mut active: brand::ActiveModel = b.into();
    active.name = Set(payload.name);
    let updated = active.update(&state.db).await?;

    let model_count = vehicle_model::Entity::find()
        .filter(vehicle_model::Column::BrandId.eq(updated.id))
        .count(&state.db)
        .await?;

    Ok(Json(BrandResponse {
        id: updated.id,
        name: updated.name,
        type_id: updated.type_id,
        model_count,
    }))
}

pub async fn delete_brand(
    State(state): State<AppState>,
    Path((type_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<serde_json::Value>> {
    find_brand(&state, type_id, id).await?;

    let txn = state.db.begin().await?;

    let models = vehicle_model::Entity::find()
        .filter(vehicle_model::Column::BrandId.eq(id))
        .count(&txn)
        .await?;

    if models > 0 {
        return Err(AppError::DeleteBlocked(
            "Cannot delete brand with models".to_string(),
        ));
    }

    brand::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    Ok(Json(serde_json::json!({ "message": "Brand deleted" })))
}

// ============ Models ============

#[derive(Debug, Deserialize)]
pub struct ModelPayload {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ModelResponse {
    pub id: Uuid,
    pub name: String,
    pub brand_id: Uuid,
    pub type_id: Uuid,
}

impl From<vehicle_model::Model> for ModelResponse {
    fn from(m: vehicle_model::Model) -> Self {
        ModelResponse {
            id: m.id,
            name: m.name,
            brand_id: m.brand_id,
            type_id: m.type_id,
        }
    }
}

async fn find_model(
    state: &AppState,
    type_id: Uuid,
    brand_id: Uuid,
    id: Uuid,
) -> AppResult<vehicle_model::Model> {
    vehicle_model::Entity::find_by_id(id)
        .filter(vehicle_model::Column::BrandId.eq(brand_id))
        .filter(vehicle_model::Column::TypeId.eq(type_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Model not found".to_string()))
}

pub async fn list_models(
    State(state): State<AppState>,
    Path((type_id, brand_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<Vec<ModelResponse>>> {
    find_brand(&state, type_id, brand_id).await?;

    let models = vehicle_model::Entity::find()
        .filter(vehicle_model::Column::BrandId.eq(brand_id))
        .filter(vehicle_model::Column::TypeId.eq(type_id))
        .all(&state.db)
        .await?;

    Ok(Json(models.into_iter().map(ModelResponse::from).collect()))
}

pub async fn get_model(
    State(state): State<AppState>,
    Path((type_id, brand_id, id)): Path<(Uuid, Uuid, Uuid)>,
) -> AppResult<Json<ModelResponse>> {
    let m = find_model(&state, type_id, brand_id, id).await?;
    Ok(Json(ModelResponse::from(m)))
}

pub async fn create_model(
    State(state): State<AppState>,
    Path((type_id, brand_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ModelPayload>,
) -> AppResult<Json<ModelResponse>> {
    validate::taxonomy_name(&payload.name)?;

    // The brand must belong to the path's type, so the model's redundant
    // type reference always agrees with its brand's.
    find_brand(&state, type_id, brand_id).await?;

    let created = vehicle_model::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        brand_id: Set(brand_id),
        type_id: Set(type_id),
    }
    .insert(&state.db)
    .await?;

    Ok(Json(ModelResponse::from(created)))
}

pub async fn update_model(
    State(state): State<AppState>,
    Path((type_id, brand_id, id)): Path<(Uuid, Uuid, Uuid)>,
    Json(payload): Json<ModelPayload>,
) -> AppResult<Json<ModelResponse>> {
    validate::taxonomy_name(&payload.name)?;

    let m = find_model(&state, type_id, brand_id, id).await?;

    let mut active: vehicle_model::ActiveModel = m.into();
    active.name = Set(payload.name);
    let updated = active.update(&state.db).await?;

    Ok(Json(ModelResponse::from(updated)))
}

pub async fn delete_model(
    State(state): State<AppState>,
    Path((type_id, brand_id, id)): Path<(Uuid, Uuid, Uuid)>,
) -> AppResult<Json<serde_json::Value>> {
    find_model(&state, type_id, brand_id, id).await?;

    let txn = state.db.begin().await?;

    let vehicles = vehicle::Entity::find()
        .filter(vehicle::Column::ModelId.eq(id))
        .count(&txn)
        .await?;

    if vehicles > 0 {
        return Err(AppError::DeleteBlocked(
            "Cannot delete model with vehicles".to_string(),
        ));
    }

    vehicle_model::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    Ok(Json(serde_json::json!({ "message": "Model deleted" })))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};

    use super::*;
    use crate::test_support;

    fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
    }

    #[tokio::test]
    async fn type_with_brands_cannot_be_deleted() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(3)]])
            .into_connection();
        let state = test_support::state(db);

        let err = delete_type(State(state), Path(Uuid::new_v4()))
            .await
            .unwrap_err();

        match err {
            AppError::DeleteBlocked(msg) => assert_eq!(msg, "Cannot delete type with brands"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn brand_with_models_cannot_be_deleted() {
        let type_id = Uuid::new_v4();
        let brand_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![brand::Model {
                id: brand_id,
                name: "Toyota".to_string(),
                type_id,
            }]])
            .append_query_results([vec![count_row(1)]])
            .into_connection();
        let state = test_support::state(db);

        let err = delete_brand(State(state), Path((type_id, brand_id)))
            .await
            .unwrap_err();

        match err {
            AppError::DeleteBlocked(msg) => assert_eq!(msg, "Cannot delete brand with models"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn childless_brand_delete_goes_through() {
        let type_id = Uuid::new_v4();
        let brand_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![brand::Model {
                id: brand_id,
                name: "Saab".to_string(),
                type_id,
            }]])
            .append_query_results([vec![count_row(0)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let state = test_support::state(db);

        let body = delete_brand(State(state), Path((type_id, brand_id)))
            .await
            .unwrap();

        assert_eq!(body.0["message"], "Brand deleted");
    }

    #[tokio::test]
    async fn model_with_vehicles_cannot_be_deleted() {
        let type_id = Uuid::new_v4();
        let brand_id = Uuid::new_v4();
        let model_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![vehicle_model::Model {
                id: model_id,
                name: "Corolla".to_string(),
                brand_id,
                type_id,
            }]])
            .append_query_results([vec![count_row(2)]])
            .into_connection();
        let state = test_support::state(db);

        let err = delete_model(State(state), Path((type_id, brand_id, model_id)))
            .await
            .unwrap_err();

        match err {
            AppError::DeleteBlocked(msg) => assert_eq!(msg, "Cannot delete model with vehicles"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
