use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use sea_orm::EntityTrait;
use serde::Serialize;
use uuid::Uuid;

use crate::AppState;
use crate::entities::user;
use crate::error::{AppError, AppResult};
use crate::utils::jwt::Claims;

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub phone_number: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        UserResponse {
            id: u.id,
            is_active: u.is_active,
            is_staff: u.is_staff(),
            created_at: u.created_at.with_timezone(&Utc),
            phone_number: u.phone_number,
            username: u.username,
            email: u.email,
        }
    }
}

/// List all users (admin)
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserResponse>>> {
    let users = user::Entity::find().all(&state.db).await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Look up a single user. Any id other than the caller's own is a 404;
/// the caller cannot tell whether the account exists.
pub async fn get_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    if id != claims.sub {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let user = user::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from(user)))
}
