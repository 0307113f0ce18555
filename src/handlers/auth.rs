use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::entities::user;
use crate::error::{AppError, AppResult};
use crate::utils::jwt::create_token;
use crate::utils::validate;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub phone_number: String,
    // Omitting the password leaves the account without a usable one;
    // such accounts cannot log in by password.
    pub password: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub phone_number: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub phone_number: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub is_admin: bool,
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Register a new account
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<AuthResponse>> {
    validate::phone_number(&payload.phone_number)?;

    let existing = user::Entity::find()
        .filter(user::Column::PhoneNumber.eq(&payload.phone_number))
        .one(&state.db)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(
            "Phone number already registered".to_string(),
        ));
    }

    if let Some(username) = &payload.username {
        let taken = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&state.db)
            .await?;
        if taken.is_some() {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }
    }

    if let Some(email) = &payload.email {
        let taken = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&state.db)
            .await?;
        if taken.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
    }

    let password_hash = match &payload.password {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };

    let new_user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        phone_number: Set(payload.phone_number.clone()),
        username: Set(payload.username.clone()),
        email: Set(payload.email.clone()),
        password_hash: Set(password_hash),
        is_active: Set(true),
        is_admin: Set(false),
        is_superuser: Set(false),
        ..Default::default()
    };

    let user = new_user.insert(&state.db).await?;

    let token = create_token(
        user.id,
        &user.phone_number,
        user.is_admin,
        &state.config.jwt_secret,
        state.config.jwt_expiration_hours,
    )?;

    Ok(Json(AuthResponse {
        token,
        user: UserInfo {
            id: user.id,
            phone_number: user.phone_number,
            username: user.username,
            email: user.email,
            is_admin: user.is_admin,
        },
    }))
}

/// Login with phone number and password
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = user::Entity::find()
        .filter(user::Column::PhoneNumber.eq(&payload.phone_number))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid phone number or password".to_string()))?;

    // Accounts created without a password cannot authenticate this way.
    let stored_hash = user
        .password_hash
        .as_deref()
        .ok_or_else(|| AppError::Unauthorized("Invalid phone number or password".to_string()))?;

    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|e| AppError::Internal(format!("Failed to parse password hash: {}", e)))?;

    Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized("Invalid phone number or password".to_string()))?;

    if !user.is_active {
        return Err(AppError::Unauthorized(
            "Invalid phone number or password".to_string(),
        ));
    }

    let token = create_token(
        user.id,
        &user.phone_number,
        user.is_admin,
        &state.config.jwt_secret,
        state.config.jwt_expiration_hours,
    )?;

    Ok(Json(AuthResponse {
        token,
        user: UserInfo {
            id: user.id,
            phone_number: user.phone_number,
            username: user.username,
            email: user.email,
            is_admin: user.is_admin,
        },
    }))
}
