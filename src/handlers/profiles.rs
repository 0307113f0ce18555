use axum::{Extension, Json, extract::State};
use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::entities::profile::{self, Gender};
use crate::error::{AppError, AppResult};
use crate::utils::jwt::Claims;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub email: Option<String>,
}

impl From<profile::Model> for ProfileResponse {
    fn from(p: profile::Model) -> Self {
        ProfileResponse {
            id: p.id,
            user_id: p.user_id,
            first_name: p.first_name,
            last_name: p.last_name,
            birth_date: p.birth_date,
            gender: p.gender,
            email: p.email,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

fn parse_gender(code: Option<&str>) -> AppResult<Option<Gender>> {
    match code {
        None | Some("") => Ok(None),
        Some("M") => Ok(Some(Gender::Male)),
        Some("F") => Ok(Some(Gender::Female)),
        Some("O") => Ok(Some(Gender::Other)),
        Some(_) => Err(AppError::validation("gender", "must be one of M, F or O")),
    }
}

async fn get_or_create(state: &AppState, user_id: Uuid) -> AppResult<profile::Model> {
    let existing = profile::Entity::find()
        .filter(profile::Column::UserId.eq(user_id))
        .one(&state.db)
        .await?;

    if let Some(profile) = existing {
        return Ok(profile);
    }

    // First self access creates an empty profile.
    let created = profile::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        birth_date: Set(None),
        gender: Set(None),
        email: Set(None),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok(created)
}

/// Get the caller's own profile, creating it on first access
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<ProfileResponse>> {
    let profile = get_or_create(&state, claims.sub).await?;
    Ok(Json(ProfileResponse::from(profile)))
}

/// Fully replace the caller's profile fields
pub async fn update_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<ProfileResponse>> {
    let gender = parse_gender(payload.gender.as_deref())?;

    let profile = get_or_create(&state, claims.sub).await?;

    let mut active: profile::ActiveModel = profile.into();
    active.first_name = Set(payload.first_name.unwrap_or_default());
    active.last_name = Set(payload.last_name.unwrap_or_default());
    active.birth_date = Set(payload.birth_date);
    active.gender = Set(gender);
    active.email = Set(payload.email);
    active.updated_at = Set(chrono::Utc::now().into());

    let updated = active.update(&state.db).await?;
    Ok(Json(ProfileResponse::from(updated)))
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;
    use crate::test_support;

    #[test]
    fn gender_codes_parse() {
        assert_eq!(parse_gender(Some("M")).unwrap(), Some(Gender::Male));
        assert_eq!(parse_gender(Some("F")).unwrap(), Some(Gender::Female));
        assert_eq!(parse_gender(Some("O")).unwrap(), Some(Gender::Other));
        assert_eq!(parse_gender(None).unwrap(), None);
        assert_eq!(parse_gender(Some("")).unwrap(), None);
    }

    #[test]
    fn bad_gender_code_is_a_validation_error() {
        assert!(parse_gender(Some("X")).is_err());
        assert!(parse_gender(Some("male")).is_err());
    }

    fn profile_row(user_id: Uuid) -> profile::Model {
        profile::Model {
            id: Uuid::new_v4(),
            user_id,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            birth_date: None,
            gender: Some(Gender::Female),
            email: None,
            created_at: chrono::Utc::now().into(),
            updated_at: chrono::Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn existing_profile_is_returned_untouched() {
        let user_id = Uuid::new_v4();
        let row = profile_row(user_id);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row.clone()]])
            .into_connection();
        let state = test_support::state(db);

        let got = get_or_create(&state, user_id).await.unwrap();
        assert_eq!(got, row);

        // A single select; a second access must not insert another row.
        let issued = state.db.into_transaction_log();
        assert_eq!(issued.len(), 1);
    }

    #[tokio::test]
    async fn first_access_creates_an_empty_profile() {
        let user_id = Uuid::new_v4();
        let mut created = profile_row(user_id);
        created.first_name = String::new();
        created.last_name = String::new();
        created.gender = None;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<profile::Model>::new()])
            .append_query_results([vec![created]])
            .into_connection();
        let state = test_support::state(db);

        let got = get_or_create(&state, user_id).await.unwrap();
        assert_eq!(got.user_id, user_id);
        assert!(got.first_name.is_empty());
        assert_eq!(got.gender, None);
    }
}
