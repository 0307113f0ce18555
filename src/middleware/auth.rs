use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::utils::jwt::verify_token;

/// Extract and validate JWT token from Authorization header. A missing or
/// non-bearer header is a 401, not an extractor rejection.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let TypedHeader(auth) = bearer
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    let claims = verify_token(auth.token(), &state.config.jwt_secret)?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{StatusCode, header},
        middleware::from_fn_with_state,
        routing::get,
    };
    use sea_orm::{DatabaseBackend, MockDatabase};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::test_support;
    use crate::utils::jwt::create_token;

    fn protected_app() -> (Router, String) {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = test_support::state(db);
        let secret = state.config.jwt_secret.clone();

        let app = Router::new()
            .route("/whoami", get(|| async { "ok" }))
            .layer(from_fn_with_state(state, auth_middleware));

        (app, secret)
    }

    #[tokio::test]
    async fn missing_bearer_token_is_unauthorized() {
        let (app, _) = protected_app();

        let response = app
            .oneshot(Request::builder().uri("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized() {
        let (app, _) = protected_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_bearer_token_passes_through() {
        let (app, secret) = protected_app();
        let token = create_token(Uuid::new_v4(), "+15551230000", false, &secret, 1).unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
