use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,           // user id
    pub phone_number: String,
    pub is_admin: bool,
    pub exp: i64,            // expiration timestamp
    pub iat: i64,            // issued at timestamp
}

pub fn create_token(
    user_id: Uuid,
    phone_number: &str,
    is_admin: bool,
    secret: &str,
    expiration_hours: i64,
) -> AppResult<String> {
    let now = Utc::now();
    let exp = now + Duration::hours(expiration_hours);

    let claims = Claims {
        sub: user_id,
        phone_number: phone_number.to_string(),
        is_admin,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
}

pub fn verify_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_claims() {
        let id = Uuid::new_v4();
        let token = create_token(id, "+15551234567", true, "test-secret", 1).unwrap();
        let claims = verify_token(&token, "test-secret").unwrap();

        assert_eq!(claims.sub, id);
        assert_eq!(claims.phone_number, "+15551234567");
        assert!(claims.is_admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = create_token(Uuid::new_v4(), "+15551234567", false, "secret-a", 1).unwrap();
        assert!(verify_token(&token, "secret-b").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = create_token(Uuid::new_v4(), "+15551234567", false, "test-secret", -2).unwrap();
        assert!(verify_token(&token, "test-secret").is_err());
    }
}
