use chrono::{Utc, Duration};
use jsonwebtoken::{encode, decode, Header, Validation, EncodingKey, DecodingKey, Algorithm};
use serde::{Serialize, Deserialize};
use crate::error::AppError;
use crate::models::user::{Role, User};

pub const SESSION_HOURS: i64 = 8;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub branch: String,
    pub username: String,
    pub exp: usize,
    pub iat: usize,
}

pub fn sign_token(user: &User, secret: &str) -> Result<String, AppError> {
    let now = Utc::now();
    let exp = now + Duration::hours(SESSION_HOURS);
    let claims = Claims {
        sub: user.id.clone(),
        role: user.role,
        branch: user.branch.clone(),
        username: user.username.clone(),
        iat: now.timestamp() as usize,
        exp: exp.timestamp() as usize,
    };
    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AppError::internal(format!("Token signing failed: {e}")))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256)
    )
    .map(|d| d.claims)
    .map_err(|e| AppError::unauthorized(format!("Invalid or expired token: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::user;

    #[test]
    fn token_round_trip_keeps_identity() {
        let u = user("u9", Role::Manager, "Baby Boss miền Bắc");
        let token = sign_token(&u, "test-secret").unwrap();
        let claims = verify_token(&token, "test-secret").unwrap();
        assert_eq!(claims.sub, "u9");
        assert_eq!(claims.role, Role::Manager);
        assert_eq!(claims.branch, "Baby Boss miền Bắc");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign_token(&user("u1", Role::Staff, "A"), "one").unwrap();
        assert!(matches!(verify_token(&token, "two"), Err(AppError::Unauthorized(_))));
    }
}
