//! HS256 bearer tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use models::user::Role;

use super::domain::Claims;
use super::errors::AuthError;
use crate::actor::Actor;

pub fn issue(secret: &str, user_id: Uuid, role: Role, ttl_hours: i64) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.as_str().to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(ttl_hours)).timestamp(),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AuthError::TokenError(e.to_string()))
}

/// Decode and validate signature and expiry.
pub fn verify(secret: &str, token: &str) -> Result<Claims, AuthError> {
    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &Validation::default())
        .map_err(|e| AuthError::TokenError(e.to_string()))?;
    Ok(data.claims)
}

/// Resolve a token straight into the request actor.
pub fn actor_from_token(secret: &str, token: &str) -> Result<Actor, AuthError> {
    let claims = verify(secret, token)?;
    let user_id = Uuid::parse_str(&claims.sub).map_err(|e| AuthError::TokenError(e.to_string()))?;
    let role = claims.role.parse::<Role>().map_err(|e| AuthError::TokenError(e.to_string()))?;
    Ok(Actor::new(user_id, role))
}
