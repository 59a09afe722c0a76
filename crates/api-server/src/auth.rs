//! Actor bearer tokens
//!
//! The identity provider lives outside this service; requests carry a signed
//! actor context (subject, party, role) which is verified here and handed to
//! the core as an explicit [`Actor`].

use std::str::FromStr;

use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pmms_core::actor::{Actor, ActorRole, Party};

use crate::routes::{unauthorized, RouteError};

const DEFAULT_TOKEN_TTL_SECONDS: i64 = 60 * 60 * 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorClaims {
    pub sub: String,
    pub party: String,
    pub role: String,
    pub exp: usize,
}

fn jwt_secret() -> String {
    std::env::var("PMMS_JWT_SECRET").unwrap_or_else(|_| "dev-jwt-secret-change-me".to_string())
}

fn token_ttl_seconds() -> i64 {
    std::env::var("PMMS_TOKEN_TTL_SECONDS")
        .ok()
        .and_then(|raw| raw.parse::<i64>().ok())
        .filter(|ttl| *ttl > 0)
        .unwrap_or(DEFAULT_TOKEN_TTL_SECONDS)
}

pub fn issue_actor_jwt(actor: &Actor) -> Result<(String, usize), String> {
    let exp = (Utc::now() + Duration::seconds(token_ttl_seconds())).timestamp() as usize;
    let claims = ActorClaims {
        sub: actor.user_id.to_string(),
        party: actor.party.as_str().to_string(),
        role: actor.role.as_str().to_string(),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret().as_bytes()),
    )
    .map(|token| (token, exp))
    .map_err(|err| format!("Failed to sign actor JWT: {}", err))
}

pub fn verify_actor_jwt(token: &str) -> Result<ActorClaims, String> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    decode::<ActorClaims>(
        token,
        &DecodingKey::from_secret(jwt_secret().as_bytes()),
        &validation,
    )
    .map(|decoded| decoded.claims)
    .map_err(|err| format!("Invalid actor JWT: {}", err))
}

/// Extract and verify the acting user from the Authorization header
pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, RouteError> {
    let header = headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| unauthorized("Expected Bearer token"))?;

    let claims = verify_actor_jwt(token).map_err(unauthorized)?;
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| unauthorized("Invalid token subject"))?;
    let party =
        Party::from_str(&claims.party).map_err(|_| unauthorized("Invalid token party"))?;
    let role = ActorRole::from_str(&claims.role).map_err(|_| unauthorized("Invalid token role"))?;

    Ok(Actor::new(user_id, party, role))
}
