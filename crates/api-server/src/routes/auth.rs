//! Actor token exchange
//!
//! The upstream identity provider authenticates users; this endpoint
//! exchanges a resolved actor context for the signed bearer token the rest
//! of the API expects. It is meant to sit behind the provider, not to be
//! exposed directly.

use std::str::FromStr;

use axum::{http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pmms_core::actor::{Actor, ActorRole, Party};

use crate::auth::issue_actor_jwt;
use crate::state::AppState;

use super::{route_error, RouteError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest {
    user_id: Uuid,
    party: String,
    role: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    token: String,
    expires_at: usize,
}

async fn exchange_token(
    Json(req): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, RouteError> {
    let party = Party::from_str(&req.party)
        .map_err(|err| route_error(StatusCode::UNPROCESSABLE_ENTITY, err.to_string()))?;
    let role = ActorRole::from_str(&req.role)
        .map_err(|err| route_error(StatusCode::UNPROCESSABLE_ENTITY, err.to_string()))?;
    let actor = Actor::new(req.user_id, party, role);

    let (token, expires_at) = issue_actor_jwt(&actor)
        .map_err(|err| route_error(StatusCode::INTERNAL_SERVER_ERROR, err))?;
    Ok(Json(TokenResponse { token, expires_at }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/auth/token", post(exchange_token))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::auth::verify_actor_jwt;
    use crate::state::AppState;

    async fn build_state() -> (AppState, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let state = AppState::new(temp_dir.path().to_path_buf()).await.unwrap();
        (state, temp_dir)
    }

    #[tokio::test]
    async fn exchange_yields_verifiable_token() {
        let (state, _temp_dir) = build_state().await;
        let app = super::router().with_state(state);
        let user_id = uuid::Uuid::new_v4();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/auth/token")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        json!({
                            "userId": user_id,
                            "party": "organization",
                            "role": "admin",
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: Value = serde_json::from_slice(&body).unwrap();
        let claims = verify_actor_jwt(payload["token"].as_str().unwrap()).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.role, "admin");
    }

    #[tokio::test]
    async fn unknown_role_is_rejected() {
        let (state, _temp_dir) = build_state().await;
        let app = super::router().with_state(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/auth/token")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        json!({
                            "userId": uuid::Uuid::new_v4(),
                            "party": "organization",
                            "role": "superuser",
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
