//! Report lifecycle routes

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use pmms_core::report::{Report, ReportKey};

use crate::auth::actor_from_headers;
use crate::state::AppState;

use super::{map_core_error, RouteError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateDraftRequest {
    customer_id: Uuid,
    stack_id: Uuid,
    measured_at: NaiveDate,
    payload: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditDraftRequest {
    payload: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionsQuery {
    customer_id: Uuid,
    stack_id: Uuid,
    measured_at: NaiveDate,
}

async fn create_draft(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateDraftRequest>,
) -> Result<(StatusCode, Json<Report>), RouteError> {
    let actor = actor_from_headers(&headers)?;
    let key = ReportKey {
        customer_id: req.customer_id,
        stack_id: req.stack_id,
        measured_at: req.measured_at,
    };
    let report = state
        .reports()
        .create_draft(key, req.payload, &actor)
        .await
        .map_err(map_core_error)?;
    Ok((StatusCode::CREATED, Json(report)))
}

async fn edit_draft(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(report_id): Path<Uuid>,
    Json(req): Json<EditDraftRequest>,
) -> Result<Json<Report>, RouteError> {
    let actor = actor_from_headers(&headers)?;
    let report = state
        .reports()
        .edit_draft(report_id, req.payload, &actor)
        .await
        .map_err(map_core_error)?;
    Ok(Json(report))
}

async fn get_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(report_id): Path<Uuid>,
) -> Result<Json<Report>, RouteError> {
    let _actor = actor_from_headers(&headers)?;
    let report = state
        .reports()
        .get(report_id)
        .await
        .map_err(map_core_error)?;
    Ok(Json(report))
}

async fn confirm_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(report_id): Path<Uuid>,
) -> Result<Json<Report>, RouteError> {
    let actor = actor_from_headers(&headers)?;
    let report = state
        .reports()
        .confirm(report_id, &actor)
        .await
        .map_err(map_core_error)?;
    Ok(Json(report))
}

async fn share_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(report_id): Path<Uuid>,
) -> Result<Json<Report>, RouteError> {
    let actor = actor_from_headers(&headers)?;
    let report = state
        .reports()
        .share(report_id, &actor)
        .await
        .map_err(map_core_error)?;
    Ok(Json(report))
}

async fn list_versions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<VersionsQuery>,
) -> Result<Json<Vec<Report>>, RouteError> {
    let _actor = actor_from_headers(&headers)?;
    let key = ReportKey {
        customer_id: query.customer_id,
        stack_id: query.stack_id,
        measured_at: query.measured_at,
    };
    let versions = state
        .reports()
        .list_versions(key)
        .await
        .map_err(map_core_error)?;
    Ok(Json(versions))
}

async fn delete_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(report_id): Path<Uuid>,
) -> Result<StatusCode, RouteError> {
    let actor = actor_from_headers(&headers)?;
    state
        .reports()
        .delete(report_id, &actor)
        .await
        .map_err(map_core_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/reports", post(create_draft))
        .route("/api/v1/reports/versions", get(list_versions))
        .route(
            "/api/v1/reports/{report_id}",
            get(get_report).put(edit_draft).delete(delete_report),
        )
        .route("/api/v1/reports/{report_id}/confirm", post(confirm_report))
        .route("/api/v1/reports/{report_id}/share", post(share_report))
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

    use pmms_core::actor::{Actor, ActorRole, Party};

    use crate::auth::issue_actor_jwt;
    use crate::state::AppState;

    async fn build_state() -> (AppState, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let state = AppState::new(temp_dir.path().to_path_buf()).await.unwrap();
        (state, temp_dir)
    }

    fn bearer(actor: &Actor) -> String {
        let (token, _exp) = issue_actor_jwt(actor).unwrap();
        format!("Bearer {}", token)
    }

    fn org_admin() -> Actor {
        Actor::new(uuid::Uuid::new_v4(), Party::Organization, ActorRole::Admin)
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    async fn post_json(
        app: &axum::Router,
        uri: &str,
        actor: &Actor,
        body: Value,
    ) -> axum::response::Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("Authorization", bearer(actor))
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn full_report_lifecycle_over_http() {
        let (state, _temp_dir) = build_state().await;
        let app = super::router().with_state(state);
        let actor = org_admin();
        let customer_id = uuid::Uuid::new_v4();
        let stack_id = uuid::Uuid::new_v4();

        let create_body = json!({
            "customerId": customer_id,
            "stackId": stack_id,
            "measuredAt": "2024-01-01",
            "payload": {"nox": 42.0},
        });

        let response = post_json(&app, "/api/v1/reports", &actor, create_body.clone()).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let draft = json_body(response).await;
        assert_eq!(draft["version"], 1);
        assert_eq!(draft["status"], "draft");
        let report_id = draft["id"].as_str().unwrap().to_string();

        // Second draft for the same key conflicts while the first is live
        let response = post_json(&app, "/api/v1/reports", &actor, create_body.clone()).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = post_json(
            &app,
            &format!("/api/v1/reports/{}/confirm", report_id),
            &actor,
            json!({}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "confirmed");

        let response = post_json(
            &app,
            &format!("/api/v1/reports/{}/share", report_id),
            &actor,
            json!({}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "shared");

        // Sharing twice is a conflict
        let response = post_json(
            &app,
            &format!("/api/v1/reports/{}/share", report_id),
            &actor,
            json!({}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        // Copy-on-edit: a new draft lands at version 2
        let response = post_json(&app, "/api/v1/reports", &actor, create_body).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(json_body(response).await["version"], 2);

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(format!(
                        "/api/v1/reports/versions?customerId={}&stackId={}&measuredAt=2024-01-01",
                        customer_id, stack_id
                    ))
                    .header("Authorization", bearer(&actor))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let versions = json_body(response).await;
        let versions = versions.as_array().unwrap();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0]["version"], 2);
        assert_eq!(versions[0]["status"], "draft");
        assert_eq!(versions[1]["version"], 1);
        assert_eq!(versions[1]["status"], "shared");
    }

    #[tokio::test]
    async fn edit_shared_report_is_rejected_in_place() {
        let (state, _temp_dir) = build_state().await;
        let app = super::router().with_state(state);
        let actor = org_admin();

        let response = post_json(
            &app,
            "/api/v1/reports",
            &actor,
            json!({
                "customerId": uuid::Uuid::new_v4(),
                "stackId": uuid::Uuid::new_v4(),
                "measuredAt": "2024-02-01",
                "payload": {"so2": 1.0},
            }),
        )
        .await;
        let report_id = json_body(response).await["id"]
            .as_str()
            .unwrap()
            .to_string();

        post_json(
            &app,
            &format!("/api/v1/reports/{}/confirm", report_id),
            &actor,
            json!({}),
        )
        .await;
        post_json(
            &app,
            &format!("/api/v1/reports/{}/share", report_id),
            &actor,
            json!({}),
        )
        .await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri(format!("/api/v1/reports/{}", report_id))
                    .header("Authorization", bearer(&actor))
                    .header("Content-Type", "application/json")
                    .body(Body::from(json!({"payload": {"so2": 99.0}}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        // The shared row is untouched
        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(format!("/api/v1/reports/{}", report_id))
                    .header("Authorization", bearer(&actor))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let stored = json_body(response).await;
        assert_eq!(stored["payload"], json!({"so2": 1.0}));
        assert_eq!(stored["status"], "shared");
    }

    #[tokio::test]
    async fn member_cannot_confirm() {
        let (state, _temp_dir) = build_state().await;
        let app = super::router().with_state(state);
        let member = Actor::new(uuid::Uuid::new_v4(), Party::Organization, ActorRole::Member);

        let response = post_json(
            &app,
            "/api/v1/reports",
            &member,
            json!({
                "customerId": uuid::Uuid::new_v4(),
                "stackId": uuid::Uuid::new_v4(),
                "measuredAt": "2024-03-01",
                "payload": {},
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let report_id = json_body(response).await["id"]
            .as_str()
            .unwrap()
            .to_string();

        let response = post_json(
            &app,
            &format!("/api/v1/reports/{}/confirm", report_id),
            &member,
            json!({}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn missing_report_is_not_found() {
        let (state, _temp_dir) = build_state().await;
        let app = super::router().with_state(state);
        let actor = org_admin();

        let response = post_json(
            &app,
            &format!("/api/v1/reports/{}/confirm", uuid::Uuid::new_v4()),
            &actor,
            json!({}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
