//! Connection lifecycle routes

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use pmms_core::connection::{Connection, ConnectionDecision, ConnectionStatus};

use crate::auth::actor_from_headers;
use crate::state::AppState;

use super::{map_core_error, RouteError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestConnectionRequest {
    customer_id: Uuid,
    organization_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DecisionRequest {
    decision: ConnectionDecision,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContractPeriodRequest {
    contract_start: NaiveDate,
    contract_end: NaiveDate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NicknameRequest {
    nickname: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    #[serde(default)]
    status: Option<ConnectionStatus>,
}

async fn request_connection(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RequestConnectionRequest>,
) -> Result<(StatusCode, Json<Connection>), RouteError> {
    let actor = actor_from_headers(&headers)?;
    let connection = state
        .connections()
        .request(req.customer_id, req.organization_id, &actor)
        .await
        .map_err(map_core_error)?;
    Ok((StatusCode::CREATED, Json(connection)))
}

async fn list_connections(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Connection>>, RouteError> {
    let _actor = actor_from_headers(&headers)?;
    let connections = match query.status {
        Some(status) => state.connections().list_by_status(status).await,
        None => state.connections().list().await,
    }
    .map_err(map_core_error)?;
    Ok(Json(connections))
}

async fn get_connection(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(connection_id): Path<Uuid>,
) -> Result<Json<Connection>, RouteError> {
    let _actor = actor_from_headers(&headers)?;
    let connection = state
        .connections()
        .get(connection_id)
        .await
        .map_err(map_core_error)?;
    Ok(Json(connection))
}

async fn decide_connection(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(connection_id): Path<Uuid>,
    Json(req): Json<DecisionRequest>,
) -> Result<Json<Connection>, RouteError> {
    let actor = actor_from_headers(&headers)?;
    let connection = state
        .connections()
        .decide(connection_id, &actor, req.decision)
        .await
        .map_err(map_core_error)?;
    Ok(Json(connection))
}

async fn set_contract_period(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(connection_id): Path<Uuid>,
    Json(req): Json<ContractPeriodRequest>,
) -> Result<Json<Connection>, RouteError> {
    let actor = actor_from_headers(&headers)?;
    let connection = state
        .connections()
        .set_contract_period(connection_id, &actor, req.contract_start, req.contract_end)
        .await
        .map_err(map_core_error)?;
    Ok(Json(connection))
}

async fn set_nickname(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(connection_id): Path<Uuid>,
    Json(req): Json<NicknameRequest>,
) -> Result<Json<Connection>, RouteError> {
    let actor = actor_from_headers(&headers)?;
    let connection = state
        .connections()
        .set_nickname(connection_id, &actor, req.nickname)
        .await
        .map_err(map_core_error)?;
    Ok(Json(connection))
}

async fn disconnect(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(connection_id): Path<Uuid>,
) -> Result<StatusCode, RouteError> {
    let actor = actor_from_headers(&headers)?;
    state
        .connections()
        .disconnect(connection_id, &actor)
        .await
        .map_err(map_core_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/connections",
            get(list_connections).post(request_connection),
        )
        .route(
            "/api/v1/connections/{connection_id}",
            get(get_connection).delete(disconnect),
        )
        .route(
            "/api/v1/connections/{connection_id}/decision",
            post(decide_connection),
        )
        .route(
            "/api/v1/connections/{connection_id}/contract",
            put(set_contract_period),
        )
        .route(
            "/api/v1/connections/{connection_id}/nickname",
            put(set_nickname),
        )
}
