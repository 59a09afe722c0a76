//! Notification feed routes

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::auth::actor_from_headers;
use crate::notifications::NotificationEntry;
use crate::state::AppState;

use super::RouteError;

const DEFAULT_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedQuery {
    #[serde(default)]
    limit: Option<usize>,
}

async fn list_notifications(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<NotificationEntry>>, RouteError> {
    let _actor = actor_from_headers(&headers)?;
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    Ok(Json(state.notifications().recent(limit).await))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/notifications", get(list_notifications))
}
