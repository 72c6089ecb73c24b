use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use super::job_handler::parse_id;
use super::AppState;
use crate::adapter::middleware::context::CallerContext;

#[derive(Debug, Deserialize)]
pub struct ListMappingsQuery {
    pub collection_target: Option<String>,
}

/// GET /api/v1/mappings
pub async fn list_mappings(
    State(state): State<AppState>,
    CallerContext(ctx): CallerContext,
    Query(query): Query<ListMappingsQuery>,
) -> Response {
    match state
        .list_mappings_uc
        .execute(&ctx, query.collection_target)
        .await
    {
        Ok(templates) => Json(serde_json::json!({ "mappings": templates })).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/v1/mappings/{id}
pub async fn get_mapping(
    State(state): State<AppState>,
    CallerContext(ctx): CallerContext,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state.get_mapping_uc.execute(&ctx, id).await {
        Ok(template) => Json(template).into_response(),
        Err(e) => e.into_response(),
    }
}
