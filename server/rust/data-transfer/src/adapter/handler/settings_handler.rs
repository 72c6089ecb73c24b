use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::error::validation_response;
use super::AppState;
use crate::adapter::middleware::context::CallerContext;
use crate::domain::entity::{ObjectStorageSettings, SftpSettings, StorageSettings};
use crate::usecase::test_storage_connection::ConnectionTestTarget;

/// リクエストボディを型付き設定に変換する。形式エラーは 400。
fn parse_body<S: StorageSettings>(body: serde_json::Value) -> Result<S, Response> {
    S::from_blob(body).map_err(|e| {
        tracing::debug!(error = %e, settings = S::KEY, "malformed settings body");
        validation_response(vec![S::KEY.to_string()])
    })
}

/// GET /api/v1/settings/object-storage
pub async fn get_object_storage(
    State(state): State<AppState>,
    CallerContext(ctx): CallerContext,
) -> Response {
    match state.get_object_storage_uc.execute(&ctx).await {
        Ok(settings) => Json(settings.to_masked_json()).into_response(),
        Err(e) => e.into_response(),
    }
}

/// PUT /api/v1/settings/object-storage
pub async fn update_object_storage(
    State(state): State<AppState>,
    CallerContext(ctx): CallerContext,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let settings = match parse_body::<ObjectStorageSettings>(body) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match state.update_object_storage_uc.execute(&ctx, settings).await {
        Ok(saved) => Json(saved.to_masked_json()).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /api/v1/settings/object-storage/test
pub async fn test_object_storage(
    State(state): State<AppState>,
    CallerContext(ctx): CallerContext,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let settings = match parse_body::<ObjectStorageSettings>(body) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match state
        .test_connection_uc
        .execute(&ctx, ConnectionTestTarget::ObjectStorage(settings))
        .await
    {
        Ok(output) => {
            Json(serde_json::json!({ "ok": output.ok, "message": output.message })).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// GET /api/v1/settings/sftp
pub async fn get_sftp(State(state): State<AppState>, CallerContext(ctx): CallerContext) -> Response {
    match state.get_sftp_uc.execute(&ctx).await {
        Ok(settings) => Json(settings.to_masked_json()).into_response(),
        Err(e) => e.into_response(),
    }
}

/// PUT /api/v1/settings/sftp
pub async fn update_sftp(
    State(state): State<AppState>,
    CallerContext(ctx): CallerContext,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let settings = match parse_body::<SftpSettings>(body) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match state.update_sftp_uc.execute(&ctx, settings).await {
        Ok(saved) => Json(saved.to_masked_json()).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /api/v1/settings/sftp/test
pub async fn test_sftp(
    State(state): State<AppState>,
    CallerContext(ctx): CallerContext,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let settings = match parse_body::<SftpSettings>(body) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match state
        .test_connection_uc
        .execute(&ctx, ConnectionTestTarget::Sftp(settings))
        .await
    {
        Ok(output) => {
            Json(serde_json::json!({ "ok": output.ok, "message": output.message })).into_response()
        }
        Err(e) => e.into_response(),
    }
}
