use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::{ErrorDetail, ErrorResponse};
use crate::domain::value_object::MissingContext;
use crate::usecase::get_job::GetJobError;
use crate::usecase::get_mapping_template::GetMappingTemplateError;
use crate::usecase::get_storage_settings::GetStorageSettingsError;
use crate::usecase::list_jobs::ListJobsError;
use crate::usecase::list_mapping_templates::ListMappingTemplatesError;
use crate::usecase::remove_job::RemoveJobError;
use crate::usecase::submit_job::SubmitJobError;
use crate::usecase::test_storage_connection::TestStorageConnectionError;
use crate::usecase::update_storage_settings::UpdateStorageSettingsError;

const CODE_VALIDATION_FAILED: &str = "SYS_DTX_VALIDATION_FAILED";
const CODE_CONTEXT_UNAVAILABLE: &str = "SYS_DTX_CONTEXT_UNAVAILABLE";
const CODE_PERMISSION_DENIED: &str = "SYS_DTX_PERMISSION_DENIED";
const CODE_JOB_NOT_FOUND: &str = "SYS_DTX_JOB_NOT_FOUND";
const CODE_MAPPING_NOT_FOUND: &str = "SYS_DTX_MAPPING_NOT_FOUND";
const CODE_SETTINGS_NOT_CONFIGURED: &str = "SYS_DTX_SETTINGS_NOT_CONFIGURED";
const CODE_JOB_IN_PROGRESS: &str = "SYS_DTX_JOB_IN_PROGRESS";
const CODE_UPSTREAM_ERROR: &str = "SYS_DTX_UPSTREAM_ERROR";

fn respond(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(ErrorResponse::new(code, message))).into_response()
}

/// 不正なフィールドを details に列挙した 400 レスポンスを返す。
pub fn validation_response(fields: Vec<String>) -> Response {
    let details = fields
        .into_iter()
        .map(|field| ErrorDetail {
            message: format!("{} is missing or invalid", field),
            field,
        })
        .collect();
    let err = ErrorResponse::with_details(CODE_VALIDATION_FAILED, "入力値が不正です", details);
    (StatusCode::BAD_REQUEST, Json(err)).into_response()
}

fn context_unavailable(missing: MissingContext) -> Response {
    respond(StatusCode::UNAUTHORIZED, CODE_CONTEXT_UNAVAILABLE, &missing.to_string())
}

fn upstream(status: StatusCode, err: anyhow::Error) -> Response {
    tracing::error!(error = %err, "upstream call failed");
    respond(status, CODE_UPSTREAM_ERROR, &err.to_string())
}

/// SubmitJobError を HTTP レスポンスに変換する。
impl IntoResponse for SubmitJobError {
    fn into_response(self) -> Response {
        match self {
            SubmitJobError::Validation(fields) => validation_response(fields),
            SubmitJobError::ContextUnavailable(missing) => context_unavailable(missing),
            e @ SubmitJobError::MappingNotFound(_) => {
                respond(StatusCode::NOT_FOUND, CODE_MAPPING_NOT_FOUND, &e.to_string())
            }
            SubmitJobError::Upstream(e) => upstream(StatusCode::INTERNAL_SERVER_ERROR, e),
        }
    }
}

/// RemoveJobError を HTTP レスポンスに変換する。
impl IntoResponse for RemoveJobError {
    fn into_response(self) -> Response {
        match self {
            e @ RemoveJobError::NotFound(_) => {
                respond(StatusCode::NOT_FOUND, CODE_JOB_NOT_FOUND, &e.to_string())
            }
            e @ RemoveJobError::Conflict(_) => {
                respond(StatusCode::CONFLICT, CODE_JOB_IN_PROGRESS, &e.to_string())
            }
            RemoveJobError::ContextUnavailable(missing) => context_unavailable(missing),
            RemoveJobError::Upstream(e) => upstream(StatusCode::INTERNAL_SERVER_ERROR, e),
        }
    }
}

impl IntoResponse for GetJobError {
    fn into_response(self) -> Response {
        match self {
            e @ GetJobError::NotFound(_) => {
                respond(StatusCode::NOT_FOUND, CODE_JOB_NOT_FOUND, &e.to_string())
            }
            GetJobError::ContextUnavailable(missing) => context_unavailable(missing),
            GetJobError::Upstream(e) => upstream(StatusCode::INTERNAL_SERVER_ERROR, e),
        }
    }
}

impl IntoResponse for ListJobsError {
    fn into_response(self) -> Response {
        match self {
            ListJobsError::Validation(fields) => validation_response(fields),
            ListJobsError::ContextUnavailable(missing) => context_unavailable(missing),
            ListJobsError::Upstream(e) => upstream(StatusCode::INTERNAL_SERVER_ERROR, e),
        }
    }
}

impl IntoResponse for ListMappingTemplatesError {
    fn into_response(self) -> Response {
        match self {
            ListMappingTemplatesError::ContextUnavailable(missing) => context_unavailable(missing),
            ListMappingTemplatesError::Upstream(e) => {
                upstream(StatusCode::INTERNAL_SERVER_ERROR, e)
            }
        }
    }
}

impl IntoResponse for GetMappingTemplateError {
    fn into_response(self) -> Response {
        match self {
            e @ GetMappingTemplateError::NotFound(_) => {
                respond(StatusCode::NOT_FOUND, CODE_MAPPING_NOT_FOUND, &e.to_string())
            }
            GetMappingTemplateError::ContextUnavailable(missing) => context_unavailable(missing),
            GetMappingTemplateError::Upstream(e) => {
                upstream(StatusCode::INTERNAL_SERVER_ERROR, e)
            }
        }
    }
}

impl IntoResponse for GetStorageSettingsError {
    fn into_response(self) -> Response {
        match self {
            e @ GetStorageSettingsError::AccessDenied(_) => {
                respond(StatusCode::FORBIDDEN, CODE_PERMISSION_DENIED, &e.to_string())
            }
            e @ GetStorageSettingsError::NotConfigured(_) => respond(
                StatusCode::NOT_FOUND,
                CODE_SETTINGS_NOT_CONFIGURED,
                &e.to_string(),
            ),
            GetStorageSettingsError::ContextUnavailable(missing) => context_unavailable(missing),
            GetStorageSettingsError::Upstream(e) => upstream(StatusCode::INTERNAL_SERVER_ERROR, e),
        }
    }
}

impl IntoResponse for UpdateStorageSettingsError {
    fn into_response(self) -> Response {
        match self {
            e @ UpdateStorageSettingsError::AccessDenied(_) => {
                respond(StatusCode::FORBIDDEN, CODE_PERMISSION_DENIED, &e.to_string())
            }
            UpdateStorageSettingsError::Validation(fields) => validation_response(fields),
            UpdateStorageSettingsError::ContextUnavailable(missing) => {
                context_unavailable(missing)
            }
            UpdateStorageSettingsError::Upstream(e) => {
                upstream(StatusCode::INTERNAL_SERVER_ERROR, e)
            }
        }
    }
}

/// 疎通確認の失敗は外部ストレージ側の問題として 502 を返す。
impl IntoResponse for TestStorageConnectionError {
    fn into_response(self) -> Response {
        match self {
            e @ TestStorageConnectionError::AccessDenied(_) => {
                respond(StatusCode::FORBIDDEN, CODE_PERMISSION_DENIED, &e.to_string())
            }
            TestStorageConnectionError::Validation(fields) => validation_response(fields),
            TestStorageConnectionError::ContextUnavailable(missing) => {
                context_unavailable(missing)
            }
            TestStorageConnectionError::Upstream(e) => upstream(StatusCode::BAD_GATEWAY, e),
        }
    }
}

/// AuthRejection は認証・認可ミドルウェアのエラーを表す。
#[derive(Debug)]
pub enum AuthRejection {
    MissingToken,
    InvalidToken,
    MissingClaims,
    PermissionDenied(&'static str),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::MissingToken => respond(
                StatusCode::UNAUTHORIZED,
                "SYS_AUTH_MISSING_TOKEN",
                "Missing bearer token",
            ),
            AuthRejection::InvalidToken => respond(
                StatusCode::UNAUTHORIZED,
                "SYS_AUTH_TOKEN_INVALID",
                "Invalid or expired token",
            ),
            AuthRejection::MissingClaims => respond(
                StatusCode::UNAUTHORIZED,
                "SYS_AUTH_MISSING_CLAIMS",
                "Missing authentication claims",
            ),
            AuthRejection::PermissionDenied(action) => respond(
                StatusCode::FORBIDDEN,
                CODE_PERMISSION_DENIED,
                &format!("Insufficient permissions for action: {}", action),
            ),
        }
    }
}
