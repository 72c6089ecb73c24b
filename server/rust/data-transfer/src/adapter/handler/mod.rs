pub mod error;
pub mod health;
pub mod job_handler;
pub mod mapping_handler;
pub mod settings_handler;

use std::sync::Arc;

use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::adapter::middleware::auth::{auth_middleware, DataTransferAuthState};
use crate::adapter::middleware::http_metrics::track_http_metrics;
use crate::adapter::middleware::rbac::require_permission;
use crate::domain::entity::{ObjectStorageSettings, SftpSettings};
use crate::domain::repository::{
    ConnectionTester, CredentialStore, JobItemRepository, MappingTemplateRepository,
};
use crate::domain::service::access_policy::{ACTION_ADMIN, ACTION_READ, ACTION_WRITE};
use crate::infrastructure::metrics::Metrics;
use crate::usecase::{
    GetJobUseCase, GetMappingTemplateUseCase, GetStorageSettingsUseCase, ListJobsUseCase,
    ListMappingTemplatesUseCase, RemoveJobUseCase, SubmitJobUseCase,
    TestStorageConnectionUseCase, UpdateStorageSettingsUseCase,
};

/// AppState はアプリケーション全体の共有状態を表す。
#[derive(Clone)]
pub struct AppState {
    pub submit_job_uc: Arc<SubmitJobUseCase>,
    pub remove_job_uc: Arc<RemoveJobUseCase>,
    pub get_job_uc: Arc<GetJobUseCase>,
    pub list_jobs_uc: Arc<ListJobsUseCase>,
    pub list_mappings_uc: Arc<ListMappingTemplatesUseCase>,
    pub get_mapping_uc: Arc<GetMappingTemplateUseCase>,
    pub get_object_storage_uc: Arc<GetStorageSettingsUseCase<ObjectStorageSettings>>,
    pub update_object_storage_uc: Arc<UpdateStorageSettingsUseCase<ObjectStorageSettings>>,
    pub get_sftp_uc: Arc<GetStorageSettingsUseCase<SftpSettings>>,
    pub update_sftp_uc: Arc<UpdateStorageSettingsUseCase<SftpSettings>>,
    pub test_connection_uc: Arc<TestStorageConnectionUseCase>,
    pub metrics: Arc<Metrics>,
    pub auth_state: Option<DataTransferAuthState>,
}

impl AppState {
    pub fn new(
        job_repo: Arc<dyn JobItemRepository>,
        mapping_repo: Arc<dyn MappingTemplateRepository>,
        credential_store: Arc<dyn CredentialStore>,
        connection_tester: Arc<dyn ConnectionTester>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            submit_job_uc: Arc::new(SubmitJobUseCase::new(
                job_repo.clone(),
                mapping_repo.clone(),
            )),
            remove_job_uc: Arc::new(RemoveJobUseCase::new(job_repo.clone())),
            get_job_uc: Arc::new(GetJobUseCase::new(job_repo.clone())),
            list_jobs_uc: Arc::new(ListJobsUseCase::new(job_repo)),
            list_mappings_uc: Arc::new(ListMappingTemplatesUseCase::new(mapping_repo.clone())),
            get_mapping_uc: Arc::new(GetMappingTemplateUseCase::new(mapping_repo)),
            get_object_storage_uc: Arc::new(GetStorageSettingsUseCase::new(
                credential_store.clone(),
            )),
            update_object_storage_uc: Arc::new(UpdateStorageSettingsUseCase::new(
                credential_store.clone(),
            )),
            get_sftp_uc: Arc::new(GetStorageSettingsUseCase::new(credential_store.clone())),
            update_sftp_uc: Arc::new(UpdateStorageSettingsUseCase::new(
                credential_store.clone(),
            )),
            test_connection_uc: Arc::new(TestStorageConnectionUseCase::new(
                connection_tester,
                credential_store,
            )),
            metrics,
            auth_state: None,
        }
    }

    pub fn with_auth(mut self, auth_state: DataTransferAuthState) -> Self {
        self.auth_state = Some(auth_state);
        self
    }
}

/// REST API ルーターを構築する。
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/metrics", get(health::metrics));

    let api_routes = if let Some(ref auth_state) = state.auth_state {
        // 参照系 (sys_auditor 以上)
        let read_routes = Router::new()
            .route("/api/v1/jobs", get(job_handler::list_jobs))
            .route("/api/v1/jobs/{id}", get(job_handler::get_job))
            .route("/api/v1/mappings", get(mapping_handler::list_mappings))
            .route("/api/v1/mappings/{id}", get(mapping_handler::get_mapping))
            .route_layer(from_fn(require_permission(ACTION_READ)));

        // 更新系 (sys_operator 以上)
        let write_routes = Router::new()
            .route("/api/v1/jobs", post(job_handler::submit_job))
            .route("/api/v1/jobs/{id}", delete(job_handler::remove_job))
            .route_layer(from_fn(require_permission(ACTION_WRITE)));

        // ストレージ認証情報 (sys_admin のみ)
        let admin_routes =
            settings_routes().route_layer(from_fn(require_permission(ACTION_ADMIN)));

        read_routes
            .merge(write_routes)
            .merge(admin_routes)
            .layer(from_fn_with_state(auth_state.clone(), auth_middleware))
    } else {
        // 認証なし（開発環境用）。コンテキストはゲートウェイヘッダから組み立てる
        Router::new()
            .route(
                "/api/v1/jobs",
                get(job_handler::list_jobs).post(job_handler::submit_job),
            )
            .route(
                "/api/v1/jobs/{id}",
                get(job_handler::get_job).delete(job_handler::remove_job),
            )
            .route("/api/v1/mappings", get(mapping_handler::list_mappings))
            .route("/api/v1/mappings/{id}", get(mapping_handler::get_mapping))
            .merge(settings_routes())
    };

    public_routes
        .merge(api_routes)
        .layer(from_fn_with_state(state.metrics.clone(), track_http_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn settings_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/settings/object-storage",
            get(settings_handler::get_object_storage).put(settings_handler::update_object_storage),
        )
        .route(
            "/api/v1/settings/object-storage/test",
            post(settings_handler::test_object_storage),
        )
        .route(
            "/api/v1/settings/sftp",
            get(settings_handler::get_sftp).put(settings_handler::update_sftp),
        )
        .route("/api/v1/settings/sftp/test", post(settings_handler::test_sftp))
}

/// ErrorResponse は統一エラーレスポンス。
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, serde::Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub request_id: String,
    pub details: Vec<ErrorDetail>,
}

#[derive(Debug, serde::Serialize)]
pub struct ErrorDetail {
    pub field: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: &str, message: &str) -> Self {
        Self::with_details(code, message, vec![])
    }

    pub fn with_details(code: &str, message: &str, details: Vec<ErrorDetail>) -> Self {
        Self {
            error: ErrorBody {
                code: code.to_string(),
                message: message.to_string(),
                request_id: uuid::Uuid::new_v4().to_string(),
                details,
            },
        }
    }
}
