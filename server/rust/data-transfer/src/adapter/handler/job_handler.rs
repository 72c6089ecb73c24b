use std::str::FromStr;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::error::validation_response;
use super::AppState;
use crate::adapter::middleware::context::CallerContext;
use crate::domain::entity::JobItem;
use crate::domain::repository::JobItemFilter;
use crate::domain::value_object::{
    FieldMapping, FileSource, JobStatus, JobType, MappingSelection, SaveMappingAction,
};
use crate::usecase::list_jobs::{ListJobsInput, DEFAULT_PAGE_SIZE};
use crate::usecase::submit_job::SubmitJobInput;

/// ジョブ投入リクエストのボディを SubmitJobInput に変換する。
/// 型の合わないフィールドも未入力・不正なフィールドと合わせて一度に報告する。
/// null は未指定と同じ扱いになる。
fn submit_input_from_json(body: Value) -> Result<SubmitJobInput, Vec<String>> {
    let Value::Object(mut obj) = body else {
        return Err(vec!["body".to_string()]);
    };
    let mut invalid = Vec::new();

    let collection_target: String = take_field(&mut obj, "collection_target", &mut invalid);
    let file_source: Option<FileSource> = take_field(&mut obj, "file_source", &mut invalid);
    let has_header: bool = take_field(&mut obj, "has_header", &mut invalid);
    let raw_job_type: String = take_field(&mut obj, "job_type", &mut invalid);
    let job_sub_type: String = take_field(&mut obj, "job_sub_type", &mut invalid);
    let mapping: FieldMapping = take_field(&mut obj, "mapping", &mut invalid);
    // 保存済みマッピングの ID、または未選択を表す "create"
    let mapping_id: Option<String> = take_field(&mut obj, "mapping_id", &mut invalid);
    let name: String = take_field(&mut obj, "name", &mut invalid);
    let new_mapping_name: Option<String> = take_field(&mut obj, "new_mapping_name", &mut invalid);
    let save_mapping_action: Option<String> =
        take_field(&mut obj, "save_mapping_action", &mut invalid);
    let should_save_to_new_mapping: bool =
        take_field(&mut obj, "should_save_to_new_mapping", &mut invalid);

    let job_type = JobType::from_str(&raw_job_type).ok();
    if job_type.is_none() {
        invalid.push("job_type".to_string());
    }
    let mapping_selection = MappingSelection::parse(mapping_id.as_deref()).ok();
    if mapping_selection.is_none() {
        invalid.push("mapping_id".to_string());
    }
    if file_source.is_none() {
        invalid.push("file_source".to_string());
    }

    let input = SubmitJobInput {
        collection_target,
        // 形式エラー時は未入力扱いの値で残りのフィールドを検証する
        file_source: file_source.unwrap_or(FileSource::Upload {
            file_id: String::new(),
            file_name: String::new(),
        }),
        has_header,
        job_type: job_type.unwrap_or(JobType::Import),
        job_sub_type,
        mapping,
        mapping_selection: mapping_selection.unwrap_or(MappingSelection::NoneSelected),
        name,
        new_mapping_name,
        save_mapping_action: SaveMappingAction::from_wire(save_mapping_action.as_deref()),
        should_save_to_new_mapping,
    };
    if invalid.is_empty() {
        return Ok(input);
    }

    invalid.extend(input.invalid_fields());
    invalid.sort();
    invalid.dedup();
    Err(invalid)
}

fn take_field<T>(obj: &mut Map<String, Value>, name: &str, invalid: &mut Vec<String>) -> T
where
    T: DeserializeOwned + Default,
{
    match obj.remove(name) {
        None | Some(Value::Null) => T::default(),
        Some(value) => serde_json::from_value(value).unwrap_or_else(|_| {
            invalid.push(name.to_string());
            T::default()
        }),
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitJobResponse {
    pub job_item_id: Uuid,
    pub mapping_template_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    pub job_type: Option<String>,
    pub status: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ListJobsResponse {
    pub jobs: Vec<JobItem>,
    pub pagination: PaginationResponse,
}

#[derive(Debug, Serialize)]
pub struct PaginationResponse {
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
    pub has_next: bool,
}

pub(super) fn parse_id(raw: &str) -> Result<Uuid, Response> {
    Uuid::parse_str(raw).map_err(|_| validation_response(vec!["id".to_string()]))
}

/// POST /api/v1/jobs
pub async fn submit_job(
    State(state): State<AppState>,
    CallerContext(ctx): CallerContext,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Ok(Json(body)) = payload else {
        return validation_response(vec!["body".to_string()]);
    };
    let input = match submit_input_from_json(body) {
        Ok(input) => input,
        Err(fields) => return validation_response(fields),
    };
    let job_type = input.job_type;

    match state.submit_job_uc.execute(&ctx, input).await {
        Ok(output) => {
            state
                .metrics
                .jobs_submitted_total
                .with_label_values(&[job_type.as_str()])
                .inc();
            if let Some(action) = output.mapping_write {
                state
                    .metrics
                    .mapping_writes_total
                    .with_label_values(&[action])
                    .inc();
            }
            let body = SubmitJobResponse {
                job_item_id: output.job_item_id,
                mapping_template_id: output.mapping_template_id,
            };
            (StatusCode::CREATED, Json(body)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// GET /api/v1/jobs
pub async fn list_jobs(
    State(state): State<AppState>,
    CallerContext(ctx): CallerContext,
    Query(query): Query<ListJobsQuery>,
) -> Response {
    let mut invalid = Vec::new();
    let job_type = match query.job_type.as_deref().map(JobType::from_str) {
        Some(Ok(t)) => Some(t),
        Some(Err(_)) => {
            invalid.push("job_type".to_string());
            None
        }
        None => None,
    };
    let status = match query.status.as_deref().map(JobStatus::from_str) {
        Some(Ok(s)) => Some(s),
        Some(Err(_)) => {
            invalid.push("status".to_string());
            None
        }
        None => None,
    };
    if !invalid.is_empty() {
        return validation_response(invalid);
    }

    let input = ListJobsInput {
        filter: JobItemFilter { job_type, status },
        page: query.page.unwrap_or(1),
        page_size: query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
    };
    match state.list_jobs_uc.execute(&ctx, &input).await {
        Ok(output) => Json(ListJobsResponse {
            jobs: output.jobs,
            pagination: PaginationResponse {
                total_count: output.total_count,
                page: output.page,
                page_size: output.page_size,
                has_next: output.has_next,
            },
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/v1/jobs/{id}
pub async fn get_job(
    State(state): State<AppState>,
    CallerContext(ctx): CallerContext,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state.get_job_uc.execute(&ctx, id).await {
        Ok(job) => Json(job).into_response(),
        Err(e) => e.into_response(),
    }
}

/// DELETE /api/v1/jobs/{id}
pub async fn remove_job(
    State(state): State<AppState>,
    CallerContext(ctx): CallerContext,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state.remove_job_uc.execute(&ctx, id).await {
        Ok(()) => {
            state.metrics.jobs_removed_total.inc();
            Json(serde_json::json!({ "success": true })).into_response()
        }
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_mapping_id_is_none_selected() {
        let input = submit_input_from_json(serde_json::json!({
            "collection_target": "products",
            "file_source": {"type": "upload", "file_id": "file_001", "file_name": "p.csv"},
            "job_type": "import",
            "job_sub_type": "upsert",
            "mapping": {"sku": "SKU"},
            "mapping_id": "create",
            "name": "daily products"
        }))
        .unwrap();
        assert_eq!(input.mapping_selection, MappingSelection::NoneSelected);
        assert_eq!(input.save_mapping_action, SaveMappingAction::None);
        assert!(!input.should_save_to_new_mapping);
    }

    #[test]
    fn test_unknown_save_action_and_nulls_mean_no_save() {
        let id = Uuid::new_v4();
        let input = submit_input_from_json(serde_json::json!({
            "collection_target": "products",
            "file_source": {"type": "sftp", "path": "/in/p.csv"},
            "has_header": null,
            "job_type": "import",
            "job_sub_type": "upsert",
            "mapping": {"sku": "SKU"},
            "mapping_id": id.to_string(),
            "name": "daily products",
            "new_mapping_name": null,
            "save_mapping_action": "replace",
            "should_save_to_new_mapping": null
        }))
        .unwrap();
        assert_eq!(input.mapping_selection, MappingSelection::Existing(id));
        assert_eq!(input.save_mapping_action, SaveMappingAction::None);
        assert!(!input.has_header);
    }

    #[test]
    fn test_shape_errors_are_collected() {
        let fields = submit_input_from_json(serde_json::json!({
            "job_type": "transform",
            "mapping_id": "m1"
        }))
        .unwrap_err();
        assert_eq!(
            fields,
            vec![
                "collection_target",
                "file_source",
                "job_sub_type",
                "job_type",
                "mapping",
                "mapping_id",
                "name"
            ]
        );
    }

    #[test]
    fn test_mistyped_fields_are_reported_with_other_errors() {
        let fields = submit_input_from_json(serde_json::json!({
            "collection_target": "products",
            "file_source": {"type": "upload", "file_id": "file_001", "file_name": "p.csv"},
            "has_header": "yes",
            "job_type": "import",
            "job_sub_type": "upsert",
            "mapping": {"sku": 1},
            "mapping_id": "create",
            "name": ""
        }))
        .unwrap_err();
        assert_eq!(fields, vec!["has_header", "mapping", "name"]);
    }

    #[test]
    fn test_non_object_body_is_rejected() {
        let fields = submit_input_from_json(serde_json::json!([1, 2])).unwrap_err();
        assert_eq!(fields, vec!["body"]);
    }

    #[test]
    fn test_parse_id() {
        assert!(parse_id("not-a-uuid").is_err());
        assert!(parse_id(&Uuid::new_v4().to_string()).is_ok());
    }
}
