use std::sync::Arc;

use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::domain::entity::{JobItem, MappingTemplate, NewJobItem};
use crate::domain::repository::{JobItemRepository, MappingTemplateRepository};
use crate::domain::service::{decide, MappingPersistence};
use crate::domain::value_object::{
    FieldMapping, FileSource, JobType, MappingSelection, MissingContext, RequestContext,
    SaveMappingAction,
};

/// SubmitJobInput はジョブ投入リクエストを表す。
/// mapping_selection はアダプタ層で mapping_id から解釈済みの値。
#[derive(Debug, Clone, Validate)]
pub struct SubmitJobInput {
    #[validate(length(max = 255), custom(function = "validate_not_blank"))]
    pub collection_target: String,
    #[validate(custom(function = "validate_file_source"))]
    pub file_source: FileSource,
    pub has_header: bool,
    pub job_type: JobType,
    #[validate(length(max = 100), custom(function = "validate_not_blank"))]
    pub job_sub_type: String,
    #[validate(custom(function = "validate_field_mapping"))]
    pub mapping: FieldMapping,
    pub mapping_selection: MappingSelection,
    #[validate(length(max = 255), custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(length(max = 255))]
    pub new_mapping_name: Option<String>,
    pub save_mapping_action: SaveMappingAction,
    pub should_save_to_new_mapping: bool,
}

impl SubmitJobInput {
    /// 不正なフィールド名を昇順・重複なしで返す。問題がなければ空。
    pub fn invalid_fields(&self) -> Vec<String> {
        self.check().err().unwrap_or_default()
    }

    /// すべての不正フィールドを収集し、問題がなければマッピングの永続化操作を返す。
    fn check(&self) -> Result<MappingPersistence, Vec<String>> {
        let mut invalid: Vec<String> = match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .field_errors()
                .keys()
                .map(|field| field.to_string())
                .collect(),
        };
        let decision = decide(
            self.mapping_selection,
            self.save_mapping_action,
            self.should_save_to_new_mapping,
            self.new_mapping_name.as_deref(),
        );
        if let Err(ref e) = decision {
            invalid.push(e.field().to_string());
        }
        invalid.sort();
        invalid.dedup();

        match decision {
            Ok(persistence) if invalid.is_empty() => Ok(persistence),
            _ => Err(invalid),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitJobOutput {
    pub job_item_id: Uuid,
    /// ジョブに紐付いたマッピングテンプレート（アドホックの場合は None）
    pub mapping_template_id: Option<Uuid>,
    /// 実行したマッピング保存操作（"insert" / "update"）
    pub mapping_write: Option<&'static str>,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitJobError {
    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error(transparent)]
    ContextUnavailable(#[from] MissingContext),

    #[error("mapping template not found: {0}")]
    MappingNotFound(Uuid),

    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn validate_file_source(source: &FileSource) -> Result<(), ValidationError> {
    if !source.is_complete() {
        return Err(ValidationError::new("incomplete_file_source"));
    }
    Ok(())
}

fn validate_field_mapping(mapping: &FieldMapping) -> Result<(), ValidationError> {
    if mapping.is_empty() || mapping.has_blank_entries() {
        return Err(ValidationError::new("invalid_mapping"));
    }
    Ok(())
}

pub struct SubmitJobUseCase {
    job_repo: Arc<dyn JobItemRepository>,
    mapping_repo: Arc<dyn MappingTemplateRepository>,
}

impl SubmitJobUseCase {
    pub fn new(
        job_repo: Arc<dyn JobItemRepository>,
        mapping_repo: Arc<dyn MappingTemplateRepository>,
    ) -> Self {
        Self {
            job_repo,
            mapping_repo,
        }
    }

    pub async fn execute(
        &self,
        ctx: &RequestContext,
        input: SubmitJobInput,
    ) -> Result<SubmitJobOutput, SubmitJobError> {
        let tenant_id = ctx.tenant()?;
        let user_id = ctx.user()?;

        let persistence = input.check().map_err(SubmitJobError::Validation)?;

        let mapping_write = persistence.label();
        let mapping_template_id = match persistence {
            MappingPersistence::Skip => match input.mapping_selection {
                MappingSelection::Existing(mapping_id) => {
                    // 参照のみの場合も呼び出し元テナントに存在するテンプレートに限る
                    if self
                        .mapping_repo
                        .find_by_id(tenant_id, mapping_id)
                        .await?
                        .is_none()
                    {
                        return Err(SubmitJobError::MappingNotFound(mapping_id));
                    }
                    Some(mapping_id)
                }
                MappingSelection::NoneSelected => None,
            },
            MappingPersistence::Insert { name } => {
                let template = MappingTemplate::new(
                    tenant_id.to_string(),
                    name,
                    input.collection_target.clone(),
                    input.mapping.clone(),
                    user_id.to_string(),
                );
                self.mapping_repo.create(&template).await?;
                tracing::info!(
                    tenant_id = %tenant_id,
                    mapping_template_id = %template.id,
                    "mapping template created"
                );
                Some(template.id)
            }
            MappingPersistence::Update { mapping_id } => {
                let updated = self
                    .mapping_repo
                    .update_mapping(tenant_id, mapping_id, &input.mapping)
                    .await?;
                if !updated {
                    return Err(SubmitJobError::MappingNotFound(mapping_id));
                }
                tracing::info!(
                    tenant_id = %tenant_id,
                    mapping_template_id = %mapping_id,
                    "mapping template updated"
                );
                Some(mapping_id)
            }
        };

        let job = JobItem::new(NewJobItem {
            tenant_id: tenant_id.to_string(),
            collection_target: input.collection_target,
            file_source: input.file_source,
            has_header: input.has_header,
            job_type: input.job_type,
            job_sub_type: input.job_sub_type,
            mapping: input.mapping,
            mapping_id: mapping_template_id,
            created_by: user_id.to_string(),
            name: input.name,
        });
        self.job_repo.create(&job).await?;

        tracing::info!(
            tenant_id = %tenant_id,
            job_item_id = %job.id,
            job_type = %job.job_type,
            "job item submitted"
        );

        Ok(SubmitJobOutput {
            job_item_id: job.id,
            mapping_template_id,
            mapping_write,
        })
    }
}
