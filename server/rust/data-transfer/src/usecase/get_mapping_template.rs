use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entity::MappingTemplate;
use crate::domain::repository::MappingTemplateRepository;
use crate::domain::value_object::{MissingContext, RequestContext};

#[derive(Debug, thiserror::Error)]
pub enum GetMappingTemplateError {
    #[error("mapping template not found: {0}")]
    NotFound(Uuid),

    #[error(transparent)]
    ContextUnavailable(#[from] MissingContext),

    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

pub struct GetMappingTemplateUseCase {
    mapping_repo: Arc<dyn MappingTemplateRepository>,
}

impl GetMappingTemplateUseCase {
    pub fn new(mapping_repo: Arc<dyn MappingTemplateRepository>) -> Self {
        Self { mapping_repo }
    }

    pub async fn execute(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<MappingTemplate, GetMappingTemplateError> {
        let tenant_id = ctx.tenant()?;
        self.mapping_repo
            .find_by_id(tenant_id, id)
            .await?
            .ok_or(GetMappingTemplateError::NotFound(id))
    }
}
