use std::sync::Arc;

use crate::domain::entity::MappingTemplate;
use crate::domain::repository::MappingTemplateRepository;
use crate::domain::value_object::{MissingContext, RequestContext};

#[derive(Debug, thiserror::Error)]
pub enum ListMappingTemplatesError {
    #[error(transparent)]
    ContextUnavailable(#[from] MissingContext),

    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

/// ListMappingTemplatesUseCase はジョブ投入フォームの選択肢となる保存済みマッピングを返す。
pub struct ListMappingTemplatesUseCase {
    mapping_repo: Arc<dyn MappingTemplateRepository>,
}

impl ListMappingTemplatesUseCase {
    pub fn new(mapping_repo: Arc<dyn MappingTemplateRepository>) -> Self {
        Self { mapping_repo }
    }

    pub async fn execute(
        &self,
        ctx: &RequestContext,
        collection_target: Option<String>,
    ) -> Result<Vec<MappingTemplate>, ListMappingTemplatesError> {
        let tenant_id = ctx.tenant()?;
        let collection_target = collection_target.filter(|c| !c.trim().is_empty());
        Ok(self
            .mapping_repo
            .find_all(tenant_id, collection_target)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::mapping_template_repository::MockMappingTemplateRepository;

    #[tokio::test]
    async fn blank_target_lists_everything() {
        let mut mock = MockMappingTemplateRepository::new();
        mock.expect_find_all()
            .withf(|tenant, target| tenant == "tenant-abc" && target.is_none())
            .returning(|tenant, _| {
                Ok(vec![MappingTemplate::new(
                    tenant.to_string(),
                    "products default".to_string(),
                    "products".to_string(),
                    [("sku", "SKU")].into_iter().collect(),
                    "user-001".to_string(),
                )])
            });

        let uc = ListMappingTemplatesUseCase::new(Arc::new(mock));
        let templates = uc
            .execute(
                &RequestContext::new("tenant-abc", "user-001"),
                Some(" ".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(templates.len(), 1);
    }

    #[tokio::test]
    async fn upstream_error() {
        let mut mock = MockMappingTemplateRepository::new();
        mock.expect_find_all()
            .returning(|_, _| Err(anyhow::anyhow!("timeout")));

        let uc = ListMappingTemplatesUseCase::new(Arc::new(mock));
        let result = uc
            .execute(&RequestContext::new("tenant-abc", "user-001"), None)
            .await;
        assert!(matches!(result, Err(ListMappingTemplatesError::Upstream(_))));
    }
}
