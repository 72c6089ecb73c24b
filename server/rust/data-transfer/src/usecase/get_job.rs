use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entity::JobItem;
use crate::domain::repository::JobItemRepository;
use crate::domain::value_object::{MissingContext, RequestContext};

#[derive(Debug, thiserror::Error)]
pub enum GetJobError {
    #[error("job item not found: {0}")]
    NotFound(Uuid),

    #[error(transparent)]
    ContextUnavailable(#[from] MissingContext),

    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

pub struct GetJobUseCase {
    job_repo: Arc<dyn JobItemRepository>,
}

impl GetJobUseCase {
    pub fn new(job_repo: Arc<dyn JobItemRepository>) -> Self {
        Self { job_repo }
    }

    pub async fn execute(&self, ctx: &RequestContext, id: Uuid) -> Result<JobItem, GetJobError> {
        let tenant_id = ctx.tenant()?;
        self.job_repo
            .find_by_id(tenant_id, id)
            .await?
            .ok_or(GetJobError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::NewJobItem;
    use crate::domain::repository::job_item_repository::MockJobItemRepository;
    use crate::domain::value_object::{FileSource, JobType};

    #[tokio::test]
    async fn success() {
        let job = JobItem::new(NewJobItem {
            tenant_id: "tenant-abc".to_string(),
            collection_target: "orders".to_string(),
            file_source: FileSource::ObjectStorage {
                bucket: "exports".to_string(),
                key: "orders.csv".to_string(),
            },
            has_header: false,
            job_type: JobType::Export,
            job_sub_type: "full".to_string(),
            mapping: [("order_no", "ORDER_NO")].into_iter().collect(),
            mapping_id: None,
            created_by: "user-001".to_string(),
            name: "orders export".to_string(),
        });
        let id = job.id;
        let expected = job.clone();

        let mut mock = MockJobItemRepository::new();
        mock.expect_find_by_id()
            .withf(move |tenant, job_id| tenant == "tenant-abc" && *job_id == id)
            .returning(move |_, _| Ok(Some(job.clone())));

        let uc = GetJobUseCase::new(Arc::new(mock));
        let found = uc
            .execute(&RequestContext::new("tenant-abc", "user-001"), id)
            .await
            .unwrap();
        assert_eq!(found, expected);
    }

    #[tokio::test]
    async fn other_tenant_sees_not_found() {
        let mut mock = MockJobItemRepository::new();
        mock.expect_find_by_id()
            .withf(|tenant, _| tenant == "tenant-xyz")
            .returning(|_, _| Ok(None));

        let uc = GetJobUseCase::new(Arc::new(mock));
        let result = uc
            .execute(&RequestContext::new("tenant-xyz", "user-002"), Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(GetJobError::NotFound(_))));
    }
}
