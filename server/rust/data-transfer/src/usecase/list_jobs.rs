use std::sync::Arc;

use crate::domain::entity::JobItem;
use crate::domain::repository::{JobItemFilter, JobItemRepository};
use crate::domain::value_object::{MissingContext, RequestContext};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone)]
pub struct ListJobsInput {
    pub filter: JobItemFilter,
    pub page: u32,
    pub page_size: u32,
}

impl Default for ListJobsInput {
    fn default() -> Self {
        Self {
            filter: JobItemFilter::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListJobsOutput {
    pub jobs: Vec<JobItem>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
    pub has_next: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ListJobsError {
    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error(transparent)]
    ContextUnavailable(#[from] MissingContext),

    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

pub struct ListJobsUseCase {
    job_repo: Arc<dyn JobItemRepository>,
}

impl ListJobsUseCase {
    pub fn new(job_repo: Arc<dyn JobItemRepository>) -> Self {
        Self { job_repo }
    }

    pub async fn execute(
        &self,
        ctx: &RequestContext,
        input: &ListJobsInput,
    ) -> Result<ListJobsOutput, ListJobsError> {
        let tenant_id = ctx.tenant()?;

        let mut invalid = Vec::new();
        if input.page < 1 {
            invalid.push("page".to_string());
        }
        if input.page_size < 1 || input.page_size > MAX_PAGE_SIZE {
            invalid.push("page_size".to_string());
        }
        if !invalid.is_empty() {
            return Err(ListJobsError::Validation(invalid));
        }

        let (jobs, total_count) = self
            .job_repo
            .find_all(tenant_id, &input.filter, input.page, input.page_size)
            .await?;
        let has_next = u64::from(input.page) * u64::from(input.page_size) < total_count;

        Ok(ListJobsOutput {
            jobs,
            total_count,
            page: input.page,
            page_size: input.page_size,
            has_next,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::job_item_repository::MockJobItemRepository;
    use crate::domain::value_object::JobStatus;

    fn ctx() -> RequestContext {
        RequestContext::new("tenant-abc", "user-001")
    }

    #[tokio::test]
    async fn passes_filter_and_computes_has_next() {
        let mut mock = MockJobItemRepository::new();
        mock.expect_find_all()
            .withf(|tenant, filter, page, page_size| {
                tenant == "tenant-abc"
                    && filter.status == Some(JobStatus::Failed)
                    && *page == 1
                    && *page_size == 10
            })
            .returning(|_, _, _, _| Ok((vec![], 25)));

        let uc = ListJobsUseCase::new(Arc::new(mock));
        let input = ListJobsInput {
            filter: JobItemFilter {
                job_type: None,
                status: Some(JobStatus::Failed),
            },
            page: 1,
            page_size: 10,
        };
        let output = uc.execute(&ctx(), &input).await.unwrap();
        assert_eq!(output.total_count, 25);
        assert!(output.has_next);
    }

    #[tokio::test]
    async fn last_page_has_no_next() {
        let mut mock = MockJobItemRepository::new();
        mock.expect_find_all()
            .returning(|_, _, _, _| Ok((vec![], 20)));

        let uc = ListJobsUseCase::new(Arc::new(mock));
        let output = uc.execute(&ctx(), &ListJobsInput::default()).await.unwrap();
        assert!(!output.has_next);
    }

    #[tokio::test]
    async fn invalid_paging() {
        let mut mock = MockJobItemRepository::new();
        mock.expect_find_all().never();

        let uc = ListJobsUseCase::new(Arc::new(mock));
        let input = ListJobsInput {
            filter: JobItemFilter::default(),
            page: 0,
            page_size: 500,
        };
        match uc.execute(&ctx(), &input).await.unwrap_err() {
            ListJobsError::Validation(fields) => {
                assert_eq!(fields, vec!["page".to_string(), "page_size".to_string()])
            }
            e => unreachable!("unexpected error: {:?}", e),
        }
    }
}
