use std::sync::Arc;

use uuid::Uuid;

use crate::domain::repository::JobItemRepository;
use crate::domain::value_object::{MissingContext, RequestContext};

pub const JOB_IN_PROGRESS_MESSAGE: &str = "Job item is in progress and can't be deleted.";

#[derive(Debug, thiserror::Error)]
pub enum RemoveJobError {
    #[error("job item not found: {0}")]
    NotFound(Uuid),

    #[error("{}", JOB_IN_PROGRESS_MESSAGE)]
    Conflict(Uuid),

    #[error(transparent)]
    ContextUnavailable(#[from] MissingContext),

    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

/// RemoveJobUseCase はジョブアイテムを削除する。
/// 実行中のジョブは削除できない。アップロード済みファイルの削除は行わない。
pub struct RemoveJobUseCase {
    job_repo: Arc<dyn JobItemRepository>,
}

impl RemoveJobUseCase {
    pub fn new(job_repo: Arc<dyn JobItemRepository>) -> Self {
        Self { job_repo }
    }

    pub async fn execute(&self, ctx: &RequestContext, id: Uuid) -> Result<(), RemoveJobError> {
        let tenant_id = ctx.tenant()?;

        let job = self
            .job_repo
            .find_by_id(tenant_id, id)
            .await?
            .ok_or(RemoveJobError::NotFound(id))?;
        if !job.is_removable() {
            return Err(RemoveJobError::Conflict(id));
        }

        if self.job_repo.delete_unless_in_progress(tenant_id, id).await? {
            tracing::info!(tenant_id = %tenant_id, job_item_id = %id, "job item removed");
            return Ok(());
        }

        // 読み取り後に状態が変わった、または並行して削除された
        match self.job_repo.find_by_id(tenant_id, id).await? {
            Some(_) => {
                tracing::warn!(
                    tenant_id = %tenant_id,
                    job_item_id = %id,
                    "job item started while being removed"
                );
                Err(RemoveJobError::Conflict(id))
            }
            None => Err(RemoveJobError::NotFound(id)),
        }
    }
}
