use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entity::JobItem;
use crate::domain::value_object::{JobStatus, JobType};

/// JobItemFilter はジョブ一覧取得の絞り込み条件を表す。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobItemFilter {
    pub job_type: Option<JobType>,
    pub status: Option<JobStatus>,
}

/// JobItemRepository はジョブアイテムの永続化を抽象化する。
/// すべての操作はテナント単位でスコープされる。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobItemRepository: Send + Sync {
    async fn find_by_id(&self, tenant_id: &str, id: Uuid) -> anyhow::Result<Option<JobItem>>;

    /// 投入日時の降順で返す。戻り値の 2 番目は絞り込み後の総件数。
    async fn find_all(
        &self,
        tenant_id: &str,
        filter: &JobItemFilter,
        page: u32,
        page_size: u32,
    ) -> anyhow::Result<(Vec<JobItem>, u64)>;

    async fn create(&self, job: &JobItem) -> anyhow::Result<()>;

    /// status が in_progress でない場合に限りアトミックに削除する。
    /// 削除した場合は true、対象が存在しないか実行中の場合は false を返す。
    async fn delete_unless_in_progress(&self, tenant_id: &str, id: Uuid) -> anyhow::Result<bool>;
}
