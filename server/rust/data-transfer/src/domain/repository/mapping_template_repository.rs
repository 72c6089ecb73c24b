use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entity::MappingTemplate;
use crate::domain::value_object::FieldMapping;

/// MappingTemplateRepository は保存済みマッピングの永続化を抽象化する。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MappingTemplateRepository: Send + Sync {
    async fn find_by_id(&self, tenant_id: &str, id: Uuid)
        -> anyhow::Result<Option<MappingTemplate>>;

    /// 名前順で返す。collection_target を指定した場合はその対象のみ。
    async fn find_all(
        &self,
        tenant_id: &str,
        collection_target: Option<String>,
    ) -> anyhow::Result<Vec<MappingTemplate>>;

    async fn create(&self, template: &MappingTemplate) -> anyhow::Result<()>;

    /// mapping を置き換える。対象が存在しない場合は false を返す。
    async fn update_mapping(
        &self,
        tenant_id: &str,
        id: Uuid,
        mapping: &FieldMapping,
    ) -> anyhow::Result<bool>;
}
