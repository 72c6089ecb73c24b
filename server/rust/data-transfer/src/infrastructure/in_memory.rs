//! DB 未設定時および結合テストで使うインメモリ実装。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entity::{JobItem, MappingTemplate};
use crate::domain::repository::{
    CredentialStore, JobItemFilter, JobItemRepository, MappingTemplateRepository,
};
use crate::domain::value_object::{FieldMapping, JobStatus};

#[derive(Default)]
pub struct InMemoryJobItemRepository {
    jobs: RwLock<HashMap<Uuid, JobItem>>,
}

impl InMemoryJobItemRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 外部のジョブ実行基盤による状態遷移を再現する。前進しない遷移はエラー。
    pub async fn advance_status(&self, id: Uuid, next: JobStatus) -> anyhow::Result<()> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| anyhow::anyhow!("job item not found: {}", id))?;
        if !job.status.can_transition_to(next) {
            anyhow::bail!("invalid status transition: {} -> {}", job.status, next);
        }
        job.status = next;
        Ok(())
    }

    pub async fn count(&self) -> usize {
        self.jobs.read().await.len()
    }
}

#[async_trait]
impl JobItemRepository for InMemoryJobItemRepository {
    async fn find_by_id(&self, tenant_id: &str, id: Uuid) -> anyhow::Result<Option<JobItem>> {
        let jobs = self.jobs.read().await;
        Ok(jobs.get(&id).filter(|j| j.tenant_id == tenant_id).cloned())
    }

    async fn find_all(
        &self,
        tenant_id: &str,
        filter: &JobItemFilter,
        page: u32,
        page_size: u32,
    ) -> anyhow::Result<(Vec<JobItem>, u64)> {
        let jobs = self.jobs.read().await;
        let mut matched: Vec<JobItem> = jobs
            .values()
            .filter(|j| j.tenant_id == tenant_id)
            .filter(|j| filter.job_type.is_none_or(|t| j.job_type == t))
            .filter(|j| filter.status.is_none_or(|s| j.status == s))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));

        let total = matched.len() as u64;
        let offset = (page.saturating_sub(1) as usize) * page_size as usize;
        let items = matched
            .into_iter()
            .skip(offset)
            .take(page_size as usize)
            .collect();
        Ok((items, total))
    }

    async fn create(&self, job: &JobItem) -> anyhow::Result<()> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.id) {
            anyhow::bail!("job item already exists: {}", job.id);
        }
        jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn delete_unless_in_progress(&self, tenant_id: &str, id: Uuid) -> anyhow::Result<bool> {
        let mut jobs = self.jobs.write().await;
        let removable = jobs
            .get(&id)
            .is_some_and(|j| j.tenant_id == tenant_id && j.status != JobStatus::InProgress);
        if removable {
            jobs.remove(&id);
        }
        Ok(removable)
    }
}

#[derive(Default)]
pub struct InMemoryMappingTemplateRepository {
    templates: RwLock<HashMap<Uuid, MappingTemplate>>,
}

impl InMemoryMappingTemplateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.templates.read().await.len()
    }
}

#[async_trait]
impl MappingTemplateRepository for InMemoryMappingTemplateRepository {
    async fn find_by_id(
        &self,
        tenant_id: &str,
        id: Uuid,
    ) -> anyhow::Result<Option<MappingTemplate>> {
        let templates = self.templates.read().await;
        Ok(templates
            .get(&id)
            .filter(|t| t.tenant_id == tenant_id)
            .cloned())
    }

    async fn find_all(
        &self,
        tenant_id: &str,
        collection_target: Option<String>,
    ) -> anyhow::Result<Vec<MappingTemplate>> {
        let templates = self.templates.read().await;
        let mut result: Vec<MappingTemplate> = templates
            .values()
            .filter(|t| t.tenant_id == tenant_id)
            .filter(|t| {
                collection_target
                    .as_deref()
                    .is_none_or(|c| t.collection_target == c)
            })
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    async fn create(&self, template: &MappingTemplate) -> anyhow::Result<()> {
        let mut templates = self.templates.write().await;
        templates.insert(template.id, template.clone());
        Ok(())
    }

    async fn update_mapping(
        &self,
        tenant_id: &str,
        id: Uuid,
        mapping: &FieldMapping,
    ) -> anyhow::Result<bool> {
        let mut templates = self.templates.write().await;
        match templates.get_mut(&id).filter(|t| t.tenant_id == tenant_id) {
            Some(template) => {
                template.replace_mapping(mapping.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct InMemoryCredentialStore {
    entries: RwLock<HashMap<(String, String), serde_json::Value>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn get(&self, tenant_id: &str, name: &str) -> anyhow::Result<Option<serde_json::Value>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(&(tenant_id.to_string(), name.to_string()))
            .cloned())
    }

    async fn set(
        &self,
        tenant_id: &str,
        name: &str,
        value: &serde_json::Value,
        _updated_by: &str,
    ) -> anyhow::Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert((tenant_id.to_string(), name.to_string()), value.clone());
        Ok(())
    }
}
