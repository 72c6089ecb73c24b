use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_object::{FieldMapping, FileSource, JobStatus, JobType};

/// JobItem は 1 件のインポート/エクスポートジョブの投入記録を表す。
/// mapping は投入時点のスナップショットで、保存済みマッピングの後続の更新の影響を受けない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobItem {
    pub id: Uuid,
    pub tenant_id: String,
    pub collection_target: String,
    pub file_source: FileSource,
    pub has_header: bool,
    pub job_type: JobType,
    pub job_sub_type: String,
    pub mapping: FieldMapping,
    /// None はアドホックなマッピングで投入されたことを表す
    pub mapping_id: Option<Uuid>,
    pub status: JobStatus,
    pub uploaded_at: DateTime<Utc>,
    pub created_by: String,
    pub name: String,
}

/// JobItem 生成時の入力。
#[derive(Debug, Clone)]
pub struct NewJobItem {
    pub tenant_id: String,
    pub collection_target: String,
    pub file_source: FileSource,
    pub has_header: bool,
    pub job_type: JobType,
    pub job_sub_type: String,
    pub mapping: FieldMapping,
    pub mapping_id: Option<Uuid>,
    pub created_by: String,
    pub name: String,
}

impl JobItem {
    pub fn new(req: NewJobItem) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id: req.tenant_id,
            collection_target: req.collection_target,
            file_source: req.file_source,
            has_header: req.has_header,
            job_type: req.job_type,
            job_sub_type: req.job_sub_type,
            mapping: req.mapping,
            mapping_id: req.mapping_id,
            status: JobStatus::Pending,
            uploaded_at: Utc::now(),
            created_by: req.created_by,
            name: req.name,
        }
    }

    /// 実行中のジョブは削除できない。
    pub fn is_removable(&self) -> bool {
        self.status != JobStatus::InProgress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> NewJobItem {
        NewJobItem {
            tenant_id: "tenant-abc".to_string(),
            collection_target: "products".to_string(),
            file_source: FileSource::Upload {
                file_id: "file_001".to_string(),
                file_name: "products.csv".to_string(),
            },
            has_header: true,
            job_type: JobType::Import,
            job_sub_type: "upsert".to_string(),
            mapping: [("sku", "SKU")].into_iter().collect(),
            mapping_id: None,
            created_by: "user-001".to_string(),
            name: "daily products".to_string(),
        }
    }

    #[test]
    fn test_new_creates_pending_job() {
        let job = JobItem::new(sample_request());
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.tenant_id, "tenant-abc");
        assert_eq!(job.created_by, "user-001");
        assert_eq!(job.mapping.get("sku"), Some("SKU"));
        assert!(job.mapping_id.is_none());
    }

    #[test]
    fn test_new_assigns_unique_ids() {
        let a = JobItem::new(sample_request());
        let b = JobItem::new(sample_request());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_removable_unless_in_progress() {
        let mut job = JobItem::new(sample_request());
        assert!(job.is_removable());

        job.status = JobStatus::InProgress;
        assert!(!job.is_removable());

        job.status = JobStatus::Completed;
        assert!(job.is_removable());

        job.status = JobStatus::Failed;
        assert!(job.is_removable());
    }
}
