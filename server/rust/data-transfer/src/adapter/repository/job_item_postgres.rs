use std::str::FromStr;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::entity::JobItem;
use crate::domain::repository::{JobItemFilter, JobItemRepository};
use crate::domain::value_object::{FieldMapping, FileSource, JobStatus, JobType};

/// JobItemPostgresRepository は JobItemRepository の PostgreSQL 実装。
pub struct JobItemPostgresRepository {
    pool: PgPool,
}

impl JobItemPostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "id, tenant_id, collection_target, file_source, has_header, \
     job_type, job_sub_type, mapping, mapping_id, status, uploaded_at, created_by, name";

fn row_to_job_item(row: PgRow) -> anyhow::Result<JobItem> {
    let file_source: serde_json::Value = row.try_get("file_source")?;
    let mapping: serde_json::Value = row.try_get("mapping")?;
    let job_type: String = row.try_get("job_type")?;
    let status: String = row.try_get("status")?;

    Ok(JobItem {
        id: row.try_get("id")?,
        tenant_id: row.try_get("tenant_id")?,
        collection_target: row.try_get("collection_target")?,
        file_source: serde_json::from_value::<FileSource>(file_source)?,
        has_header: row.try_get("has_header")?,
        job_type: JobType::from_str(&job_type)?,
        job_sub_type: row.try_get("job_sub_type")?,
        mapping: FieldMapping::from_json(mapping)?,
        mapping_id: row.try_get("mapping_id")?,
        status: JobStatus::from_str(&status)?,
        uploaded_at: row.try_get("uploaded_at")?,
        created_by: row.try_get("created_by")?,
        name: row.try_get("name")?,
    })
}

#[async_trait]
impl JobItemRepository for JobItemPostgresRepository {
    async fn find_by_id(&self, tenant_id: &str, id: Uuid) -> anyhow::Result<Option<JobItem>> {
        let query = format!(
            "SELECT {} FROM data_transfer.job_items WHERE tenant_id = $1 AND id = $2",
            SELECT_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_job_item).transpose()
    }

    async fn find_all(
        &self,
        tenant_id: &str,
        filter: &JobItemFilter,
        page: u32,
        page_size: u32,
    ) -> anyhow::Result<(Vec<JobItem>, u64)> {
        let job_type = filter.job_type.map(|t| t.as_str());
        let status = filter.status.map(|s| s.as_str());
        let offset = i64::from(page.saturating_sub(1)) * i64::from(page_size);

        let query = format!(
            r#"
            SELECT {}
            FROM data_transfer.job_items
            WHERE tenant_id = $1
              AND ($2::text IS NULL OR job_type = $2)
              AND ($3::text IS NULL OR status = $3)
            ORDER BY uploaded_at DESC
            LIMIT $4 OFFSET $5
            "#,
            SELECT_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(tenant_id)
            .bind(job_type)
            .bind(status)
            .bind(i64::from(page_size))
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        let jobs = rows
            .into_iter()
            .map(row_to_job_item)
            .collect::<anyhow::Result<Vec<_>>>()?;

        let count_row: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM data_transfer.job_items
            WHERE tenant_id = $1
              AND ($2::text IS NULL OR job_type = $2)
              AND ($3::text IS NULL OR status = $3)
            "#,
        )
        .bind(tenant_id)
        .bind(job_type)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok((jobs, u64::try_from(count_row.0).unwrap_or_default()))
    }

    async fn create(&self, job: &JobItem) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO data_transfer.job_items
                (id, tenant_id, collection_target, file_source, has_header, job_type,
                 job_sub_type, mapping, mapping_id, status, uploaded_at, created_by, name)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(job.id)
        .bind(&job.tenant_id)
        .bind(&job.collection_target)
        .bind(serde_json::to_value(&job.file_source)?)
        .bind(job.has_header)
        .bind(job.job_type.as_str())
        .bind(&job.job_sub_type)
        .bind(job.mapping.to_json())
        .bind(job.mapping_id)
        .bind(job.status.as_str())
        .bind(job.uploaded_at)
        .bind(&job.created_by)
        .bind(&job.name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_unless_in_progress(&self, tenant_id: &str, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM data_transfer.job_items
            WHERE tenant_id = $1 AND id = $2 AND status <> 'in_progress'
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
