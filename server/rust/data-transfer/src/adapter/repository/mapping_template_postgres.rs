use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::entity::MappingTemplate;
use crate::domain::repository::MappingTemplateRepository;
use crate::domain::value_object::FieldMapping;

/// MappingTemplatePostgresRepository は MappingTemplateRepository の PostgreSQL 実装。
pub struct MappingTemplatePostgresRepository {
    pool: PgPool,
}

impl MappingTemplatePostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_template(row: PgRow) -> anyhow::Result<MappingTemplate> {
    let mapping: serde_json::Value = row.try_get("mapping")?;
    Ok(MappingTemplate {
        id: row.try_get("id")?,
        tenant_id: row.try_get("tenant_id")?,
        name: row.try_get("name")?,
        collection_target: row.try_get("collection_target")?,
        mapping: FieldMapping::from_json(mapping)?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl MappingTemplateRepository for MappingTemplatePostgresRepository {
    async fn find_by_id(
        &self,
        tenant_id: &str,
        id: Uuid,
    ) -> anyhow::Result<Option<MappingTemplate>> {
        let row = sqlx::query(
            r#"
            SELECT id, tenant_id, name, collection_target, mapping, created_by,
                   created_at, updated_at
            FROM data_transfer.mapping_templates
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_template).transpose()
    }

    async fn find_all(
        &self,
        tenant_id: &str,
        collection_target: Option<String>,
    ) -> anyhow::Result<Vec<MappingTemplate>> {
        let rows = sqlx::query(
            r#"
            SELECT id, tenant_id, name, collection_target, mapping, created_by,
                   created_at, updated_at
            FROM data_transfer.mapping_templates
            WHERE tenant_id = $1
              AND ($2::text IS NULL OR collection_target = $2)
            ORDER BY name ASC
            "#,
        )
        .bind(tenant_id)
        .bind(collection_target)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_template).collect()
    }

    async fn create(&self, template: &MappingTemplate) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO data_transfer.mapping_templates
                (id, tenant_id, name, collection_target, mapping, created_by,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(template.id)
        .bind(&template.tenant_id)
        .bind(&template.name)
        .bind(&template.collection_target)
        .bind(template.mapping.to_json())
        .bind(&template.created_by)
        .bind(template.created_at)
        .bind(template.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_mapping(
        &self,
        tenant_id: &str,
        id: Uuid,
        mapping: &FieldMapping,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE data_transfer.mapping_templates
            SET mapping = $3, updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(mapping.to_json())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
