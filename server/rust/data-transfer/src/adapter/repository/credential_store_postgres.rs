use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::repository::CredentialStore;

/// CredentialStorePostgresRepository は CredentialStore の PostgreSQL 実装。
/// 設定は (tenant_id, name) 単位で 1 行の JSONB として保存する。
pub struct CredentialStorePostgresRepository {
    pool: PgPool,
}

impl CredentialStorePostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for CredentialStorePostgresRepository {
    async fn get(&self, tenant_id: &str, name: &str) -> anyhow::Result<Option<serde_json::Value>> {
        let row: Option<(serde_json::Value,)> = sqlx::query_as(
            "SELECT value FROM data_transfer.storage_settings WHERE tenant_id = $1 AND name = $2",
        )
        .bind(tenant_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(value,)| value))
    }

    async fn set(
        &self,
        tenant_id: &str,
        name: &str,
        value: &serde_json::Value,
        updated_by: &str,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO data_transfer.storage_settings (tenant_id, name, value, updated_by, updated_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (tenant_id, name)
            DO UPDATE SET value = EXCLUDED.value,
                          updated_by = EXCLUDED.updated_by,
                          updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(tenant_id)
        .bind(name)
        .bind(value)
        .bind(updated_by)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
