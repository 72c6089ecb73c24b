use async_trait::async_trait;

/// CredentialStore は名前付き設定ブロブのキーバリューストア。
/// 中身は不透明な JSON として扱い、型付けは上位層で行う。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, tenant_id: &str, name: &str) -> anyhow::Result<Option<serde_json::Value>>;

    async fn set(
        &self,
        tenant_id: &str,
        name: &str,
        value: &serde_json::Value,
        updated_by: &str,
    ) -> anyhow::Result<()>;
}
