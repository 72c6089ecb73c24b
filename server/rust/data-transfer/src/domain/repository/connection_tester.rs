use async_trait::async_trait;

use crate::domain::entity::{ObjectStorageSettings, SftpSettings};

/// ConnectionTester は外部ストレージへの疎通確認を抽象化する。
/// 失敗時はクライアントのエラーをそのまま返す。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectionTester: Send + Sync {
    async fn test_object_storage(&self, settings: &ObjectStorageSettings) -> anyhow::Result<()>;
    async fn test_sftp(&self, settings: &SftpSettings) -> anyhow::Result<()>;
}
