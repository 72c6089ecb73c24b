use std::sync::Arc;

use crate::domain::entity::{ObjectStorageSettings, SftpSettings, StorageSettings};
use crate::domain::repository::{ConnectionTester, CredentialStore};
use crate::domain::service::access_policy::{role_allows, ACTION_ADMIN};
use crate::domain::value_object::{MissingContext, RequestContext};
use crate::usecase::update_storage_settings::restore_masked_secret;

/// ConnectionTestTarget は疎通確認の対象となる設定を表す。
#[derive(Debug)]
pub enum ConnectionTestTarget {
    ObjectStorage(ObjectStorageSettings),
    Sftp(SftpSettings),
}

impl ConnectionTestTarget {
    pub fn key(&self) -> &'static str {
        match self {
            ConnectionTestTarget::ObjectStorage(_) => ObjectStorageSettings::KEY,
            ConnectionTestTarget::Sftp(_) => SftpSettings::KEY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTestOutput {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TestStorageConnectionError {
    #[error("permission denied: {0} settings require admin")]
    AccessDenied(&'static str),

    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error(transparent)]
    ContextUnavailable(#[from] MissingContext),

    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

/// TestStorageConnectionUseCase は入力された設定で外部ストレージへの疎通を確認する。
/// 秘密値がマスク文字列の場合は保存済みの値を使う。設定は保存しない。
pub struct TestStorageConnectionUseCase {
    tester: Arc<dyn ConnectionTester>,
    store: Arc<dyn CredentialStore>,
}

impl TestStorageConnectionUseCase {
    pub fn new(tester: Arc<dyn ConnectionTester>, store: Arc<dyn CredentialStore>) -> Self {
        Self { tester, store }
    }

    pub async fn execute(
        &self,
        ctx: &RequestContext,
        target: ConnectionTestTarget,
    ) -> Result<ConnectionTestOutput, TestStorageConnectionError> {
        let key = target.key();
        if !role_allows(&ctx.roles, ACTION_ADMIN) {
            return Err(TestStorageConnectionError::AccessDenied(key));
        }
        let tenant_id = ctx.tenant()?;

        match target {
            ConnectionTestTarget::ObjectStorage(mut settings) => {
                self.prepare(tenant_id, &mut settings).await?;
                self.tester.test_object_storage(&settings).await?;
            }
            ConnectionTestTarget::Sftp(mut settings) => {
                self.prepare(tenant_id, &mut settings).await?;
                self.tester.test_sftp(&settings).await?;
            }
        }

        tracing::info!(tenant_id = %tenant_id, settings = key, "storage connection test succeeded");
        Ok(ConnectionTestOutput {
            ok: true,
            message: format!("{} connection succeeded", key),
        })
    }

    async fn prepare<S: StorageSettings>(
        &self,
        tenant_id: &str,
        settings: &mut S,
    ) -> Result<(), TestStorageConnectionError> {
        if !restore_masked_secret(self.store.as_ref(), tenant_id, settings).await? {
            return Err(TestStorageConnectionError::Validation(vec![
                S::SECRET_FIELD.to_string(),
            ]));
        }
        let invalid = settings.invalid_fields();
        if !invalid.is_empty() {
            return Err(TestStorageConnectionError::Validation(
                invalid.into_iter().map(str::to_string).collect(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::MASKED_SECRET;
    use crate::domain::repository::connection_tester::MockConnectionTester;
    use crate::domain::repository::credential_store::MockCredentialStore;
    use secrecy::{ExposeSecret, SecretString};

    fn admin() -> RequestContext {
        RequestContext::new("tenant-abc", "admin-001").with_roles(vec!["sys_admin".to_string()])
    }

    fn sftp(password: &str) -> SftpSettings {
        SftpSettings {
            host: "sftp.example.com".to_string(),
            port: 22,
            username: "transfer".to_string(),
            password: SecretString::new(password.to_string()),
            root_path: "/".to_string(),
        }
    }

    #[tokio::test]
    async fn success() {
        let mut tester = MockConnectionTester::new();
        tester
            .expect_test_sftp()
            .withf(|s| s.host == "sftp.example.com")
            .times(1)
            .returning(|_| Ok(()));
        let store = MockCredentialStore::new();

        let uc = TestStorageConnectionUseCase::new(Arc::new(tester), Arc::new(store));
        let output = uc
            .execute(&admin(), ConnectionTestTarget::Sftp(sftp("pw")))
            .await
            .unwrap();
        assert!(output.ok);
        assert!(output.message.contains("sftp"));
    }

    #[tokio::test]
    async fn masked_password_uses_stored_secret() {
        let mut tester = MockConnectionTester::new();
        tester
            .expect_test_sftp()
            .withf(|s| s.password.expose_secret() == "stored-pw")
            .times(1)
            .returning(|_| Ok(()));
        let mut store = MockCredentialStore::new();
        store
            .expect_get()
            .returning(|_, _| Ok(Some(sftp("stored-pw").to_blob())));

        let uc = TestStorageConnectionUseCase::new(Arc::new(tester), Arc::new(store));
        let result = uc
            .execute(&admin(), ConnectionTestTarget::Sftp(sftp(MASKED_SECRET)))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn client_failure_is_upstream() {
        let mut tester = MockConnectionTester::new();
        tester
            .expect_test_object_storage()
            .returning(|_| Err(anyhow::anyhow!("NoSuchBucket")));
        let store = MockCredentialStore::new();

        let settings = ObjectStorageSettings {
            region: "ap-northeast-1".to_string(),
            bucket: "missing".to_string(),
            access_key_id: "AKIAEXAMPLE".to_string(),
            secret_access_key: SecretString::new("s".to_string()),
            endpoint: None,
        };
        let uc = TestStorageConnectionUseCase::new(Arc::new(tester), Arc::new(store));
        let result = uc
            .execute(&admin(), ConnectionTestTarget::ObjectStorage(settings))
            .await;
        match result.unwrap_err() {
            TestStorageConnectionError::Upstream(e) => assert_eq!(e.to_string(), "NoSuchBucket"),
            e => unreachable!("unexpected error: {:?}", e),
        }
    }

    #[tokio::test]
    async fn non_admin_is_denied_before_client_call() {
        let mut tester = MockConnectionTester::new();
        tester.expect_test_sftp().never();
        let store = MockCredentialStore::new();

        let ctx = RequestContext::new("tenant-abc", "user-001")
            .with_roles(vec!["sys_operator".to_string()]);
        let uc = TestStorageConnectionUseCase::new(Arc::new(tester), Arc::new(store));
        let result = uc.execute(&ctx, ConnectionTestTarget::Sftp(sftp("pw"))).await;
        assert!(matches!(
            result,
            Err(TestStorageConnectionError::AccessDenied("sftp"))
        ));
    }
}
