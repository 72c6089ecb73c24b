use std::marker::PhantomData;
use std::sync::Arc;

use crate::domain::entity::StorageSettings;
use crate::domain::repository::CredentialStore;
use crate::domain::service::access_policy::{role_allows, ACTION_ADMIN};
use crate::domain::value_object::{MissingContext, RequestContext};

#[derive(Debug, thiserror::Error)]
pub enum GetStorageSettingsError {
    #[error("permission denied: {0} settings require admin")]
    AccessDenied(&'static str),

    #[error("{0} settings are not configured")]
    NotConfigured(&'static str),

    #[error(transparent)]
    ContextUnavailable(#[from] MissingContext),

    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

/// GetStorageSettingsUseCase は保存済みのストレージ設定を読み出す。
/// 呼び出し側は to_masked_json で秘密値を伏せて返すこと。
pub struct GetStorageSettingsUseCase<S> {
    store: Arc<dyn CredentialStore>,
    _settings: PhantomData<fn() -> S>,
}

impl<S: StorageSettings> GetStorageSettingsUseCase<S> {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            _settings: PhantomData,
        }
    }

    pub async fn execute(&self, ctx: &RequestContext) -> Result<S, GetStorageSettingsError> {
        if !role_allows(&ctx.roles, ACTION_ADMIN) {
            return Err(GetStorageSettingsError::AccessDenied(S::KEY));
        }
        let tenant_id = ctx.tenant()?;

        let blob = self
            .store
            .get(tenant_id, S::KEY)
            .await?
            .ok_or(GetStorageSettingsError::NotConfigured(S::KEY))?;
        Ok(S::from_blob(blob)?)
    }
}
