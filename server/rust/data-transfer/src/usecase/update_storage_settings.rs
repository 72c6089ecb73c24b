use std::marker::PhantomData;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use crate::domain::entity::StorageSettings;
use crate::domain::repository::CredentialStore;
use crate::domain::service::access_policy::{role_allows, ACTION_ADMIN};
use crate::domain::value_object::{MissingContext, RequestContext};

#[derive(Debug, thiserror::Error)]
pub enum UpdateStorageSettingsError {
    #[error("permission denied: {0} settings require admin")]
    AccessDenied(&'static str),

    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error(transparent)]
    ContextUnavailable(#[from] MissingContext),

    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

/// 秘密値がマスク文字列のままなら保存済みの値で置き換える。
/// 保存済みの設定がない場合は false を返す。
pub(crate) async fn restore_masked_secret<S: StorageSettings>(
    store: &dyn CredentialStore,
    tenant_id: &str,
    settings: &mut S,
) -> anyhow::Result<bool> {
    if !settings.has_masked_secret() {
        return Ok(true);
    }
    let Some(blob) = store.get(tenant_id, S::KEY).await? else {
        return Ok(false);
    };
    let stored = S::from_blob(blob)?;
    settings.replace_secret(SecretString::new(stored.secret().expose_secret().clone()));
    Ok(true)
}

pub struct UpdateStorageSettingsUseCase<S> {
    store: Arc<dyn CredentialStore>,
    _settings: PhantomData<fn() -> S>,
}

impl<S: StorageSettings> UpdateStorageSettingsUseCase<S> {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            _settings: PhantomData,
        }
    }

    pub async fn execute(
        &self,
        ctx: &RequestContext,
        mut settings: S,
    ) -> Result<S, UpdateStorageSettingsError> {
        if !role_allows(&ctx.roles, ACTION_ADMIN) {
            return Err(UpdateStorageSettingsError::AccessDenied(S::KEY));
        }
        let tenant_id = ctx.tenant()?;
        let user_id = ctx.user()?;

        if !restore_masked_secret(self.store.as_ref(), tenant_id, &mut settings).await? {
            return Err(UpdateStorageSettingsError::Validation(vec![
                S::SECRET_FIELD.to_string(),
            ]));
        }
        let invalid = settings.invalid_fields();
        if !invalid.is_empty() {
            return Err(UpdateStorageSettingsError::Validation(
                invalid.into_iter().map(str::to_string).collect(),
            ));
        }

        self.store
            .set(tenant_id, S::KEY, &settings.to_blob(), user_id)
            .await?;
        tracing::info!(
            tenant_id = %tenant_id,
            settings = S::KEY,
            updated_by = %user_id,
            "storage settings updated"
        );
        Ok(settings)
    }
}
