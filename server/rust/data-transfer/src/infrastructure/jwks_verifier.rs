//! JWKS 検証器: 公開鍵を HTTP で取得してキャッシュし、JWT を検証する。

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;

/// RealmAccess は Keycloak の realm_access Claim を表す。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RealmAccess {
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Claims はデータ転送サーバーが参照する JWT Claims。
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    /// ユーザーの一意識別子
    pub sub: String,
    pub iss: String,
    pub exp: u64,
    /// 所属テナント（Keycloak のユーザー属性マッパーで付与）
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub preferred_username: Option<String>,
    #[serde(default)]
    pub realm_access: Option<RealmAccess>,
}

impl Claims {
    /// realm_access のロール一覧を返す。
    pub fn realm_roles(&self) -> &[String] {
        self.realm_access
            .as_ref()
            .map(|ra| ra.roles.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("JWKS fetch failed: {0}")]
    JwksFetchFailed(String),
}

/// TokenVerifier はベアラートークンの検証を抽象化する。
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify_token(&self, token: &str) -> Result<Claims, AuthError>;
}

/// JwkKey は RSA 公開鍵の構成要素。
#[derive(Debug, Clone, Deserialize)]
pub struct JwkKey {
    pub kid: String,
    pub n: String,
    pub e: String,
}

#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<JwkKey>,
}

/// JwksFetcher は JWKS エンドポイントからの鍵取得を抽象化する。
#[async_trait]
pub trait JwksFetcher: Send + Sync {
    async fn fetch_keys(&self, jwks_url: &str) -> Result<Vec<JwkKey>, AuthError>;
}

/// HttpJwksFetcher は reqwest で JWKS を取得する。
pub struct HttpJwksFetcher {
    client: reqwest::Client,
}

impl HttpJwksFetcher {
    pub fn new() -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| AuthError::JwksFetchFailed(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl JwksFetcher for HttpJwksFetcher {
    async fn fetch_keys(&self, jwks_url: &str) -> Result<Vec<JwkKey>, AuthError> {
        let resp: JwksResponse = self
            .client
            .get(jwks_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AuthError::JwksFetchFailed(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::JwksFetchFailed(e.to_string()))?;
        Ok(resp.keys)
    }
}

struct JwksCache {
    keys: Vec<JwkKey>,
    fetched_at: Instant,
}

impl JwksCache {
    fn fresh_keys(slot: &Option<JwksCache>, ttl: Duration) -> Option<Vec<JwkKey>> {
        slot.as_ref()
            .filter(|c| c.fetched_at.elapsed() < ttl)
            .map(|c| c.keys.clone())
    }
}

/// JwksVerifier は JWKS の公開鍵で RS256 署名の JWT を検証する。
pub struct JwksVerifier {
    jwks_url: String,
    issuer: String,
    audience: String,
    cache_ttl: Duration,
    cache: RwLock<Option<JwksCache>>,
    fetcher: Arc<dyn JwksFetcher>,
}

impl JwksVerifier {
    pub fn new(
        jwks_url: &str,
        issuer: &str,
        audience: &str,
        cache_ttl: Duration,
        fetcher: Arc<dyn JwksFetcher>,
    ) -> Self {
        Self {
            jwks_url: jwks_url.to_string(),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
            cache_ttl,
            cache: RwLock::new(None),
            fetcher,
        }
    }

    /// TTL 内ならキャッシュ済みの鍵を返し、期限切れなら JWKS を再取得する。
    async fn keys(&self) -> Result<Vec<JwkKey>, AuthError> {
        if let Some(keys) = JwksCache::fresh_keys(&*self.cache.read().await, self.cache_ttl) {
            return Ok(keys);
        }

        let mut slot = self.cache.write().await;
        // 書き込みロック待ちの間に別のリクエストが再取得済みの場合がある
        if let Some(keys) = JwksCache::fresh_keys(&slot, self.cache_ttl) {
            return Ok(keys);
        }

        let keys = self.fetcher.fetch_keys(&self.jwks_url).await?;
        tracing::debug!(key_count = keys.len(), "JWKS refreshed");
        *slot = Some(JwksCache {
            keys: keys.clone(),
            fetched_at: Instant::now(),
        });
        Ok(keys)
    }
}

#[async_trait]
impl TokenVerifier for JwksVerifier {
    async fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidToken("missing kid in header".to_string()))?;

        let invalid = |e: jsonwebtoken::errors::Error| AuthError::InvalidToken(e.to_string());

        let keys = self.keys().await?;
        let Some(jwk) = keys.iter().find(|k| k.kid == kid) else {
            return Err(AuthError::InvalidToken(format!("no JWKS key for kid {}", kid)));
        };
        let decoding_key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e).map_err(invalid)?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);

        decode::<Claims>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(invalid)
    }
}
