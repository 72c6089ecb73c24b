use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::domain::value_object::RequestContext;
use crate::infrastructure::jwks_verifier::Claims;

pub const TENANT_ID_HEADER: &str = "x-tenant-id";
pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLES_HEADER: &str = "x-user-roles";

/// CallerContext は呼び出し元の RequestContext を取り出すエクストラクタ。
/// 認証済み Claims があればそれのみを使い、なければゲートウェイヘッダから組み立てる。
/// 値の欠落はユースケース側で ContextUnavailable として扱う。
#[derive(Debug, Clone)]
pub struct CallerContext(pub RequestContext);

impl<S: Send + Sync> FromRequestParts<S> for CallerContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = match parts.extensions.get::<Claims>() {
            Some(claims) => from_claims(claims),
            None => from_headers(&parts.headers),
        };
        Ok(CallerContext(ctx))
    }
}

fn from_claims(claims: &Claims) -> RequestContext {
    RequestContext {
        tenant_id: claims.tenant_id.clone(),
        user_id: Some(claims.sub.clone()),
        roles: claims.realm_roles().to_vec(),
    }
}

fn from_headers(headers: &HeaderMap) -> RequestContext {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let roles = header(USER_ROLES_HEADER)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    RequestContext {
        tenant_id: header(TENANT_ID_HEADER),
        user_id: header(USER_ID_HEADER),
        roles,
    }
}
