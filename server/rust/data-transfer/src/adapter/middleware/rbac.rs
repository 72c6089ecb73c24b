use std::future::Future;
use std::pin::Pin;

use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::adapter::handler::error::AuthRejection;
use crate::domain::service::access_policy::role_allows;
use crate::infrastructure::jwks_verifier::Claims;

type RbacFuture = Pin<Box<dyn Future<Output = Result<Response, AuthRejection>> + Send>>;

/// action を許可するロールを持たないリクエストを 403 で拒否するミドルウェアを返す。
pub fn require_permission(
    action: &'static str,
) -> impl Fn(Request<Body>, Next) -> RbacFuture + Clone + Send + Sync + 'static {
    move |req, next| Box::pin(rbac_check(req, next, action))
}

async fn rbac_check(
    req: Request<Body>,
    next: Next,
    action: &'static str,
) -> Result<Response, AuthRejection> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .ok_or(AuthRejection::MissingClaims)?;

    if !role_allows(claims.realm_roles(), action) {
        tracing::info!(sub = %claims.sub, action, "permission denied");
        return Err(AuthRejection::PermissionDenied(action));
    }

    Ok(next.run(req).await)
}
