use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::adapter::handler::error::AuthRejection;
use crate::infrastructure::jwks_verifier::TokenVerifier;

#[derive(Clone)]
pub struct DataTransferAuthState {
    pub verifier: Arc<dyn TokenVerifier>,
}

/// ベアラートークンを検証し、Claims をリクエスト拡張に格納する。
pub async fn auth_middleware(
    State(state): State<DataTransferAuthState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthRejection> {
    let token = extract_bearer_token(&req).ok_or(AuthRejection::MissingToken)?;

    let claims = state.verifier.verify_token(&token).await.map_err(|e| {
        tracing::debug!(error = %e, "token verification failed");
        AuthRejection::InvalidToken
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

fn extract_bearer_token(req: &Request<Body>) -> Option<String> {
    let header = req.headers().get("Authorization")?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token_valid() {
        let mut req = Request::builder().body(Body::empty()).unwrap();
        req.headers_mut()
            .insert("Authorization", HeaderValue::from_static("Bearer my-token"));
        assert_eq!(extract_bearer_token(&req), Some("my-token".to_string()));
    }

    #[test]
    fn test_extract_bearer_token_missing_or_blank() {
        let req = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(extract_bearer_token(&req), None);

        let mut req = Request::builder().body(Body::empty()).unwrap();
        req.headers_mut()
            .insert("Authorization", HeaderValue::from_static("Bearer   "));
        assert_eq!(extract_bearer_token(&req), None);
    }

    #[test]
    fn test_extract_bearer_token_wrong_scheme() {
        let mut req = Request::builder().body(Body::empty()).unwrap();
        req.headers_mut()
            .insert("Authorization", HeaderValue::from_static("Basic abc123"));
        assert_eq!(extract_bearer_token(&req), None);
    }
}
