/// RequestContext は呼び出し元のテナント・ユーザー・ロールを表す。
/// 値は認証済み Claims、または認証無効時のゲートウェイヘッダから組み立てられる。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub tenant_id: Option<String>,
    pub user_id: Option<String>,
    pub roles: Vec<String>,
}

/// 必須のコンテキスト値が欠けているときのエラー。値は欠けている項目名。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("request context unavailable: {0}")]
pub struct MissingContext(pub &'static str);

impl RequestContext {
    pub fn new(tenant_id: &str, user_id: &str) -> Self {
        Self {
            tenant_id: Some(tenant_id.to_string()),
            user_id: Some(user_id.to_string()),
            roles: Vec::new(),
        }
    }

    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        self.roles = roles;
        self
    }

    pub fn tenant(&self) -> Result<&str, MissingContext> {
        non_blank(self.tenant_id.as_deref()).ok_or(MissingContext("tenant_id"))
    }

    pub fn user(&self) -> Result<&str, MissingContext> {
        non_blank(self.user_id.as_deref()).ok_or(MissingContext("user_id"))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
