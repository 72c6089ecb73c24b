/// 参照系操作（ジョブ・マッピングの取得）
pub const ACTION_READ: &str = "read";
/// 更新系操作（ジョブの投入・削除）
pub const ACTION_WRITE: &str = "write";
/// 管理操作（ストレージ認証情報の参照・更新・接続テスト）
pub const ACTION_ADMIN: &str = "admin";

/// ロールごとに許可される操作。ここにないロールは何も許可されない。
const ROLE_GRANTS: &[(&str, &[&str])] = &[
    ("sys_admin", &[ACTION_READ, ACTION_WRITE, ACTION_ADMIN]),
    ("sys_operator", &[ACTION_READ, ACTION_WRITE]),
    ("sys_auditor", &[ACTION_READ]),
];

/// ロール一覧のいずれかが action を許可していれば true を返す。
pub fn role_allows(roles: &[String], action: &str) -> bool {
    roles.iter().any(|role| {
        ROLE_GRANTS
            .iter()
            .any(|(name, actions)| *name == role.as_str() && actions.contains(&action))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_admin_can_manage_credentials() {
        let admin = roles(&["sys_admin"]);
        assert!(role_allows(&admin, ACTION_READ));
        assert!(role_allows(&admin, ACTION_WRITE));
        assert!(role_allows(&admin, ACTION_ADMIN));
    }

    #[test]
    fn test_operator_submits_but_cannot_manage_credentials() {
        let operator = roles(&["sys_operator"]);
        assert!(role_allows(&operator, ACTION_WRITE));
        assert!(!role_allows(&operator, ACTION_ADMIN));
    }

    #[test]
    fn test_auditor_is_read_only() {
        let auditor = roles(&["sys_auditor"]);
        assert!(role_allows(&auditor, ACTION_READ));
        assert!(!role_allows(&auditor, ACTION_WRITE));
    }

    #[test]
    fn test_grants_are_combined_across_roles() {
        let mixed = roles(&["viewer", "sys_auditor", "sys_operator"]);
        assert!(role_allows(&mixed, ACTION_WRITE));
        assert!(!role_allows(&mixed, ACTION_ADMIN));
    }

    #[test]
    fn test_unknown_or_empty_roles_are_denied() {
        assert!(!role_allows(&[], ACTION_READ));
        assert!(!role_allows(&roles(&["SYS_ADMIN"]), ACTION_READ));
    }
}
