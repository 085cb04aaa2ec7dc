//! 权限判定
//!
//! 每个受控操作一个纯谓词，对 `Option<Role>` 全函数，
//! None 一律拒绝。判定结果从不缓存，由调用方每次重新计算。

use serde::{Deserialize, Serialize};

use crate::role::{Role, outranks_or_equals};

/// 受控操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    ManageUsers,
    CreateAdmins,
    ManageCases,
    DeleteDocuments,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::ManageUsers => write!(f, "manage_users"),
            Action::CreateAdmins => write!(f, "create_admins"),
            Action::ManageCases => write!(f, "manage_cases"),
            Action::DeleteDocuments => write!(f, "delete_documents"),
        }
    }
}

/// 是否可管理用户（创建、编辑、删除）
pub fn can_manage_users(role: Option<Role>) -> bool {
    matches!(role, Some(Role::Admin) | Some(Role::SuperAdmin))
}

/// 是否可创建/提升管理员
///
/// 仅 super_admin；admin 只能创建 staff
pub fn can_create_admins(role: Option<Role>) -> bool {
    matches!(role, Some(Role::SuperAdmin))
}

/// 是否可管理案件
pub fn can_manage_cases(role: Option<Role>) -> bool {
    matches!(role, Some(Role::Admin) | Some(Role::SuperAdmin))
}

/// 是否可删除文档
pub fn can_delete_documents(role: Option<Role>) -> bool {
    matches!(role, Some(Role::Admin) | Some(Role::SuperAdmin))
}

/// 该角色进入敏感界面前是否必须通过本地生物识别
///
/// staff 豁免
pub fn requires_biometric(role: Option<Role>) -> bool {
    matches!(role, Some(Role::Admin) | Some(Role::SuperAdmin))
}

/// 层级兜底判定：role 的特权不低于 required 即允许
pub fn has_permission(role: Option<Role>, required: Role) -> bool {
    outranks_or_equals(role, required)
}

/// 操作到谓词的映射
pub fn is_allowed(role: Option<Role>, action: Action) -> bool {
    match action {
        Action::ManageUsers => can_manage_users(role),
        Action::CreateAdmins => can_create_admins(role),
        Action::ManageCases => can_manage_cases(role),
        Action::DeleteDocuments => can_delete_documents(role),
    }
}

/// actor 是否可向目标分配 target_role
///
/// admin 及以上目标角色需要 create_admins 特权，staff 目标只需 manage_users
pub fn can_assign_role(actor: Option<Role>, target_role: Role) -> bool {
    match target_role {
        Role::Admin | Role::SuperAdmin => can_create_admins(actor),
        Role::Staff => can_manage_users(actor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Option<Role>; 4] = [
        None,
        Some(Role::Staff),
        Some(Role::Admin),
        Some(Role::SuperAdmin),
    ];

    #[test]
    fn test_manage_users_matrix() {
        assert!(!can_manage_users(None));
        assert!(!can_manage_users(Some(Role::Staff)));
        assert!(can_manage_users(Some(Role::Admin)));
        assert!(can_manage_users(Some(Role::SuperAdmin)));
    }

    #[test]
    fn test_create_admins_only_super_admin() {
        for role in ALL {
            assert_eq!(can_create_admins(role), role == Some(Role::SuperAdmin));
        }
    }

    #[test]
    fn test_manage_cases_and_delete_documents() {
        for role in ALL {
            let expected = matches!(role, Some(Role::Admin) | Some(Role::SuperAdmin));
            assert_eq!(can_manage_cases(role), expected);
            assert_eq!(can_delete_documents(role), expected);
        }
    }

    #[test]
    fn test_requires_biometric() {
        assert!(requires_biometric(Some(Role::Admin)));
        assert!(requires_biometric(Some(Role::SuperAdmin)));
        assert!(!requires_biometric(Some(Role::Staff)));
        assert!(!requires_biometric(None));
    }

    #[test]
    fn test_has_permission_follows_hierarchy() {
        assert!(has_permission(Some(Role::SuperAdmin), Role::Admin));
        assert!(has_permission(Some(Role::Admin), Role::Admin));
        assert!(!has_permission(Some(Role::Staff), Role::Admin));
        assert!(!has_permission(None, Role::Staff));
    }

    #[test]
    fn test_is_allowed_dispatch() {
        assert!(is_allowed(Some(Role::Admin), Action::ManageUsers));
        assert!(!is_allowed(Some(Role::Admin), Action::CreateAdmins));
        assert!(is_allowed(Some(Role::SuperAdmin), Action::CreateAdmins));
        assert!(!is_allowed(Some(Role::Staff), Action::ManageCases));
    }

    #[test]
    fn test_assign_role_rules() {
        // admin 可建 staff，不可建 admin
        assert!(can_assign_role(Some(Role::Admin), Role::Staff));
        assert!(!can_assign_role(Some(Role::Admin), Role::Admin));
        // super_admin 可建任何角色
        assert!(can_assign_role(Some(Role::SuperAdmin), Role::Admin));
        assert!(can_assign_role(Some(Role::SuperAdmin), Role::SuperAdmin));
        // staff 什么都不能建
        assert!(!can_assign_role(Some(Role::Staff), Role::Staff));
    }
}
