//! 角色与层级

use serde::{Deserialize, Serialize};

/// 用户角色
///
/// 按特权严格排序：staff < admin < super_admin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Staff,
    Admin,
    SuperAdmin,
}

impl Role {
    /// 角色的特权等级
    ///
    /// 严格递增；调用方对缺失角色使用 [`rank`]，得到 0
    pub fn rank(&self) -> u8 {
        match self {
            Role::Staff => 1,
            Role::Admin => 2,
            Role::SuperAdmin => 3,
        }
    }

    /// 提供给后端行的 snake_case 表示
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Staff => "staff",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "staff" => Ok(Role::Staff),
            "admin" => Ok(Role::Admin),
            "super_admin" => Ok(Role::SuperAdmin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// 未知角色字符串
///
/// 只会在 provider 边界的行归一化处出现，不会变成一个幽灵角色
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl std::fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

/// 缺失角色按最低等级 0 处理，永不 panic
pub fn rank(role: Option<Role>) -> u8 {
    role.map(|r| r.rank()).unwrap_or(0)
}

/// a 的特权是否不低于 b
pub fn outranks_or_equals(a: Option<Role>, b: Role) -> bool {
    rank(a) >= b.rank()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_rank_strictly_increasing() {
        assert!(Role::Staff.rank() < Role::Admin.rank());
        assert!(Role::Admin.rank() < Role::SuperAdmin.rank());
    }

    #[test]
    fn test_absent_role_ranks_lowest() {
        assert_eq!(rank(None), 0);
        assert!(rank(None) < Role::Staff.rank());
    }

    #[test]
    fn test_outranks_reflexive() {
        for role in [Role::Staff, Role::Admin, Role::SuperAdmin] {
            assert!(outranks_or_equals(Some(role), role));
        }
    }

    #[test]
    fn test_outranks_ordering() {
        assert!(outranks_or_equals(Some(Role::SuperAdmin), Role::Staff));
        assert!(!outranks_or_equals(Some(Role::Staff), Role::Admin));
        assert!(!outranks_or_equals(None, Role::Staff));
    }

    #[test]
    fn test_role_string_roundtrip() {
        for role in [Role::Staff, Role::Admin, Role::SuperAdmin] {
            assert_eq!(Role::from_str(role.as_str()).unwrap(), role);
        }
        assert!(Role::from_str("root").is_err());
    }
}
