//! 已认证主体的档案实体

use chrono::{DateTime, Utc};
use gavel_access_core::Role;
use gavel_common::UserId;
use gavel_domain_core::Entity;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Email;

/// 用户状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Suspended,
    Deactivated,
}

impl Default for UserStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserStatus::Active => write!(f, "active"),
            UserStatus::Suspended => write!(f, "suspended"),
            UserStatus::Deactivated => write!(f, "deactivated"),
        }
    }
}

/// 已认证主体
///
/// 唯一由 SessionManager 写入；UI 和 AccessController 只读共享。
/// 只能从 provider 边界的归一化步骤产生，原始行结构不会越过该边界。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub email: Email,
    pub role: Role,
    pub status: UserStatus,
    /// 远端的展示性副本；本地安全存储里的开关才是门控依据
    pub biometric_enabled: bool,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

impl Entity for Identity {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_identity() -> Identity {
        let now = Utc::now();
        Identity {
            id: UserId::new(),
            email: Email::new("clerk@example.com").unwrap(),
            role: Role::Staff,
            status: UserStatus::Active,
            biometric_enabled: false,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_active_by_default() {
        let identity = test_identity();
        assert!(identity.is_active());
    }

    #[test]
    fn test_non_active_statuses() {
        let mut identity = test_identity();
        identity.status = UserStatus::Suspended;
        assert!(!identity.is_active());
        identity.status = UserStatus::Deactivated;
        assert!(!identity.is_active());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&UserStatus::Deactivated).unwrap();
        assert_eq!(json, "\"deactivated\"");
    }
}
