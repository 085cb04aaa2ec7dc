//! 会话与认证状态机

use chrono::{DateTime, Utc};
use gavel_common::UserId;
use serde::{Deserialize, Serialize};

use crate::domain::identity::Identity;

/// provider 签发的会话
///
/// 核心只把它当作能力句柄：token 内容不做任何解析，
/// 过期与吊销由 provider 在下一次校验时裁决。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    /// auth 主体 id，用于拉取对应的 Identity 档案
    pub subject_id: UserId,
}

impl ProviderSession {
    /// 本地已知的过期判断，仅用于提前跳过一次网络往返；
    /// 权威判定永远在 provider 侧
    pub fn is_locally_expired(&self) -> bool {
        match self.expires_at {
            Some(at) => at <= Utc::now(),
            None => false,
        }
    }
}

/// 认证状态机
///
/// 不存在 Identity 与 `is_authenticated == false` 并存的状态
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// 未认证（初始态，也是登出与失败后的归宿）
    Unauthenticated,
    /// 恢复/登录进行中
    Restoring,
    /// 已认证，携带唯一的身份快照
    Authenticated(Identity),
    /// 上一次登录/恢复失败，原因留给 UI 展示；等价于未认证
    AuthFailed(String),
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    /// 当前身份快照；非 Authenticated 态为 None
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identity::UserStatus;
    use crate::domain::value_objects::Email;
    use gavel_access_core::Role;

    fn authenticated_state() -> SessionState {
        let now = Utc::now();
        SessionState::Authenticated(Identity {
            id: UserId::new(),
            email: Email::new("admin@example.com").unwrap(),
            role: Role::Admin,
            status: UserStatus::Active,
            biometric_enabled: false,
            created_by: None,
            created_at: now,
            updated_at: now,
        })
    }

    #[test]
    fn test_is_authenticated_matches_state() {
        assert!(!SessionState::Unauthenticated.is_authenticated());
        assert!(!SessionState::Restoring.is_authenticated());
        assert!(!SessionState::AuthFailed("x".into()).is_authenticated());
        assert!(authenticated_state().is_authenticated());
    }

    #[test]
    fn test_identity_only_when_authenticated() {
        assert!(SessionState::Unauthenticated.identity().is_none());
        assert!(authenticated_state().identity().is_some());
    }

    #[test]
    fn test_local_expiry() {
        let session = ProviderSession {
            access_token: "opaque".into(),
            refresh_token: None,
            expires_at: Some(Utc::now() - chrono::Duration::hours(1)),
            subject_id: UserId::new(),
        };
        assert!(session.is_locally_expired());

        let open_ended = ProviderSession {
            expires_at: None,
            ..session
        };
        assert!(!open_ended.is_locally_expired());
    }
}
