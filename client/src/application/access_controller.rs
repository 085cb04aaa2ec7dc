//! 访问控制门面
//!
//! 统一决策点：把当前会话身份与纯权限谓词拼起来回答
//! "现在这个人能不能做 X"。每次询问都重新计算，不缓存，
//! 角色变更或登出在下一次检查立即生效。

use std::sync::Arc;

use gavel_access_core::{Action, Role, is_allowed, requires_biometric};
use metrics::counter;

use crate::application::session_manager::SessionManager;

/// 访问控制器
///
/// 所有 CRUD 界面在渲染和启用动作前询问这里；默认拒绝。
pub struct AccessController {
    session: Arc<SessionManager>,
}

impl AccessController {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// 当前用户能否执行 action
    ///
    /// 未认证 → 拒绝；suspended/deactivated 身份按未认证处理
    /// （会话保留，权限全拒），见 DESIGN.md 的开放问题决策。
    pub fn can(&self, action: Action) -> bool {
        let role = self.effective_role();
        let allowed = is_allowed(role, action);

        counter!(
            "access_checks_total",
            "action" => action.to_string(),
            "allowed" => allowed.to_string()
        )
        .increment(1);

        allowed
    }

    /// 当前用户的有效角色
    ///
    /// 仅 Authenticated 且 status == active 的身份有角色
    pub fn effective_role(&self) -> Option<Role> {
        self.session
            .current_identity()
            .filter(|identity| identity.is_active())
            .map(|identity| identity.role)
    }

    /// 当前用户是否需要生物识别门控
    pub fn requires_biometric(&self) -> bool {
        requires_biometric(self.effective_role())
    }

    /// 当前用户能否给目标分配 target_role
    pub fn can_assign_role(&self, target_role: Role) -> bool {
        gavel_access_core::can_assign_role(self.effective_role(), target_role)
    }
}
