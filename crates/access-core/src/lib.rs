//! gavel-access-core - 访问控制核心库
//!
//! 角色层级与权限判定的纯逻辑，不依赖会话状态和 IO

mod policy;
mod role;

pub use policy::*;
pub use role::*;

// 供 require_action! 展开使用
#[doc(hidden)]
pub use gavel_errors::AppError;

use gavel_common::UserId;

/// 生物识别开关在安全存储中的键前缀
pub const BIOMETRIC_ENABLED_KEY: &str = "biometric_enabled";

/// 会话持久化在安全存储中的键
pub const USER_SESSION_KEY: &str = "user_session";

/// 按用户隔离的生物识别开关键
///
/// 键按用户 id 命名空间化，防止同设备上跨用户串号
pub fn biometric_flag_key(user_id: &UserId) -> String {
    format!("{}_{}", BIOMETRIC_ENABLED_KEY, user_id)
}

/// 权限检查宏
///
/// 判定失败时以 Forbidden 返回，供应用服务在入口处使用
#[macro_export]
macro_rules! require_action {
    ($controller:expr, $action:expr) => {
        if !$controller.can($action) {
            return Err($crate::AppError::forbidden(format!(
                "Action not permitted: {}",
                $action
            ))
            .into());
        }
    };
}
