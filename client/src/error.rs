//! 认证流程错误

use gavel_errors::AppError;
use thiserror::Error;

/// 会话生命周期相关的错误分类
///
/// 全部可本地恢复：状态机在返回前已回到一个终态
/// （Unauthenticated / AuthFailed），不会停在中间态。
#[derive(Debug, Error)]
pub enum AuthFlowError {
    /// 登录时邮箱或密码无效
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// 认证成功但不存在对应的用户档案
    ///
    /// 绝不携带残缺身份静默登录
    #[error("Authenticated user has no profile record")]
    ProfileMissing,

    /// 设备缺少生物识别硬件或未录入
    #[error("Biometric authentication is not available on this device")]
    BiometricUnavailable,

    /// 用户取消或未通过本地挑战；开关不生效，不算安全事件
    #[error("Biometric challenge was not passed")]
    BiometricChallengeFailed,

    /// 持久化的会话已被 provider 拒绝，需要重新登录
    #[error("Session expired")]
    SessionExpired,

    /// 安全存储读写瞬时失败，best-effort 处理
    #[error("Secure storage unavailable: {0}")]
    Storage(String),

    /// provider 侧的其他错误
    #[error("Provider error: {0}")]
    Provider(String),
}

impl From<AuthFlowError> for AppError {
    fn from(error: AuthFlowError) -> Self {
        match error {
            AuthFlowError::InvalidCredentials => {
                AppError::Unauthorized("Invalid email or password".to_string())
            }
            AuthFlowError::ProfileMissing => {
                AppError::NotFound("Profile record not found for authenticated user".to_string())
            }
            AuthFlowError::BiometricUnavailable => AppError::FailedPrecondition(
                "Biometric authentication is not available".to_string(),
            ),
            AuthFlowError::BiometricChallengeFailed => {
                AppError::Forbidden("Biometric challenge was not passed".to_string())
            }
            AuthFlowError::SessionExpired => {
                AppError::Unauthenticated("Session expired".to_string())
            }
            AuthFlowError::Storage(msg) => AppError::Storage(msg),
            AuthFlowError::Provider(msg) => AppError::ExternalService(msg),
        }
    }
}

impl From<AppError> for AuthFlowError {
    fn from(error: AppError) -> Self {
        match error {
            AppError::Unauthorized(_) => AuthFlowError::InvalidCredentials,
            AppError::Unauthenticated(_) => AuthFlowError::SessionExpired,
            AppError::NotFound(_) => AuthFlowError::ProfileMissing,
            AppError::Storage(msg) => AuthFlowError::Storage(msg),
            other => AuthFlowError::Provider(other.to_string()),
        }
    }
}
