//! gavel-errors - 统一错误处理
//!
//! 客户端核心的跨 crate 错误类型。托管后端的 HTTP 状态码在
//! provider 边界统一映射为 AppError，UI 层只拿到可展示的消息。

use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Failed precondition: {0}")]
    FailedPrecondition(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn external_service(msg: impl Into<String>) -> Self {
        Self::ExternalService(msg.into())
    }

    pub fn failed_precondition(msg: impl Into<String>) -> Self {
        Self::FailedPrecondition(msg.into())
    }

    /// 从托管后端的 HTTP 状态码映射错误
    ///
    /// detail 只用于日志，不会进入用户可见的消息
    pub fn from_provider_status(status: u16, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        match status {
            400 | 422 => Self::Validation(detail),
            401 => Self::Unauthenticated(detail),
            403 => Self::Forbidden(detail),
            404 => Self::NotFound(detail),
            409 => Self::Conflict(detail),
            412 => Self::FailedPrecondition(detail),
            _ => Self::ExternalService(detail),
        }
    }

    /// 是否为认证失效类错误（会话过期、凭据无效）
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Unauthenticated(_) | Self::Unauthorized(_))
    }

    /// 用户可见的消息
    ///
    /// 不暴露 provider 内部细节（token、响应体、堆栈）
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "The requested record was not found.",
            Self::Validation(_) => "The submitted data is invalid.",
            Self::Unauthorized(_) => "Invalid email or password.",
            Self::Unauthenticated(_) => "Your session has expired. Please sign in again.",
            Self::Forbidden(_) => "You do not have permission to perform this action.",
            Self::Conflict(_) => "The record already exists.",
            Self::Internal(_) => "Something went wrong. Please try again.",
            Self::Storage(_) => "Secure storage is temporarily unavailable.",
            Self::ExternalService(_) => "The service is temporarily unavailable.",
            Self::FailedPrecondition(_) => "This action is not available on this device.",
        }
    }
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;
