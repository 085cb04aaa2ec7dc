//! 认证 provider 接口

use async_trait::async_trait;
use gavel_errors::AppResult;

use crate::domain::session::ProviderSession;
use crate::domain::value_objects::Email;

/// 托管认证服务
///
/// 会话的密码学处理完全委托给 provider；核心只关心
/// "换取会话、取回会话、注销会话"三件事。
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// 用邮箱密码换取会话
    ///
    /// 凭据无效 → `AppError::Unauthorized`
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> AppResult<ProviderSession>;

    /// 取回持久化的会话
    ///
    /// 无会话 → `Ok(None)`；会话存在但已被 provider 拒绝 →
    /// `AppError::Unauthenticated`
    async fn get_session(&self) -> AppResult<Option<ProviderSession>>;

    /// 注销远端会话（best-effort；本地状态不依赖其成败）
    async fn sign_out(&self) -> AppResult<()>;
}
