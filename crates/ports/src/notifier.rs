//! 通知投递接口

use async_trait::async_trait;
use gavel_errors::AppResult;

/// 通知发送方
///
/// 投递本身由后端的 edge function 完成，这里只负责触发。
/// 调用方按 best-effort 使用：失败记日志，不影响主流程。
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// 给新建用户发送欢迎邮件（含初始凭据）
    async fn send_welcome_email(
        &self,
        to: &str,
        payload: &serde_json::Value,
    ) -> AppResult<()>;
}
