//! 设备生物识别接口

use async_trait::async_trait;

/// 本地生物识别门
///
/// 对应 OS 的生物识别 API。实现不向核心抛错：内部错误一律
/// 折叠为 `false`，核心将 `challenge() == false` 当作"拒绝本次
/// 受限操作"，而不是致命错误。
#[async_trait]
pub trait BiometricGate: Send + Sync {
    /// 硬件存在且用户已录入
    async fn is_available(&self) -> bool;

    /// 发起本地生物识别/口令挑战
    ///
    /// 成功/取消/失败折叠为布尔
    async fn challenge(&self, prompt: &str) -> bool;
}
