//! 无生物识别能力的设备实现

use async_trait::async_trait;
use gavel_ports::BiometricGate;

/// 缺少生物识别硬件的宿主
///
/// `is_available` 恒为 false，挑战恒失败；SessionManager 会把
/// 开启请求以能力错误拒绝
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBiometricGate;

#[async_trait]
impl BiometricGate for NoopBiometricGate {
    async fn is_available(&self) -> bool {
        false
    }

    async fn challenge(&self, _prompt: &str) -> bool {
        false
    }
}
