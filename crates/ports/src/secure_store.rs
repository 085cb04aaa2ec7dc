//! OS 安全存储接口

use async_trait::async_trait;
use gavel_errors::AppResult;

/// 安全键值存储
///
/// 键按用途和用户 id 命名空间化（如 `biometric_enabled_<user_id>`），
/// 值为普通字符串，布尔以 `"true"` 编码、缺失即 false。
/// 任何操作都可能失败（设备锁定、存储不可用）；调用方约定：
/// 读失败视为"键不存在"，写失败记日志后继续，均不致命。
#[async_trait]
pub trait SecureStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> AppResult<()>;

    async fn delete(&self, key: &str) -> AppResult<()>;
}
