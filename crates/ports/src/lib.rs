//! gavel-ports - 外部协作方接口
//!
//! 设备与后端的窄接口定义。OS 安全存储、生物识别、通知投递
//! 都通过这里的 trait 注入，核心逻辑不直接触碰任何平台 API。

mod biometric;
mod notifier;
mod repository;
mod secure_store;

pub use biometric::*;
pub use notifier::*;
pub use repository::*;
pub use secure_store::*;
