//! Gavel Client Core
//!
//! 案件管理移动端的核心库：
//! - `domain`: 实体、值对象、仓储接口（Identity、Case、Document、会话状态机）
//! - `application`: SessionManager、AccessController 与受权限门控的 CRUD 服务
//! - `infrastructure`: 托管后端的 REST 适配器与设备侧实现
//!
//! UI 渲染、导航、推送均不在此 crate 内；所有界面通过
//! [`application::AccessController`] 询问"当前用户能否执行 X"。

pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod error;
pub mod infrastructure;
