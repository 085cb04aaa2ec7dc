//! 用户档案仓储接口

use async_trait::async_trait;
use gavel_access_core::Role;
use gavel_common::UserId;
use gavel_errors::AppResult;

use crate::domain::identity::{Identity, UserStatus};
use crate::domain::value_objects::Email;

/// 对用户档案的部分更新
///
/// 角色、状态只能经由显式的更新操作改变
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
    pub biometric_enabled: Option<bool>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.role.is_none() && self.status.is_none() && self.biometric_enabled.is_none()
    }
}

/// 用户档案仓储
///
/// 返回的 Identity 一律经过边界处的行归一化；
/// RLS 在服务端兜底，这里不重复其裁决。
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// 按 auth 主体 id 拉取档案；不存在 → `Ok(None)`
    async fn fetch(&self, id: &UserId) -> AppResult<Option<Identity>>;

    /// 列出全部档案（服务端按 RLS 过滤）
    async fn list(&self) -> AppResult<Vec<Identity>>;

    /// 创建档案（auth 侧用户已由 provider 先行建立）
    async fn create(
        &self,
        id: &UserId,
        email: &Email,
        role: Role,
        created_by: &UserId,
    ) -> AppResult<Identity>;

    /// 部分更新
    async fn update(&self, id: &UserId, patch: ProfilePatch) -> AppResult<Identity>;

    /// 删除档案
    async fn delete(&self, id: &UserId) -> AppResult<()>;
}
