//! 用户管理服务
//!
//! 档案 CRUD 的权限门控入口。auth 侧用户由 provider 先行创建，
//! 这里只负责档案行与欢迎通知。

use std::sync::Arc;

use gavel_access_core::{Action, Role, require_action};
use gavel_common::UserId;
use gavel_errors::{AppError, AppResult};
use gavel_ports::NotificationSender;
use rand::Rng;
use tracing::{info, warn};

use crate::application::access_controller::AccessController;
use crate::application::session_manager::SessionManager;
use crate::domain::Identity;
use crate::domain::repositories::{ProfilePatch, ProfileRepository};
use crate::domain::value_objects::Email;

const PASSWORD_CHARSET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*";

/// 生成初始密码
pub fn generate_password(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..PASSWORD_CHARSET.len());
            PASSWORD_CHARSET[idx] as char
        })
        .collect()
}

/// 用户管理服务
pub struct UserAdminService {
    session: Arc<SessionManager>,
    controller: Arc<AccessController>,
    profiles: Arc<dyn ProfileRepository>,
    notifier: Arc<dyn NotificationSender>,
}

impl UserAdminService {
    pub fn new(
        session: Arc<SessionManager>,
        controller: Arc<AccessController>,
        profiles: Arc<dyn ProfileRepository>,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            session,
            controller,
            profiles,
            notifier,
        }
    }

    fn actor(&self) -> AppResult<Identity> {
        self.session
            .current_identity()
            .ok_or_else(|| AppError::unauthenticated("No active session"))
    }

    /// 列出用户（读操作；服务端 RLS 兜底过滤）
    pub async fn list_users(&self) -> AppResult<Vec<Identity>> {
        require_action!(self.controller, Action::ManageUsers);
        self.profiles.list().await
    }

    pub async fn get_user(&self, id: &UserId) -> AppResult<Identity> {
        require_action!(self.controller, Action::ManageUsers);
        self.profiles
            .fetch(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// 创建用户档案并发送欢迎邮件
    ///
    /// `user_id` 是 provider 侧已建好的 auth 主体 id。
    /// 角色分配规则：admin 级目标需要 create_admins 特权。
    pub async fn create_user(
        &self,
        user_id: &UserId,
        email: &Email,
        role: Role,
        initial_password: &str,
    ) -> AppResult<Identity> {
        let actor = self.actor()?;

        if !self.controller.can_assign_role(role) {
            return Err(AppError::forbidden(format!(
                "Not permitted to create {} users",
                role
            )));
        }

        let identity = self
            .profiles
            .create(user_id, email, role, &actor.id)
            .await?;

        info!(user_id = %identity.id, role = %role, created_by = %actor.id, "user created");

        // 欢迎邮件 best-effort，不影响创建结果
        let payload = serde_json::json!({
            "email": email.as_str(),
            "password": initial_password,
            "role": role.as_str(),
        });
        if let Err(err) = self.notifier.send_welcome_email(email.as_str(), &payload).await {
            warn!(error = %err, "welcome email failed");
        }

        Ok(identity)
    }

    /// 更新用户（状态、角色）
    ///
    /// 角色提升到 admin 级需要 create_admins 特权
    pub async fn update_user(&self, id: &UserId, patch: ProfilePatch) -> AppResult<Identity> {
        require_action!(self.controller, Action::ManageUsers);

        if let Some(new_role) = patch.role {
            if !self.controller.can_assign_role(new_role) {
                return Err(AppError::forbidden(format!(
                    "Not permitted to assign role {}",
                    new_role
                )));
            }
        }

        if patch.is_empty() {
            return Err(AppError::validation("Empty update"));
        }

        let updated = self.profiles.update(id, patch).await?;
        info!(user_id = %id, "user updated");
        Ok(updated)
    }

    /// 删除用户；不允许删除自己
    pub async fn delete_user(&self, id: &UserId) -> AppResult<()> {
        require_action!(self.controller, Action::ManageUsers);

        let actor = self.actor()?;
        if &actor.id == id {
            return Err(AppError::validation("Cannot delete the signed-in user"));
        }

        self.profiles.delete(id).await?;
        info!(user_id = %id, deleted_by = %actor.id, "user deleted");
        Ok(())
    }
}
