//! 会话管理器
//!
//! 认证身份生命周期的唯一写入方。登录、恢复、登出与生物识别
//! 开关都在这里编排；迁移串行执行，读当前状态永不阻塞。

use std::sync::{Arc, RwLock};

use gavel_access_core::{biometric_flag_key, requires_biometric};
use gavel_common::UserId;
use gavel_errors::{AppError, AppResult};
use gavel_ports::{BiometricGate, SecureStore};
use tracing::{info, warn};

use crate::domain::repositories::{AuthProvider, ProfilePatch, ProfileRepository};
use crate::domain::{Identity, SessionState};
use crate::domain::value_objects::Email;
use crate::error::AuthFlowError;

/// 会话管理器
///
/// 进程级单例，启动时创建一次，随进程存活。所有消费方持有
/// `Arc<SessionManager>`，写入只发生在本类型内部。
pub struct SessionManager {
    auth: Arc<dyn AuthProvider>,
    profiles: Arc<dyn ProfileRepository>,
    secure_store: Arc<dyn SecureStore>,
    biometric: Arc<dyn BiometricGate>,
    biometric_prompt: String,
    /// 状态快照；读多写少，读方拿克隆
    state: RwLock<SessionState>,
    /// 本地生物识别开关（安全存储里的键才是持久权威）
    biometric_enabled: RwLock<bool>,
    /// 串行化迁移：同一时刻至多一个 sign_in/restore/sign_out 在跑
    transition: tokio::sync::Mutex<()>,
}

/// 迁移守卫
///
/// 迁移期间状态置为 Restoring；提交前被取消（future 被 drop）
/// 时回滚到迁移前的状态，保证外界看不到中间态。
struct TransitionGuard<'a> {
    state: &'a RwLock<SessionState>,
    prior: Option<SessionState>,
}

impl<'a> TransitionGuard<'a> {
    fn begin(state: &'a RwLock<SessionState>) -> Self {
        let prior = {
            let mut slot = state.write().expect("session state lock poisoned");
            std::mem::replace(&mut *slot, SessionState::Restoring)
        };
        Self {
            state,
            prior: Some(prior),
        }
    }

    fn commit(mut self, next: SessionState) {
        let mut slot = self.state.write().expect("session state lock poisoned");
        *slot = next;
        self.prior = None;
    }
}

impl Drop for TransitionGuard<'_> {
    fn drop(&mut self) {
        if let Some(prior) = self.prior.take() {
            let mut slot = self.state.write().expect("session state lock poisoned");
            *slot = prior;
        }
    }
}

impl SessionManager {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        profiles: Arc<dyn ProfileRepository>,
        secure_store: Arc<dyn SecureStore>,
        biometric: Arc<dyn BiometricGate>,
    ) -> Self {
        Self {
            auth,
            profiles,
            secure_store,
            biometric,
            biometric_prompt: "Authenticate to access Court Management".to_string(),
            state: RwLock::new(SessionState::Unauthenticated),
            biometric_enabled: RwLock::new(false),
            transition: tokio::sync::Mutex::new(()),
        }
    }

    pub fn with_biometric_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.biometric_prompt = prompt.into();
        self
    }

    /// 当前状态快照
    pub fn state(&self) -> SessionState {
        self.state.read().expect("session state lock poisoned").clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.state().identity().cloned()
    }

    /// 本地生物识别开关
    pub fn is_biometric_enabled(&self) -> bool {
        *self
            .biometric_enabled
            .read()
            .expect("biometric flag lock poisoned")
    }

    /// 上次失败原因（AuthFailed 态），供 UI 展示
    pub fn last_failure(&self) -> Option<String> {
        match self.state() {
            SessionState::AuthFailed(reason) => Some(reason),
            _ => None,
        }
    }

    /// 邮箱密码登录
    ///
    /// 协议：换会话 → 按 subject id 取档案 → 读本地生物识别开关，
    /// 三步全部成功才提交 Authenticated；任何一步失败都落在
    /// AuthFailed（等价未认证），不产生部分提交。
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<Identity> {
        let email = Email::new(email).map_err(|e| AppError::validation(e.to_string()))?;

        let _serial = self.transition.lock().await;
        let guard = TransitionGuard::begin(&self.state);

        match self.sign_in_inner(&email, password).await {
            Ok((identity, flag)) => {
                info!(user_id = %identity.id, role = %identity.role, "sign-in committed");
                *self
                    .biometric_enabled
                    .write()
                    .expect("biometric flag lock poisoned") = flag;
                guard.commit(SessionState::Authenticated(identity.clone()));
                Ok(identity)
            }
            Err(err) => {
                let flow: AuthFlowError = err.into();
                warn!(error = %flow, "sign-in failed");
                guard.commit(SessionState::AuthFailed(flow.to_string()));
                Err(flow.into())
            }
        }
    }

    async fn sign_in_inner(
        &self,
        email: &Email,
        password: &str,
    ) -> AppResult<(Identity, bool)> {
        let session = self.auth.sign_in_with_password(email, password).await?;

        let identity = self
            .profiles
            .fetch(&session.subject_id)
            .await?
            .ok_or(AuthFlowError::ProfileMissing)?;

        let flag = self.read_biometric_flag(&identity.id).await;
        Ok((identity, flag))
    }

    /// 应用启动时恢复会话
    ///
    /// 无持久化会话 → `Ok(false)`，不算错误；会话被 provider
    /// 拒绝 → `Err(SessionExpired)`。检查因网络等瞬时原因失败
    /// → 原错误原样上抛，持久化会话保留。三者都回到 Unauthenticated。
    pub async fn restore(&self) -> AppResult<bool> {
        let _serial = self.transition.lock().await;
        let guard = TransitionGuard::begin(&self.state);

        let session = match self.auth.get_session().await {
            Ok(Some(session)) => session,
            Ok(None) => {
                guard.commit(SessionState::Unauthenticated);
                return Ok(false);
            }
            Err(err) if err.is_auth_error() => {
                warn!(error = %err, "persisted session rejected by provider");
                guard.commit(SessionState::Unauthenticated);
                return Err(AuthFlowError::SessionExpired.into());
            }
            Err(err) => {
                // 会话检查失败不等于会话失效：持久化会话保留，可重试
                let flow: AuthFlowError = err.into();
                warn!(error = %flow, "session check failed, restore can be retried");
                guard.commit(SessionState::Unauthenticated);
                return Err(flow.into());
            }
        };

        match self.finish_restore(&session.subject_id).await {
            Ok((identity, flag)) => {
                info!(user_id = %identity.id, "session restored");
                *self
                    .biometric_enabled
                    .write()
                    .expect("biometric flag lock poisoned") = flag;
                guard.commit(SessionState::Authenticated(identity));
                Ok(true)
            }
            Err(err) => {
                let flow: AuthFlowError = err.into();
                warn!(error = %flow, "session restore failed");
                guard.commit(SessionState::AuthFailed(flow.to_string()));
                Err(flow.into())
            }
        }
    }

    async fn finish_restore(&self, subject_id: &UserId) -> AppResult<(Identity, bool)> {
        let identity = self
            .profiles
            .fetch(subject_id)
            .await?
            .ok_or(AuthFlowError::ProfileMissing)?;

        let flag = self.read_biometric_flag(&identity.id).await;
        Ok((identity, flag))
    }

    /// 登出
    ///
    /// 远端注销与本地开关清理都是 best-effort：任一失败只记日志，
    /// 本地状态总会回到 Unauthenticated。
    pub async fn sign_out(&self) -> AppResult<()> {
        let _serial = self.transition.lock().await;
        let guard = TransitionGuard::begin(&self.state);

        let outgoing = match guard.prior {
            Some(SessionState::Authenticated(ref identity)) => Some(identity.id.clone()),
            _ => None,
        };

        if let Err(err) = self.auth.sign_out().await {
            warn!(error = %err, "remote sign-out failed, clearing local state anyway");
        }

        if let Some(user_id) = outgoing {
            let key = biometric_flag_key(&user_id);
            if let Err(err) = self.secure_store.delete(&key).await {
                warn!(error = %err, key, "failed to clear biometric flag on sign-out");
            }
        }

        *self
            .biometric_enabled
            .write()
            .expect("biometric flag lock poisoned") = false;
        guard.commit(SessionState::Unauthenticated);
        info!("signed out");
        Ok(())
    }

    /// 外部失效（API 调用被 provider 以认证错误拒绝时调用）
    ///
    /// 惰性检测：没有推送式吊销。不自动用旧凭据重试。
    pub async fn on_provider_rejection(&self) {
        let _serial = self.transition.lock().await;
        let mut slot = self.state.write().expect("session state lock poisoned");
        if slot.is_authenticated() {
            warn!("provider rejected an authenticated call, dropping session");
            *slot = SessionState::Unauthenticated;
        }
    }

    /// 开启生物识别门控
    ///
    /// 仅对需要门控的角色开放；先查设备能力，再过本地挑战，
    /// 通过后写入本地开关并 best-effort 镜像到远端档案。
    pub async fn enable_biometric(&self) -> AppResult<()> {
        let identity = self
            .current_identity()
            .ok_or_else(|| AppError::unauthenticated("No active session"))?;

        if !requires_biometric(Some(identity.role)) {
            return Err(AppError::forbidden(
                "Biometric gating does not apply to this role",
            ));
        }

        if !self.biometric.is_available().await {
            return Err(AuthFlowError::BiometricUnavailable.into());
        }

        if !self.biometric.challenge(&self.biometric_prompt).await {
            return Err(AuthFlowError::BiometricChallengeFailed.into());
        }

        let key = biometric_flag_key(&identity.id);
        if let Err(err) = self.secure_store.set(&key, "true").await {
            warn!(error = %err, key, "failed to persist biometric flag");
        }
        *self
            .biometric_enabled
            .write()
            .expect("biometric flag lock poisoned") = true;

        self.mirror_biometric_flag(&identity.id, true).await;
        info!(user_id = %identity.id, "biometric gating enabled");
        Ok(())
    }

    /// 关闭生物识别门控
    ///
    /// 不设挑战：已登录会话本身即授权（降级动作，非越权）
    pub async fn disable_biometric(&self) -> AppResult<()> {
        let identity = self
            .current_identity()
            .ok_or_else(|| AppError::unauthenticated("No active session"))?;

        let key = biometric_flag_key(&identity.id);
        if let Err(err) = self.secure_store.delete(&key).await {
            warn!(error = %err, key, "failed to clear biometric flag");
        }
        *self
            .biometric_enabled
            .write()
            .expect("biometric flag lock poisoned") = false;

        self.mirror_biometric_flag(&identity.id, false).await;
        info!(user_id = %identity.id, "biometric gating disabled");
        Ok(())
    }

    /// 受门控界面入场前的本地挑战
    ///
    /// 开关未开或角色豁免时直接放行
    pub async fn pass_biometric_gate(&self) -> bool {
        let Some(identity) = self.current_identity() else {
            return false;
        };
        if !requires_biometric(Some(identity.role)) || !self.is_biometric_enabled() {
            return true;
        }
        self.biometric.challenge(&self.biometric_prompt).await
    }

    /// 读取本地生物识别开关；读失败视为未开启
    async fn read_biometric_flag(&self, user_id: &UserId) -> bool {
        let key = biometric_flag_key(user_id);
        match self.secure_store.get(&key).await {
            Ok(value) => value.as_deref() == Some("true"),
            Err(err) => {
                warn!(error = %err, key, "biometric flag read failed, treating as absent");
                false
            }
        }
    }

    /// 远端档案上的开关只是展示性副本，失败不影响本地结果
    async fn mirror_biometric_flag(&self, user_id: &UserId, enabled: bool) {
        let patch = ProfilePatch {
            biometric_enabled: Some(enabled),
            ..ProfilePatch::default()
        };
        if let Err(err) = self.profiles.update(user_id, patch).await {
            warn!(error = %err, "failed to mirror biometric flag to profile");
        }
    }
}
