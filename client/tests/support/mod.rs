//! 测试支撑：端口的手写 mock 与装配
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use gavel_access_core::Role;
use gavel_common::UserId;
use gavel_errors::{AppError, AppResult};
use gavel_ports::{BiometricGate, NotificationSender};
use tokio::sync::Mutex;

use gavel_client::application::{AccessController, SessionManager};
use gavel_client::domain::repositories::{
    AuthProvider, ProfilePatch, ProfileRepository,
};
use gavel_client::domain::value_objects::Email;
use gavel_client::domain::{Identity, ProviderSession, UserStatus};
use gavel_client::infrastructure::MemorySecureStore;

pub const PASSWORD: &str = "correct horse battery staple";

pub fn identity(id: UserId, role: Role, status: UserStatus) -> Identity {
    let now = Utc::now();
    Identity {
        id,
        email: Email::new("actor@example.com").unwrap(),
        role,
        status,
        biometric_enabled: false,
        created_by: None,
        created_at: now,
        updated_at: now,
    }
}

/// 认证 provider mock
pub struct MockAuthProvider {
    pub subject_id: UserId,
    /// get_session 返回的持久化会话
    pub persisted: Mutex<Option<ProviderSession>>,
    /// 持久化会话被 provider 拒绝（过期/吊销）
    pub reject_persisted: AtomicBool,
    /// 会话检查瞬时失败（网络不可达），会话本身仍有效
    pub fail_session_check: AtomicBool,
    pub fail_sign_out: AtomicBool,
    pub sign_out_calls: AtomicUsize,
}

impl MockAuthProvider {
    pub fn new(subject_id: UserId) -> Self {
        Self {
            subject_id,
            persisted: Mutex::new(None),
            reject_persisted: AtomicBool::new(false),
            fail_session_check: AtomicBool::new(false),
            fail_sign_out: AtomicBool::new(false),
            sign_out_calls: AtomicUsize::new(0),
        }
    }

    pub fn session(&self) -> ProviderSession {
        ProviderSession {
            access_token: "opaque-token".to_string(),
            refresh_token: None,
            expires_at: None,
            subject_id: self.subject_id.clone(),
        }
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn sign_in_with_password(
        &self,
        _email: &Email,
        password: &str,
    ) -> AppResult<ProviderSession> {
        if password != PASSWORD {
            return Err(AppError::unauthorized("Invalid login credentials"));
        }
        Ok(self.session())
    }

    async fn get_session(&self) -> AppResult<Option<ProviderSession>> {
        if self.fail_session_check.load(Ordering::SeqCst) {
            return Err(AppError::external_service("auth endpoint unreachable"));
        }
        if self.reject_persisted.load(Ordering::SeqCst) {
            return Err(AppError::unauthenticated("Persisted session rejected"));
        }
        Ok(self.persisted.lock().await.clone())
    }

    async fn sign_out(&self) -> AppResult<()> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(AppError::external_service("logout endpoint unreachable"));
        }
        Ok(())
    }
}

/// 档案仓储 mock
pub struct MockProfileRepository {
    pub profiles: Mutex<HashMap<UserId, Identity>>,
    pub patches: Mutex<Vec<(UserId, ProfilePatch)>>,
}

impl MockProfileRepository {
    pub fn new() -> Self {
        Self {
            profiles: Mutex::new(HashMap::new()),
            patches: Mutex::new(Vec::new()),
        }
    }

    pub async fn insert(&self, identity: Identity) {
        self.profiles
            .lock()
            .await
            .insert(identity.id.clone(), identity);
    }
}

#[async_trait]
impl ProfileRepository for MockProfileRepository {
    async fn fetch(&self, id: &UserId) -> AppResult<Option<Identity>> {
        Ok(self.profiles.lock().await.get(id).cloned())
    }

    async fn list(&self) -> AppResult<Vec<Identity>> {
        Ok(self.profiles.lock().await.values().cloned().collect())
    }

    async fn create(
        &self,
        id: &UserId,
        email: &Email,
        role: Role,
        created_by: &UserId,
    ) -> AppResult<Identity> {
        let now = Utc::now();
        let created = Identity {
            id: id.clone(),
            email: email.clone(),
            role,
            status: UserStatus::Active,
            biometric_enabled: false,
            created_by: Some(created_by.clone()),
            created_at: now,
            updated_at: now,
        };
        self.insert(created.clone()).await;
        Ok(created)
    }

    async fn update(&self, id: &UserId, patch: ProfilePatch) -> AppResult<Identity> {
        self.patches.lock().await.push((id.clone(), patch.clone()));

        let mut profiles = self.profiles.lock().await;
        let identity = profiles
            .get_mut(id)
            .ok_or_else(|| AppError::not_found("User not found"))?;
        if let Some(role) = patch.role {
            identity.role = role;
        }
        if let Some(status) = patch.status {
            identity.status = status;
        }
        if let Some(flag) = patch.biometric_enabled {
            identity.biometric_enabled = flag;
        }
        Ok(identity.clone())
    }

    async fn delete(&self, id: &UserId) -> AppResult<()> {
        self.profiles.lock().await.remove(id);
        Ok(())
    }
}

/// 生物识别门 mock
pub struct MockBiometricGate {
    pub available: AtomicBool,
    pub challenge_ok: AtomicBool,
    pub challenges: AtomicUsize,
}

impl MockBiometricGate {
    pub fn new(available: bool, challenge_ok: bool) -> Self {
        Self {
            available: AtomicBool::new(available),
            challenge_ok: AtomicBool::new(challenge_ok),
            challenges: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl BiometricGate for MockBiometricGate {
    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn challenge(&self, _prompt: &str) -> bool {
        self.challenges.fetch_add(1, Ordering::SeqCst);
        self.challenge_ok.load(Ordering::SeqCst)
    }
}

/// 通知 mock
pub struct MockNotifier {
    pub sent: Mutex<Vec<(String, serde_json::Value)>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl NotificationSender for MockNotifier {
    async fn send_welcome_email(
        &self,
        to: &str,
        payload: &serde_json::Value,
    ) -> AppResult<()> {
        self.sent
            .lock()
            .await
            .push((to.to_string(), payload.clone()));
        Ok(())
    }
}

/// 一套装配好的会话栈
pub struct Harness {
    pub manager: Arc<SessionManager>,
    pub controller: Arc<AccessController>,
    pub auth: Arc<MockAuthProvider>,
    pub profiles: Arc<MockProfileRepository>,
    pub store: Arc<MemorySecureStore>,
    pub gate: Arc<MockBiometricGate>,
    pub subject_id: UserId,
}

/// 以给定角色/状态的档案装配会话栈（未登录状态起步）
pub async fn harness(role: Role, status: UserStatus) -> Harness {
    let subject_id = UserId::new();
    let auth = Arc::new(MockAuthProvider::new(subject_id.clone()));
    let profiles = Arc::new(MockProfileRepository::new());
    profiles
        .insert(identity(subject_id.clone(), role, status))
        .await;
    let store = Arc::new(MemorySecureStore::new());
    let gate = Arc::new(MockBiometricGate::new(true, true));

    let manager = Arc::new(SessionManager::new(
        auth.clone(),
        profiles.clone(),
        store.clone(),
        gate.clone(),
    ));
    let controller = Arc::new(AccessController::new(manager.clone()));

    Harness {
        manager,
        controller,
        auth,
        profiles,
        store,
        gate,
        subject_id,
    }
}

/// 装配并登录
pub async fn signed_in_harness(role: Role, status: UserStatus) -> Harness {
    let harness = harness(role, status).await;
    harness
        .manager
        .sign_in("actor@example.com", PASSWORD)
        .await
        .expect("sign-in should succeed");
    harness
}
