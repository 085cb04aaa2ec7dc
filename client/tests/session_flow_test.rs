//! 会话生命周期集成测试

mod support;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use gavel_access_core::{Role, biometric_flag_key};
use gavel_errors::{AppError, AppResult};
use gavel_ports::SecureStore;

use gavel_client::application::SessionManager;
use gavel_client::domain::repositories::AuthProvider;
use gavel_client::domain::value_objects::Email;
use gavel_client::domain::{ProviderSession, SessionState, UserStatus};
use gavel_client::infrastructure::{MemorySecureStore, NoopBiometricGate};

use support::{MockProfileRepository, PASSWORD, harness, signed_in_harness};

#[tokio::test]
async fn test_restore_without_persisted_session_is_quiet() {
    let h = harness(Role::Staff, UserStatus::Active).await;

    let restored = h.manager.restore().await.unwrap();

    assert!(!restored);
    assert_eq!(h.manager.state(), SessionState::Unauthenticated);
    assert!(h.manager.last_failure().is_none());
}

#[tokio::test]
async fn test_restore_with_valid_session_authenticates() {
    let h = harness(Role::Admin, UserStatus::Active).await;
    *h.auth.persisted.lock().await = Some(h.auth.session());

    let restored = h.manager.restore().await.unwrap();

    assert!(restored);
    assert!(h.manager.is_authenticated());
    assert_eq!(h.manager.current_identity().unwrap().id, h.subject_id);
}

#[tokio::test]
async fn test_restore_with_rejected_session_requires_fresh_sign_in() {
    let h = harness(Role::Staff, UserStatus::Active).await;
    h.auth.reject_persisted.store(true, Ordering::SeqCst);

    let err = h.manager.restore().await.unwrap_err();

    assert!(matches!(err, AppError::Unauthenticated(_)));
    assert_eq!(h.manager.state(), SessionState::Unauthenticated);
    assert!(!h.manager.is_authenticated());
}

#[tokio::test]
async fn test_restore_after_transient_check_failure_keeps_session() {
    let h = harness(Role::Admin, UserStatus::Active).await;
    *h.auth.persisted.lock().await = Some(h.auth.session());
    h.auth.fail_session_check.store(true, Ordering::SeqCst);

    let err = h.manager.restore().await.unwrap_err();

    // 检查失败不是会话失效：错误不可报成「已过期」
    assert!(matches!(err, AppError::ExternalService(_)));
    assert_eq!(h.manager.state(), SessionState::Unauthenticated);
    assert!(h.auth.persisted.lock().await.is_some());

    // 网络恢复后同一会话直接恢复成功
    h.auth.fail_session_check.store(false, Ordering::SeqCst);
    let restored = h.manager.restore().await.unwrap();
    assert!(restored);
    assert!(h.manager.is_authenticated());
}

#[tokio::test]
async fn test_sign_in_success_commits_authenticated() {
    let h = harness(Role::Staff, UserStatus::Active).await;

    let identity = h
        .manager
        .sign_in("actor@example.com", PASSWORD)
        .await
        .unwrap();

    assert_eq!(identity.role, Role::Staff);
    assert!(h.manager.is_authenticated());
    assert_eq!(h.manager.current_identity().unwrap().id, h.subject_id);
}

#[tokio::test]
async fn test_sign_in_wrong_password_lands_in_auth_failed() {
    let h = harness(Role::Staff, UserStatus::Active).await;

    let err = h
        .manager
        .sign_in("actor@example.com", "wrong")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Unauthorized(_)));
    assert!(!h.manager.is_authenticated());
    assert!(h.manager.last_failure().is_some());

    // AuthFailed 不是终点：换对的密码可以直接重试
    h.manager
        .sign_in("actor@example.com", PASSWORD)
        .await
        .unwrap();
    assert!(h.manager.is_authenticated());
}

#[tokio::test]
async fn test_sign_in_rejects_malformed_email_before_provider() {
    let h = harness(Role::Staff, UserStatus::Active).await;

    let err = h.manager.sign_in("not-an-email", PASSWORD).await.unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(h.manager.state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn test_sign_in_without_profile_never_authenticates() {
    let h = harness(Role::Staff, UserStatus::Active).await;
    h.profiles.profiles.lock().await.clear();

    let err = h
        .manager
        .sign_in("actor@example.com", PASSWORD)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    assert!(!h.manager.is_authenticated());
    assert!(h.manager.current_identity().is_none());
}

#[tokio::test]
async fn test_sign_in_picks_up_persisted_biometric_flag() {
    let h = harness(Role::Admin, UserStatus::Active).await;
    let key = biometric_flag_key(&h.subject_id);
    h.store.set(&key, "true").await.unwrap();

    h.manager
        .sign_in("actor@example.com", PASSWORD)
        .await
        .unwrap();

    assert!(h.manager.is_biometric_enabled());
}

#[tokio::test]
async fn test_sign_out_clears_flag_even_when_remote_fails() {
    let h = signed_in_harness(Role::Admin, UserStatus::Active).await;
    h.manager.enable_biometric().await.unwrap();
    h.auth.fail_sign_out.store(true, Ordering::SeqCst);

    h.manager.sign_out().await.unwrap();

    assert_eq!(h.manager.state(), SessionState::Unauthenticated);
    assert!(!h.manager.is_biometric_enabled());
    let key = biometric_flag_key(&h.subject_id);
    assert_eq!(h.store.get(&key).await.unwrap(), None);
    assert_eq!(h.auth.sign_out_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_provider_rejection_drops_session() {
    let h = signed_in_harness(Role::Staff, UserStatus::Active).await;

    h.manager.on_provider_rejection().await;

    assert_eq!(h.manager.state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn test_enable_biometric_for_staff_is_forbidden() {
    let h = signed_in_harness(Role::Staff, UserStatus::Active).await;

    let err = h.manager.enable_biometric().await.unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
    assert!(!h.manager.is_biometric_enabled());
    assert_eq!(h.gate.challenges.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_enable_biometric_without_hardware_leaves_flag_off() {
    let h = signed_in_harness(Role::Admin, UserStatus::Active).await;
    h.gate.available.store(false, Ordering::SeqCst);

    let err = h.manager.enable_biometric().await.unwrap_err();

    assert!(matches!(err, AppError::FailedPrecondition(_)));
    assert!(!h.manager.is_biometric_enabled());
    let key = biometric_flag_key(&h.subject_id);
    assert_eq!(h.store.get(&key).await.unwrap(), None);
}

#[tokio::test]
async fn test_enable_biometric_failed_challenge_leaves_flag_off() {
    let h = signed_in_harness(Role::Admin, UserStatus::Active).await;
    h.gate.challenge_ok.store(false, Ordering::SeqCst);

    let err = h.manager.enable_biometric().await.unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
    assert!(!h.manager.is_biometric_enabled());
    assert_eq!(h.gate.challenges.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_enable_biometric_persists_and_mirrors() {
    let h = signed_in_harness(Role::SuperAdmin, UserStatus::Active).await;

    h.manager.enable_biometric().await.unwrap();

    assert!(h.manager.is_biometric_enabled());
    let key = biometric_flag_key(&h.subject_id);
    assert_eq!(h.store.get(&key).await.unwrap(), Some("true".to_string()));

    let patches = h.profiles.patches.lock().await;
    assert!(
        patches
            .iter()
            .any(|(id, patch)| id == &h.subject_id && patch.biometric_enabled == Some(true))
    );
}

#[tokio::test]
async fn test_disable_biometric_skips_challenge() {
    let h = signed_in_harness(Role::Admin, UserStatus::Active).await;
    h.manager.enable_biometric().await.unwrap();
    let challenges_after_enable = h.gate.challenges.load(Ordering::SeqCst);

    // 挑战从此必败也不妨碍降级
    h.gate.challenge_ok.store(false, Ordering::SeqCst);
    h.manager.disable_biometric().await.unwrap();

    assert!(!h.manager.is_biometric_enabled());
    assert_eq!(h.gate.challenges.load(Ordering::SeqCst), challenges_after_enable);
    let key = biometric_flag_key(&h.subject_id);
    assert_eq!(h.store.get(&key).await.unwrap(), None);
}

#[tokio::test]
async fn test_biometric_gate_passes_when_flag_off_or_role_exempt() {
    let staff = signed_in_harness(Role::Staff, UserStatus::Active).await;
    staff.gate.challenge_ok.store(false, Ordering::SeqCst);
    assert!(staff.manager.pass_biometric_gate().await);

    let admin = signed_in_harness(Role::Admin, UserStatus::Active).await;
    assert!(admin.manager.pass_biometric_gate().await);

    admin.manager.enable_biometric().await.unwrap();
    admin.gate.challenge_ok.store(false, Ordering::SeqCst);
    assert!(!admin.manager.pass_biometric_gate().await);
}

#[tokio::test]
async fn test_concurrent_transitions_serialize_to_a_terminal_state() {
    let h = harness(Role::Staff, UserStatus::Active).await;
    let manager = h.manager.clone();

    let a = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.sign_in("actor@example.com", PASSWORD).await })
    };
    let b = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.sign_in("actor@example.com", PASSWORD).await })
    };

    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    assert!(manager.is_authenticated());
    assert!(!matches!(manager.state(), SessionState::Restoring));
}

/// 永不返回的 provider，用于观察迁移中途被取消
struct StalledAuthProvider;

#[async_trait]
impl AuthProvider for StalledAuthProvider {
    async fn sign_in_with_password(
        &self,
        _email: &Email,
        _password: &str,
    ) -> AppResult<ProviderSession> {
        futures::future::pending().await
    }

    async fn get_session(&self) -> AppResult<Option<ProviderSession>> {
        Ok(None)
    }

    async fn sign_out(&self) -> AppResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_cancelled_transition_rolls_back() {
    let manager = Arc::new(SessionManager::new(
        Arc::new(StalledAuthProvider),
        Arc::new(MockProfileRepository::new()),
        Arc::new(MemorySecureStore::new()),
        Arc::new(NoopBiometricGate),
    ));

    let task = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.sign_in("actor@example.com", PASSWORD).await })
    };

    // 等任务卡进 provider 调用
    for _ in 0..8 {
        tokio::task::yield_now().await;
        if matches!(manager.state(), SessionState::Restoring) {
            break;
        }
    }
    assert_eq!(manager.state(), SessionState::Restoring);

    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());

    // 守卫随取消回滚，不留下中间态
    assert_eq!(manager.state(), SessionState::Unauthenticated);
}
