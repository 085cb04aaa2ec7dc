//! 认证适配器

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use gavel_access_core::USER_SESSION_KEY;
use gavel_common::UserId;
use gavel_errors::{AppError, AppResult};
use gavel_ports::SecureStore;
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use super::client::SupabaseClient;
use crate::domain::ProviderSession;
use crate::domain::repositories::AuthProvider;
use crate::domain::value_objects::Email;

/// auth API 的令牌响应
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    user: TokenUser,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: Uuid,
}

/// 托管认证服务适配器
///
/// 会话 JSON 持久化在安全存储的 `user_session` 键下；
/// token 内容对上层保持不透明。
pub struct SupabaseAuthProvider {
    client: Arc<SupabaseClient>,
    store: Arc<dyn SecureStore>,
}

impl SupabaseAuthProvider {
    pub fn new(client: Arc<SupabaseClient>, store: Arc<dyn SecureStore>) -> Self {
        Self { client, store }
    }

    fn session_from_token(&self, token: TokenResponse) -> ProviderSession {
        ProviderSession {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: token
                .expires_in
                .map(|secs| Utc::now() + Duration::seconds(secs)),
            subject_id: UserId::from_uuid(token.user.id),
        }
    }

    async fn persist_session(&self, session: &ProviderSession) {
        match serde_json::to_string(session) {
            Ok(json) => {
                if let Err(err) = self.store.set(USER_SESSION_KEY, &json).await {
                    warn!(error = %err, "failed to persist session");
                }
            }
            Err(err) => warn!(error = %err, "session serialization failed"),
        }
    }

    async fn clear_persisted_session(&self) {
        if let Err(err) = self.store.delete(USER_SESSION_KEY).await {
            warn!(error = %err, "failed to clear persisted session");
        }
    }

    /// 用持久化的 token 向 provider 校验会话仍然有效
    async fn validate_remote(&self, session: &ProviderSession) -> AppResult<()> {
        let url = self.client.endpoint("auth/v1/user")?;
        let mut headers = self.client.auth_headers().await?;
        headers.insert(
            reqwest::header::AUTHORIZATION,
            format!("Bearer {}", session.access_token)
                .parse()
                .map_err(|_| AppError::internal("Invalid bearer header"))?,
        );

        let response = self
            .client
            .http()
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| AppError::external_service(e.to_string()))?;

        self.client.check(response).await.map(|_| ())
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuthProvider {
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> AppResult<ProviderSession> {
        let url = self.client.endpoint("auth/v1/token?grant_type=password")?;
        let headers = self.client.auth_headers().await?;

        let response = self
            .client
            .http()
            .post(url)
            .headers(headers)
            .json(&serde_json::json!({
                "email": email.as_str(),
                "password": password,
            }))
            .send()
            .await
            .map_err(|e| AppError::external_service(e.to_string()))?;

        // auth API 对坏凭据返回 400；统一成 Unauthorized
        if response.status().as_u16() == 400 {
            let _ = response.text().await;
            return Err(AppError::unauthorized("Invalid login credentials"));
        }

        let response = self.client.check(response).await?;
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::external_service(format!("Malformed token response: {}", e)))?;

        let session = self.session_from_token(token);
        self.persist_session(&session).await;
        self.client.set_access_token(&session.access_token).await;
        Ok(session)
    }

    async fn get_session(&self) -> AppResult<Option<ProviderSession>> {
        let stored = match self.store.get(USER_SESSION_KEY).await {
            Ok(value) => value,
            Err(err) => {
                // 读失败视为无会话，不升级为恢复错误
                warn!(error = %err, "session read failed, treating as absent");
                return Ok(None);
            }
        };

        let Some(json) = stored else {
            return Ok(None);
        };

        let session: ProviderSession = match serde_json::from_str(&json) {
            Ok(session) => session,
            Err(err) => {
                warn!(error = %err, "persisted session unreadable, discarding");
                self.clear_persisted_session().await;
                return Ok(None);
            }
        };

        // 本地可判的过期直接丢弃，省一次注定失败的往返
        if session.is_locally_expired() {
            self.clear_persisted_session().await;
            return Err(AppError::unauthenticated("Persisted session expired"));
        }

        if let Err(err) = self.validate_remote(&session).await {
            if err.is_auth_error() {
                // provider 明确拒绝才算失效，此时才丢弃持久化会话
                self.clear_persisted_session().await;
                self.client.clear_access_token().await;
                return Err(AppError::unauthenticated("Persisted session rejected"));
            }
            // 瞬时失败（网络、5xx）不动持久化会话，下次启动重试
            warn!(error = %err, "session check failed transiently, keeping persisted session");
            return Err(err);
        }

        self.client.set_access_token(&session.access_token).await;
        Ok(Some(session))
    }

    async fn sign_out(&self) -> AppResult<()> {
        let url = self.client.endpoint("auth/v1/logout")?;
        let headers = self.client.auth_headers().await?;

        let result = self
            .client
            .http()
            .post(url)
            .headers(headers)
            .send()
            .await;

        // 本地清理无条件执行
        self.clear_persisted_session().await;
        self.client.clear_access_token().await;

        match result {
            Ok(response) => self.client.check(response).await.map(|_| ()),
            Err(e) => Err(AppError::external_service(e.to_string())),
        }
    }
}
