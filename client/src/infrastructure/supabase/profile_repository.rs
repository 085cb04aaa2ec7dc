//! 用户档案适配器与行归一化

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gavel_access_core::Role;
use gavel_common::UserId;
use gavel_errors::{AppError, AppResult};
use serde::Deserialize;
use uuid::Uuid;

use super::client::SupabaseClient;
use crate::domain::identity::{Identity, UserStatus};
use crate::domain::repositories::{ProfilePatch, ProfileRepository};
use crate::domain::value_objects::Email;

/// users 表的原始行
///
/// 历史数据里状态字段有两种形态：`status` 字符串或早期的
/// `is_active` 布尔。归一化在这里一次完成，Identity 之外
/// 不再出现行结构。
#[derive(Debug, Deserialize)]
struct UserRow {
    id: Uuid,
    email: String,
    role: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    is_active: Option<bool>,
    #[serde(default)]
    biometric_enabled: Option<bool>,
    #[serde(default)]
    created_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn normalize(self) -> AppResult<Identity> {
        let role: Role = self
            .role
            .parse()
            .map_err(|e| AppError::internal(format!("Profile row rejected: {}", e)))?;

        let status = match self.status.as_deref() {
            Some("active") => UserStatus::Active,
            Some("suspended") => UserStatus::Suspended,
            Some("deactivated") => UserStatus::Deactivated,
            // 未知字符串或缺失时退回老字段
            _ => match self.is_active {
                Some(false) => UserStatus::Deactivated,
                _ => UserStatus::Active,
            },
        };

        let email = Email::new(self.email)
            .map_err(|e| AppError::internal(format!("Profile row rejected: {}", e)))?;

        Ok(Identity {
            id: UserId::from_uuid(self.id),
            email,
            role,
            status,
            biometric_enabled: self.biometric_enabled.unwrap_or(false),
            created_by: self.created_by.map(UserId::from_uuid),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// 用户档案仓储适配器
pub struct SupabaseProfileRepository {
    client: Arc<SupabaseClient>,
}

impl SupabaseProfileRepository {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }

    async fn fetch_rows(&self, path: &str) -> AppResult<Vec<UserRow>> {
        let url = self.client.endpoint(path)?;
        let headers = self.client.auth_headers().await?;

        let response = self
            .client
            .http()
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| AppError::external_service(e.to_string()))?;

        let response = self.client.check(response).await?;
        response
            .json()
            .await
            .map_err(|e| AppError::external_service(format!("Malformed rows: {}", e)))
    }
}

#[async_trait]
impl ProfileRepository for SupabaseProfileRepository {
    async fn fetch(&self, id: &UserId) -> AppResult<Option<Identity>> {
        let rows = self
            .fetch_rows(&format!("rest/v1/users?id=eq.{}&select=*", id))
            .await?;

        rows.into_iter().next().map(UserRow::normalize).transpose()
    }

    async fn list(&self) -> AppResult<Vec<Identity>> {
        let rows = self
            .fetch_rows("rest/v1/users?select=*&order=created_at.desc")
            .await?;

        rows.into_iter().map(UserRow::normalize).collect()
    }

    async fn create(
        &self,
        id: &UserId,
        email: &Email,
        role: Role,
        created_by: &UserId,
    ) -> AppResult<Identity> {
        let url = self.client.endpoint("rest/v1/users")?;
        let mut headers = self.client.auth_headers().await?;
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let response = self
            .client
            .http()
            .post(url)
            .headers(headers)
            .json(&serde_json::json!({
                "id": id,
                "email": email.as_str(),
                "role": role.as_str(),
                "created_by": created_by,
                "status": "active",
                "biometric_enabled": false,
            }))
            .send()
            .await
            .map_err(|e| AppError::external_service(e.to_string()))?;

        let response = self.client.check(response).await?;
        let mut rows: Vec<UserRow> = response
            .json()
            .await
            .map_err(|e| AppError::external_service(format!("Malformed rows: {}", e)))?;

        rows.pop()
            .ok_or_else(|| AppError::external_service("Insert returned no row"))?
            .normalize()
    }

    async fn update(&self, id: &UserId, patch: ProfilePatch) -> AppResult<Identity> {
        let url = self.client.endpoint(&format!("rest/v1/users?id=eq.{}", id))?;
        let mut headers = self.client.auth_headers().await?;
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let mut body = serde_json::Map::new();
        if let Some(role) = patch.role {
            body.insert("role".into(), role.as_str().into());
        }
        if let Some(status) = patch.status {
            body.insert("status".into(), status.to_string().into());
        }
        if let Some(flag) = patch.biometric_enabled {
            body.insert("biometric_enabled".into(), flag.into());
        }

        let response = self
            .client
            .http()
            .patch(url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::external_service(e.to_string()))?;

        let response = self.client.check(response).await?;
        let mut rows: Vec<UserRow> = response
            .json()
            .await
            .map_err(|e| AppError::external_service(format!("Malformed rows: {}", e)))?;

        rows.pop()
            .ok_or_else(|| AppError::not_found("User not found"))?
            .normalize()
    }

    async fn delete(&self, id: &UserId) -> AppResult<()> {
        let url = self.client.endpoint(&format!("rest/v1/users?id=eq.{}", id))?;
        let headers = self.client.auth_headers().await?;

        let response = self
            .client
            .http()
            .delete(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| AppError::external_service(e.to_string()))?;

        self.client.check(response).await.map(|_| ())
    }
}
