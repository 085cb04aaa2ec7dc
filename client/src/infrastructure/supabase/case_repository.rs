//! 案件仓储适配器

use std::sync::Arc;

use async_trait::async_trait;
use gavel_common::{CaseId, Pagination};
use gavel_errors::{AppError, AppResult};
use gavel_ports::{PageableRepository, Repository};
use reqwest::header::HeaderValue;

use super::client::SupabaseClient;
use crate::domain::case::{Case, CaseStatus};
use crate::domain::repositories::CaseRepository;

/// 案件仓储适配器
///
/// cases 表的列与 [`Case`] 的 serde 形状一致，无需单独的行类型
pub struct SupabaseCaseRepository {
    client: Arc<SupabaseClient>,
}

impl SupabaseCaseRepository {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }

    async fn fetch_cases(&self, path: &str) -> AppResult<Vec<Case>> {
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
impl Repository<Case, CaseId> for SupabaseCaseRepository {
    async fn find_by_id(&self, id: &CaseId) -> AppResult<Option<Case>> {
        let cases = self
            .fetch_cases(&format!("rest/v1/cases?id=eq.{}&select=*", id))
            .await?;
        Ok(cases.into_iter().next())
    }

    async fn save(&self, entity: &Case) -> AppResult<()> {
        let url = self.client.endpoint("rest/v1/cases")?;
        let mut headers = self.client.auth_headers().await?;
        headers.insert(
            "Prefer",
            HeaderValue::from_static("resolution=merge-duplicates"),
        );

        let response = self
            .client
            .http()
            .post(url)
            .headers(headers)
            .json(entity)
            .send()
            .await
            .map_err(|e| AppError::external_service(e.to_string()))?;

        self.client.check(response).await.map(|_| ())
    }

    async fn delete(&self, id: &CaseId) -> AppResult<()> {
        let url = self.client.endpoint(&format!("rest/v1/cases?id=eq.{}", id))?;
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

#[async_trait]
impl PageableRepository<Case, CaseId> for SupabaseCaseRepository {
    async fn find_all(&self, pagination: &Pagination) -> AppResult<Vec<Case>> {
        self.fetch_cases(&format!(
            "rest/v1/cases?select=*&order=created_at.desc&limit={}&offset={}",
            pagination.page_size,
            pagination.offset()
        ))
        .await
    }

    async fn count(&self) -> AppResult<u64> {
        let url = self.client.endpoint("rest/v1/cases?select=id")?;
        let mut headers = self.client.auth_headers().await?;
        headers.insert("Prefer", HeaderValue::from_static("count=exact"));
        headers.insert("Range", HeaderValue::from_static("0-0"));

        let response = self
            .client
            .http()
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| AppError::external_service(e.to_string()))?;

        let response = self.client.check(response).await?;

        // content-range: 0-0/42
        let total = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.rsplit('/').next())
            .and_then(|v| v.parse::<u64>().ok())
            .ok_or_else(|| AppError::external_service("Missing count in content-range"))?;

        Ok(total)
    }
}

#[async_trait]
impl CaseRepository for SupabaseCaseRepository {
    async fn update_status(&self, id: &CaseId, status: CaseStatus) -> AppResult<Case> {
        let url = self.client.endpoint(&format!("rest/v1/cases?id=eq.{}", id))?;
        let mut headers = self.client.auth_headers().await?;
        headers.insert(
            "Prefer",
            HeaderValue::from_static("return=representation"),
        );

        let response = self
            .client
            .http()
            .patch(url)
            .headers(headers)
            .json(&serde_json::json!({ "status": status }))
            .send()
            .await
            .map_err(|e| AppError::external_service(e.to_string()))?;

        let response = self.client.check(response).await?;
        let mut cases: Vec<Case> = response
            .json()
            .await
            .map_err(|e| AppError::external_service(format!("Malformed rows: {}", e)))?;

        cases
            .pop()
            .ok_or_else(|| AppError::not_found("Case not found"))
    }
}
