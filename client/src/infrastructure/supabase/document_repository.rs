//! 文档仓储与对象存储适配器

use std::sync::Arc;

use async_trait::async_trait;
use gavel_common::{CaseId, DocumentId};
use gavel_errors::{AppError, AppResult};
use gavel_ports::Repository;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde::Deserialize;

use super::client::SupabaseClient;
use crate::domain::document::Document;
use crate::domain::repositories::{DocumentRepository, DocumentStorage};

const BUCKET: &str = "documents";

/// 文档元数据仓储适配器
pub struct SupabaseDocumentRepository {
    client: Arc<SupabaseClient>,
}

impl SupabaseDocumentRepository {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }

    async fn fetch_documents(&self, path: &str) -> AppResult<Vec<Document>> {
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
impl Repository<Document, DocumentId> for SupabaseDocumentRepository {
    async fn find_by_id(&self, id: &DocumentId) -> AppResult<Option<Document>> {
        let documents = self
            .fetch_documents(&format!("rest/v1/documents?id=eq.{}&select=*", id))
            .await?;
        Ok(documents.into_iter().next())
    }

    async fn save(&self, entity: &Document) -> AppResult<()> {
        let url = self.client.endpoint("rest/v1/documents")?;
        let headers = self.client.auth_headers().await?;

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

    async fn delete(&self, id: &DocumentId) -> AppResult<()> {
        let url = self
            .client
            .endpoint(&format!("rest/v1/documents?id=eq.{}", id))?;
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
impl DocumentRepository for SupabaseDocumentRepository {
    async fn list_for_case(&self, case_id: &CaseId) -> AppResult<Vec<Document>> {
        self.fetch_documents(&format!(
            "rest/v1/documents?case_id=eq.{}&select=*&order=created_at.desc",
            case_id
        ))
        .await
    }
}

/// 对象存储适配器
pub struct SupabaseDocumentStorage {
    client: Arc<SupabaseClient>,
}

impl SupabaseDocumentStorage {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct SignedUrlResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

#[async_trait]
impl DocumentStorage for SupabaseDocumentStorage {
    async fn upload(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> AppResult<String> {
        let url = self
            .client
            .endpoint(&format!("storage/v1/object/{}/{}", BUCKET, path))?;
        let mut headers = self.client.auth_headers().await?;
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_str(content_type)
                .map_err(|_| AppError::validation("Invalid content type"))?,
        );

        let response = self
            .client
            .http()
            .post(url)
            .headers(headers)
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::external_service(e.to_string()))?;

        self.client.check(response).await?;
        Ok(path.to_string())
    }

    async fn remove(&self, path: &str) -> AppResult<()> {
        let url = self
            .client
            .endpoint(&format!("storage/v1/object/{}/{}", BUCKET, path))?;
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

    async fn signed_url(&self, path: &str, expires_in_secs: u64) -> AppResult<String> {
        let url = self
            .client
            .endpoint(&format!("storage/v1/object/sign/{}/{}", BUCKET, path))?;
        let headers = self.client.auth_headers().await?;

        let response = self
            .client
            .http()
            .post(url)
            .headers(headers)
            .json(&serde_json::json!({ "expiresIn": expires_in_secs }))
            .send()
            .await
            .map_err(|e| AppError::external_service(e.to_string()))?;

        let response = self.client.check(response).await?;
        let signed: SignedUrlResponse = response
            .json()
            .await
            .map_err(|e| AppError::external_service(format!("Malformed sign response: {}", e)))?;

        let full = self.client.endpoint(signed.signed_url.trim_start_matches('/'))?;
        Ok(full.to_string())
    }
}
