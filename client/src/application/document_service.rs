//! 文档服务
//!
//! 上传前做大小/类型校验；内容写入对象存储成功后再落元数据，
//! 元数据落库失败时 best-effort 清理已上传的对象。

use std::sync::Arc;

use gavel_access_core::{Action, require_action};
use gavel_common::{CaseId, DocumentId};
use gavel_errors::{AppError, AppResult};
use tracing::{info, warn};

use crate::application::access_controller::AccessController;
use crate::application::session_manager::SessionManager;
use crate::domain::document::{Document, UploadPolicy};
use crate::domain::repositories::{DocumentRepository, DocumentStorage};

const SIGNED_URL_TTL_SECS: u64 = 300;

/// 文档服务
pub struct DocumentService {
    session: Arc<SessionManager>,
    controller: Arc<AccessController>,
    documents: Arc<dyn DocumentRepository>,
    storage: Arc<dyn DocumentStorage>,
    policy: UploadPolicy,
}

impl DocumentService {
    pub fn new(
        session: Arc<SessionManager>,
        controller: Arc<AccessController>,
        documents: Arc<dyn DocumentRepository>,
        storage: Arc<dyn DocumentStorage>,
        policy: UploadPolicy,
    ) -> Self {
        Self {
            session,
            controller,
            documents,
            storage,
            policy,
        }
    }

    fn require_authenticated(&self) -> AppResult<gavel_common::UserId> {
        self.session
            .current_identity()
            .filter(|identity| identity.is_active())
            .map(|identity| identity.id)
            .ok_or_else(|| AppError::unauthenticated("No active session"))
    }

    pub async fn list_for_case(&self, case_id: &CaseId) -> AppResult<Vec<Document>> {
        self.require_authenticated()?;
        self.documents.list_for_case(case_id).await
    }

    /// 上传文档
    ///
    /// 所有已认证角色可上传；删除才是受限操作
    pub async fn upload(
        &self,
        case_id: &CaseId,
        filename: String,
        content_type: String,
        bytes: Vec<u8>,
    ) -> AppResult<Document> {
        let actor_id = self.require_authenticated()?;

        let file_size = bytes.len() as u64;
        self.policy
            .check(&content_type, file_size)
            .map_err(|violation| AppError::validation(violation.to_string()))?;

        let path = format!("{}/{}", case_id, filename);
        let stored_path = self.storage.upload(&path, &content_type, bytes).await?;

        let document = Document::new(
            case_id.clone(),
            filename,
            stored_path.clone(),
            Some(content_type),
            Some(file_size),
            actor_id,
        );

        if let Err(err) = self.documents.save(&document).await {
            // 元数据失败时清掉孤儿对象，清理失败只记日志
            if let Err(cleanup) = self.storage.remove(&stored_path).await {
                warn!(error = %cleanup, path = stored_path, "orphan cleanup failed");
            }
            return Err(err);
        }

        info!(document_id = %document.id, case_id = %case_id, "document uploaded");
        Ok(document)
    }

    /// 删除文档（元数据 + 对象）
    pub async fn delete(&self, id: &DocumentId) -> AppResult<()> {
        self.require_authenticated()?;
        require_action!(self.controller, Action::DeleteDocuments);

        let document = self
            .documents
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Document not found"))?;

        self.documents.delete(id).await?;
        if let Err(err) = self.storage.remove(&document.file_path).await {
            warn!(error = %err, path = document.file_path, "stored object removal failed");
        }

        info!(document_id = %id, "document deleted");
        Ok(())
    }

    /// 生成限时下载链接
    pub async fn download_url(&self, id: &DocumentId) -> AppResult<String> {
        self.require_authenticated()?;

        let document = self
            .documents
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Document not found"))?;

        self.storage
            .signed_url(&document.file_path, SIGNED_URL_TTL_SECS)
            .await
    }
}
