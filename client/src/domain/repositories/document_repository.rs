//! 文档仓储与对象存储接口

use async_trait::async_trait;
use gavel_common::{CaseId, DocumentId};
use gavel_errors::AppResult;
use gavel_ports::Repository;

use crate::domain::document::Document;

/// 文档元数据仓储
#[async_trait]
pub trait DocumentRepository: Repository<Document, DocumentId> {
    /// 列出某案件下的全部文档
    async fn list_for_case(&self, case_id: &CaseId) -> AppResult<Vec<Document>>;
}

/// 文档对象存储
///
/// 内容与元数据分离：这里只管字节，元数据走 [`DocumentRepository`]
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    /// 上传字节，返回存储路径
    async fn upload(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> AppResult<String>;

    /// 删除对象（best-effort 清理时也走这里）
    async fn remove(&self, path: &str) -> AppResult<()>;

    /// 生成限时下载 URL
    async fn signed_url(&self, path: &str, expires_in_secs: u64) -> AppResult<String>;
}
