//! 案件文档实体

use chrono::{DateTime, Utc};
use gavel_common::{CaseId, DocumentId, UserId};
use gavel_domain_core::Entity;
use serde::{Deserialize, Serialize};

/// 案件文档元数据
///
/// 文件内容存放在后端对象存储，这里只持有路径
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub case_id: CaseId,
    pub filename: String,
    pub file_path: String,
    pub file_type: Option<String>,
    pub file_size: Option<u64>,
    pub uploaded_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(
        case_id: CaseId,
        filename: String,
        file_path: String,
        file_type: Option<String>,
        file_size: Option<u64>,
        uploaded_by: UserId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: DocumentId::new(),
            case_id,
            filename,
            file_path,
            file_type,
            file_size,
            uploaded_by: Some(uploaded_by),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for Document {
    type Id = DocumentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// 上传约束
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub max_file_size: u64,
    pub allowed_file_types: Vec<String>,
}

impl UploadPolicy {
    pub fn check(&self, file_type: &str, file_size: u64) -> Result<(), UploadViolation> {
        if file_size > self.max_file_size {
            return Err(UploadViolation::TooLarge {
                size: file_size,
                limit: self.max_file_size,
            });
        }
        if !self.allowed_file_types.iter().any(|t| t == file_type) {
            return Err(UploadViolation::TypeNotAllowed(file_type.to_string()));
        }
        Ok(())
    }
}

/// 上传校验失败
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadViolation {
    #[error("File of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },
    #[error("File type not allowed: {0}")]
    TypeNotAllowed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> UploadPolicy {
        UploadPolicy {
            max_file_size: 10 * 1024 * 1024,
            allowed_file_types: vec!["application/pdf".into(), "image/png".into()],
        }
    }

    #[test]
    fn test_accepts_allowed_type_under_limit() {
        assert!(policy().check("application/pdf", 1024).is_ok());
    }

    #[test]
    fn test_rejects_oversized_file() {
        let err = policy().check("application/pdf", 11 * 1024 * 1024).unwrap_err();
        assert!(matches!(err, UploadViolation::TooLarge { .. }));
    }

    #[test]
    fn test_rejects_unlisted_type() {
        let err = policy().check("application/x-msdownload", 10).unwrap_err();
        assert_eq!(
            err,
            UploadViolation::TypeNotAllowed("application/x-msdownload".into())
        );
    }
}
