//! 案件实体

use chrono::{DateTime, Utc};
use gavel_common::{CaseId, UserId};
use gavel_domain_core::Entity;
use serde::{Deserialize, Serialize};

/// 案件状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Open,
    Pending,
    Closed,
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaseStatus::Open => write!(f, "open"),
            CaseStatus::Pending => write!(f, "pending"),
            CaseStatus::Closed => write!(f, "closed"),
        }
    }
}

/// 案件实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    pub id: CaseId,
    pub case_number: String,
    pub title: String,
    pub description: Option<String>,
    pub status: CaseStatus,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Case {
    pub fn new(
        case_number: String,
        title: String,
        description: Option<String>,
        created_by: UserId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: CaseId::new(),
            case_number,
            title,
            description,
            status: CaseStatus::Open,
            created_by: Some(created_by),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_status(&mut self, status: CaseStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    pub fn is_closed(&self) -> bool {
        self.status == CaseStatus::Closed
    }
}

impl Entity for Case {
    type Id = CaseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
