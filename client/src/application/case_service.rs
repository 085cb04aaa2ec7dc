//! 案件服务
//!
//! 读操作对所有已认证用户开放（服务端 RLS 兜底），
//! 写操作一律先过 AccessController。

use std::sync::Arc;

use gavel_access_core::{Action, require_action};
use gavel_common::{CaseId, PagedResult, Pagination};
use gavel_errors::{AppError, AppResult};
use tracing::info;

use crate::application::access_controller::AccessController;
use crate::application::session_manager::SessionManager;
use crate::domain::case::{Case, CaseStatus};
use crate::domain::repositories::CaseRepository;

/// 案件服务
pub struct CaseService {
    session: Arc<SessionManager>,
    controller: Arc<AccessController>,
    cases: Arc<dyn CaseRepository>,
}

impl CaseService {
    pub fn new(
        session: Arc<SessionManager>,
        controller: Arc<AccessController>,
        cases: Arc<dyn CaseRepository>,
    ) -> Self {
        Self {
            session,
            controller,
            cases,
        }
    }

    fn require_authenticated(&self) -> AppResult<gavel_common::UserId> {
        self.session
            .current_identity()
            .filter(|identity| identity.is_active())
            .map(|identity| identity.id)
            .ok_or_else(|| AppError::unauthenticated("No active session"))
    }

    /// 分页列出案件
    pub async fn list_cases(&self, pagination: &Pagination) -> AppResult<PagedResult<Case>> {
        self.require_authenticated()?;
        let items = self.cases.find_all(pagination).await?;
        let total = self.cases.count().await?;
        Ok(PagedResult::new(items, total, pagination))
    }

    pub async fn get_case(&self, id: &CaseId) -> AppResult<Case> {
        self.require_authenticated()?;
        self.cases
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Case not found"))
    }

    /// 创建案件
    pub async fn create_case(
        &self,
        case_number: String,
        title: String,
        description: Option<String>,
    ) -> AppResult<Case> {
        let actor_id = self.require_authenticated()?;
        require_action!(self.controller, Action::ManageCases);

        if case_number.trim().is_empty() || title.trim().is_empty() {
            return Err(AppError::validation("Case number and title are required"));
        }

        let case = Case::new(case_number, title, description, actor_id);
        self.cases.save(&case).await?;
        info!(case_id = %case.id, case_number = %case.case_number, "case created");
        Ok(case)
    }

    /// 更新案件状态
    pub async fn update_status(&self, id: &CaseId, status: CaseStatus) -> AppResult<Case> {
        self.require_authenticated()?;
        require_action!(self.controller, Action::ManageCases);

        let updated = self.cases.update_status(id, status).await?;
        info!(case_id = %id, status = %status, "case status updated");
        Ok(updated)
    }

    /// 删除案件
    pub async fn delete_case(&self, id: &CaseId) -> AppResult<()> {
        self.require_authenticated()?;
        require_action!(self.controller, Action::ManageCases);

        self.cases.delete(id).await?;
        info!(case_id = %id, "case deleted");
        Ok(())
    }
}
