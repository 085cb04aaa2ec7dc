//! 案件仓储接口

use async_trait::async_trait;
use gavel_common::CaseId;
use gavel_errors::AppResult;
use gavel_ports::PageableRepository;

use crate::domain::case::{Case, CaseStatus};

/// 案件仓储
///
/// 基础 CRUD 与分页来自 gavel-ports 的通用 trait，这里只补充
/// 案件特有的操作
#[async_trait]
pub trait CaseRepository: PageableRepository<Case, CaseId> {
    /// 更新案件状态
    async fn update_status(&self, id: &CaseId, status: CaseStatus) -> AppResult<Case>;
}
