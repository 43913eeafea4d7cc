// ==========================================
// 工作量再分配引擎 - 在办工作量提取
// ==========================================
// 只读: 承办人名下 assigned / in_progress 且属于指定优先级分组的工作项
// ==========================================

use crate::domain::assignment::Assignment;
use crate::domain::types::PriorityTier;
use crate::engine::error::EngineResult;
use crate::repository::AssignmentStore;
use std::sync::Arc;

pub struct WorkloadExtractor {
    assignment_store: Arc<dyn AssignmentStore>,
}

impl WorkloadExtractor {
    pub fn new(assignment_store: Arc<dyn AssignmentStore>) -> Self {
        Self { assignment_store }
    }

    /// 列出承办人在办工作项
    ///
    /// 返回顺序: 优先级（urgent 在前）, assigned_at, id。
    /// 每条工作项独立处理, 顺序只用于结果稳定。
    pub fn list_active_assignments(
        &self,
        staff_id: &str,
        tier: PriorityTier,
    ) -> EngineResult<Vec<Assignment>> {
        let mut items = self
            .assignment_store
            .find_active_by_assignee(staff_id, tier.priorities())?;

        items.retain(|a| a.status.is_active() && a.priority.tier() == tier);
        sort_for_processing(&mut items);
        Ok(items)
    }
}

pub fn sort_for_processing(items: &mut [Assignment]) {
    items.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| a.assigned_at.cmp(&b.assigned_at))
            .then_with(|| a.id.cmp(&b.id))
    });
}
