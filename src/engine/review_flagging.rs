// ==========================================
// 工作量再分配引擎 - 普通/低优先级复核标记
// ==========================================
// 只打标记, 不改变承办人; 由主管人工决定去向
// ==========================================

use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::assignment::{Assignment, BatchOutcome, FlaggedItem, SkipReason, SkippedItem};
use crate::domain::types::PriorityTier;
use crate::engine::audit::{record_quietly, SYSTEM_ACTOR};
use crate::engine::error::EngineResult;
use crate::engine::repositories::ReassignmentRepositories;
use crate::engine::workload::WorkloadExtractor;
use chrono::{DateTime, Utc};

pub struct ReviewFlagger {
    repos: ReassignmentRepositories,
    extractor: WorkloadExtractor,
    reason: String,
}

impl ReviewFlagger {
    pub fn new(repos: ReassignmentRepositories, reason: impl Into<String>) -> Self {
        let extractor = WorkloadExtractor::new(repos.assignment_store.clone());
        Self {
            repos,
            extractor,
            reason: reason.into(),
        }
    }

    /// 标记员工名下全部 normal/low 在办工作项
    pub fn flag_normal_low_items(
        &self,
        staff_id: &str,
        now: DateTime<Utc>,
    ) -> EngineResult<BatchOutcome<FlaggedItem>> {
        // 已标记的工作项不重复标记, 保证重复调用结果为空
        let items: Vec<Assignment> = self
            .extractor
            .list_active_assignments(staff_id, PriorityTier::NormalLow)?
            .into_iter()
            .filter(|a| !a.needs_review)
            .collect();

        let outcome = items.iter().fold(BatchOutcome::empty(), |mut acc, assignment| {
            match self.flag_one(assignment, now) {
                Ok(item) => acc.succeeded.push(item),
                Err(reason) => acc.skipped.push(SkippedItem::new(assignment, reason)),
            }
            acc
        });

        if outcome.total() > 0 {
            tracing::info!(
                staff_id = %staff_id,
                flagged = outcome.succeeded.len(),
                skipped = outcome.skipped.len(),
                "复核标记完成"
            );
        }
        Ok(outcome)
    }

    fn flag_one(&self, assignment: &Assignment, now: DateTime<Utc>) -> Result<FlaggedItem, SkipReason> {
        if let Err(e) = self
            .repos
            .assignment_store
            .flag_for_review(&assignment.id, &self.reason, now)
        {
            tracing::warn!(assignment_id = %assignment.id, error = %e, "复核标记写入失败，跳过该工作项");
            return Err(SkipReason::WriteFailed(e.to_string()));
        }

        record_quietly(
            self.repos.action_log_store.as_ref(),
            ActionLog::new(ActionType::AssignmentFlagged, SYSTEM_ACTOR, &assignment.id, now)
                .with_payload(&serde_json::json!({
                    "work_item_id": assignment.work_item_id,
                    "priority": assignment.priority,
                    "assignee_id": assignment.assignee_id,
                }))
                .with_detail(self.reason.clone()),
        );

        let mut item = FlaggedItem::from(assignment);
        item.review_reason = Some(self.reason.clone());
        item.flagged_at = Some(now);
        Ok(item)
    }
}
