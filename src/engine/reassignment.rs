// ==========================================
// 工作量再分配引擎 - 紧急/高优先级自动改派
// ==========================================
// 红线: 单条失败不中断批处理（部分成功）
// 红线: 无候选人时工作项留在原承办人名下, 记入 skipped, 并转人工复核
// ==========================================

use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::assignment::{
    Assignment, BatchOutcome, FlaggedItem, ReassignedItem, SkipReason, SkippedItem,
};
use crate::domain::staff::StaffProfile;
use crate::domain::types::PriorityTier;
use crate::engine::audit::{record_quietly, SYSTEM_ACTOR};
use crate::engine::candidate_resolver::CandidateResolver;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::repositories::ReassignmentRepositories;
use crate::engine::workload::WorkloadExtractor;
use crate::repository::ReassignmentUpdate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// urgent/high 处理结果
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UrgentHighOutcome {
    pub reassigned: BatchOutcome<ReassignedItem>,
    /// 无候选人、本次转为人工复核的工作项（同时出现在 reassigned.skipped 中）
    pub escalated: Vec<FlaggedItem>,
}

pub struct ReassignmentExecutor {
    repos: ReassignmentRepositories,
    resolver: CandidateResolver,
    extractor: WorkloadExtractor,
    reason: String,
    review_reason: String,
}

impl ReassignmentExecutor {
    pub fn new(
        repos: ReassignmentRepositories,
        reason: impl Into<String>,
        review_reason: impl Into<String>,
    ) -> Self {
        let resolver = CandidateResolver::new(repos.staff_store.clone());
        let extractor = WorkloadExtractor::new(repos.assignment_store.clone());
        Self {
            repos,
            resolver,
            extractor,
            reason: reason.into(),
            review_reason: review_reason.into(),
        }
    }

    /// 改派员工名下全部 urgent/high 在办工作项
    ///
    /// # 返回
    /// - Err(NotFound): 员工不存在
    /// - Err(Infrastructure): 读取员工或工作项失败
    /// - Ok(outcome): 单条失败进入 outcome.reassigned.skipped
    pub fn reassign_urgent_high_items(
        &self,
        staff_id: &str,
        now: DateTime<Utc>,
    ) -> EngineResult<UrgentHighOutcome> {
        let staff = self
            .repos
            .staff_store
            .find_staff(staff_id)?
            .ok_or_else(|| EngineError::NotFound {
                entity: "StaffProfile".to_string(),
                id: staff_id.to_string(),
            })?;
        self.reassign_for(&staff, now)
    }

    /// 对已加载的员工档案执行改派
    pub fn reassign_for(
        &self,
        staff: &StaffProfile,
        now: DateTime<Utc>,
    ) -> EngineResult<UrgentHighOutcome> {
        let items = self
            .extractor
            .list_active_assignments(&staff.user_id, PriorityTier::UrgentHigh)?;

        if items.is_empty() {
            return Ok(UrgentHighOutcome::default());
        }

        let outcome = items.iter().fold(UrgentHighOutcome::default(), |mut acc, assignment| {
            match self.reassign_one(staff, assignment, now) {
                Ok(item) => acc.reassigned.succeeded.push(item),
                Err(SkipReason::NoCandidate) => {
                    if let Some(flagged) = self.escalate_for_review(assignment, now) {
                        acc.escalated.push(flagged);
                    }
                    acc.reassigned
                        .skipped
                        .push(SkippedItem::new(assignment, SkipReason::NoCandidate));
                }
                Err(reason) => acc.reassigned.skipped.push(SkippedItem::new(assignment, reason)),
            }
            acc
        });

        tracing::info!(
            staff_id = %staff.user_id,
            reassigned = outcome.reassigned.succeeded.len(),
            skipped = outcome.reassigned.skipped.len(),
            escalated = outcome.escalated.len(),
            "紧急/高优先级改派完成"
        );
        Ok(outcome)
    }

    /// 无候选人: 留在原承办人名下并打复核标记
    ///
    /// 已标记的工作项不重复标记（返回 None, 不再计入通知）。
    fn escalate_for_review(&self, assignment: &Assignment, now: DateTime<Utc>) -> Option<FlaggedItem> {
        if assignment.needs_review {
            return None;
        }

        if let Err(e) = self
            .repos
            .assignment_store
            .flag_for_review(&assignment.id, &self.review_reason, now)
        {
            tracing::warn!(assignment_id = %assignment.id, error = %e, "无候选工作项复核标记失败");
            return None;
        }

        record_quietly(
            self.repos.action_log_store.as_ref(),
            ActionLog::new(ActionType::AssignmentFlagged, SYSTEM_ACTOR, &assignment.id, now)
                .with_payload(&serde_json::json!({
                    "work_item_id": assignment.work_item_id,
                    "priority": assignment.priority,
                    "assignee_id": assignment.assignee_id,
                    "no_candidate": true,
                }))
                .with_detail(self.review_reason.clone()),
        );

        let mut item = FlaggedItem::from(assignment);
        item.review_reason = Some(self.review_reason.clone());
        item.flagged_at = Some(now);
        Some(item)
    }

    fn reassign_one(
        &self,
        staff: &StaffProfile,
        assignment: &Assignment,
        now: DateTime<Utc>,
    ) -> Result<ReassignedItem, SkipReason> {
        let required = effective_required_skills(assignment, staff);

        let candidate =
            match self
                .resolver
                .resolve_best(&staff.unit_id, &required, Some(&staff.user_id))
            {
                Ok(candidate) => candidate,
                Err(EngineError::NoCandidateFound { .. }) => {
                    tracing::warn!(
                        assignment_id = %assignment.id,
                        unit_id = %staff.unit_id,
                        required = ?required,
                        "无可用候选人，工作项保留在原承办人名下并转人工复核"
                    );
                    return Err(SkipReason::NoCandidate);
                }
                Err(e) => {
                    tracing::warn!(assignment_id = %assignment.id, error = %e, "候选人查询失败");
                    return Err(SkipReason::WriteFailed(e.to_string()));
                }
            };

        let update = ReassignmentUpdate {
            assignment_id: &assignment.id,
            from_assignee_id: &staff.user_id,
            to_assignee_id: &candidate.user_id,
            reason: &self.reason,
            assigned_at: now,
        };

        if let Err(e) = self.repos.assignment_store.reassign(&update) {
            tracing::warn!(
                assignment_id = %assignment.id,
                to = %candidate.user_id,
                error = %e,
                "改派写入失败，跳过该工作项"
            );
            return Err(SkipReason::WriteFailed(e.to_string()));
        }

        tracing::info!(
            assignment_id = %assignment.id,
            from = %staff.user_id,
            to = %candidate.user_id,
            "工作项已改派"
        );

        record_quietly(
            self.repos.action_log_store.as_ref(),
            ActionLog::new(ActionType::AssignmentReassigned, SYSTEM_ACTOR, &assignment.id, now)
                .with_payload(&serde_json::json!({
                    "work_item_id": assignment.work_item_id,
                    "priority": assignment.priority,
                    "from": staff.user_id,
                    "to": candidate.user_id,
                    "required_skills": required,
                }))
                .with_detail(self.reason.clone()),
        );

        Ok(ReassignedItem {
            assignment_id: assignment.id.clone(),
            work_item_id: assignment.work_item_id.clone(),
            work_item_type: assignment.work_item_type,
            priority: assignment.priority,
            old_assignee_id: staff.user_id.clone(),
            new_assignee_id: candidate.user_id.clone(),
            new_assignee_name: candidate.display_name().to_string(),
        })
    }
}

/// 工作项未登记技能要求时沿用原承办人的技能集合
pub fn effective_required_skills(assignment: &Assignment, outgoing: &StaffProfile) -> BTreeSet<String> {
    match &assignment.required_skills {
        Some(required) => required.clone(),
        None => outgoing.skills.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{
        AssignmentStatus, AvailabilitySource, AvailabilityStatus, Priority, StaffRole,
        WorkItemType,
    };

    fn skills(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_requirement_falls_back_to_outgoing_skills() {
        let outgoing = StaffProfile {
            user_id: "a".to_string(),
            full_name: "A".to_string(),
            unit_id: "U1".to_string(),
            role: StaffRole::Staff,
            skills: skills(&["ar", "en"]),
            availability_status: AvailabilityStatus::OnLeave,
            unavailable_until: None,
            unavailable_reason: None,
            availability_source: AvailabilitySource::Manual,
            individual_wip_limit: 5,
            current_assignment_count: 3,
        };
        let mut assignment = Assignment {
            id: "1".to_string(),
            work_item_id: "w-1".to_string(),
            work_item_type: WorkItemType::Dossier,
            assignee_id: "a".to_string(),
            priority: Priority::Urgent,
            status: AssignmentStatus::InProgress,
            required_skills: None,
            needs_review: false,
            review_reason: None,
            flagged_at: None,
            reassigned_from: None,
            reassignment_reason: None,
            assigned_at: Utc::now(),
        };

        assert_eq!(effective_required_skills(&assignment, &outgoing), skills(&["ar", "en"]));

        assignment.required_skills = Some(BTreeSet::new());
        assert!(effective_required_skills(&assignment, &outgoing).is_empty());

        assignment.required_skills = Some(skills(&["ar"]));
        assert_eq!(effective_required_skills(&assignment, &outgoing), skills(&["ar"]));
    }
}
