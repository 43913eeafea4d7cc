// ==========================================
// 工作量再分配引擎 - 可用状态管理
// ==========================================
// 流程:
// 1. 校验输入（失败则零写入）
// 2. 写入员工可用状态（失败则中止, 不做再分配）
// 3. on_leave / unavailable: 紧急/高优先级改派（无候选人转复核）+ 普通/低优先级复核标记
// 4. 有复核标记时通知主管
// ==========================================
// 红线: 状态写入成功即视为操作成功, 再分配的部分失败体现在返回结果中
// 红线: 恢复可用不清除任何复核标记
// ==========================================

use crate::config::ReassignmentConfig;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::assignment::{BatchOutcome, FlaggedItem, ReassignedItem};
use crate::domain::staff::{AvailabilityChange, StaffProfile};
use crate::domain::types::{AvailabilitySource, AvailabilityStatus};
use crate::engine::audit::{record_quietly, SYSTEM_ACTOR};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::reassignment::{ReassignmentExecutor, UrgentHighOutcome};
use crate::engine::repositories::ReassignmentRepositories;
use crate::engine::review_flagging::ReviewFlagger;
use crate::engine::supervisor_notifier::SupervisorNotifier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// 可用状态变更请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityRequest {
    pub status: AvailabilityStatus,
    pub unavailable_until: Option<DateTime<Utc>>,
    pub reason: Option<String>,
}

impl AvailabilityRequest {
    pub fn new(status: AvailabilityStatus) -> Self {
        Self {
            status,
            unavailable_until: None,
            reason: None,
        }
    }

    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.unavailable_until = Some(until);
        self
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// 校验: on_leave 的截止时间必须严格晚于当前时间
    pub fn validate(&self, now: DateTime<Utc>) -> EngineResult<()> {
        if self.status == AvailabilityStatus::OnLeave {
            if let Some(until) = self.unavailable_until {
                if until <= now {
                    return Err(EngineError::Validation(format!(
                        "unavailable_until 必须晚于当前时间: {}",
                        until.to_rfc3339()
                    )));
                }
            }
        }
        Ok(())
    }

    /// 转换为写入字段; 变为 available 时清空截止时间与原因
    fn to_change(&self) -> AvailabilityChange {
        if self.status == AvailabilityStatus::Available {
            return AvailabilityChange::restore_available();
        }
        AvailabilityChange {
            status: self.status,
            unavailable_until: self.unavailable_until,
            unavailable_reason: self.reason.clone(),
            source: AvailabilitySource::Manual,
        }
    }
}

/// 可用状态变更结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityOutcome {
    pub staff_id: String,
    pub status: AvailabilityStatus,
    pub reassigned: BatchOutcome<ReassignedItem>,
    pub flagged: BatchOutcome<FlaggedItem>,
    pub supervisor_notified: bool,
}

pub struct AvailabilityManager {
    repos: ReassignmentRepositories,
    executor: ReassignmentExecutor,
    flagger: ReviewFlagger,
    notifier: SupervisorNotifier,
}

impl AvailabilityManager {
    pub fn new(repos: ReassignmentRepositories, config: ReassignmentConfig) -> Self {
        let executor = ReassignmentExecutor::new(
            repos.clone(),
            config.reassignment_reason.clone(),
            config.review_reason.clone(),
        );
        let flagger = ReviewFlagger::new(repos.clone(), config.review_reason.clone());
        let notifier = SupervisorNotifier::new(repos.clone(), config);
        Self {
            repos,
            executor,
            flagger,
            notifier,
        }
    }

    /// 变更员工可用状态并触发工作量再分配
    ///
    /// # 返回
    /// - Err(Validation): 输入不合法（零写入）
    /// - Err(NotFound): 员工不存在
    /// - Err(Infrastructure): 状态写入失败（未做任何再分配）
    #[instrument(skip(self, request, now), fields(staff_id = %staff_id, status = %request.status))]
    pub fn update_availability(
        &self,
        staff_id: &str,
        request: &AvailabilityRequest,
        now: DateTime<Utc>,
    ) -> EngineResult<AvailabilityOutcome> {
        if staff_id.trim().is_empty() {
            return Err(EngineError::Validation("staff_id 不能为空".to_string()));
        }
        request.validate(now)?;

        let staff = self.load_staff(staff_id)?;
        tracing::info!(from = %staff.availability_status, to = %request.status, "开始变更可用状态");

        let change = request.to_change();
        self.repos
            .staff_store
            .update_availability(staff_id, &change, now)?;

        record_quietly(
            self.repos.action_log_store.as_ref(),
            ActionLog::new(ActionType::AvailabilityChanged, SYSTEM_ACTOR, staff_id, now)
                .with_payload(&serde_json::json!({
                    "from": staff.availability_status,
                    "to": change.status,
                    "unavailable_until": change.unavailable_until,
                    "reason": change.unavailable_reason,
                })),
        );

        let mut outcome = AvailabilityOutcome {
            staff_id: staff_id.to_string(),
            status: change.status,
            reassigned: BatchOutcome::empty(),
            flagged: BatchOutcome::empty(),
            supervisor_notified: false,
        };

        if !change.status.removes_from_active_work() {
            return Ok(outcome);
        }

        // 用写入后的状态做后续展示与通知
        let staff = StaffProfile {
            availability_status: change.status,
            unavailable_until: change.unavailable_until,
            unavailable_reason: change.unavailable_reason.clone(),
            availability_source: change.source,
            ..staff
        };

        let urgent_high = match self.executor.reassign_for(&staff, now) {
            Ok(urgent_high) => urgent_high,
            Err(e) => {
                tracing::warn!(error = %e, "紧急/高优先级工作项读取失败，跳过改派");
                UrgentHighOutcome::default()
            }
        };
        outcome.reassigned = urgent_high.reassigned;

        let normal_low = match self.flagger.flag_normal_low_items(staff_id, now) {
            Ok(flagged) => flagged,
            Err(e) => {
                tracing::warn!(error = %e, "普通/低优先级工作项读取失败，跳过复核标记");
                BatchOutcome::empty()
            }
        };

        // 无候选人转复核的 urgent/high 排在前面, 一并通知主管
        outcome.flagged.succeeded = urgent_high.escalated;
        outcome.flagged.succeeded.extend(normal_low.succeeded);
        outcome.flagged.skipped = normal_low.skipped;

        if !outcome.flagged.succeeded.is_empty() {
            outcome.supervisor_notified = self
                .notifier
                .notify_supervisor_of_flagged_items(&staff, &outcome.flagged.succeeded, now)
                .is_some();
        }

        Ok(outcome)
    }

    /// 恢复可用
    ///
    /// 不改动任何工作项（包括 needs_review 标记）。
    #[instrument(skip(self, now), fields(staff_id = %staff_id))]
    pub fn set_available(&self, staff_id: &str, now: DateTime<Utc>) -> EngineResult<()> {
        let staff = self.load_staff(staff_id)?;

        self.repos.staff_store.update_availability(
            staff_id,
            &AvailabilityChange::restore_available(),
            now,
        )?;

        record_quietly(
            self.repos.action_log_store.as_ref(),
            ActionLog::new(ActionType::AvailabilityRestored, SYSTEM_ACTOR, staff_id, now)
                .with_payload(&serde_json::json!({ "from": staff.availability_status })),
        );

        tracing::info!(from = %staff.availability_status, "员工已恢复可用");
        Ok(())
    }

    /// 查询单元内待复核的工作项
    pub fn get_flagged_items_for_unit(&self, unit_id: &str) -> EngineResult<Vec<FlaggedItem>> {
        let assignments = self.repos.assignment_store.find_flagged_by_unit(unit_id)?;
        Ok(assignments.iter().map(FlaggedItem::from).collect())
    }

    fn load_staff(&self, staff_id: &str) -> EngineResult<StaffProfile> {
        self.repos
            .staff_store
            .find_staff(staff_id)?
            .ok_or_else(|| EngineError::NotFound {
                entity: "StaffProfile".to_string(),
                id: staff_id.to_string(),
            })
    }
}
