// ==========================================
// 工作量再分配引擎 - 可用状态 API
// ==========================================
// 职责: 状态变更、恢复可用、待复核查询
// 说明: 调用方需检查 reassigned_items / flagged_for_review / skipped
//       判断再分配是否完整
// ==========================================

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::assignment::{Assignment, FlaggedItem, ReassignedItem, SkippedItem};
use crate::domain::staff::StaffProfile;
use crate::domain::types::{AvailabilityStatus, PriorityTier};
use crate::engine::{AvailabilityManager, AvailabilityRequest, ReassignmentRepositories, WorkloadExtractor};
use crate::perf::PerfGuard;

// ==========================================
// UpdateAvailabilityResponse - 状态变更响应
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateAvailabilityResponse {
    pub updated: bool,
    pub status: AvailabilityStatus,
    pub reassigned_items: Vec<ReassignedItem>,
    pub flagged_for_review: Vec<FlaggedItem>,
    /// 未能处理的工作项（仍在原承办人名下，需人工跟进）
    pub skipped: Vec<SkippedItem>,
    pub supervisor_notified: bool,
}

// ==========================================
// AvailabilityApi
// ==========================================
pub struct AvailabilityApi {
    repos: ReassignmentRepositories,
    manager: Arc<AvailabilityManager>,
}

impl AvailabilityApi {
    pub fn new(repos: ReassignmentRepositories, manager: Arc<AvailabilityManager>) -> Self {
        Self { repos, manager }
    }

    /// 变更员工可用状态
    ///
    /// # 参数
    /// - staff_id: 员工ID
    /// - status: 目标状态
    /// - unavailable_until: 截止时间（on_leave 时必须晚于当前时间）
    /// - reason: 原因
    pub fn update_availability(
        &self,
        staff_id: &str,
        status: AvailabilityStatus,
        unavailable_until: Option<DateTime<Utc>>,
        reason: Option<String>,
    ) -> ApiResult<UpdateAvailabilityResponse> {
        self.update_availability_at(staff_id, status, unavailable_until, reason, Utc::now())
    }

    /// 同 update_availability, 由调用方提供当前时间
    pub fn update_availability_at(
        &self,
        staff_id: &str,
        status: AvailabilityStatus,
        unavailable_until: Option<DateTime<Utc>>,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> ApiResult<UpdateAvailabilityResponse> {
        let _perf = PerfGuard::new("update_availability").subject(staff_id);

        if staff_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("员工ID不能为空".to_string()));
        }
        let reason = reason.filter(|r| !r.trim().is_empty());

        let request = AvailabilityRequest {
            status,
            unavailable_until,
            reason,
        };
        let outcome = self.manager.update_availability(staff_id, &request, now)?;

        let mut skipped = outcome.reassigned.skipped;
        skipped.extend(outcome.flagged.skipped);

        Ok(UpdateAvailabilityResponse {
            updated: true,
            status: outcome.status,
            reassigned_items: outcome.reassigned.succeeded,
            flagged_for_review: outcome.flagged.succeeded,
            skipped,
            supervisor_notified: outcome.supervisor_notified,
        })
    }

    /// 恢复可用（不清除复核标记）
    pub fn set_available(&self, staff_id: &str) -> ApiResult<()> {
        self.set_available_at(staff_id, Utc::now())
    }

    pub fn set_available_at(&self, staff_id: &str, now: DateTime<Utc>) -> ApiResult<()> {
        let _perf = PerfGuard::new("set_available").subject(staff_id);

        if staff_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("员工ID不能为空".to_string()));
        }
        self.manager.set_available(staff_id, now)?;
        Ok(())
    }

    /// 查询单元内待复核的工作项
    pub fn get_flagged_items_for_unit(&self, unit_id: &str) -> ApiResult<Vec<FlaggedItem>> {
        let _perf = PerfGuard::new("get_flagged_items_for_unit").subject(unit_id);

        if unit_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("单元ID不能为空".to_string()));
        }
        Ok(self.manager.get_flagged_items_for_unit(unit_id)?)
    }

    /// 查询员工档案
    pub fn get_staff_profile(&self, staff_id: &str) -> ApiResult<StaffProfile> {
        if staff_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("员工ID不能为空".to_string()));
        }
        self.repos
            .staff_store
            .find_staff(staff_id)?
            .ok_or_else(|| ApiError::NotFound(format!("StaffProfile(id={})不存在", staff_id)))
    }

    /// 查询员工全部在办工作项（urgent → low）
    pub fn list_active_assignments(&self, staff_id: &str) -> ApiResult<Vec<Assignment>> {
        let _perf = PerfGuard::new("list_active_assignments").subject(staff_id);

        // 不存在的员工返回 NotFound, 而不是空列表
        self.get_staff_profile(staff_id)?;

        let extractor = WorkloadExtractor::new(self.repos.assignment_store.clone());
        let mut items = extractor.list_active_assignments(staff_id, PriorityTier::UrgentHigh)?;
        items.extend(extractor.list_active_assignments(staff_id, PriorityTier::NormalLow)?);
        Ok(items)
    }
}
