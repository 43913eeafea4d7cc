// ==========================================
// 工作量再分配引擎 - 外部存储接口 Trait
// ==========================================
// 职责: 引擎依赖的存储接口（依赖倒置）
// 说明: Engine 只依赖这些 trait; SQLite 仓储是默认实现,
//       测试可替换为故障注入替身
// ==========================================

use crate::domain::action_log::ActionLog;
use crate::domain::assignment::Assignment;
use crate::domain::notification::Notification;
use crate::domain::staff::{AvailabilityChange, StaffProfile};
use crate::domain::types::{Priority, StaffRole};
use crate::repository::error::RepositoryResult;
use chrono::{DateTime, Utc};

// ==========================================
// StaffDirectoryStore - 员工目录
// ==========================================
pub trait StaffDirectoryStore: Send + Sync {
    /// 按 user_id 读取员工档案
    fn find_staff(&self, user_id: &str) -> RepositoryResult<Option<StaffProfile>>;

    /// 写入可用状态（单条原子更新）
    ///
    /// # 返回
    /// - Err(NotFound): 员工不存在
    fn update_availability(
        &self,
        user_id: &str,
        change: &AvailabilityChange,
        now: DateTime<Utc>,
    ) -> RepositoryResult<()>;

    /// 查询单元内 available 且在办数严格小于上限的员工
    fn find_available_with_capacity(&self, unit_id: &str) -> RepositoryResult<Vec<StaffProfile>>;

    /// 查询单元内指定角色的员工（按 user_id 升序）
    fn find_by_unit_and_role(
        &self,
        unit_id: &str,
        role: StaffRole,
    ) -> RepositoryResult<Vec<StaffProfile>>;
}

/// 改派写入参数
#[derive(Debug, Clone)]
pub struct ReassignmentUpdate<'a> {
    pub assignment_id: &'a str,
    pub from_assignee_id: &'a str,
    pub to_assignee_id: &'a str,
    pub reason: &'a str,
    pub assigned_at: DateTime<Utc>,
}

// ==========================================
// AssignmentStore - 工作项分配
// ==========================================
pub trait AssignmentStore: Send + Sync {
    /// 查询承办人名下在办（assigned / in_progress）且优先级属于给定集合的工作项
    fn find_active_by_assignee(
        &self,
        assignee_id: &str,
        priorities: &[Priority],
    ) -> RepositoryResult<Vec<Assignment>>;

    /// 改派承办人（单条原子更新）
    fn reassign(&self, update: &ReassignmentUpdate<'_>) -> RepositoryResult<()>;

    /// 打复核标记（不改变承办人）
    fn flag_for_review(
        &self,
        assignment_id: &str,
        reason: &str,
        flagged_at: DateTime<Utc>,
    ) -> RepositoryResult<()>;

    /// 查询单元内待复核的在办工作项
    fn find_flagged_by_unit(&self, unit_id: &str) -> RepositoryResult<Vec<Assignment>>;
}

// ==========================================
// NotificationSink - 通知落地
// ==========================================
pub trait NotificationSink: Send + Sync {
    fn submit(&self, notification: &Notification) -> RepositoryResult<()>;
}

// ==========================================
// ActionLogStore - 审计日志
// ==========================================
pub trait ActionLogStore: Send + Sync {
    fn record(&self, log: &ActionLog) -> RepositoryResult<()>;
}
