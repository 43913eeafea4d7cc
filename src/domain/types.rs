// ==========================================
// 工作量再分配引擎 - 领域类型定义
// ==========================================
// 对齐: staff_profiles / assignments 表的枚举列
// 序列化格式: snake_case (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 可用状态 (Availability Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    Available,   // 可接单
    OnLeave,     // 休假
    Unavailable, // 不可用（病假、出差等）
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl AvailabilityStatus {
    /// 从字符串解析可用状态
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "available" => Some(AvailabilityStatus::Available),
            "on_leave" => Some(AvailabilityStatus::OnLeave),
            "unavailable" => Some(AvailabilityStatus::Unavailable),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            AvailabilityStatus::Available => "available",
            AvailabilityStatus::OnLeave => "on_leave",
            AvailabilityStatus::Unavailable => "unavailable",
        }
    }

    /// 该状态是否使员工脱离在岗工作（触发工作量再分配）
    pub fn removes_from_active_work(&self) -> bool {
        matches!(
            self,
            AvailabilityStatus::OnLeave | AvailabilityStatus::Unavailable
        )
    }
}

// ==========================================
// 状态来源 (Availability Source)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilitySource {
    Manual, // 人工设置
    System, // 系统同步（HR 等）
}

impl fmt::Display for AvailabilitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl AvailabilitySource {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "manual" => Some(AvailabilitySource::Manual),
            "system" => Some(AvailabilitySource::System),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            AvailabilitySource::Manual => "manual",
            AvailabilitySource::System => "system",
        }
    }
}

// ==========================================
// 员工角色 (Staff Role)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Staff,      // 普通员工
    Supervisor, // 单元主管（接收复核通知）
    Admin,      // 管理员
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl StaffRole {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "staff" => Some(StaffRole::Staff),
            "supervisor" => Some(StaffRole::Supervisor),
            "admin" => Some(StaffRole::Admin),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            StaffRole::Staff => "staff",
            StaffRole::Supervisor => "supervisor",
            StaffRole::Admin => "admin",
        }
    }
}

// ==========================================
// 优先级 (Priority)
// ==========================================
// 红线: urgent/high 自动改派, normal/low 只做复核标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Urgent,
    High,
    Normal,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl Priority {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "urgent" => Some(Priority::Urgent),
            "high" => Some(Priority::High),
            "normal" => Some(Priority::Normal),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            Priority::Urgent => "urgent",
            Priority::High => "high",
            Priority::Normal => "normal",
            Priority::Low => "low",
        }
    }

    /// 所属优先级分组
    pub fn tier(&self) -> PriorityTier {
        match self {
            Priority::Urgent | Priority::High => PriorityTier::UrgentHigh,
            Priority::Normal | Priority::Low => PriorityTier::NormalLow,
        }
    }
}

// ==========================================
// 优先级分组 (Priority Tier)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityTier {
    UrgentHigh, // 自动改派
    NormalLow,  // 标记人工复核
}

impl PriorityTier {
    /// 分组包含的优先级
    pub fn priorities(&self) -> &'static [Priority] {
        match self {
            PriorityTier::UrgentHigh => &[Priority::Urgent, Priority::High],
            PriorityTier::NormalLow => &[Priority::Normal, Priority::Low],
        }
    }
}

// ==========================================
// 分配状态 (Assignment Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Pending,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl AssignmentStatus {
    /// 参与再分配的在办状态
    pub const ACTIVE: [AssignmentStatus; 2] =
        [AssignmentStatus::Assigned, AssignmentStatus::InProgress];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(AssignmentStatus::Pending),
            "assigned" => Some(AssignmentStatus::Assigned),
            "in_progress" => Some(AssignmentStatus::InProgress),
            "completed" => Some(AssignmentStatus::Completed),
            "cancelled" => Some(AssignmentStatus::Cancelled),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "pending",
            AssignmentStatus::Assigned => "assigned",
            AssignmentStatus::InProgress => "in_progress",
            AssignmentStatus::Completed => "completed",
            AssignmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }
}

// ==========================================
// 工作项类型 (Work Item Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemType {
    Dossier,
    Ticket,
    Position,
    Task,
}

impl fmt::Display for WorkItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl WorkItemType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "dossier" => Some(WorkItemType::Dossier),
            "ticket" => Some(WorkItemType::Ticket),
            "position" => Some(WorkItemType::Position),
            "task" => Some(WorkItemType::Task),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            WorkItemType::Dossier => "dossier",
            WorkItemType::Ticket => "ticket",
            WorkItemType::Position => "position",
            WorkItemType::Task => "task",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_tier_split() {
        assert_eq!(Priority::Urgent.tier(), PriorityTier::UrgentHigh);
        assert_eq!(Priority::High.tier(), PriorityTier::UrgentHigh);
        assert_eq!(Priority::Normal.tier(), PriorityTier::NormalLow);
        assert_eq!(Priority::Low.tier(), PriorityTier::NormalLow);

        for p in PriorityTier::UrgentHigh.priorities() {
            assert_eq!(p.tier(), PriorityTier::UrgentHigh);
        }
    }

    #[test]
    fn test_availability_status_roundtrip_db_str() {
        for status in [
            AvailabilityStatus::Available,
            AvailabilityStatus::OnLeave,
            AvailabilityStatus::Unavailable,
        ] {
            assert_eq!(AvailabilityStatus::from_str(status.to_db_str()), Some(status));
        }
        assert_eq!(AvailabilityStatus::from_str(" ON_LEAVE "), Some(AvailabilityStatus::OnLeave));
        assert_eq!(AvailabilityStatus::from_str("retired"), None);
    }

    #[test]
    fn test_removes_from_active_work() {
        assert!(!AvailabilityStatus::Available.removes_from_active_work());
        assert!(AvailabilityStatus::OnLeave.removes_from_active_work());
        assert!(AvailabilityStatus::Unavailable.removes_from_active_work());
    }

    #[test]
    fn test_assignment_status_active_set() {
        assert!(AssignmentStatus::Assigned.is_active());
        assert!(AssignmentStatus::InProgress.is_active());
        assert!(!AssignmentStatus::Pending.is_active());
        assert!(!AssignmentStatus::Completed.is_active());
        assert!(!AssignmentStatus::Cancelled.is_active());
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        assert_eq!(StaffRole::from_str(" Supervisor "), Some(StaffRole::Supervisor));
        assert_eq!(StaffRole::from_str("staff"), Some(StaffRole::Staff));
        assert_eq!(StaffRole::from_str("superviser"), None);
        assert_eq!(StaffRole::from_str(""), None);
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&AssignmentStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let status: AvailabilityStatus = serde_json::from_str("\"on_leave\"").unwrap();
        assert_eq!(status, AvailabilityStatus::OnLeave);
    }
}
