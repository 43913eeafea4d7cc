// ==========================================
// 工作量再分配引擎 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod action_log;
pub mod assignment;
pub mod notification;
pub mod staff;
pub mod types;

// 重导出核心类型
pub use action_log::{ActionLog, ActionType};
pub use assignment::{Assignment, BatchOutcome, FlaggedItem, ReassignedItem, SkipReason, SkippedItem};
pub use notification::{Notification, NOTIFICATION_TYPE_REVIEW_REQUIRED};
pub use staff::{AvailabilityChange, StaffProfile, WipCapacity};
pub use types::{
    AssignmentStatus, AvailabilitySource, AvailabilityStatus, Priority, PriorityTier, StaffRole,
    WorkItemType,
};
