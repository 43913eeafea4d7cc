// ==========================================
// 工作量再分配引擎 - 引擎层存储聚合
// ==========================================
// 职责: 聚合再分配引擎所需的所有外部存储
// 说明: 字段是 trait object, 测试可整体替换为替身
// ==========================================

use std::sync::Arc;

use crate::db::SharedConnection;
use crate::repository::{
    ActionLogRepository, ActionLogStore, AssignmentRepository, AssignmentStore,
    NotificationRepository, NotificationSink, StaffDirectoryStore, StaffProfileRepository,
};

/// 再分配引擎存储集合
///
/// # 包含的存储
/// - `staff_store`: 员工目录
/// - `assignment_store`: 工作项分配
/// - `notification_sink`: 通知落地
/// - `action_log_store`: 审计日志
#[derive(Clone)]
pub struct ReassignmentRepositories {
    pub staff_store: Arc<dyn StaffDirectoryStore>,
    pub assignment_store: Arc<dyn AssignmentStore>,
    pub notification_sink: Arc<dyn NotificationSink>,
    pub action_log_store: Arc<dyn ActionLogStore>,
}

impl ReassignmentRepositories {
    pub fn new(
        staff_store: Arc<dyn StaffDirectoryStore>,
        assignment_store: Arc<dyn AssignmentStore>,
        notification_sink: Arc<dyn NotificationSink>,
        action_log_store: Arc<dyn ActionLogStore>,
    ) -> Self {
        Self {
            staff_store,
            assignment_store,
            notification_sink,
            action_log_store,
        }
    }

    /// 基于同一个 SQLite 连接构建全部默认仓储
    pub fn from_connection(conn: SharedConnection) -> Self {
        Self {
            staff_store: Arc::new(StaffProfileRepository::from_connection(conn.clone())),
            assignment_store: Arc::new(AssignmentRepository::from_connection(conn.clone())),
            notification_sink: Arc::new(NotificationRepository::from_connection(conn.clone())),
            action_log_store: Arc::new(ActionLogRepository::new(conn)),
        }
    }

    pub fn staff_store(&self) -> &Arc<dyn StaffDirectoryStore> {
        &self.staff_store
    }

    pub fn assignment_store(&self) -> &Arc<dyn AssignmentStore> {
        &self.assignment_store
    }

    pub fn notification_sink(&self) -> &Arc<dyn NotificationSink> {
        &self.notification_sink
    }

    pub fn action_log_store(&self) -> &Arc<dyn ActionLogStore> {
        &self.action_log_store
    }
}
