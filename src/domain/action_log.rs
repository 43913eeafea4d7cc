// ==========================================
// 工作量再分配引擎 - 操作日志领域模型
// ==========================================
// 用途: 审计追踪（状态切换、改派、复核标记）
// 对齐: action_log 表
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ==========================================
// ActionLog - 操作日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,
    pub action_type: String,      // 存储为字符串
    pub action_ts: DateTime<Utc>,
    pub actor: String,            // 操作人（系统操作为 "system"）
    pub target_id: String,        // 员工 ID 或工作项 ID
    pub payload_json: Option<JsonValue>,
    pub detail: Option<String>,
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    AvailabilityChanged, // 可用状态变更
    AvailabilityRestored, // 恢复可用
    AssignmentReassigned, // 自动改派
    AssignmentFlagged,    // 标记人工复核
}

impl ActionType {
    /// 转换为字符串 (用于数据库存储)
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::AvailabilityChanged => "AvailabilityChanged",
            ActionType::AvailabilityRestored => "AvailabilityRestored",
            ActionType::AssignmentReassigned => "AssignmentReassigned",
            ActionType::AssignmentFlagged => "AssignmentFlagged",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "AvailabilityChanged" => Some(ActionType::AvailabilityChanged),
            "AvailabilityRestored" => Some(ActionType::AvailabilityRestored),
            "AssignmentReassigned" => Some(ActionType::AssignmentReassigned),
            "AssignmentFlagged" => Some(ActionType::AssignmentFlagged),
            _ => None,
        }
    }
}

impl ActionLog {
    /// 创建新的操作日志（action_id 使用 UUID v4）
    pub fn new(action_type: ActionType, actor: &str, target_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            action_type: action_type.as_str().to_string(),
            action_ts: now,
            actor: actor.to_string(),
            target_id: target_id.to_string(),
            payload_json: None,
            detail: None,
        }
    }

    /// 设置操作负载 (转换为JSON)
    pub fn with_payload<T: Serialize>(mut self, payload: &T) -> Self {
        self.payload_json = serde_json::to_value(payload).ok();
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
