// ==========================================
// 工作量再分配引擎 - 通知领域模型
// ==========================================
// 对齐: notifications 表
// 用途: 主管复核提醒（双语）
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// 通知类型: 工作项待复核
pub const NOTIFICATION_TYPE_REVIEW_REQUIRED: &str = "assignment_review_required";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: String, // 接收人
    pub notification_type: String,

    // ===== 双语内容 =====
    pub title_en: String,
    pub title_ar: String,
    pub message_en: String,
    pub message_ar: String,

    pub link: Option<String>,
    pub metadata: JsonValue, // { staff_id, assignment_ids, flagged_count }
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// 元数据中的受影响工作项 ID
    pub fn assignment_ids(&self) -> Vec<String> {
        self.metadata
            .get("assignment_ids")
            .and_then(|v| v.as_array())
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| id.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}
