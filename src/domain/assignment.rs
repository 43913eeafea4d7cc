// ==========================================
// 工作量再分配引擎 - 工作项分配领域模型
// ==========================================
// 对齐: assignments 表
// 红线: 任一时刻只有一个有效承办人
// ==========================================

use crate::domain::types::{AssignmentStatus, Priority, WorkItemType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ==========================================
// Assignment - 工作项分配
// ==========================================
// 本引擎只做两类修改: 改派承办人 / 打复核标记; 不创建也不删除
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub work_item_id: String,
    pub work_item_type: WorkItemType,
    pub assignee_id: String,
    pub priority: Priority,
    pub status: AssignmentStatus,
    // None: 未登记技能要求（改派时沿用原承办人技能）; Some(空集): 明确无要求
    pub required_skills: Option<BTreeSet<String>>,

    // ===== 复核标记 =====
    pub needs_review: bool,
    pub review_reason: Option<String>,
    pub flagged_at: Option<DateTime<Utc>>,

    // ===== 改派轨迹 =====
    pub reassigned_from: Option<String>,
    pub reassignment_reason: Option<String>,
    pub assigned_at: DateTime<Utc>,
}

// ==========================================
// 单次调用的结果记录（不落库）
// ==========================================

/// 已自动改派的工作项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReassignedItem {
    pub assignment_id: String,
    pub work_item_id: String,
    pub work_item_type: WorkItemType,
    pub priority: Priority,
    pub old_assignee_id: String,
    pub new_assignee_id: String,
    pub new_assignee_name: String,
}

/// 已标记人工复核的工作项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedItem {
    pub assignment_id: String,
    pub work_item_id: String,
    pub work_item_type: WorkItemType,
    pub priority: Priority,
    pub assignee_id: String,
    pub review_reason: Option<String>,
    pub flagged_at: Option<DateTime<Utc>>,
}

impl From<&Assignment> for FlaggedItem {
    fn from(a: &Assignment) -> Self {
        Self {
            assignment_id: a.id.clone(),
            work_item_id: a.work_item_id.clone(),
            work_item_type: a.work_item_type,
            priority: a.priority,
            assignee_id: a.assignee_id.clone(),
            review_reason: a.review_reason.clone(),
            flagged_at: a.flagged_at,
        }
    }
}

/// 跳过原因
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// 无满足技能与容量的候选人，仍挂在原承办人名下
    NoCandidate,
    /// 单条写入失败
    WriteFailed(String),
}

/// 被跳过的工作项（需后续人工跟进）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedItem {
    pub assignment_id: String,
    pub work_item_id: String,
    pub reason: SkipReason,
}

impl SkippedItem {
    pub fn new(assignment: &Assignment, reason: SkipReason) -> Self {
        Self {
            assignment_id: assignment.id.clone(),
            work_item_id: assignment.work_item_id.clone(),
            reason,
        }
    }
}

// ==========================================
// BatchOutcome - 批处理结果（部分成功语义）
// ==========================================
// 单条失败只进入 skipped, 不中断其余条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome<T> {
    pub succeeded: Vec<T>,
    pub skipped: Vec<SkippedItem>,
}

impl<T> BatchOutcome<T> {
    pub fn empty() -> Self {
        Self {
            succeeded: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// 处理过的条目总数
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.skipped.len()
    }
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self::empty()
    }
}
