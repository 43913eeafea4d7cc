// ==========================================
// 工作量再分配引擎 - 员工档案领域模型
// ==========================================
// 对齐: staff_profiles 表
// 软约束: available 时 current_assignment_count < individual_wip_limit
// ==========================================

use crate::domain::types::{AvailabilitySource, AvailabilityStatus, StaffRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ==========================================
// StaffProfile - 员工档案
// ==========================================
// 由入职流程外部创建; 本引擎只在可用状态切换时修改, 从不删除
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffProfile {
    // ===== 主键 =====
    pub user_id: String,

    // ===== 组织与展示 =====
    pub full_name: String,
    pub unit_id: String,
    pub role: StaffRole,

    // ===== 能力 =====
    pub skills: BTreeSet<String>,

    // ===== 可用状态 =====
    pub availability_status: AvailabilityStatus,
    pub unavailable_until: Option<DateTime<Utc>>,
    pub unavailable_reason: Option<String>,
    pub availability_source: AvailabilitySource,

    // ===== 在办容量 =====
    pub individual_wip_limit: i32,
    pub current_assignment_count: i32,
}

impl StaffProfile {
    /// 展示名（姓名为空时回退为 user_id）
    pub fn display_name(&self) -> &str {
        let name = self.full_name.trim();
        if name.is_empty() {
            &self.user_id
        } else {
            name
        }
    }

    /// 技能集合是否包含全部所需技能（包含关系，而非交集）
    pub fn has_all_skills(&self, required: &BTreeSet<String>) -> bool {
        required.is_subset(&self.skills)
    }
}

// ==========================================
// Trait: WipCapacity
// ==========================================
// 用途: Candidate Resolver 容量检查接口
pub trait WipCapacity {
    /// 是否还能接收新工作项（严格小于上限）
    fn has_capacity(&self) -> bool;
}

impl WipCapacity for StaffProfile {
    fn has_capacity(&self) -> bool {
        self.current_assignment_count < self.individual_wip_limit
    }
}

/// 可用状态变更（写入 staff_profiles 的字段集合）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityChange {
    pub status: AvailabilityStatus,
    pub unavailable_until: Option<DateTime<Utc>>,
    pub unavailable_reason: Option<String>,
    pub source: AvailabilitySource,
}

impl AvailabilityChange {
    /// 恢复可用：清空截止时间与原因
    pub fn restore_available() -> Self {
        Self {
            status: AvailabilityStatus::Available,
            unavailable_until: None,
            unavailable_reason: None,
            source: AvailabilitySource::Manual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(skills: &[&str], count: i32, limit: i32) -> StaffProfile {
        StaffProfile {
            user_id: "u-1".to_string(),
            full_name: "  ".to_string(),
            unit_id: "U1".to_string(),
            role: StaffRole::Staff,
            skills: skills.iter().map(|s| s.to_string()).collect(),
            availability_status: AvailabilityStatus::Available,
            unavailable_until: None,
            unavailable_reason: None,
            availability_source: AvailabilitySource::Manual,
            individual_wip_limit: limit,
            current_assignment_count: count,
        }
    }

    #[test]
    fn test_skill_containment_not_overlap() {
        let p = profile(&["en"], 0, 5);
        let ar_en: BTreeSet<String> = ["ar", "en"].iter().map(|s| s.to_string()).collect();
        assert!(!p.has_all_skills(&ar_en));

        let en: BTreeSet<String> = ["en"].iter().map(|s| s.to_string()).collect();
        assert!(p.has_all_skills(&en));
        assert!(p.has_all_skills(&BTreeSet::new()));
    }

    #[test]
    fn test_capacity_is_strict() {
        assert!(profile(&[], 4, 5).has_capacity());
        assert!(!profile(&[], 5, 5).has_capacity());
    }

    #[test]
    fn test_display_name_falls_back_to_user_id() {
        let mut p = profile(&[], 0, 5);
        assert_eq!(p.display_name(), "u-1");
        p.full_name = "Noura Al-Harbi".to_string();
        assert_eq!(p.display_name(), "Noura Al-Harbi");
    }
}
