// ==========================================
// 工作量再分配引擎 - 候选人解析
// ==========================================
// 规则:
// 1. 同单元 + available + 在办数 < 上限
// 2. 技能集合包含全部所需技能（包含关系，而非交集）
// 3. 在办数最少者优先; 并列按 user_id 升序
// ==========================================
// 注意: "读容量再决策" 不加锁, 同单元并发变更可能同时选中同一人
// ==========================================

use crate::domain::staff::{StaffProfile, WipCapacity};
use crate::domain::types::AvailabilityStatus;
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::StaffDirectoryStore;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::instrument;

/// 候选人是否合格（状态 + 容量 + 技能 + 非原承办人）
pub fn is_qualified(
    profile: &StaffProfile,
    unit_id: &str,
    required_skills: &BTreeSet<String>,
    exclude_user_id: Option<&str>,
) -> bool {
    profile.unit_id == unit_id
        && profile.availability_status == AvailabilityStatus::Available
        && profile.has_capacity()
        && profile.has_all_skills(required_skills)
        && exclude_user_id != Some(profile.user_id.as_str())
}

/// 候选人排序: 在办数升序, 再按 user_id 升序
pub fn compare_candidates(a: &StaffProfile, b: &StaffProfile) -> Ordering {
    a.current_assignment_count
        .cmp(&b.current_assignment_count)
        .then_with(|| a.user_id.cmp(&b.user_id))
}

/// 从给定档案中选出最佳候选人（纯函数）
pub fn select_best_candidate<'a>(
    profiles: &'a [StaffProfile],
    unit_id: &str,
    required_skills: &BTreeSet<String>,
    exclude_user_id: Option<&str>,
) -> Option<&'a StaffProfile> {
    profiles
        .iter()
        .filter(|p| is_qualified(p, unit_id, required_skills, exclude_user_id))
        .min_by(|a, b| compare_candidates(a, b))
}

pub struct CandidateResolver {
    staff_store: Arc<dyn StaffDirectoryStore>,
}

impl CandidateResolver {
    pub fn new(staff_store: Arc<dyn StaffDirectoryStore>) -> Self {
        Self { staff_store }
    }

    /// 查询合格候选人集合（已按优先顺序排列）
    ///
    /// # 返回
    /// - Ok(非空列表): 第一个即最佳候选人
    /// - Err(NoCandidateFound): 无人满足条件
    #[instrument(skip(self, required_skills), fields(unit_id = %unit_id, required = ?required_skills))]
    pub fn find_candidates(
        &self,
        unit_id: &str,
        required_skills: &BTreeSet<String>,
        exclude_user_id: Option<&str>,
    ) -> EngineResult<Vec<StaffProfile>> {
        let pool = self.staff_store.find_available_with_capacity(unit_id)?;

        let mut qualified: Vec<StaffProfile> = pool
            .into_iter()
            .filter(|p| is_qualified(p, unit_id, required_skills, exclude_user_id))
            .collect();

        if qualified.is_empty() {
            return Err(EngineError::NoCandidateFound {
                unit_id: unit_id.to_string(),
                required_skills: required_skills.clone(),
            });
        }

        qualified.sort_by(compare_candidates);
        tracing::debug!(candidates = qualified.len(), best = %qualified[0].user_id, "候选人解析完成");
        Ok(qualified)
    }

    /// 解析最佳候选人
    pub fn resolve_best(
        &self,
        unit_id: &str,
        required_skills: &BTreeSet<String>,
        exclude_user_id: Option<&str>,
    ) -> EngineResult<StaffProfile> {
        let mut candidates = self.find_candidates(unit_id, required_skills, exclude_user_id)?;
        Ok(candidates.swap_remove(0))
    }
}
