// ==========================================
// 工作量再分配引擎 - 花名册导入
// ==========================================
// 员工: user_id,full_name,unit_id,role,skills,individual_wip_limit
// 工作项: id,work_item_id,work_item_type,assignee_id,priority,status,required_skills[,assigned_at]
// ==========================================
// 技能列以 ';' 分隔
// required_skills: 空白 = 未登记要求; "-" = 明确无要求
// 每个文件一个事务: 任一行失败则整个文件不落库
// ==========================================

use crate::domain::assignment::Assignment;
use crate::domain::staff::StaffProfile;
use crate::domain::types::{
    AssignmentStatus, AvailabilitySource, AvailabilityStatus, Priority, StaffRole, WorkItemType,
};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{CsvParser, RawRecord};
use crate::repository::{AssignmentRepository, StaffProfileRepository};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

const NO_REQUIREMENT_MARKER: &str = "-";

/// 单个文件的导入结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub file: String,
    pub rows_imported: usize,
}

pub struct RosterImporter {
    staff_repo: Arc<StaffProfileRepository>,
    assignment_repo: Arc<AssignmentRepository>,
    parser: CsvParser,
}

impl RosterImporter {
    pub fn new(
        staff_repo: Arc<StaffProfileRepository>,
        assignment_repo: Arc<AssignmentRepository>,
    ) -> Self {
        Self {
            staff_repo,
            assignment_repo,
            parser: CsvParser,
        }
    }

    /// 导入员工档案
    pub fn import_staff(&self, path: &Path) -> ImportResult<ImportSummary> {
        let records = self.parser.parse_to_raw_records(path)?;
        let profiles = records
            .iter()
            .map(map_staff_record)
            .collect::<ImportResult<Vec<_>>>()?;

        let rows_imported = self.staff_repo.batch_upsert(&profiles)?;
        tracing::info!(file = %path.display(), rows_imported, "员工档案导入完成");
        Ok(ImportSummary {
            file: path.display().to_string(),
            rows_imported,
        })
    }

    /// 导入工作项分配（承办人须已存在）
    pub fn import_assignments(&self, path: &Path, now: DateTime<Utc>) -> ImportResult<ImportSummary> {
        let records = self.parser.parse_to_raw_records(path)?;
        let assignments = records
            .iter()
            .map(|r| map_assignment_record(r, now))
            .collect::<ImportResult<Vec<_>>>()?;

        let rows_imported = self.assignment_repo.batch_upsert(&assignments)?;
        tracing::info!(file = %path.display(), rows_imported, "工作项分配导入完成");
        Ok(ImportSummary {
            file: path.display().to_string(),
            rows_imported,
        })
    }
}

fn parse_skill_list(raw: &str) -> BTreeSet<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_required_skills(raw: &str) -> Option<BTreeSet<String>> {
    match raw.trim() {
        "" => None,
        NO_REQUIREMENT_MARKER => Some(BTreeSet::new()),
        list => Some(parse_skill_list(list)),
    }
}

fn mapping_error(record: &RawRecord, message: String) -> ImportError {
    ImportError::FieldMappingError {
        row: record.line,
        message,
    }
}

fn map_staff_record(record: &RawRecord) -> ImportResult<StaffProfile> {
    let user_id = record.require("user_id")?.to_string();
    let unit_id = record.require("unit_id")?.to_string();

    let limit_raw = record.require("individual_wip_limit")?;
    let individual_wip_limit: i32 = limit_raw
        .parse()
        .ok()
        .filter(|v: &i32| *v >= 0)
        .ok_or_else(|| {
            mapping_error(record, format!("individual_wip_limit 不是非负整数: {}", limit_raw))
        })?;

    let role = match record.get("role") {
        "" => StaffRole::Staff,
        raw => StaffRole::from_str(raw)
            .ok_or_else(|| mapping_error(record, format!("未知的 role: {}", raw)))?,
    };

    Ok(StaffProfile {
        user_id,
        full_name: record.get("full_name").to_string(),
        unit_id,
        role,
        skills: parse_skill_list(record.get("skills")),
        availability_status: AvailabilityStatus::Available,
        unavailable_until: None,
        unavailable_reason: None,
        availability_source: AvailabilitySource::Manual,
        individual_wip_limit,
        current_assignment_count: 0,
    })
}

fn map_assignment_record(record: &RawRecord, now: DateTime<Utc>) -> ImportResult<Assignment> {
    let id = record.require("id")?.to_string();
    let work_item_id = record.require("work_item_id")?.to_string();
    let assignee_id = record.require("assignee_id")?.to_string();

    let type_raw = record.require("work_item_type")?;
    let work_item_type = WorkItemType::from_str(type_raw)
        .ok_or_else(|| mapping_error(record, format!("未知的 work_item_type: {}", type_raw)))?;

    let priority_raw = record.require("priority")?;
    let priority = Priority::from_str(priority_raw)
        .ok_or_else(|| mapping_error(record, format!("未知的 priority: {}", priority_raw)))?;

    let status = match record.get("status") {
        "" => AssignmentStatus::Assigned,
        raw => AssignmentStatus::from_str(raw)
            .ok_or_else(|| mapping_error(record, format!("未知的 status: {}", raw)))?,
    };

    let assigned_at = match record.get("assigned_at") {
        "" => now,
        raw => DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| mapping_error(record, format!("assigned_at 不是 RFC 3339 时间: {}", e)))?,
    };

    Ok(Assignment {
        id,
        work_item_id,
        work_item_type,
        assignee_id,
        priority,
        status,
        required_skills: parse_required_skills(record.get("required_skills")),
        needs_review: false,
        review_reason: None,
        flagged_at: None,
        reassigned_from: None,
        reassignment_reason: None,
        assigned_at,
    })
}
