// ==========================================
// 工作量再分配引擎 - 工作项分配数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 每次改派/标记都是单行原子更新, 不跨条目开事务
// ==========================================

use crate::db::SharedConnection;
use crate::domain::assignment::Assignment;
use crate::domain::types::{AssignmentStatus, Priority, WorkItemType};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::{enum_from_db, set_from_json, set_to_json};
use crate::repository::stores::{AssignmentStore, ReassignmentUpdate};
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const ASSIGNMENT_COLUMNS: &str = r#"
    a.id, a.work_item_id, a.work_item_type, a.assignee_id, a.priority, a.status,
    a.required_skills, a.needs_review, a.review_reason, a.flagged_at,
    a.reassigned_from, a.reassignment_reason, a.assigned_at
"#;

// 处理顺序: urgent 先于 high, 同级按分配时间、id
const PRIORITY_ORDER: &str = r#"
    CASE a.priority WHEN 'urgent' THEN 0 WHEN 'high' THEN 1 WHEN 'normal' THEN 2 ELSE 3 END,
    a.assigned_at ASC, a.id ASC
"#;

// ==========================================
// AssignmentRepository - 工作项分配仓储
// ==========================================
pub struct AssignmentRepository {
    conn: SharedConnection,
}

impl AssignmentRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Assignment> {
        let required_skills = match row.get::<_, Option<String>>(6)? {
            Some(raw) => Some(set_from_json(6, &raw)?),
            None => None,
        };

        Ok(Assignment {
            id: row.get(0)?,
            work_item_id: row.get(1)?,
            work_item_type: enum_from_db(2, &row.get::<_, String>(2)?, WorkItemType::from_str)?,
            assignee_id: row.get(3)?,
            priority: enum_from_db(4, &row.get::<_, String>(4)?, Priority::from_str)?,
            status: enum_from_db(5, &row.get::<_, String>(5)?, AssignmentStatus::from_str)?,
            required_skills,
            needs_review: row.get::<_, i64>(7)? != 0,
            review_reason: row.get(8)?,
            flagged_at: row.get(9)?,
            reassigned_from: row.get(10)?,
            reassignment_reason: row.get(11)?,
            assigned_at: row.get(12)?,
        })
    }

    /// 按 ID 查询工作项分配
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Assignment>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM assignments a WHERE a.id = ?1", ASSIGNMENT_COLUMNS);
        Ok(conn.query_row(&sql, params![id], Self::map_row).optional()?)
    }

    /// 查询承办人名下全部在办工作项（不限优先级）
    pub fn list_active_by_assignee(&self, assignee_id: &str) -> RepositoryResult<Vec<Assignment>> {
        self.find_active_by_assignee(
            assignee_id,
            &[Priority::Urgent, Priority::High, Priority::Normal, Priority::Low],
        )
    }

    /// 插入或更新工作项分配
    pub fn upsert(&self, assignment: &Assignment) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::upsert_with(&conn, assignment)
    }

    /// 批量插入或更新（单事务）
    pub fn batch_upsert(&self, assignments: &[Assignment]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        for assignment in assignments {
            Self::upsert_with(&tx, assignment)?;
        }
        tx.commit()?;
        Ok(assignments.len())
    }

    fn upsert_with(conn: &Connection, a: &Assignment) -> RepositoryResult<()> {
        let required_skills = match &a.required_skills {
            Some(skills) => Some(set_to_json(skills)?),
            None => None,
        };

        conn.execute(
            r#"
            INSERT INTO assignments (
                id, work_item_id, work_item_type, assignee_id, priority, status,
                required_skills, needs_review, review_reason, flagged_at,
                reassigned_from, reassignment_reason, assigned_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, datetime('now'))
            ON CONFLICT(id) DO UPDATE SET
                work_item_id = excluded.work_item_id,
                work_item_type = excluded.work_item_type,
                assignee_id = excluded.assignee_id,
                priority = excluded.priority,
                status = excluded.status,
                required_skills = excluded.required_skills,
                updated_at = datetime('now')
            "#,
            params![
                a.id,
                a.work_item_id,
                a.work_item_type.to_db_str(),
                a.assignee_id,
                a.priority.to_db_str(),
                a.status.to_db_str(),
                required_skills,
                a.needs_review as i64,
                a.review_reason,
                a.flagged_at,
                a.reassigned_from,
                a.reassignment_reason,
                a.assigned_at,
            ],
        )?;
        Ok(())
    }
}

impl AssignmentStore for AssignmentRepository {
    fn find_active_by_assignee(
        &self,
        assignee_id: &str,
        priorities: &[Priority],
    ) -> RepositoryResult<Vec<Assignment>> {
        if priorities.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.get_conn()?;
        let placeholders = (0..priorities.len())
            .map(|i| format!("?{}", i + 2))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            r#"
            SELECT {} FROM assignments a
             WHERE a.assignee_id = ?1
               AND a.status IN ('assigned', 'in_progress')
               AND a.priority IN ({})
             ORDER BY {}
            "#,
            ASSIGNMENT_COLUMNS, placeholders, PRIORITY_ORDER
        );

        let mut values: Vec<String> = Vec::with_capacity(priorities.len() + 1);
        values.push(assignee_id.to_string());
        values.extend(priorities.iter().map(|p| p.to_db_str().to_string()));

        let mut stmt = conn.prepare(&sql)?;
        let assignments = stmt
            .query_map(params_from_iter(values.iter()), Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(assignments)
    }

    fn reassign(&self, update: &ReassignmentUpdate<'_>) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        // assignee_id 仍为原承办人时才改派, 避免覆盖并发改动
        let rows = conn.execute(
            r#"
            UPDATE assignments
               SET assignee_id = ?3,
                   assigned_at = ?4,
                   reassigned_from = ?2,
                   reassignment_reason = ?5,
                   updated_at = ?4
             WHERE id = ?1
               AND assignee_id = ?2
            "#,
            params![
                update.assignment_id,
                update.from_assignee_id,
                update.to_assignee_id,
                update.assigned_at,
                update.reason,
            ],
        )?;

        if rows == 0 {
            let exists: bool = conn
                .query_row(
                    "SELECT 1 FROM assignments WHERE id = ?1",
                    params![update.assignment_id],
                    |_| Ok(true),
                )
                .optional()?
                .unwrap_or(false);
            if !exists {
                return Err(RepositoryError::not_found("Assignment", update.assignment_id));
            }
            return Err(RepositoryError::ConcurrentModification {
                message: format!(
                    "assignment {} 已不属于 {}",
                    update.assignment_id, update.from_assignee_id
                ),
            });
        }
        Ok(())
    }

    fn flag_for_review(
        &self,
        assignment_id: &str,
        reason: &str,
        flagged_at: DateTime<Utc>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE assignments
               SET needs_review = 1,
                   review_reason = ?2,
                   flagged_at = ?3,
                   updated_at = ?3
             WHERE id = ?1
            "#,
            params![assignment_id, reason, flagged_at],
        )?;

        if rows == 0 {
            return Err(RepositoryError::not_found("Assignment", assignment_id));
        }
        Ok(())
    }

    fn find_flagged_by_unit(&self, unit_id: &str) -> RepositoryResult<Vec<Assignment>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {} FROM assignments a
              JOIN staff_profiles s ON s.user_id = a.assignee_id
             WHERE s.unit_id = ?1
               AND a.needs_review = 1
               AND a.status IN ('assigned', 'in_progress')
             ORDER BY a.flagged_at ASC, a.id ASC
            "#,
            ASSIGNMENT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let assignments = stmt
            .query_map(params![unit_id], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(assignments)
    }
}
