// ==========================================
// 工作量再分配引擎 - 员工档案数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: current_assignment_count 由 assignments 表触发器维护, 此处不写
// ==========================================

use crate::db::SharedConnection;
use crate::domain::staff::{AvailabilityChange, StaffProfile};
use crate::domain::types::{AvailabilitySource, AvailabilityStatus, StaffRole};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::{enum_from_db, set_from_json, set_to_json};
use crate::repository::stores::StaffDirectoryStore;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

const STAFF_COLUMNS: &str = r#"
    user_id, full_name, unit_id, role, skills,
    availability_status, unavailable_until, unavailable_reason, availability_source,
    individual_wip_limit, current_assignment_count
"#;

// ==========================================
// StaffProfileRepository - 员工档案仓储
// ==========================================
pub struct StaffProfileRepository {
    conn: SharedConnection,
}

impl StaffProfileRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<StaffProfile> {
        Ok(StaffProfile {
            user_id: row.get(0)?,
            full_name: row.get(1)?,
            unit_id: row.get(2)?,
            role: enum_from_db(3, &row.get::<_, String>(3)?, StaffRole::from_str)?,
            skills: set_from_json(4, &row.get::<_, String>(4)?)?,
            availability_status: enum_from_db(
                5,
                &row.get::<_, String>(5)?,
                AvailabilityStatus::from_str,
            )?,
            unavailable_until: row.get(6)?,
            unavailable_reason: row.get(7)?,
            availability_source: enum_from_db(
                8,
                &row.get::<_, String>(8)?,
                AvailabilitySource::from_str,
            )?,
            individual_wip_limit: row.get(9)?,
            current_assignment_count: row.get(10)?,
        })
    }

    /// 按 user_id 查询员工档案
    ///
    /// # 返回
    /// - Ok(Some(StaffProfile)): 找到
    /// - Ok(None): 未找到
    pub fn find_by_id(&self, user_id: &str) -> RepositoryResult<Option<StaffProfile>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM staff_profiles WHERE user_id = ?1", STAFF_COLUMNS);
        let profile = conn
            .query_row(&sql, params![user_id], Self::map_row)
            .optional()?;
        Ok(profile)
    }

    /// 插入或更新员工档案
    ///
    /// 冲突时保留已有 current_assignment_count（由触发器维护）
    pub fn upsert(&self, profile: &StaffProfile) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::upsert_with(&conn, profile)
    }

    /// 批量插入或更新（单事务）
    pub fn batch_upsert(&self, profiles: &[StaffProfile]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        for profile in profiles {
            Self::upsert_with(&tx, profile)?;
        }
        tx.commit()?;
        Ok(profiles.len())
    }

    fn upsert_with(conn: &Connection, profile: &StaffProfile) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO staff_profiles (
                user_id, full_name, unit_id, role, skills,
                availability_status, unavailable_until, unavailable_reason, availability_source,
                individual_wip_limit, current_assignment_count, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, datetime('now'))
            ON CONFLICT(user_id) DO UPDATE SET
                full_name = excluded.full_name,
                unit_id = excluded.unit_id,
                role = excluded.role,
                skills = excluded.skills,
                individual_wip_limit = excluded.individual_wip_limit,
                updated_at = datetime('now')
            "#,
            params![
                profile.user_id,
                profile.full_name,
                profile.unit_id,
                profile.role.to_db_str(),
                set_to_json(&profile.skills)?,
                profile.availability_status.to_db_str(),
                profile.unavailable_until,
                profile.unavailable_reason,
                profile.availability_source.to_db_str(),
                profile.individual_wip_limit,
                profile.current_assignment_count,
            ],
        )?;
        Ok(())
    }
}

impl StaffDirectoryStore for StaffProfileRepository {
    fn find_staff(&self, user_id: &str) -> RepositoryResult<Option<StaffProfile>> {
        self.find_by_id(user_id)
    }

    fn update_availability(
        &self,
        user_id: &str,
        change: &AvailabilityChange,
        now: DateTime<Utc>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE staff_profiles
               SET availability_status = ?2,
                   unavailable_until = ?3,
                   unavailable_reason = ?4,
                   availability_source = ?5,
                   updated_at = ?6
             WHERE user_id = ?1
            "#,
            params![
                user_id,
                change.status.to_db_str(),
                change.unavailable_until,
                change.unavailable_reason,
                change.source.to_db_str(),
                now,
            ],
        )?;

        if rows == 0 {
            return Err(RepositoryError::not_found("StaffProfile", user_id));
        }
        Ok(())
    }

    fn find_available_with_capacity(&self, unit_id: &str) -> RepositoryResult<Vec<StaffProfile>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {} FROM staff_profiles
             WHERE unit_id = ?1
               AND availability_status = 'available'
               AND current_assignment_count < individual_wip_limit
             ORDER BY current_assignment_count ASC, user_id ASC
            "#,
            STAFF_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let profiles = stmt
            .query_map(params![unit_id], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(profiles)
    }

    fn find_by_unit_and_role(
        &self,
        unit_id: &str,
        role: StaffRole,
    ) -> RepositoryResult<Vec<StaffProfile>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM staff_profiles WHERE unit_id = ?1 AND role = ?2 ORDER BY user_id",
            STAFF_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let profiles = stmt
            .query_map(params![unit_id, role.to_db_str()], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(profiles)
    }
}
