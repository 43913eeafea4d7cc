// ==========================================
// 工作量再分配引擎 - 操作日志数据仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// ==========================================

use crate::db::SharedConnection;
use crate::domain::action_log::ActionLog;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::stores::ActionLogStore;
use rusqlite::{params, Connection, Row};

pub struct ActionLogRepository {
    conn: SharedConnection,
}

impl ActionLogRepository {
    /// 创建新的操作日志仓储
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<ActionLog> {
        let payload_json = match row.get::<_, Option<String>>(5)? {
            Some(raw) => serde_json::from_str(&raw).ok(),
            None => None,
        };
        Ok(ActionLog {
            action_id: row.get(0)?,
            action_type: row.get(1)?,
            action_ts: row.get(2)?,
            actor: row.get(3)?,
            target_id: row.get(4)?,
            payload_json,
            detail: row.get(6)?,
        })
    }

    /// 插入操作日志
    ///
    /// # 返回
    /// - `Ok(action_id)`: 成功插入,返回action_id
    pub fn insert(&self, log: &ActionLog) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO action_log (
                action_id, action_type, action_ts, actor, target_id, payload_json, detail
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                log.action_id,
                log.action_type,
                log.action_ts,
                log.actor,
                log.target_id,
                log.payload_json.as_ref().map(|v| v.to_string()),
                log.detail,
            ],
        )?;
        Ok(log.action_id.clone())
    }

    /// 按目标对象查询日志（时间升序）
    pub fn find_by_target(&self, target_id: &str) -> RepositoryResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT action_id, action_type, action_ts, actor, target_id, payload_json, detail
              FROM action_log
             WHERE target_id = ?1
             ORDER BY action_ts ASC, action_id ASC
            "#,
        )?;
        let logs = stmt
            .query_map(params![target_id], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(logs)
    }

    /// 按操作类型查询日志
    pub fn find_by_action_type(&self, action_type: &str) -> RepositoryResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT action_id, action_type, action_ts, actor, target_id, payload_json, detail
              FROM action_log
             WHERE action_type = ?1
             ORDER BY action_ts ASC, action_id ASC
            "#,
        )?;
        let logs = stmt
            .query_map(params![action_type], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(logs)
    }
}

impl ActionLogStore for ActionLogRepository {
    fn record(&self, log: &ActionLog) -> RepositoryResult<()> {
        self.insert(log).map(|_| ())
    }
}
