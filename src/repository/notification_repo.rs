// ==========================================
// 工作量再分配引擎 - 通知数据仓储
// ==========================================
// 职责: notifications 表写入与查询
// ==========================================

use crate::db::SharedConnection;
use crate::domain::notification::Notification;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::stores::NotificationSink;
use rusqlite::{params, Connection, Row};
use serde_json::Value as JsonValue;

pub struct NotificationRepository {
    conn: SharedConnection,
}

impl NotificationRepository {
    pub fn from_connection(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Notification> {
        let raw_metadata: String = row.get(8)?;
        let metadata: JsonValue = serde_json::from_str(&raw_metadata).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(Notification {
            id: row.get(0)?,
            user_id: row.get(1)?,
            notification_type: row.get(2)?,
            title_en: row.get(3)?,
            title_ar: row.get(4)?,
            message_en: row.get(5)?,
            message_ar: row.get(6)?,
            link: row.get(7)?,
            metadata,
            is_read: row.get::<_, i64>(9)? != 0,
            created_at: row.get(10)?,
        })
    }

    /// 插入通知
    pub fn insert(&self, n: &Notification) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO notifications (
                id, user_id, notification_type, title_en, title_ar,
                message_en, message_ar, link, metadata, is_read, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                n.id,
                n.user_id,
                n.notification_type,
                n.title_en,
                n.title_ar,
                n.message_en,
                n.message_ar,
                n.link,
                n.metadata.to_string(),
                n.is_read as i64,
                n.created_at,
            ],
        )?;
        Ok(())
    }

    /// 查询接收人的通知（最新在前）
    pub fn find_by_user(&self, user_id: &str) -> RepositoryResult<Vec<Notification>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, notification_type, title_en, title_ar,
                   message_en, message_ar, link, metadata, is_read, created_at
              FROM notifications
             WHERE user_id = ?1
             ORDER BY created_at DESC, id ASC
            "#,
        )?;
        let notifications = stmt
            .query_map(params![user_id], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(notifications)
    }

    /// 标记已读
    pub fn mark_read(&self, id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute("UPDATE notifications SET is_read = 1 WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(RepositoryError::not_found("Notification", id));
        }
        Ok(())
    }
}

impl NotificationSink for NotificationRepository {
    fn submit(&self, notification: &Notification) -> RepositoryResult<()> {
        self.insert(notification)
    }
}
