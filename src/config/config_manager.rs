// ==========================================
// 工作量再分配引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::db::SharedConnection;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

const GLOBAL_SCOPE: &str = "global";

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 改派
    pub const REASSIGN_REASON: &str = "reassign.reason";

    // 复核
    pub const REVIEW_REASON: &str = "review.reason";

    // 通知
    pub const NOTIFY_ENABLED: &str = "notify.enabled";
    pub const NOTIFY_LINK: &str = "notify.link";
    pub const NOTIFY_LOCALES: &str = "notify.locales"; // 逗号分隔, 如 "en,ar"
}

// ==========================================
// ReassignmentConfig - 再分配配置快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReassignmentConfig {
    pub reassignment_reason: String,
    pub review_reason: String,
    pub notify_enabled: bool,
    pub notify_link: Option<String>,
    pub primary_locale: String,
    pub secondary_locale: String,
}

impl Default for ReassignmentConfig {
    fn default() -> Self {
        Self {
            reassignment_reason: "Staff unavailable".to_string(),
            review_reason: "Staff unavailable".to_string(),
            notify_enabled: true,
            notify_link: Some("/assignments?needs_review=true".to_string()),
            primary_locale: "en".to_string(),
            secondary_locale: "ar".to_string(),
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: SharedConnection,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![GLOBAL_SCOPE, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（覆盖已有值）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = datetime('now')
            "#,
            params![GLOBAL_SCOPE, key, value],
        )?;
        Ok(())
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 加载再分配配置（缺省项使用默认值）
    pub fn load_reassignment_config(&self) -> RepositoryResult<ReassignmentConfig> {
        let defaults = ReassignmentConfig::default();

        let reassignment_reason =
            self.get_config_or_default(config_keys::REASSIGN_REASON, &defaults.reassignment_reason)?;
        let review_reason =
            self.get_config_or_default(config_keys::REVIEW_REASON, &defaults.review_reason)?;

        let notify_enabled = match self.get_global_config_value(config_keys::NOTIFY_ENABLED)? {
            Some(raw) => parse_bool(&raw).unwrap_or_else(|| {
                tracing::warn!(key = config_keys::NOTIFY_ENABLED, value = %raw, "配置值无法解析为布尔值，使用默认值");
                defaults.notify_enabled
            }),
            None => defaults.notify_enabled,
        };

        let notify_link = match self.get_global_config_value(config_keys::NOTIFY_LINK)? {
            Some(raw) if raw.trim().is_empty() => None,
            Some(raw) => Some(raw),
            None => defaults.notify_link.clone(),
        };

        let (primary_locale, secondary_locale) =
            match self.get_global_config_value(config_keys::NOTIFY_LOCALES)? {
                Some(raw) => parse_locales(&raw).unwrap_or_else(|| {
                    tracing::warn!(key = config_keys::NOTIFY_LOCALES, value = %raw, "语言配置需要两个语言代码，使用默认值");
                    (defaults.primary_locale.clone(), defaults.secondary_locale.clone())
                }),
                None => (defaults.primary_locale.clone(), defaults.secondary_locale.clone()),
            };

        Ok(ReassignmentConfig {
            reassignment_reason,
            review_reason,
            notify_enabled,
            notify_link,
            primary_locale,
            secondary_locale,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

fn parse_locales(raw: &str) -> Option<(String, String)> {
    let parts: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    match parts.as_slice() {
        [primary, secondary] => Some((primary.to_string(), secondary.to_string())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[test]
    fn test_defaults_when_table_empty() {
        let manager = ConfigManager::from_connection(open_in_memory().unwrap());
        let config = manager.load_reassignment_config().unwrap();
        assert_eq!(config, ReassignmentConfig::default());
        assert_eq!(config.reassignment_reason, "Staff unavailable");
    }

    #[test]
    fn test_overrides_are_applied() {
        let manager = ConfigManager::from_connection(open_in_memory().unwrap());
        manager.set_global_config_value(config_keys::REVIEW_REASON, "Owner on leave").unwrap();
        manager.set_global_config_value(config_keys::NOTIFY_ENABLED, "off").unwrap();
        manager.set_global_config_value(config_keys::NOTIFY_LINK, "").unwrap();
        manager.set_global_config_value(config_keys::NOTIFY_LOCALES, "ar, en").unwrap();

        let config = manager.load_reassignment_config().unwrap();
        assert_eq!(config.review_reason, "Owner on leave");
        assert!(!config.notify_enabled);
        assert_eq!(config.notify_link, None);
        assert_eq!(config.primary_locale, "ar");
        assert_eq!(config.secondary_locale, "en");
    }

    #[test]
    fn test_invalid_values_fall_back_to_defaults() {
        let manager = ConfigManager::from_connection(open_in_memory().unwrap());
        manager.set_global_config_value(config_keys::NOTIFY_ENABLED, "maybe").unwrap();
        manager.set_global_config_value(config_keys::NOTIFY_LOCALES, "en").unwrap();

        let config = manager.load_reassignment_config().unwrap();
        assert!(config.notify_enabled);
        assert_eq!(config.primary_locale, "en");
        assert_eq!(config.secondary_locale, "ar");
    }

    #[test]
    fn test_set_overwrites_existing_value() {
        let manager = ConfigManager::from_connection(open_in_memory().unwrap());
        manager.set_global_config_value(config_keys::REASSIGN_REASON, "a").unwrap();
        manager.set_global_config_value(config_keys::REASSIGN_REASON, "b").unwrap();
        assert_eq!(
            manager.get_global_config_value(config_keys::REASSIGN_REASON).unwrap(),
            Some("b".to_string())
        );
    }
}
