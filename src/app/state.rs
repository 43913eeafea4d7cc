// ==========================================
// 工作量再分配引擎 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享连接、仓储、引擎与API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::AvailabilityApi;
use crate::config::ConfigManager;
use crate::db::{apply_schema, open_sqlite_connection, SharedConnection};
use crate::engine::{AvailabilityManager, ReassignmentRepositories};
use crate::perf::install_sqlite_tracing;
use crate::repository::{
    ActionLogRepository, AssignmentRepository, NotificationRepository, StaffProfileRepository,
};

/// 应用状态
///
/// 所有仓储共用一个 SQLite 连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 共享连接
    pub conn: SharedConnection,

    /// 可用状态 API
    pub availability_api: Arc<AvailabilityApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    pub staff_repo: Arc<StaffProfileRepository>,
    pub assignment_repo: Arc<AssignmentRepository>,
    pub notification_repo: Arc<NotificationRepository>,

    /// 操作日志仓储（用于审计追踪）
    pub action_log_repo: Arc<ActionLogRepository>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库并建表（幂等）
    /// 2. 加载再分配配置
    /// 3. 初始化仓储、引擎与API
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let mut conn =
            open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        apply_schema(&conn).map_err(|e| format!("建表失败: {}", e))?;
        install_sqlite_tracing(&mut conn);

        Self::from_connection(db_path, Arc::new(Mutex::new(conn)))
    }

    /// 基于已建表的连接创建 AppState
    pub fn from_connection(db_path: String, conn: SharedConnection) -> Result<Self, String> {
        let config_manager = Arc::new(ConfigManager::from_connection(conn.clone()));
        let config = config_manager
            .load_reassignment_config()
            .map_err(|e| format!("加载再分配配置失败: {}", e))?;

        let staff_repo = Arc::new(StaffProfileRepository::from_connection(conn.clone()));
        let assignment_repo = Arc::new(AssignmentRepository::from_connection(conn.clone()));
        let notification_repo = Arc::new(NotificationRepository::from_connection(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::new(conn.clone()));

        let repos = ReassignmentRepositories::new(
            staff_repo.clone(),
            assignment_repo.clone(),
            notification_repo.clone(),
            action_log_repo.clone(),
        );

        let manager = Arc::new(AvailabilityManager::new(repos.clone(), config));
        let availability_api = Arc::new(AvailabilityApi::new(repos, manager));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            conn,
            availability_api,
            config_manager,
            staff_repo,
            assignment_repo,
            notification_repo,
            action_log_repo,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级:
/// 1. 环境变量 WORKLOAD_REASSIGN_DB_PATH
/// 2. 用户数据目录/workload-reassign/workload_reassign.db
/// 3. ./workload_reassign.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("WORKLOAD_REASSIGN_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./workload_reassign.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("workload-reassign");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("workload_reassign.db");
        }
    }

    path.to_string_lossy().to_string()
}
