// ==========================================
// 工作量再分配引擎 - 核心库
// ==========================================
// 场景: 员工休假/不可用时重新分配其在办工作项
// 技术栈: Rust + SQLite
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 花名册
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// 性能统计
pub mod perf;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    AssignmentStatus, AvailabilitySource, AvailabilityStatus, Priority, PriorityTier, StaffRole,
    WorkItemType,
};

// 领域实体
pub use domain::{
    ActionLog, ActionType, Assignment, BatchOutcome, FlaggedItem, Notification, ReassignedItem,
    SkipReason, SkippedItem, StaffProfile,
};

// 引擎
pub use engine::{
    AvailabilityManager, CandidateResolver, EngineError, ReassignmentExecutor,
    ReassignmentRepositories, ReviewFlagger, SupervisorNotifier, WorkloadExtractor,
};

// API
pub use api::{ApiError, AvailabilityApi, UpdateAvailabilityResponse};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "workload-reassign";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";
