// ==========================================
// 工作量再分配引擎 - 导入层
// ==========================================
// 职责: 从 CSV 花名册初始化员工档案与工作项分配
// ==========================================

pub mod error;
pub mod file_parser;
pub mod roster_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, RawRecord};
pub use roster_importer::{ImportSummary, RosterImporter};
