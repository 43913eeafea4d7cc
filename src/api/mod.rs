// ==========================================
// 工作量再分配引擎 - API 层
// ==========================================
// 职责: 对外暴露的业务接口（传输与鉴权由外层服务负责）
// ==========================================

pub mod availability_api;
pub mod error;

// 重导出核心类型
pub use availability_api::{AvailabilityApi, UpdateAvailabilityResponse};
pub use error::{ApiError, ApiResult};
