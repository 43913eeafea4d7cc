// ==========================================
// 工作量再分配引擎 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换 Repository / Engine 错误为调用方可读的消息
// ==========================================

use crate::engine::error::EngineError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入与业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("并发冲突: {0}")]
    ConcurrentModification(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::ConcurrentModification { message } => {
                ApiError::ConcurrentModification(message)
            }
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::ValidationError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::ValidationError(format!("外键约束违反: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Validation(msg) => ApiError::ValidationError(msg),
            EngineError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            EngineError::Infrastructure(repo_err) => repo_err.into(),
            // 以下两类不应到达顶层, 出现即为内部错误
            other @ EngineError::NoCandidateFound { .. } => ApiError::InternalError(other.to_string()),
            other @ EngineError::NotificationDispatch(_) => ApiError::InternalError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        let api_err: ApiError = RepositoryError::not_found("StaffProfile", "S001").into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("StaffProfile"));
                assert!(msg.contains("S001"));
            }
            _ => panic!("Expected NotFound"),
        }

        let api_err: ApiError = RepositoryError::LockError("poisoned".to_string()).into();
        assert!(matches!(api_err, ApiError::DatabaseConnectionError(_)));
    }

    #[test]
    fn test_engine_error_conversion() {
        let api_err: ApiError = EngineError::Validation("past date".to_string()).into();
        assert!(matches!(api_err, ApiError::ValidationError(_)));

        let api_err: ApiError =
            EngineError::Infrastructure(RepositoryError::DatabaseQueryError("disk I/O".to_string()))
                .into();
        match api_err {
            ApiError::DatabaseError(msg) => assert_eq!(msg, "disk I/O"),
            _ => panic!("Expected DatabaseError"),
        }
    }
}
