// ==========================================
// 工作量再分配引擎 - 引擎层错误类型
// ==========================================
// NoCandidateFound / NotificationDispatch 只在引擎内部流转,
// 不会从顶层操作返回
// ==========================================

use crate::repository::error::RepositoryError;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// 输入不合法（零写入）
    #[error("校验失败: {0}")]
    Validation(String),

    #[error("{entity} 不存在: {id}")]
    NotFound { entity: String, id: String },

    /// 无满足技能与容量的候选人（非致命，跳过该工作项）
    #[error("单元 {unit_id} 内无候选人满足技能 {required_skills:?}")]
    NoCandidateFound {
        unit_id: String,
        required_skills: BTreeSet<String>,
    },

    #[error("存储访问失败: {0}")]
    Infrastructure(#[source] RepositoryError),

    /// 通知投递失败（只记录日志）
    #[error("通知投递失败: {0}")]
    NotificationDispatch(String),
}

impl From<RepositoryError> for EngineError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => EngineError::NotFound { entity, id },
            other => EngineError::Infrastructure(other),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
