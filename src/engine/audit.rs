// ==========================================
// 工作量再分配引擎 - 审计记录
// ==========================================
// 审计写入失败只记录日志, 不影响业务操作结果
// ==========================================

use crate::domain::action_log::ActionLog;
use crate::repository::ActionLogStore;

/// 引擎写审计时使用的操作人
pub const SYSTEM_ACTOR: &str = "system";

pub fn record_quietly(store: &dyn ActionLogStore, log: ActionLog) {
    if let Err(e) = store.record(&log) {
        tracing::warn!(
            action_type = %log.action_type,
            target_id = %log.target_id,
            error = %e,
            "审计日志写入失败"
        );
    }
}
