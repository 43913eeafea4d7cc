// ==========================================
// 工作量再分配引擎 - 主管复核通知
// ==========================================
// 职责: 为被标记复核的工作项生成一条双语通知并投递
// 红线: 找不到主管或投递失败只记录日志, 不影响上层操作
// ==========================================
// 主管解析: 同单元 role = supervisor
// - 0 人: warn 后跳过
// - 多人: warn 后取 user_id 最小者
// ==========================================

use crate::config::ReassignmentConfig;
use crate::domain::assignment::FlaggedItem;
use crate::domain::notification::{Notification, NOTIFICATION_TYPE_REVIEW_REQUIRED};
use crate::domain::staff::StaffProfile;
use crate::domain::types::StaffRole;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::repositories::ReassignmentRepositories;
use crate::i18n::t_in;
use chrono::{DateTime, Utc};

pub struct SupervisorNotifier {
    repos: ReassignmentRepositories,
    config: ReassignmentConfig,
}

impl SupervisorNotifier {
    pub fn new(repos: ReassignmentRepositories, config: ReassignmentConfig) -> Self {
        Self { repos, config }
    }

    /// 通知主管复核（只有副作用）
    ///
    /// # 返回
    /// - Some(通知): 已成功投递
    /// - None: 无需通知、找不到主管或投递失败（均已记录日志）
    pub fn notify_supervisor_of_flagged_items(
        &self,
        staff: &StaffProfile,
        flagged: &[FlaggedItem],
        now: DateTime<Utc>,
    ) -> Option<Notification> {
        if flagged.is_empty() || !self.config.notify_enabled {
            return None;
        }

        let supervisor = match self.resolve_supervisor(&staff.unit_id) {
            Ok(Some(supervisor)) => supervisor,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(unit_id = %staff.unit_id, error = %e, "主管查询失败，跳过通知");
                return None;
            }
        };

        let notification = self.build_notification(&supervisor.user_id, staff, flagged, now);
        match self.dispatch(&notification) {
            Ok(()) => {
                tracing::info!(
                    supervisor_id = %supervisor.user_id,
                    staff_id = %staff.user_id,
                    flagged_count = flagged.len(),
                    "复核通知已投递"
                );
                Some(notification)
            }
            Err(e) => {
                tracing::warn!(supervisor_id = %supervisor.user_id, error = %e, "复核通知投递失败");
                None
            }
        }
    }

    /// 解析单元主管
    pub fn resolve_supervisor(&self, unit_id: &str) -> EngineResult<Option<StaffProfile>> {
        let mut supervisors = self
            .repos
            .staff_store
            .find_by_unit_and_role(unit_id, StaffRole::Supervisor)?;

        match supervisors.len() {
            0 => {
                tracing::warn!(unit_id = %unit_id, "单元内没有主管，跳过复核通知");
                Ok(None)
            }
            1 => Ok(supervisors.pop()),
            n => {
                supervisors.sort_by(|a, b| a.user_id.cmp(&b.user_id));
                tracing::warn!(
                    unit_id = %unit_id,
                    supervisors = n,
                    chosen = %supervisors[0].user_id,
                    "单元内存在多名主管，取 user_id 最小者"
                );
                Ok(Some(supervisors.swap_remove(0)))
            }
        }
    }

    /// 构建双语通知
    ///
    /// 主语言写入 *_en 字段, 次语言写入 *_ar 字段（默认 en / ar）。
    pub fn build_notification(
        &self,
        recipient_id: &str,
        staff: &StaffProfile,
        flagged: &[FlaggedItem],
        now: DateTime<Utc>,
    ) -> Notification {
        let count = flagged.len().to_string();
        let assignment_ids: Vec<&str> = flagged.iter().map(|f| f.assignment_id.as_str()).collect();

        let render = |locale: &str| -> (String, String) {
            let status_key = format!("availability.status.{}", staff.availability_status.to_db_str());
            let status = t_in(locale, &status_key, &[]);
            let title = t_in(locale, "notification.review_required.title", &[]);
            let message = t_in(
                locale,
                "notification.review_required.message",
                &[
                    ("count", count.as_str()),
                    ("name", staff.display_name()),
                    ("status", status.as_str()),
                ],
            );
            (title, message)
        };

        let (title_en, message_en) = render(&self.config.primary_locale);
        let (title_ar, message_ar) = render(&self.config.secondary_locale);

        Notification {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: recipient_id.to_string(),
            notification_type: NOTIFICATION_TYPE_REVIEW_REQUIRED.to_string(),
            title_en,
            title_ar,
            message_en,
            message_ar,
            link: self.config.notify_link.clone(),
            metadata: serde_json::json!({
                "staff_id": staff.user_id,
                "assignment_ids": assignment_ids,
                "flagged_count": flagged.len(),
            }),
            is_read: false,
            created_at: now,
        }
    }

    fn dispatch(&self, notification: &Notification) -> EngineResult<()> {
        self.repos
            .notification_sink
            .submit(notification)
            .map_err(|e| EngineError::NotificationDispatch(e.to_string()))
    }
}
