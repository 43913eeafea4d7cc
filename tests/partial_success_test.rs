// ==========================================
// 部分成功语义测试（故障注入）
// ==========================================
// 用替身包装 SQLite 仓储, 对指定条目注入写入失败
// ==========================================


use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use test_helpers::*;
use workload_reassign::config::ReassignmentConfig;
use workload_reassign::db::SharedConnection;
use workload_reassign::domain::staff::{AvailabilityChange, StaffProfile};
use workload_reassign::domain::types::{AvailabilityStatus, Priority, StaffRole};
use workload_reassign::domain::{ActionLog, Assignment, Notification, SkipReason};
use workload_reassign::engine::{
    AvailabilityManager, AvailabilityRequest, EngineError, ReassignmentRepositories,
};
use workload_reassign::repository::{
    ActionLogStore, AssignmentRepository, AssignmentStore, NotificationSink, ReassignmentUpdate,
    RepositoryError, RepositoryResult, StaffDirectoryStore, StaffProfileRepository,
};

// ==========================================
// 故障注入替身
// ==========================================

struct FlakyAssignments {
    inner: AssignmentRepository,
    fail_ids: HashSet<String>,
}

impl AssignmentStore for FlakyAssignments {
    fn find_active_by_assignee(
        &self,
        assignee_id: &str,
        priorities: &[Priority],
    ) -> RepositoryResult<Vec<Assignment>> {
        self.inner.find_active_by_assignee(assignee_id, priorities)
    }

    fn reassign(&self, update: &ReassignmentUpdate<'_>) -> RepositoryResult<()> {
        if self.fail_ids.contains(update.assignment_id) {
            return Err(RepositoryError::DatabaseQueryError("disk I/O error".to_string()));
        }
        self.inner.reassign(update)
    }

    fn flag_for_review(
        &self,
        assignment_id: &str,
        reason: &str,
        flagged_at: DateTime<Utc>,
    ) -> RepositoryResult<()> {
        if self.fail_ids.contains(assignment_id) {
            return Err(RepositoryError::DatabaseQueryError("disk I/O error".to_string()));
        }
        self.inner.flag_for_review(assignment_id, reason, flagged_at)
    }

    fn find_flagged_by_unit(&self, unit_id: &str) -> RepositoryResult<Vec<Assignment>> {
        self.inner.find_flagged_by_unit(unit_id)
    }
}

struct ReadOnlyStaff {
    inner: StaffProfileRepository,
}

impl StaffDirectoryStore for ReadOnlyStaff {
    fn find_staff(&self, user_id: &str) -> RepositoryResult<Option<StaffProfile>> {
        self.inner.find_staff(user_id)
    }

    fn update_availability(
        &self,
        _user_id: &str,
        _change: &AvailabilityChange,
        _now: DateTime<Utc>,
    ) -> RepositoryResult<()> {
        Err(RepositoryError::DatabaseQueryError("attempt to write a readonly database".to_string()))
    }

    fn find_available_with_capacity(&self, unit_id: &str) -> RepositoryResult<Vec<StaffProfile>> {
        self.inner.find_available_with_capacity(unit_id)
    }

    fn find_by_unit_and_role(
        &self,
        unit_id: &str,
        role: StaffRole,
    ) -> RepositoryResult<Vec<StaffProfile>> {
        self.inner.find_by_unit_and_role(unit_id, role)
    }
}

#[derive(Default)]
struct BrokenSink {
    attempts: AtomicUsize,
}

impl NotificationSink for BrokenSink {
    fn submit(&self, _notification: &Notification) -> RepositoryResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(RepositoryError::InternalError("sink offline".to_string()))
    }
}

struct BrokenAudit;

impl ActionLogStore for BrokenAudit {
    fn record(&self, _log: &ActionLog) -> RepositoryResult<()> {
        Err(RepositoryError::InternalError("audit offline".to_string()))
    }
}

fn seeded_connection() -> (tempfile::NamedTempFile, SharedConnection) {
    let (tmp, state) = create_test_state();
    seed(
        &state,
        &[
            staff("A", "U1", &["en"], 0, 10),
            staff("B", "U1", &["en"], 0, 10),
            supervisor("S", "U1"),
        ],
        &[
            assignment("u1", "A", Priority::Urgent, Some(&["en"])),
            assignment("u2", "A", Priority::Urgent, Some(&["en"])),
            assignment("h1", "A", Priority::High, Some(&["en"])),
            assignment("n1", "A", Priority::Normal, Some(&[])),
            assignment("l1", "A", Priority::Low, Some(&[])),
        ],
    );
    (tmp, state.conn.clone())
}

fn flaky_repos(
    conn: &SharedConnection,
    fail_ids: &[&str],
    sink: Arc<BrokenSink>,
) -> ReassignmentRepositories {
    ReassignmentRepositories::new(
        Arc::new(StaffProfileRepository::from_connection(conn.clone())),
        Arc::new(FlakyAssignments {
            inner: AssignmentRepository::from_connection(conn.clone()),
            fail_ids: fail_ids.iter().map(|s| s.to_string()).collect(),
        }),
        sink,
        Arc::new(BrokenAudit),
    )
}

#[test]
fn test_single_write_failure_does_not_abort_batch() {
    workload_reassign::logging::init_test();
    let (_tmp, conn) = seeded_connection();
    let sink = Arc::new(BrokenSink::default());
    let repos = flaky_repos(&conn, &["u2", "n1"], sink.clone());
    let manager = AvailabilityManager::new(repos, ReassignmentConfig::default());

    let outcome = manager
        .update_availability(
            "A",
            &AvailabilityRequest::new(AvailabilityStatus::Unavailable),
            fixed_now(),
        )
        .unwrap();

    let reassigned: Vec<&str> = outcome
        .reassigned
        .succeeded
        .iter()
        .map(|r| r.assignment_id.as_str())
        .collect();
    assert_eq!(reassigned, vec!["u1", "h1"]);
    assert_eq!(outcome.reassigned.skipped.len(), 1);
    assert_eq!(outcome.reassigned.skipped[0].assignment_id, "u2");
    assert!(matches!(
        outcome.reassigned.skipped[0].reason,
        SkipReason::WriteFailed(_)
    ));

    let flagged: Vec<&str> = outcome
        .flagged
        .succeeded
        .iter()
        .map(|f| f.assignment_id.as_str())
        .collect();
    assert_eq!(flagged, vec!["l1"]);
    assert_eq!(outcome.flagged.skipped[0].assignment_id, "n1");

    // 投递失败只记录日志
    assert_eq!(sink.attempts.load(Ordering::SeqCst), 1);
    assert!(!outcome.supervisor_notified);

    // 每条工作项都有归宿: 成功或 skipped
    assert_eq!(outcome.reassigned.total() + outcome.flagged.total(), 5);
}

#[test]
fn test_profile_write_failure_aborts_before_redistribution() {
    let (_tmp, conn) = seeded_connection();
    let repos = ReassignmentRepositories::new(
        Arc::new(ReadOnlyStaff {
            inner: StaffProfileRepository::from_connection(conn.clone()),
        }),
        Arc::new(AssignmentRepository::from_connection(conn.clone())),
        Arc::new(BrokenSink::default()),
        Arc::new(BrokenAudit),
    );
    let manager = AvailabilityManager::new(repos, ReassignmentConfig::default());

    let err = manager
        .update_availability(
            "A",
            &AvailabilityRequest::new(AvailabilityStatus::OnLeave),
            fixed_now(),
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::Infrastructure(_)));

    let assignments = AssignmentRepository::from_connection(conn);
    let remaining = assignments.list_active_by_assignee("A").unwrap();
    assert_eq!(remaining.len(), 5);
    assert!(remaining.iter().all(|a| !a.needs_review));
}
