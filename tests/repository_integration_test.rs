// ==========================================
// 仓储层集成测试
// ==========================================
// 覆盖: 条件改派、触发器计数、在办过滤、单元复核查询
// ==========================================


use chrono::Duration;
use test_helpers::*;
use workload_reassign::domain::types::{AssignmentStatus, Priority, StaffRole};
use workload_reassign::repository::{
    AssignmentStore, ReassignmentUpdate, RepositoryError, StaffDirectoryStore,
};

fn update<'a>(id: &'a str, from: &'a str, to: &'a str) -> ReassignmentUpdate<'a> {
    ReassignmentUpdate {
        assignment_id: id,
        from_assignee_id: from,
        to_assignee_id: to,
        reason: "Staff unavailable",
        assigned_at: fixed_now(),
    }
}

fn count_of(state: &workload_reassign::app::AppState, user_id: &str) -> i32 {
    state
        .staff_repo
        .find_by_id(user_id)
        .unwrap()
        .unwrap()
        .current_assignment_count
}

#[test]
fn test_reassign_is_guarded_by_current_assignee() {
    let (_tmp, state) = create_test_state();
    seed(
        &state,
        &[staff("A", "U1", &[], 0, 5), staff("B", "U1", &[], 0, 5), staff("C", "U1", &[], 0, 5)],
        &[assignment("1", "A", Priority::Urgent, None)],
    );
    let repo = state.assignment_repo.as_ref();

    repo.reassign(&update("1", "A", "B")).unwrap();
    let moved = repo.find_by_id("1").unwrap().unwrap();
    assert_eq!(moved.assignee_id, "B");
    assert_eq!(moved.reassigned_from.as_deref(), Some("A"));
    assert_eq!(moved.reassignment_reason.as_deref(), Some("Staff unavailable"));
    assert_eq!(moved.assigned_at, fixed_now());

    // 已被改走, 再以 A 为原承办人写入视为并发冲突
    let err = repo.reassign(&update("1", "A", "C")).unwrap_err();
    assert!(matches!(err, RepositoryError::ConcurrentModification { .. }));
    assert_eq!(repo.find_by_id("1").unwrap().unwrap().assignee_id, "B");

    let err = repo.reassign(&update("missing", "A", "C")).unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

#[test]
fn test_triggers_maintain_active_counts() {
    let (_tmp, state) = create_test_state();
    let mut done = assignment("3", "A", Priority::Low, None);
    done.status = AssignmentStatus::Completed;
    seed(
        &state,
        &[staff("A", "U1", &[], 0, 5), staff("B", "U1", &[], 0, 5)],
        &[
            assignment("1", "A", Priority::Urgent, None),
            assignment("2", "A", Priority::High, None),
            done,
        ],
    );
    assert_eq!(count_of(&state, "A"), 2);

    state.assignment_repo.reassign(&update("1", "A", "B")).unwrap();
    assert_eq!(count_of(&state, "A"), 1);
    assert_eq!(count_of(&state, "B"), 1);

    // 状态变为 completed 时释放容量
    let mut finished = state.assignment_repo.find_by_id("2").unwrap().unwrap();
    finished.status = AssignmentStatus::Completed;
    state.assignment_repo.upsert(&finished).unwrap();
    assert_eq!(count_of(&state, "A"), 0);

    // 复核标记不影响计数
    state
        .assignment_repo
        .flag_for_review("1", "Staff unavailable", fixed_now())
        .unwrap();
    assert_eq!(count_of(&state, "B"), 1);
}

#[test]
fn test_find_active_by_assignee_filters_status_and_priority() {
    let (_tmp, state) = create_test_state();
    let mut in_progress = assignment("h1", "A", Priority::High, None);
    in_progress.status = AssignmentStatus::InProgress;
    let mut pending = assignment("u2", "A", Priority::Urgent, None);
    pending.status = AssignmentStatus::Pending;
    let mut older_urgent = assignment("u3", "A", Priority::Urgent, None);
    older_urgent.assigned_at = fixed_now() - Duration::days(30);
    seed(
        &state,
        &[staff("A", "U1", &[], 0, 10)],
        &[
            in_progress,
            assignment("u1", "A", Priority::Urgent, None),
            pending,
            older_urgent,
            assignment("n1", "A", Priority::Normal, None),
        ],
    );

    let urgent_high = state
        .assignment_repo
        .find_active_by_assignee("A", &[Priority::Urgent, Priority::High])
        .unwrap();
    let ids: Vec<&str> = urgent_high.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["u3", "u1", "h1"]);

    let none = state.assignment_repo.find_active_by_assignee("A", &[]).unwrap();
    assert!(none.is_empty());
}

#[test]
fn test_find_flagged_by_unit_only_returns_active_flagged_items() {
    let (_tmp, state) = create_test_state();
    seed(
        &state,
        &[
            staff("A", "U1", &[], 0, 5),
            staff("X", "U2", &[], 0, 5),
        ],
        &[
            assignment("1", "A", Priority::Normal, None),
            assignment("2", "A", Priority::Low, None),
            assignment("3", "A", Priority::Low, None),
            assignment("4", "X", Priority::Low, None),
        ],
    );
    let repo = state.assignment_repo.as_ref();
    repo.flag_for_review("2", "Staff unavailable", fixed_now()).unwrap();
    repo.flag_for_review("3", "Staff unavailable", fixed_now() - Duration::hours(1))
        .unwrap();
    repo.flag_for_review("4", "Staff unavailable", fixed_now()).unwrap();

    let mut cancelled = repo.find_by_id("2").unwrap().unwrap();
    cancelled.status = AssignmentStatus::Cancelled;
    repo.upsert(&cancelled).unwrap();

    let flagged = repo.find_flagged_by_unit("U1").unwrap();
    let ids: Vec<&str> = flagged.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["3"]);
    assert_eq!(flagged[0].review_reason.as_deref(), Some("Staff unavailable"));

    let err = repo
        .flag_for_review("missing", "Staff unavailable", fixed_now())
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

#[test]
fn test_staff_directory_queries() {
    let (_tmp, state) = create_test_state();
    let mut away = staff("D", "U1", &["en"], 0, 5);
    away.availability_status = workload_reassign::AvailabilityStatus::OnLeave;
    seed(
        &state,
        &[
            staff("B", "U1", &["en"], 4, 5),
            staff("C", "U1", &["en"], 1, 5),
            staff("F", "U1", &["en"], 5, 5),
            away,
            supervisor("S2", "U1"),
            supervisor("S1", "U1"),
            staff("Z", "U2", &["en"], 0, 5),
        ],
        &[],
    );
    let repo = state.staff_repo.as_ref();

    let candidates = repo.find_available_with_capacity("U1").unwrap();
    let ids: Vec<&str> = candidates.iter().map(|s| s.user_id.as_str()).collect();
    assert_eq!(ids, vec!["C", "B"]);

    let supervisors = repo.find_by_unit_and_role("U1", StaffRole::Supervisor).unwrap();
    let ids: Vec<&str> = supervisors.iter().map(|s| s.user_id.as_str()).collect();
    assert_eq!(ids, vec!["S1", "S2"]);

    let err = repo
        .update_availability(
            "ghost",
            &workload_reassign::domain::AvailabilityChange::restore_available(),
            fixed_now(),
        )
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}
