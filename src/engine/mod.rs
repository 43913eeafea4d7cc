// ==========================================
// 工作量再分配引擎 - 引擎层
// ==========================================
// 职责: 实现再分配业务规则,不拼 SQL
// 红线: Engine 只依赖 repository::stores 中的 trait
// ==========================================

pub mod audit;
pub mod availability;
pub mod candidate_resolver;
pub mod error;
pub mod reassignment;
pub mod repositories;
pub mod review_flagging;
pub mod supervisor_notifier;
pub mod workload;

// 重导出核心引擎
pub use availability::{AvailabilityManager, AvailabilityOutcome, AvailabilityRequest};
pub use candidate_resolver::{select_best_candidate, CandidateResolver};
pub use error::{EngineError, EngineResult};
pub use reassignment::{ReassignmentExecutor, UrgentHighOutcome};
pub use repositories::ReassignmentRepositories;
pub use review_flagging::ReviewFlagger;
pub use supervisor_notifier::SupervisorNotifier;
pub use workload::WorkloadExtractor;
