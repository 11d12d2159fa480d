// ==========================================
// 学籍成绩管理系统 - 引擎层
// ==========================================
// 职责: 业务规则与事务编排
// 红线: 引擎是唯一的写入口; 每个操作单事务, 要么全部生效要么保持原状
// ==========================================

// 引擎层错误类型
pub mod error;

// 授权判定
pub mod authorization;

// 选课资格纯计算核心
pub mod eligibility_core;

// 选课资格校验引擎
pub mod eligibility;

// 选课对账引擎
pub mod reconciler;

// 成绩生命周期引擎
pub mod score_lifecycle;

// 考场座位分配引擎
pub mod seat_allocator;

pub use authorization::{AuthDecision, Capability};
pub use eligibility::EligibilityValidator;
pub use eligibility_core::{EligibilityCore, PeriodCoordinate};
pub use error::{DomainError, DomainResult, ErrorKind};
pub use reconciler::{ReconcileRequest, RegistrationReconciler};
pub use score_lifecycle::ScoreLifecycleManager;
pub use seat_allocator::{
    AllocationFailure, AllocationOutcome, AllocationRequest, SeatAllocator, UnassignOutcome,
};
