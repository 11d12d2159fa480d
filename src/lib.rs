// ==========================================
// 学籍成绩管理系统 - 核心库
// ==========================================
// 系统定位: 学籍记录完整性核心 (选课/成绩/考务)
// 技术栈: Rust + SQLite
// 红线: 引擎是唯一写入口; 每个操作单事务; 所有成功写入留审计日志
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CourseType, Grade, LecturerRole, SemesterType};

// 领域实体
pub use domain::{
    AcademicPeriod, Course, CreditUnitRequirement, Exam, ExamSession, Principal, ReconcileOutcome,
    Registration, Score, ScoreComponents, SeatAssignment, Semester, Student,
};

// 引擎
pub use engine::{
    AllocationOutcome, AllocationRequest, DomainError, DomainResult, EligibilityValidator,
    ErrorKind, ReconcileRequest, RegistrationReconciler, ScoreLifecycleManager, SeatAllocator,
};

// API
pub use api::{ApiError, ApiResult, ExamApi, RegistrationApi, ScoreApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "学籍成绩管理系统";
