// ==========================================
// 学籍成绩管理系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入;
//       所有函数接收 &Connection, 由引擎层决定事务边界
// ==========================================

pub mod action_log_repo;
pub mod catalog_repo;
pub mod error;
pub mod exam_repo;
pub mod registration_repo;
pub mod score_repo;
pub mod student_repo;

// 重导出核心仓储
pub use action_log_repo::{ActionLog, ActionLogRepository};
pub use catalog_repo::CatalogRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use exam_repo::{ExamRepository, StudentFilters};
pub use registration_repo::{PrerequisitePass, RegistrationRepository};
pub use score_repo::ScoreRepository;
pub use student_repo::StudentRepository;
