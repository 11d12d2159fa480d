// ==========================================
// 学籍成绩管理系统 - API层
// ==========================================
// 职责: 外层入口; 领域错误到传输状态码的翻译
// ==========================================

// API层错误类型
pub mod error;

// 选课 API
pub mod registration_api;

// 成绩 API
pub mod score_api;

// 考务 API
pub mod exam_api;

pub use error::{ApiError, ApiResult, ErrorBody};
pub use exam_api::ExamApi;
pub use registration_api::RegistrationApi;
pub use score_api::ScoreApi;
