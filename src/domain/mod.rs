// ==========================================
// 学籍成绩管理系统 - 领域层
// ==========================================
// 职责: 实体与封闭类型定义, 不含持久化与业务编排
// ==========================================

pub mod catalog;
pub mod exam;
pub mod principal;
pub mod registration;
pub mod score;
pub mod student;
pub mod types;

// 重导出核心实体
pub use catalog::{
    AcademicPeriod, Course, CoursePrerequisite, CourseTimetable, CreditUnitRequirement, Level,
    Program, ProgramCourseLink, Season, Semester,
};
pub use exam::{Exam, ExamAttempt, ExamSession, SeatAssignment};
pub use principal::Principal;
pub use registration::{ReconcileOutcome, Registration};
pub use score::{Score, ScoreComponents};
pub use student::Student;
pub use types::{CourseType, Grade, LecturerRole, SemesterType};
