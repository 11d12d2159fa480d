// ==========================================
// 学籍成绩管理系统 - 引擎层错误类型
// ==========================================
// 职责: 封闭领域错误枚举 + 错误类别映射
// 红线: 预期错误 (NotFound/Unauthorized/规则违反/冲突) 不允许部分落库;
//       SystemFailure 整体回滚, 核心不做重试
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

// ==========================================
// ErrorKind - 错误类别
// ==========================================
// 传输层状态码映射在 api 层完成, 引擎只产出类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Unauthorized,
    InvariantViolation,
    Conflict,
    SystemFailure,
}

// ==========================================
// DomainError - 领域错误
// ==========================================
#[derive(Error, Debug)]
pub enum DomainError {
    // ===== 实体定位 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    // ===== 授权 =====
    #[error("无权执行该操作: {reason}")]
    Unauthorized { reason: String },

    // ===== 选课规则 =====
    #[error("该专业该层次未开设此课程: course_id={course_id}, program_id={program_id}, level_id={level_id}")]
    CourseNotOffered {
        course_id: String,
        program_id: String,
        level_id: String,
    },

    #[error("先修课未在更早周期通过: course_id={course_id}, prerequisite_id={prerequisite_id}")]
    PrerequisiteNotMet {
        course_id: String,
        prerequisite_id: String,
    },

    #[error("超过学分上限: course_id={course_id}, 累计={attempted}, 上限={maximum}")]
    CreditUnitLimitExceeded {
        course_id: String,
        attempted: i64,
        maximum: i64,
    },

    #[error("未达到学分下限: 合计={total}, 下限={minimum}")]
    CreditUnitMinimumNotMet { total: i64, minimum: i64 },

    #[error("不能退选已录成绩的课程: course_id={course_id}")]
    CannotDropGradedCourse { course_id: String },

    #[error("学期已锁定, 仅管理员/特批职员可调整选课: semester_id={semester_id}")]
    PeriodLocked { semester_id: String },

    #[error("重复选课: course_id={course_id}")]
    AlreadyRegistered { course_id: String },

    // ===== 成绩规则 =====
    #[error("分量越界: field={field}, value={value}, 允许区间=[0, {max}]")]
    ComponentOutOfRange {
        field: String,
        value: f64,
        max: f64,
    },

    #[error("成绩已由阅卷审批人批准, 不可重复批准: score_id={score_id}")]
    AlreadyApproved { score_id: String },

    #[error("成绩已由系主任接受, 不可重复接受: score_id={score_id}")]
    AlreadyAccepted { score_id: String },

    #[error("需先经阅卷审批人批准: score_id={score_id}")]
    ApprovalOrderViolation { score_id: String },

    #[error("成绩尚未批准, 无可撤销的批准: score_id={score_id}")]
    NotApproved { score_id: String },

    #[error("成绩尚未接受, 无可撤销的接受: score_id={score_id}")]
    NotAccepted { score_id: String },

    #[error("成绩已被系主任接受, 需先撤销接受再撤销批准: score_id={score_id}")]
    DeapproveWhileAccepted { score_id: String },

    // ===== 考务规则 =====
    #[error("考生已有该考试的座位分配: student_id={student_id}")]
    AlreadyAssigned { student_id: String },

    #[error("没有剩余容量的场次可分配: student_id={student_id}")]
    NoSessionCapacity { student_id: String },

    #[error("场次未启用: session_id={session_id}")]
    SessionInactive { session_id: String },

    #[error("考生不符合该考试的参考资格: student_id={student_id}, exam_id={exam_id}")]
    NotEligibleForExam {
        student_id: String,
        exam_id: String,
    },

    #[error("已存在作答记录, 分配不可撤销: student_id={student_id}, session_id={session_id}")]
    AttemptRecorded {
        student_id: String,
        session_id: String,
    },

    // ===== 持久层透传 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl DomainError {
    /// 领域错误 → 错误类别
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::NotFound { .. } => ErrorKind::NotFound,
            DomainError::Unauthorized { .. } => ErrorKind::Unauthorized,
            DomainError::CourseNotOffered { .. }
            | DomainError::PrerequisiteNotMet { .. }
            | DomainError::CreditUnitLimitExceeded { .. }
            | DomainError::CreditUnitMinimumNotMet { .. }
            | DomainError::CannotDropGradedCourse { .. }
            | DomainError::PeriodLocked { .. }
            | DomainError::ComponentOutOfRange { .. }
            | DomainError::AlreadyApproved { .. }
            | DomainError::AlreadyAccepted { .. }
            | DomainError::ApprovalOrderViolation { .. }
            | DomainError::NotApproved { .. }
            | DomainError::NotAccepted { .. }
            | DomainError::DeapproveWhileAccepted { .. }
            | DomainError::NoSessionCapacity { .. }
            | DomainError::SessionInactive { .. }
            | DomainError::NotEligibleForExam { .. }
            | DomainError::AttemptRecorded { .. } => ErrorKind::InvariantViolation,
            DomainError::AlreadyRegistered { .. } | DomainError::AlreadyAssigned { .. } => {
                ErrorKind::Conflict
            }
            DomainError::Repository(err) => match err {
                RepositoryError::NotFound { .. } => ErrorKind::NotFound,
                // 读-判-写窗口内的唯一约束竞争按冲突处理
                RepositoryError::UniqueConstraintViolation(_) => ErrorKind::Conflict,
                _ => ErrorKind::SystemFailure,
            },
        }
    }

    fn not_found(entity: &str, id: &str) -> Self {
        DomainError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn student_not_found(id: &str) -> Self {
        Self::not_found("Student", id)
    }

    pub fn course_not_found(id: &str) -> Self {
        Self::not_found("Course", id)
    }

    pub fn semester_not_found(id: &str) -> Self {
        Self::not_found("Semester", id)
    }

    pub fn season_not_found(id: &str) -> Self {
        Self::not_found("Season", id)
    }

    pub fn registration_not_found(id: &str) -> Self {
        Self::not_found("Registration", id)
    }

    pub fn score_not_found(id: &str) -> Self {
        Self::not_found("Score", id)
    }

    pub fn exam_not_found(id: &str) -> Self {
        Self::not_found("Exam", id)
    }

    pub fn session_not_found(id: &str) -> Self {
        Self::not_found("ExamSession", id)
    }
}

/// Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            DomainError::student_not_found("S1").kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            DomainError::Unauthorized {
                reason: "test".to_string()
            }
            .kind(),
            ErrorKind::Unauthorized
        );
        assert_eq!(
            DomainError::CannotDropGradedCourse {
                course_id: "C1".to_string()
            }
            .kind(),
            ErrorKind::InvariantViolation
        );
        assert_eq!(
            DomainError::AlreadyAssigned {
                student_id: "S1".to_string()
            }
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            DomainError::Repository(RepositoryError::DatabaseQueryError("boom".to_string()))
                .kind(),
            ErrorKind::SystemFailure
        );
    }

    #[test]
    fn test_unique_violation_maps_to_conflict() {
        // 并发竞争通过唯一约束兜底, 与预检路径同为冲突类别
        let err = DomainError::Repository(RepositoryError::UniqueConstraintViolation(
            "UNIQUE constraint failed: seat_assignment.student_id".to_string(),
        ));
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }
}
