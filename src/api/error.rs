// ==========================================
// 学籍成绩管理系统 - API层错误类型
// ==========================================
// 职责: 把领域错误转换为带传输状态码的外层错误
// 红线: 状态码只由错误类别决定, 不在 API 层重新判定业务规则
// ==========================================

use crate::engine::error::{DomainError, ErrorKind};
use serde::Serialize;
use thiserror::Error;

/// API层错误
/// message 保留领域错误的显式原因, kind 决定传输状态码
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ApiError {
    /// 错误类别 → 传输状态码
    pub fn status_code(&self) -> u16 {
        match self.kind {
            ErrorKind::NotFound => 404,
            ErrorKind::Unauthorized => 403,
            ErrorKind::InvariantViolation => 422,
            ErrorKind::Conflict => 409,
            ErrorKind::SystemFailure => 500,
        }
    }

    /// 序列化为响应体
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            status: self.status_code(),
            message: self.message.clone(),
        }
    }
}

/// 错误响应体
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            ApiError::from(DomainError::student_not_found("S1")).status_code(),
            404
        );
        assert_eq!(
            ApiError::from(DomainError::Unauthorized {
                reason: "x".to_string()
            })
            .status_code(),
            403
        );
        assert_eq!(
            ApiError::from(DomainError::CannotDropGradedCourse {
                course_id: "C1".to_string()
            })
            .status_code(),
            422
        );
        assert_eq!(
            ApiError::from(DomainError::AlreadyRegistered {
                course_id: "C1".to_string()
            })
            .status_code(),
            409
        );
    }
}
