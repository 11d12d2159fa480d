// ==========================================
// 学籍成绩管理系统 - 选课 API
// ==========================================
// 职责: 选课对账与资格预检的外层入口
// 红线: 不在 API 层重做业务判断, 全部委托引擎
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::catalog::{AcademicPeriod, Course};
use crate::domain::principal::Principal;
use crate::domain::registration::ReconcileOutcome;
use crate::engine::error::DomainError;
use crate::engine::{EligibilityValidator, ReconcileRequest, RegistrationReconciler};
use crate::repository::error::RepositoryError;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// 选课 API
pub struct RegistrationApi {
    conn: Arc<Mutex<Connection>>,
    reconciler: RegistrationReconciler,
}

impl RegistrationApi {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            reconciler: RegistrationReconciler::new(conn.clone()),
            conn,
        }
    }

    /// 把学生某周期的选课对账到期望集合
    pub fn reconcile(
        &self,
        request: &ReconcileRequest,
        principal: &Principal,
    ) -> ApiResult<ReconcileOutcome> {
        debug!(student_id = %request.student_id, desired = request.desired_course_ids.len(), "reconcile request");
        self.reconciler.reconcile(request, principal).map_err(|err| {
            warn!(student_id = %request.student_id, error = %err, "reconcile rejected");
            ApiError::from(err)
        })
    }

    /// 单门课程资格预检 (只读, 不落库)
    pub fn check_eligibility(
        &self,
        student_id: &str,
        course_id: &str,
        period: &AcademicPeriod,
        tentative_course_ids: &[String],
    ) -> ApiResult<Course> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ApiError::from(DomainError::Repository(RepositoryError::LockError(e.to_string()))))?;
        EligibilityValidator::validate(&conn, student_id, course_id, period, tentative_course_ids)
            .map_err(ApiError::from)
    }
}
