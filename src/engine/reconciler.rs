// ==========================================
// 学籍成绩管理系统 - 选课对账引擎
// ==========================================
// 职责: 期望课程集合与当前集合的最小 add/drop 差集, 单事务原子落库
// 红线: 任一成员校验失败则整体失败, 不允许观察到部分对账
// ==========================================
// 输入: 学生 + 教学周期 + 期望课程 id 集合 + 请求主体
// 输出: {added, removed} 或保持原状的领域错误
// ==========================================

use crate::domain::catalog::AcademicPeriod;
use crate::domain::principal::Principal;
use crate::domain::registration::{ReconcileOutcome, Registration};
use crate::engine::authorization;
use crate::engine::eligibility::EligibilityValidator;
use crate::engine::eligibility_core::EligibilityCore;
use crate::engine::error::{DomainError, DomainResult};
use crate::repository::error::RepositoryError;
use crate::repository::{
    ActionLogRepository, CatalogRepository, RegistrationRepository, StudentRepository,
};
use chrono::Utc;
use rusqlite::Connection;
use serde_json::json;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, instrument};
use uuid::Uuid;

/// 对账请求
#[derive(Debug, Clone)]
pub struct ReconcileRequest {
    pub student_id: String,
    pub period: AcademicPeriod,
    /// 期望集合; 数组顺序即新增课程的校验顺序 (上限触发点依赖该顺序)
    pub desired_course_ids: Vec<String>,
}

// ==========================================
// RegistrationReconciler - 选课对账引擎
// ==========================================
pub struct RegistrationReconciler {
    conn: Arc<Mutex<Connection>>,
}

impl RegistrationReconciler {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> DomainResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DomainError::Repository(RepositoryError::LockError(e.to_string())))
    }

    /// 对账并原子应用差集
    ///
    /// 步骤:
    /// 1. 学期锁定检查 + 授权
    /// 2. toDrop 成员挂成绩即整体失败
    /// 3. toAdd 按期望数组顺序逐一过资格校验, 学分累计基于"滚动暂定集合"
    /// 4. 最终集合学分需达到下限 (要求存在时)
    /// 5. 全部通过后才删除/插入, 单事务提交
    #[instrument(skip(self, request, principal), fields(student_id = %request.student_id))]
    pub fn reconcile(
        &self,
        request: &ReconcileRequest,
        principal: &Principal,
    ) -> DomainResult<ReconcileOutcome> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(RepositoryError::from)?;

        let semester = CatalogRepository::find_semester(&tx, &request.period.semester_id)?
            .ok_or_else(|| DomainError::semester_not_found(&request.period.semester_id))?;
        authorization::can_reconcile_registrations(
            principal,
            &request.student_id,
            semester.edits_locked,
        )
        .require()?;

        let student = StudentRepository::find_by_id(&tx, &request.student_id)?
            .ok_or_else(|| DomainError::student_not_found(&request.student_id))?;

        // === 步骤 1: 计算差集 ===
        let current = RegistrationRepository::find_by_student_period(
            &tx,
            &request.student_id,
            &request.period.semester_id,
            &request.period.season_id,
        )?;
        let current_ids: HashSet<&str> = current.iter().map(|r| r.course_id.as_str()).collect();
        let desired_ids: HashSet<&str> = request
            .desired_course_ids
            .iter()
            .map(String::as_str)
            .collect();

        let to_drop: Vec<&Registration> = current
            .iter()
            .filter(|r| !desired_ids.contains(r.course_id.as_str()))
            .collect();
        // 保持期望数组顺序, 去重
        let mut seen = HashSet::new();
        let to_add: Vec<&String> = request
            .desired_course_ids
            .iter()
            .filter(|id| !current_ids.contains(id.as_str()) && seen.insert(id.as_str()))
            .collect();

        // === 步骤 2: 退选硬检查 ===
        for registration in &to_drop {
            if registration.has_score {
                return Err(DomainError::CannotDropGradedCourse {
                    course_id: registration.course_id.clone(),
                });
            }
        }

        // === 步骤 3: 新增逐一过资格校验 (滚动暂定集合) ===
        let (target, requirement) =
            EligibilityValidator::load_period_context(&tx, &student, &request.period)?;

        let mut tentative_total = 0i64;
        for registration in &current {
            if desired_ids.contains(registration.course_id.as_str()) {
                let course = CatalogRepository::find_course(&tx, &registration.course_id)?
                    .ok_or_else(|| DomainError::course_not_found(&registration.course_id))?;
                tentative_total += course.credit_unit;
            }
        }
        for course_id in &to_add {
            let course = EligibilityValidator::validate_addition(
                &tx,
                &student,
                course_id,
                &request.period,
                &target,
                requirement.as_ref(),
                tentative_total,
            )?;
            tentative_total += course.credit_unit;
        }

        // === 步骤 4: 学分下限 ===
        if let Some(requirement) = &requirement {
            if !EligibilityCore::meets_minimum(tentative_total, requirement.minimum_credit_units) {
                return Err(DomainError::CreditUnitMinimumNotMet {
                    total: tentative_total,
                    minimum: requirement.minimum_credit_units,
                });
            }
        }

        // === 步骤 5: 全部通过, 应用差集 ===
        let mut outcome = ReconcileOutcome::default();
        for registration in &to_drop {
            RegistrationRepository::delete(&tx, &registration.registration_id)?;
            outcome.removed.push(registration.course_id.clone());
        }
        for course_id in &to_add {
            let registration = Registration {
                registration_id: Uuid::new_v4().to_string(),
                student_id: request.student_id.clone(),
                course_id: (*course_id).clone(),
                semester_id: request.period.semester_id.clone(),
                season_id: request.period.season_id.clone(),
                level_id: request.period.level_id.clone(),
                has_score: false,
                registered_at: Utc::now(),
            };
            // 并发竞争由唯一键兜底, 与预检路径同报重复选课
            RegistrationRepository::insert(&tx, &registration).map_err(|err| {
                if err.is_unique_violation() {
                    DomainError::AlreadyRegistered {
                        course_id: (*course_id).clone(),
                    }
                } else {
                    DomainError::Repository(err)
                }
            })?;
            outcome.added.push((*course_id).clone());
        }

        ActionLogRepository::record(
            &tx,
            "RECONCILE_REGISTRATIONS",
            principal.id(),
            "Student",
            &request.student_id,
            Some(json!({
                "semester_id": request.period.semester_id,
                "season_id": request.period.season_id,
                "added": outcome.added,
                "removed": outcome.removed,
            })),
        )?;

        tx.commit().map_err(RepositoryError::from)?;
        info!(
            student_id = %request.student_id,
            added = outcome.added.len(),
            removed = outcome.removed.len(),
            "registration reconcile committed"
        );
        Ok(outcome)
    }
}
