// ==========================================
// 学籍成绩管理系统 - 成绩生命周期引擎
// ==========================================
// 职责: 成绩录入/修改 + 两级审批状态机 (阅卷批准 → 系主任接受)
// 红线: 任何分量编辑必须连带清空两级审批; 接受必须以批准为前提;
//       撤销批准前必须先撤销接受
// ==========================================
// 状态机: Draft → Submitted → ExaminerApproved → HodAccepted,
//         每条正向边都有对应的撤销边
// ==========================================

use crate::domain::principal::Principal;
use crate::domain::registration::Registration;
use crate::domain::score::{Score, ScoreComponents};
use crate::domain::student::Student;
use crate::engine::authorization;
use crate::engine::error::{DomainError, DomainResult};
use crate::repository::error::RepositoryError;
use crate::repository::{
    ActionLogRepository, CatalogRepository, RegistrationRepository, ScoreRepository,
    StudentRepository,
};
use chrono::Utc;
use rusqlite::Connection;
use serde_json::json;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, instrument};
use uuid::Uuid;

// ==========================================
// ScoreLifecycleManager - 成绩生命周期引擎
// ==========================================
pub struct ScoreLifecycleManager {
    conn: Arc<Mutex<Connection>>,
}

impl ScoreLifecycleManager {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> DomainResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DomainError::Repository(RepositoryError::LockError(e.to_string())))
    }

    /// 加载成绩及其选课/学生上下文 (审批与删除共用)
    fn load_score_context(
        conn: &Connection,
        score_id: &str,
    ) -> DomainResult<(Score, Registration, Student)> {
        let score = ScoreRepository::find_by_id(conn, score_id)?
            .ok_or_else(|| DomainError::score_not_found(score_id))?;
        let registration = RegistrationRepository::find_by_id(conn, &score.registration_id)?
            .ok_or_else(|| DomainError::registration_not_found(&score.registration_id))?;
        let student = StudentRepository::find_by_id(conn, &registration.student_id)?
            .ok_or_else(|| DomainError::student_not_found(&registration.student_id))?;
        Ok((score, registration, student))
    }

    /// 录入或修改成绩分量
    ///
    /// 已有成绩则整行重算; 任何编辑路径都经 apply_components 清空两级审批。
    /// 新建成绩同事务置 registration.has_score = true。
    #[instrument(skip(self, components, principal), fields(registration_id = %registration_id))]
    pub fn submit_or_update(
        &self,
        registration_id: &str,
        components: &ScoreComponents,
        principal: &Principal,
    ) -> DomainResult<Score> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(RepositoryError::from)?;

        let registration = RegistrationRepository::find_by_id(&tx, registration_id)?
            .ok_or_else(|| DomainError::registration_not_found(registration_id))?;
        let student = StudentRepository::find_by_id(&tx, &registration.student_id)?
            .ok_or_else(|| DomainError::student_not_found(&registration.student_id))?;

        let is_timetabled = match principal {
            Principal::Lecturer { id, .. } => CatalogRepository::is_timetabled(
                &tx,
                id,
                &registration.course_id,
                &registration.semester_id,
                &registration.season_id,
            )?,
            _ => false,
        };
        authorization::can_submit_score(principal, &student.department_id, is_timetabled)
            .require()?;

        components.validate().map_err(|violation| {
            DomainError::ComponentOutOfRange {
                field: violation.field.to_string(),
                value: violation.value,
                max: violation.max,
            }
        })?;

        let course = CatalogRepository::find_course(&tx, &registration.course_id)?
            .ok_or_else(|| DomainError::course_not_found(&registration.course_id))?;

        let score = match ScoreRepository::find_by_registration(&tx, registration_id)? {
            Some(mut existing) => {
                existing.apply_components(components, course.credit_unit);
                ScoreRepository::update(&tx, &existing)?;
                existing
            }
            None => {
                let now = Utc::now();
                let mut score = Score {
                    score_id: Uuid::new_v4().to_string(),
                    registration_id: registration_id.to_string(),
                    first_ca: 0.0,
                    second_ca: 0.0,
                    exam_score: 0.0,
                    total_score: 0.0,
                    grade: crate::domain::types::Grade::F,
                    point: 0.0,
                    credit_points: 0.0,
                    is_approved_by_examiner: false,
                    examiner_id: None,
                    approved_at: None,
                    is_accepted_by_hod: false,
                    hod_id: None,
                    accepted_at: None,
                    created_at: now,
                    updated_at: now,
                };
                score.apply_components(components, course.credit_unit);
                // 并发下同一选课重复建分由 registration_id 唯一键兜底 (冲突类别)
                ScoreRepository::insert(&tx, &score)?;
                RegistrationRepository::set_has_score(&tx, registration_id, true)?;
                score
            }
        };

        ActionLogRepository::record(
            &tx,
            "SUBMIT_SCORE",
            principal.id(),
            "Score",
            &score.score_id,
            Some(json!({
                "registration_id": registration_id,
                "total_score": score.total_score,
                "grade": score.grade.to_string(),
            })),
        )?;

        tx.commit().map_err(RepositoryError::from)?;
        info!(score_id = %score.score_id, total = score.total_score, "score submitted");
        Ok(score)
    }

    /// 阅卷审批人批准
    #[instrument(skip(self, principal), fields(score_id = %score_id))]
    pub fn approve_by_examiner(&self, score_id: &str, principal: &Principal) -> DomainResult<Score> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(RepositoryError::from)?;

        let (mut score, _registration, student) = Self::load_score_context(&tx, score_id)?;
        authorization::can_approve_score(principal, &student.department_id).require()?;

        if score.is_approved_by_examiner {
            return Err(DomainError::AlreadyApproved {
                score_id: score_id.to_string(),
            });
        }

        score.is_approved_by_examiner = true;
        score.examiner_id = Some(principal.id().to_string());
        score.approved_at = Some(Utc::now());
        score.updated_at = Utc::now();
        ScoreRepository::update(&tx, &score)?;

        ActionLogRepository::record(
            &tx,
            "APPROVE_SCORE",
            principal.id(),
            "Score",
            score_id,
            None,
        )?;
        tx.commit().map_err(RepositoryError::from)?;
        Ok(score)
    }

    /// 系主任接受
    ///
    /// 前提: 成绩已经过阅卷批准
    #[instrument(skip(self, principal), fields(score_id = %score_id))]
    pub fn accept_by_hod(&self, score_id: &str, principal: &Principal) -> DomainResult<Score> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(RepositoryError::from)?;

        let (mut score, _registration, student) = Self::load_score_context(&tx, score_id)?;
        authorization::can_accept_score(principal, &student.department_id).require()?;

        if !score.is_approved_by_examiner {
            return Err(DomainError::ApprovalOrderViolation {
                score_id: score_id.to_string(),
            });
        }
        if score.is_accepted_by_hod {
            return Err(DomainError::AlreadyAccepted {
                score_id: score_id.to_string(),
            });
        }

        score.is_accepted_by_hod = true;
        score.hod_id = Some(principal.id().to_string());
        score.accepted_at = Some(Utc::now());
        score.updated_at = Utc::now();
        ScoreRepository::update(&tx, &score)?;

        ActionLogRepository::record(
            &tx,
            "ACCEPT_SCORE",
            principal.id(),
            "Score",
            score_id,
            None,
        )?;
        tx.commit().map_err(RepositoryError::from)?;
        Ok(score)
    }

    /// 撤销阅卷批准
    ///
    /// 成绩已被接受时必须先撤销接受, 保证子状态不变量
    #[instrument(skip(self, principal), fields(score_id = %score_id))]
    pub fn deapprove(&self, score_id: &str, principal: &Principal) -> DomainResult<Score> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(RepositoryError::from)?;

        let (mut score, _registration, student) = Self::load_score_context(&tx, score_id)?;
        authorization::can_deapprove_score(principal, &student.department_id).require()?;

        if score.is_accepted_by_hod {
            return Err(DomainError::DeapproveWhileAccepted {
                score_id: score_id.to_string(),
            });
        }
        if !score.is_approved_by_examiner {
            return Err(DomainError::NotApproved {
                score_id: score_id.to_string(),
            });
        }

        score.is_approved_by_examiner = false;
        score.examiner_id = None;
        score.approved_at = None;
        score.updated_at = Utc::now();
        ScoreRepository::update(&tx, &score)?;

        ActionLogRepository::record(
            &tx,
            "DEAPPROVE_SCORE",
            principal.id(),
            "Score",
            score_id,
            None,
        )?;
        tx.commit().map_err(RepositoryError::from)?;
        Ok(score)
    }

    /// 撤销系主任接受 (批准状态保留)
    #[instrument(skip(self, principal), fields(score_id = %score_id))]
    pub fn deaccept(&self, score_id: &str, principal: &Principal) -> DomainResult<Score> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(RepositoryError::from)?;

        let (mut score, _registration, student) = Self::load_score_context(&tx, score_id)?;
        authorization::can_deaccept_score(principal, &student.department_id).require()?;

        if !score.is_accepted_by_hod {
            return Err(DomainError::NotAccepted {
                score_id: score_id.to_string(),
            });
        }

        score.is_accepted_by_hod = false;
        score.hod_id = None;
        score.accepted_at = None;
        score.updated_at = Utc::now();
        ScoreRepository::update(&tx, &score)?;

        ActionLogRepository::record(
            &tx,
            "DEACCEPT_SCORE",
            principal.id(),
            "Score",
            score_id,
            None,
        )?;
        tx.commit().map_err(RepositoryError::from)?;
        Ok(score)
    }

    /// 删除成绩
    ///
    /// 授权按审批进度收紧; 同事务回置 registration.has_score = false
    #[instrument(skip(self, principal), fields(score_id = %score_id))]
    pub fn delete(&self, score_id: &str, principal: &Principal) -> DomainResult<()> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(RepositoryError::from)?;

        let (score, registration, student) = Self::load_score_context(&tx, score_id)?;
        authorization::can_delete_score(
            principal,
            &student.department_id,
            score.is_approved_by_examiner,
            score.is_accepted_by_hod,
        )
        .require()?;

        ScoreRepository::delete(&tx, score_id)?;
        RegistrationRepository::set_has_score(&tx, &registration.registration_id, false)?;

        ActionLogRepository::record(
            &tx,
            "DELETE_SCORE",
            principal.id(),
            "Score",
            score_id,
            Some(json!({ "registration_id": registration.registration_id })),
        )?;
        tx.commit().map_err(RepositoryError::from)?;
        info!(score_id = %score_id, "score deleted");
        Ok(())
    }
}
