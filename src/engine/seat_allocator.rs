// ==========================================
// 学籍成绩管理系统 - 考场座位分配引擎
// ==========================================
// 职责: 批量均匀随机分配 + 定向分配 + 撤销分配
// 红线: 任何场次不得超过 max_attendees; 每名考生每场考试至多一个座位;
//       已有作答记录的分配不可撤销
// ==========================================
// 批量分配是"逐行部分成功": 单个考生的规则失败只记入结果,
// 不回滚其他考生; 仅系统错误使整个事务失败
// ==========================================

use crate::domain::exam::{ExamSession, SeatAssignment};
use crate::domain::principal::Principal;
use crate::engine::authorization;
use crate::engine::error::{DomainError, DomainResult};
use crate::repository::error::RepositoryError;
use crate::repository::{ActionLogRepository, ExamRepository, StudentFilters, StudentRepository};
use chrono::Utc;
use rand::seq::SliceRandom;
use rand::thread_rng;
use rusqlite::Connection;
use serde_json::json;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, instrument};
use uuid::Uuid;

/// 批量分配请求
#[derive(Debug, Clone, Default)]
pub struct AllocationRequest {
    pub exam_id: String,
    /// 考生筛选条件; 不筛选 = 全部持有选课记录的在籍考生
    pub filters: StudentFilters,
    /// true 时既有分配被释放并重新分配 (有作答记录的除外)
    pub overwrite: bool,
}

/// 单个考生的分配失败记录
#[derive(Debug)]
pub struct AllocationFailure {
    pub student_id: String,
    pub reason: DomainError,
}

/// 批量分配结果
#[derive(Debug, Default)]
pub struct AllocationOutcome {
    pub succeeded: Vec<SeatAssignment>,
    pub failed: Vec<AllocationFailure>,
}

/// 批量撤销结果
#[derive(Debug, Default)]
pub struct UnassignOutcome {
    pub removed: Vec<String>,
    pub failed: Vec<AllocationFailure>,
}

/// 分配过程中的场次槽位 (容量在内存里递减, 落库前即判满)
struct SessionSlot {
    session: ExamSession,
    assigned_count: i64,
}

impl SessionSlot {
    fn can_admit(&self) -> bool {
        self.session.can_admit(self.assigned_count)
    }
}

// ==========================================
// SeatAllocator - 考场座位分配引擎
// ==========================================
pub struct SeatAllocator {
    conn: Arc<Mutex<Connection>>,
}

impl SeatAllocator {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> DomainResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DomainError::Repository(RepositoryError::LockError(e.to_string())))
    }

    fn load_slots(conn: &Connection, exam_id: &str) -> DomainResult<Vec<SessionSlot>> {
        let mut slots = Vec::new();
        for session in ExamRepository::find_active_sessions(conn, exam_id)? {
            let assigned_count = ExamRepository::count_assignments(conn, &session.session_id)?;
            slots.push(SessionSlot {
                session,
                assigned_count,
            });
        }
        Ok(slots)
    }

    /// 批量均匀随机分配
    ///
    /// 考生与启用场次都先洗牌, 再按旋转游标轮转填充, 使各场次人数均匀且
    /// 分配结果不可按任何录入顺序预测。逐行部分成功, 整体单事务提交。
    #[instrument(skip(self, request, principal), fields(exam_id = %request.exam_id))]
    pub fn distribute(
        &self,
        request: &AllocationRequest,
        principal: &Principal,
    ) -> DomainResult<AllocationOutcome> {
        authorization::can_manage_seating(principal).require()?;

        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(RepositoryError::from)?;

        let exam = ExamRepository::find_exam(&tx, &request.exam_id)?
            .ok_or_else(|| DomainError::exam_not_found(&request.exam_id))?;

        let mut slots = Self::load_slots(&tx, &request.exam_id)?;
        let mut students = ExamRepository::find_eligible_students(&tx, &exam, &request.filters)?;

        let mut rng = thread_rng();
        slots.shuffle(&mut rng);
        students.shuffle(&mut rng);

        let mut outcome = AllocationOutcome::default();
        // 旋转游标: 每次成功分配后前进, 避免总从同一场次开始填
        let mut cursor = 0usize;

        for student in &students {
            let existing =
                ExamRepository::find_assignment_for_student(&tx, &student.student_id, &exam.exam_id)?;
            if let Some(existing) = existing {
                if !request.overwrite {
                    outcome.failed.push(AllocationFailure {
                        student_id: student.student_id.clone(),
                        reason: DomainError::AlreadyAssigned {
                            student_id: student.student_id.clone(),
                        },
                    });
                    continue;
                }
                if ExamRepository::attempt_exists(&tx, &student.student_id, &existing.session_id)? {
                    outcome.failed.push(AllocationFailure {
                        student_id: student.student_id.clone(),
                        reason: DomainError::AttemptRecorded {
                            student_id: student.student_id.clone(),
                            session_id: existing.session_id.clone(),
                        },
                    });
                    continue;
                }
                ExamRepository::delete_assignment(&tx, &existing.assignment_id)?;
                if let Some(slot) = slots
                    .iter_mut()
                    .find(|slot| slot.session.session_id == existing.session_id)
                {
                    slot.assigned_count -= 1;
                }
            }

            let Some(offset) = (0..slots.len()).find(|offset| {
                slots[(cursor + offset) % slots.len()].can_admit()
            }) else {
                outcome.failed.push(AllocationFailure {
                    student_id: student.student_id.clone(),
                    reason: DomainError::NoSessionCapacity {
                        student_id: student.student_id.clone(),
                    },
                });
                continue;
            };
            let index = (cursor + offset) % slots.len();
            let slot = &mut slots[index];

            let assignment = SeatAssignment {
                assignment_id: Uuid::new_v4().to_string(),
                student_id: student.student_id.clone(),
                exam_id: exam.exam_id.clone(),
                session_id: slot.session.session_id.clone(),
                seat_label: None,
                assigned_at: Utc::now(),
            };
            match ExamRepository::insert_assignment(&tx, &assignment) {
                Ok(()) => {
                    slot.assigned_count += 1;
                    cursor = (index + 1) % slots.len();
                    outcome.succeeded.push(assignment);
                }
                // 读-判-写窗口内的竞争按逐行冲突处理, 不中断其余考生
                Err(err) if err.is_unique_violation() => {
                    outcome.failed.push(AllocationFailure {
                        student_id: student.student_id.clone(),
                        reason: DomainError::AlreadyAssigned {
                            student_id: student.student_id.clone(),
                        },
                    });
                }
                Err(err) => return Err(DomainError::Repository(err)),
            }
        }

        ActionLogRepository::record(
            &tx,
            "DISTRIBUTE_SEATS",
            principal.id(),
            "Exam",
            &request.exam_id,
            Some(json!({
                "succeeded": outcome.succeeded.len(),
                "failed": outcome.failed.len(),
                "overwrite": request.overwrite,
            })),
        )?;
        tx.commit().map_err(RepositoryError::from)?;
        info!(
            exam_id = %request.exam_id,
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "seat distribution committed"
        );
        Ok(outcome)
    }

    /// 定向分配: 把一名考生放入指定场次
    ///
    /// 不洗牌不轮转; 容量/资格/重复分配规则与批量路径一致
    #[instrument(skip(self, principal), fields(exam_id = %exam_id, session_id = %session_id, student_id = %student_id))]
    pub fn assign_student(
        &self,
        exam_id: &str,
        session_id: &str,
        student_id: &str,
        seat_label: Option<String>,
        overwrite: bool,
        principal: &Principal,
    ) -> DomainResult<SeatAssignment> {
        authorization::can_manage_seating(principal).require()?;

        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(RepositoryError::from)?;

        let exam = ExamRepository::find_exam(&tx, exam_id)?
            .ok_or_else(|| DomainError::exam_not_found(exam_id))?;
        let session = ExamRepository::find_session(&tx, session_id)?
            .ok_or_else(|| DomainError::session_not_found(session_id))?;
        if session.exam_id != exam.exam_id {
            return Err(DomainError::session_not_found(session_id));
        }
        if !session.is_active {
            return Err(DomainError::SessionInactive {
                session_id: session_id.to_string(),
            });
        }

        let filters = StudentFilters {
            student_ids: Some(vec![student_id.to_string()]),
            ..StudentFilters::default()
        };
        if ExamRepository::find_eligible_students(&tx, &exam, &filters)?.is_empty() {
            return Err(DomainError::NotEligibleForExam {
                student_id: student_id.to_string(),
                exam_id: exam_id.to_string(),
            });
        }

        if let Some(existing) =
            ExamRepository::find_assignment_for_student(&tx, student_id, exam_id)?
        {
            if !overwrite {
                return Err(DomainError::AlreadyAssigned {
                    student_id: student_id.to_string(),
                });
            }
            if ExamRepository::attempt_exists(&tx, student_id, &existing.session_id)? {
                return Err(DomainError::AttemptRecorded {
                    student_id: student_id.to_string(),
                    session_id: existing.session_id,
                });
            }
            ExamRepository::delete_assignment(&tx, &existing.assignment_id)?;
        }

        let assigned_count = ExamRepository::count_assignments(&tx, session_id)?;
        if !session.can_admit(assigned_count) {
            return Err(DomainError::NoSessionCapacity {
                student_id: student_id.to_string(),
            });
        }

        let assignment = SeatAssignment {
            assignment_id: Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            exam_id: exam_id.to_string(),
            session_id: session_id.to_string(),
            seat_label,
            assigned_at: Utc::now(),
        };
        ExamRepository::insert_assignment(&tx, &assignment).map_err(|err| {
            if err.is_unique_violation() {
                DomainError::AlreadyAssigned {
                    student_id: student_id.to_string(),
                }
            } else {
                DomainError::Repository(err)
            }
        })?;

        ActionLogRepository::record(
            &tx,
            "ASSIGN_SEAT",
            principal.id(),
            "Exam",
            exam_id,
            Some(json!({
                "student_id": student_id,
                "session_id": session_id,
                "overwrite": overwrite,
            })),
        )?;
        tx.commit().map_err(RepositoryError::from)?;
        Ok(assignment)
    }

    /// 批量撤销考试下的座位分配
    ///
    /// 与批量分配同样是逐行部分成功: 有作答记录的考生记为失败, 其余照常删除
    #[instrument(skip(self, filters, principal), fields(exam_id = %exam_id))]
    pub fn unassign_many(
        &self,
        exam_id: &str,
        filters: &StudentFilters,
        principal: &Principal,
    ) -> DomainResult<UnassignOutcome> {
        authorization::can_manage_seating(principal).require()?;

        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(RepositoryError::from)?;

        ExamRepository::find_exam(&tx, exam_id)?
            .ok_or_else(|| DomainError::exam_not_found(exam_id))?;

        let mut outcome = UnassignOutcome::default();
        for assignment in ExamRepository::find_assignments_for_exam(&tx, exam_id)? {
            if !Self::matches_filters(&tx, &assignment.student_id, filters)? {
                continue;
            }
            if ExamRepository::attempt_exists(&tx, &assignment.student_id, &assignment.session_id)? {
                outcome.failed.push(AllocationFailure {
                    student_id: assignment.student_id.clone(),
                    reason: DomainError::AttemptRecorded {
                        student_id: assignment.student_id.clone(),
                        session_id: assignment.session_id.clone(),
                    },
                });
                continue;
            }
            ExamRepository::delete_assignment(&tx, &assignment.assignment_id)?;
            outcome.removed.push(assignment.student_id);
        }

        ActionLogRepository::record(
            &tx,
            "UNASSIGN_SEATS",
            principal.id(),
            "Exam",
            exam_id,
            Some(json!({
                "removed": outcome.removed.len(),
                "failed": outcome.failed.len(),
            })),
        )?;
        tx.commit().map_err(RepositoryError::from)?;
        info!(
            exam_id = %exam_id,
            removed = outcome.removed.len(),
            failed = outcome.failed.len(),
            "batch unassign committed"
        );
        Ok(outcome)
    }

    /// 考生是否匹配撤销筛选条件 (全部可选, 同时生效取交集)
    fn matches_filters(
        conn: &Connection,
        student_id: &str,
        filters: &StudentFilters,
    ) -> DomainResult<bool> {
        if let Some(student_ids) = &filters.student_ids {
            if !student_ids.iter().any(|id| id == student_id) {
                return Ok(false);
            }
        }
        if filters.program_id.is_none()
            && filters.level_id.is_none()
            && filters.department_id.is_none()
        {
            return Ok(true);
        }
        let student = StudentRepository::find_by_id(conn, student_id)?
            .ok_or_else(|| DomainError::student_not_found(student_id))?;
        if let Some(program_id) = &filters.program_id {
            if &student.program_id != program_id {
                return Ok(false);
            }
        }
        if let Some(level_id) = &filters.level_id {
            if &student.current_level_id != level_id {
                return Ok(false);
            }
        }
        if let Some(department_id) = &filters.department_id {
            if &student.department_id != department_id {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// 撤销一名考生的座位分配
    ///
    /// 该考生在所分配场次已有作答记录时拒绝撤销
    #[instrument(skip(self, principal), fields(exam_id = %exam_id, student_id = %student_id))]
    pub fn unassign_student(
        &self,
        exam_id: &str,
        student_id: &str,
        principal: &Principal,
    ) -> DomainResult<()> {
        authorization::can_manage_seating(principal).require()?;

        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(RepositoryError::from)?;

        let assignment = ExamRepository::find_assignment_for_student(&tx, student_id, exam_id)?
            .ok_or_else(|| DomainError::NotFound {
                entity: "SeatAssignment".to_string(),
                id: format!("{student_id}/{exam_id}"),
            })?;
        if ExamRepository::attempt_exists(&tx, student_id, &assignment.session_id)? {
            return Err(DomainError::AttemptRecorded {
                student_id: student_id.to_string(),
                session_id: assignment.session_id,
            });
        }

        ExamRepository::delete_assignment(&tx, &assignment.assignment_id)?;
        ActionLogRepository::record(
            &tx,
            "UNASSIGN_SEAT",
            principal.id(),
            "Exam",
            exam_id,
            Some(json!({ "student_id": student_id })),
        )?;
        tx.commit().map_err(RepositoryError::from)?;
        Ok(())
    }
}
