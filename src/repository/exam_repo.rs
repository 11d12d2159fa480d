// ==========================================
// 学籍成绩管理系统 - 考务仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 唯一键 (student_id, exam_id) 兜底重复分配竞争
// ==========================================

use crate::domain::exam::{Exam, ExamSession, SeatAssignment};
use crate::domain::student::Student;
use crate::repository::error::RepositoryResult;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};

/// 考生筛选条件
/// 全部可选; 同时生效取交集
#[derive(Debug, Clone, Default)]
pub struct StudentFilters {
    pub student_ids: Option<Vec<String>>,
    pub program_id: Option<String>,
    pub level_id: Option<String>,
    pub department_id: Option<String>,
}

/// 考务仓储
pub struct ExamRepository;

impl ExamRepository {
    fn map_session(row: &Row<'_>) -> SqliteResult<ExamSession> {
        Ok(ExamSession {
            session_id: row.get(0)?,
            exam_id: row.get(1)?,
            name: row.get(2)?,
            venue_id: row.get(3)?,
            max_attendees: row.get(4)?,
            is_active: row.get(5)?,
        })
    }

    fn map_assignment(row: &Row<'_>) -> SqliteResult<SeatAssignment> {
        Ok(SeatAssignment {
            assignment_id: row.get(0)?,
            student_id: row.get(1)?,
            exam_id: row.get(2)?,
            session_id: row.get(3)?,
            seat_label: row.get(4)?,
            assigned_at: row.get(5)?,
        })
    }

    /// 按主键查询考试
    pub fn find_exam(conn: &Connection, exam_id: &str) -> RepositoryResult<Option<Exam>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT exam_id, course_id, semester_id, season_id, exam_date, is_active
            FROM exam
            WHERE exam_id = ?1
            "#,
        )?;
        let exam = stmt
            .query_row(params![exam_id], |row| {
                Ok(Exam {
                    exam_id: row.get(0)?,
                    course_id: row.get(1)?,
                    semester_id: row.get(2)?,
                    season_id: row.get(3)?,
                    exam_date: row.get(4)?,
                    is_active: row.get(5)?,
                })
            })
            .optional()?;
        Ok(exam)
    }

    /// 按主键查询场次
    pub fn find_session(
        conn: &Connection,
        session_id: &str,
    ) -> RepositoryResult<Option<ExamSession>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT session_id, exam_id, name, venue_id, max_attendees, is_active
            FROM exam_session
            WHERE session_id = ?1
            "#,
        )?;
        let session = stmt
            .query_row(params![session_id], Self::map_session)
            .optional()?;
        Ok(session)
    }

    /// 考试下全部启用场次
    pub fn find_active_sessions(
        conn: &Connection,
        exam_id: &str,
    ) -> RepositoryResult<Vec<ExamSession>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT session_id, exam_id, name, venue_id, max_attendees, is_active
            FROM exam_session
            WHERE exam_id = ?1 AND is_active = 1
            ORDER BY session_id
            "#,
        )?;
        let sessions = stmt
            .query_map(params![exam_id], Self::map_session)?
            .collect::<SqliteResult<Vec<ExamSession>>>()?;
        Ok(sessions)
    }

    /// 场次当前已分配人数
    pub fn count_assignments(conn: &Connection, session_id: &str) -> RepositoryResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM seat_assignment WHERE session_id = ?1",
            params![session_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 考试下全部既有分配
    pub fn find_assignments_for_exam(
        conn: &Connection,
        exam_id: &str,
    ) -> RepositoryResult<Vec<SeatAssignment>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT assignment_id, student_id, exam_id, session_id, seat_label, assigned_at
            FROM seat_assignment
            WHERE exam_id = ?1
            "#,
        )?;
        let assignments = stmt
            .query_map(params![exam_id], Self::map_assignment)?
            .collect::<SqliteResult<Vec<SeatAssignment>>>()?;
        Ok(assignments)
    }

    /// 考生在该考试下的既有分配 (唯一键保证至多一条)
    pub fn find_assignment_for_student(
        conn: &Connection,
        student_id: &str,
        exam_id: &str,
    ) -> RepositoryResult<Option<SeatAssignment>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT assignment_id, student_id, exam_id, session_id, seat_label, assigned_at
            FROM seat_assignment
            WHERE student_id = ?1 AND exam_id = ?2
            "#,
        )?;
        let assignment = stmt
            .query_row(params![student_id, exam_id], Self::map_assignment)
            .optional()?;
        Ok(assignment)
    }

    /// 插入座位分配
    /// 唯一键冲突向上抛出 UniqueConstraintViolation, 由引擎翻译为重复分配
    pub fn insert_assignment(
        conn: &Connection,
        assignment: &SeatAssignment,
    ) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO seat_assignment (
                assignment_id, student_id, exam_id, session_id, seat_label, assigned_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                assignment.assignment_id,
                assignment.student_id,
                assignment.exam_id,
                assignment.session_id,
                assignment.seat_label,
                assignment.assigned_at,
            ],
        )?;
        Ok(())
    }

    /// 删除座位分配
    pub fn delete_assignment(conn: &Connection, assignment_id: &str) -> RepositoryResult<()> {
        conn.execute(
            "DELETE FROM seat_assignment WHERE assignment_id = ?1",
            params![assignment_id],
        )?;
        Ok(())
    }

    /// (student, session) 是否已有作答记录
    pub fn attempt_exists(
        conn: &Connection,
        student_id: &str,
        session_id: &str,
    ) -> RepositoryResult<bool> {
        let exists: Option<bool> = conn
            .query_row(
                r#"
                SELECT 1 FROM exam_attempt
                WHERE student_id = ?1 AND session_id = ?2
                LIMIT 1
                "#,
                params![student_id, session_id],
                |_row| Ok(true),
            )
            .optional()?;
        Ok(exists.unwrap_or(false))
    }

    /// 符合条件的考生: 在籍 + 筛选匹配 + 持有该考试 (course, semester, season) 的选课记录
    /// 未选课的学生直接排除, 不参与分配
    pub fn find_eligible_students(
        conn: &Connection,
        exam: &Exam,
        filters: &StudentFilters,
    ) -> RepositoryResult<Vec<Student>> {
        let mut sql = String::from(
            r#"
            SELECT DISTINCT s.student_id, s.matric_no, s.program_id, s.department_id,
                   s.current_level_id, s.is_active, s.created_at, s.updated_at
            FROM student s
            JOIN registration r ON r.student_id = s.student_id
            WHERE s.is_active = 1
              AND r.course_id = ?1
              AND r.semester_id = ?2
              AND r.season_id = ?3
            "#,
        );
        let mut bindings: Vec<SqlValue> = vec![
            SqlValue::Text(exam.course_id.clone()),
            SqlValue::Text(exam.semester_id.clone()),
            SqlValue::Text(exam.season_id.clone()),
        ];

        if let Some(program_id) = &filters.program_id {
            bindings.push(SqlValue::Text(program_id.clone()));
            sql.push_str(&format!(" AND s.program_id = ?{}", bindings.len()));
        }
        if let Some(level_id) = &filters.level_id {
            bindings.push(SqlValue::Text(level_id.clone()));
            sql.push_str(&format!(" AND s.current_level_id = ?{}", bindings.len()));
        }
        if let Some(department_id) = &filters.department_id {
            bindings.push(SqlValue::Text(department_id.clone()));
            sql.push_str(&format!(" AND s.department_id = ?{}", bindings.len()));
        }
        if let Some(student_ids) = &filters.student_ids {
            if student_ids.is_empty() {
                return Ok(Vec::new());
            }
            let mut placeholders = Vec::with_capacity(student_ids.len());
            for student_id in student_ids {
                bindings.push(SqlValue::Text(student_id.clone()));
                placeholders.push(format!("?{}", bindings.len()));
            }
            sql.push_str(&format!(
                " AND s.student_id IN ({})",
                placeholders.join(", ")
            ));
        }
        sql.push_str(" ORDER BY s.student_id");

        let mut stmt = conn.prepare(&sql)?;
        let students = stmt
            .query_map(rusqlite::params_from_iter(bindings), |row| {
                Ok(Student {
                    student_id: row.get(0)?,
                    matric_no: row.get(1)?,
                    program_id: row.get(2)?,
                    department_id: row.get(3)?,
                    current_level_id: row.get(4)?,
                    is_active: row.get(5)?,
                    created_at: row.get(6)?,
                    updated_at: row.get(7)?,
                })
            })?
            .collect::<SqliteResult<Vec<Student>>>()?;
        Ok(students)
    }
}
