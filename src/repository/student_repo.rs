// ==========================================
// 学籍成绩管理系统 - 学生仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::student::Student;
use crate::repository::error::RepositoryResult;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};

/// 学生仓储
/// 职责: student 表的只读访问 (学籍字段由招生模块维护)
pub struct StudentRepository;

impl StudentRepository {
    fn map_student(row: &Row<'_>) -> SqliteResult<Student> {
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
    }

    /// 按主键查询学生
    pub fn find_by_id(conn: &Connection, student_id: &str) -> RepositoryResult<Option<Student>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT student_id, matric_no, program_id, department_id,
                   current_level_id, is_active, created_at, updated_at
            FROM student
            WHERE student_id = ?1
            "#,
        )?;
        let student = stmt
            .query_row(params![student_id], Self::map_student)
            .optional()?;
        Ok(student)
    }
}
