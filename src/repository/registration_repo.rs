// ==========================================
// 学籍成绩管理系统 - 选课记录仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 唯一键 (student_id, course_id, semester_id, season_id) 兜底并发竞争
// ==========================================

use crate::domain::registration::Registration;
use crate::domain::types::Grade;
use crate::repository::error::RepositoryResult;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};

/// 先修课通过记录 (选课资格校验输入)
/// 周期坐标用于"严格早于"比较, 不在 SQL 内做先后判断
#[derive(Debug, Clone)]
pub struct PrerequisitePass {
    pub course_id: String,
    pub grade: Grade,
    pub season_id: String,
    pub ordering_year: i64,
    pub semester_number: i64,
}

/// 选课记录仓储
pub struct RegistrationRepository;

impl RegistrationRepository {
    fn map_registration(row: &Row<'_>) -> SqliteResult<Registration> {
        Ok(Registration {
            registration_id: row.get(0)?,
            student_id: row.get(1)?,
            course_id: row.get(2)?,
            semester_id: row.get(3)?,
            season_id: row.get(4)?,
            level_id: row.get(5)?,
            has_score: row.get(6)?,
            registered_at: row.get(7)?,
        })
    }

    const SELECT_COLUMNS: &'static str = r#"
        SELECT registration_id, student_id, course_id, semester_id,
               season_id, level_id, has_score, registered_at
        FROM registration
    "#;

    /// 按主键查询选课记录
    pub fn find_by_id(
        conn: &Connection,
        registration_id: &str,
    ) -> RepositoryResult<Option<Registration>> {
        let sql = format!("{} WHERE registration_id = ?1", Self::SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let registration = stmt
            .query_row(params![registration_id], Self::map_registration)
            .optional()?;
        Ok(registration)
    }

    /// 学生在指定周期内的当前选课集合
    pub fn find_by_student_period(
        conn: &Connection,
        student_id: &str,
        semester_id: &str,
        season_id: &str,
    ) -> RepositoryResult<Vec<Registration>> {
        let sql = format!(
            "{} WHERE student_id = ?1 AND semester_id = ?2 AND season_id = ?3 ORDER BY registered_at",
            Self::SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let registrations = stmt
            .query_map(
                params![student_id, semester_id, season_id],
                Self::map_registration,
            )?
            .collect::<SqliteResult<Vec<Registration>>>()?;
        Ok(registrations)
    }

    /// 插入选课记录
    /// 唯一键冲突向上抛出 UniqueConstraintViolation, 由引擎翻译为重复选课
    pub fn insert(conn: &Connection, registration: &Registration) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO registration (
                registration_id, student_id, course_id, semester_id,
                season_id, level_id, has_score, registered_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                registration.registration_id,
                registration.student_id,
                registration.course_id,
                registration.semester_id,
                registration.season_id,
                registration.level_id,
                registration.has_score,
                registration.registered_at,
            ],
        )?;
        Ok(())
    }

    /// 删除选课记录
    pub fn delete(conn: &Connection, registration_id: &str) -> RepositoryResult<()> {
        conn.execute(
            "DELETE FROM registration WHERE registration_id = ?1",
            params![registration_id],
        )?;
        Ok(())
    }

    /// 维护派生标记 has_score (与 Score 写入/删除同事务)
    pub fn set_has_score(
        conn: &Connection,
        registration_id: &str,
        has_score: bool,
    ) -> RepositoryResult<()> {
        conn.execute(
            "UPDATE registration SET has_score = ?2 WHERE registration_id = ?1",
            params![registration_id, has_score],
        )?;
        Ok(())
    }

    /// 学生对某课程的全部通过记录及其周期坐标
    /// 只取通过集合 {A,B,C,D,E,P}; 先后关系由引擎层判定
    pub fn find_passing_records(
        conn: &Connection,
        student_id: &str,
        course_id: &str,
    ) -> RepositoryResult<Vec<PrerequisitePass>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT r.course_id, sc.grade, r.season_id,
                   se.ordering_year, sm.semester_number
            FROM registration r
            JOIN score sc ON sc.registration_id = r.registration_id
            JOIN semester sm ON sm.semester_id = r.semester_id
            JOIN season se ON se.season_id = r.season_id
            WHERE r.student_id = ?1
              AND r.course_id = ?2
              AND sc.grade IN ('A', 'B', 'C', 'D', 'E', 'P')
            "#,
        )?;
        let passes = stmt
            .query_map(params![student_id, course_id], |row| {
                Ok(PrerequisitePass {
                    course_id: row.get(0)?,
                    grade: Grade::parse(&row.get::<_, String>(1)?).unwrap_or(Grade::F),
                    season_id: row.get(2)?,
                    ordering_year: row.get(3)?,
                    semester_number: row.get(4)?,
                })
            })?
            .collect::<SqliteResult<Vec<PrerequisitePass>>>()?;
        Ok(passes)
    }
}
