// ==========================================
// 学籍成绩管理系统 - 参考目录仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================
// 说明: 目录数据由外部 CRUD 维护, 核心只读;
//       所有函数接收 &Connection, 可在调用方事务内执行
// ==========================================

use crate::domain::catalog::{Course, CreditUnitRequirement, Season, Semester};
use crate::domain::types::{CourseType, SemesterType};
use crate::repository::error::RepositoryResult;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};

/// 参考目录仓储
/// 职责: program/course/level/semester/season 及其关联表的只读访问
pub struct CatalogRepository;

impl CatalogRepository {
    fn map_course(row: &Row<'_>) -> SqliteResult<Course> {
        Ok(Course {
            course_id: row.get(0)?,
            code: row.get(1)?,
            title: row.get(2)?,
            credit_unit: row.get(3)?,
            course_type: CourseType::parse(&row.get::<_, String>(4)?)
                .unwrap_or(CourseType::Compulsory),
            preferred_semester_type: SemesterType::parse(&row.get::<_, String>(5)?)
                .unwrap_or(SemesterType::First),
            created_at: row.get(6)?,
        })
    }

    /// 按主键查询课程
    pub fn find_course(conn: &Connection, course_id: &str) -> RepositoryResult<Option<Course>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT course_id, code, title, credit_unit, course_type,
                   preferred_semester_type, created_at
            FROM course
            WHERE course_id = ?1
            "#,
        )?;
        let course = stmt
            .query_row(params![course_id], Self::map_course)
            .optional()?;
        Ok(course)
    }

    /// 专业开课关联是否存在
    /// 缺失 = 该专业该层次不开此课
    pub fn link_exists(
        conn: &Connection,
        program_id: &str,
        course_id: &str,
        level_id: &str,
    ) -> RepositoryResult<bool> {
        let exists: Option<bool> = conn
            .query_row(
                r#"
                SELECT 1 FROM program_course_link
                WHERE program_id = ?1 AND course_id = ?2 AND level_id = ?3
                LIMIT 1
                "#,
                params![program_id, course_id, level_id],
                |_row| Ok(true),
            )
            .optional()?;
        Ok(exists.unwrap_or(false))
    }

    /// 课程的先修课集合 (AND 语义)
    pub fn find_prerequisites(
        conn: &Connection,
        course_id: &str,
    ) -> RepositoryResult<Vec<String>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT prerequisite_course_id
            FROM course_prerequisite
            WHERE course_id = ?1
            ORDER BY prerequisite_course_id
            "#,
        )?;
        let ids = stmt
            .query_map(params![course_id], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<Vec<String>>>()?;
        Ok(ids)
    }

    /// 学分上下限要求; 缺失 = 不做约束 (策略性留白, 不是数据缺陷)
    pub fn find_credit_requirement(
        conn: &Connection,
        program_id: &str,
        level_id: &str,
        semester_type: SemesterType,
    ) -> RepositoryResult<Option<CreditUnitRequirement>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT program_id, level_id, semester_type,
                   minimum_credit_units, maximum_credit_units
            FROM credit_unit_requirement
            WHERE program_id = ?1 AND level_id = ?2 AND semester_type = ?3
            "#,
        )?;
        let requirement = stmt
            .query_row(
                params![program_id, level_id, semester_type.to_string()],
                |row| {
                    Ok(CreditUnitRequirement {
                        program_id: row.get(0)?,
                        level_id: row.get(1)?,
                        semester_type: SemesterType::parse(&row.get::<_, String>(2)?)
                            .unwrap_or(SemesterType::First),
                        minimum_credit_units: row.get(3)?,
                        maximum_credit_units: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(requirement)
    }

    /// 按主键查询学期
    pub fn find_semester(
        conn: &Connection,
        semester_id: &str,
    ) -> RepositoryResult<Option<Semester>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT semester_id, season_id, semester_number, semester_type, edits_locked
            FROM semester
            WHERE semester_id = ?1
            "#,
        )?;
        let semester = stmt
            .query_row(params![semester_id], |row| {
                Ok(Semester {
                    semester_id: row.get(0)?,
                    season_id: row.get(1)?,
                    semester_number: row.get(2)?,
                    semester_type: SemesterType::parse(&row.get::<_, String>(3)?)
                        .unwrap_or(SemesterType::First),
                    edits_locked: row.get(4)?,
                })
            })
            .optional()?;
        Ok(semester)
    }

    /// 按主键查询学年周期
    pub fn find_season(conn: &Connection, season_id: &str) -> RepositoryResult<Option<Season>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT season_id, name, ordering_year, is_active
            FROM season
            WHERE season_id = ?1
            "#,
        )?;
        let season = stmt
            .query_row(params![season_id], |row| {
                Ok(Season {
                    season_id: row.get(0)?,
                    name: row.get(1)?,
                    ordering_year: row.get(2)?,
                    is_active: row.get(3)?,
                })
            })
            .optional()?;
        Ok(season)
    }

    /// 讲师在该周期是否被排课到该课程
    /// 成绩录入授权依据之一
    pub fn is_timetabled(
        conn: &Connection,
        lecturer_id: &str,
        course_id: &str,
        semester_id: &str,
        season_id: &str,
    ) -> RepositoryResult<bool> {
        let exists: Option<bool> = conn
            .query_row(
                r#"
                SELECT 1 FROM course_timetable
                WHERE lecturer_id = ?1 AND course_id = ?2
                  AND semester_id = ?3 AND season_id = ?4
                LIMIT 1
                "#,
                params![lecturer_id, course_id, semester_id, season_id],
                |_row| Ok(true),
            )
            .optional()?;
        Ok(exists.unwrap_or(false))
    }
}
