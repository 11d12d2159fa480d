// ==========================================
// 学籍成绩管理系统 - 选课资格校验引擎
// ==========================================
// 职责: 开课关联 + 先修课 + 学分上限的有序硬校验
// 红线: 校验不落库; 任一检查失败立即中止, 无部分效果
// ==========================================
// 输入: 学生 + 课程 + 教学周期 + 同周期暂定课程集合
// 输出: 校验通过的 Course, 或带显式原因的领域错误
// ==========================================

use crate::domain::catalog::{AcademicPeriod, Course, CreditUnitRequirement};
use crate::domain::student::Student;
use crate::engine::eligibility_core::{EligibilityCore, PeriodCoordinate};
use crate::engine::error::{DomainError, DomainResult};
use crate::repository::{CatalogRepository, RegistrationRepository, StudentRepository};
use rusqlite::Connection;
use tracing::instrument;

// ==========================================
// EligibilityValidator - 选课资格校验引擎
// ==========================================
// 无状态引擎, 在调用方事务内执行
pub struct EligibilityValidator;

impl EligibilityValidator {
    /// 校验一门新增课程 (对账引擎内部入口)
    ///
    /// 检查顺序 (每项都是硬失败):
    /// 1. 专业开课关联必须存在
    /// 2. 每条先修课边必须有严格更早周期的通过记录
    /// 3. 暂定学分累计 + 本课学分不得超过上限 (要求缺失则不设限)
    ///
    /// # 参数
    /// - target: 目标周期坐标 (由调用方预加载, 批量校验时复用)
    /// - requirement: 学分上下限要求 (缺失 = 不约束)
    /// - tentative_total: 已接受的暂定课程集合学分合计
    pub fn validate_addition(
        conn: &Connection,
        student: &Student,
        course_id: &str,
        period: &AcademicPeriod,
        target: &PeriodCoordinate,
        requirement: Option<&CreditUnitRequirement>,
        tentative_total: i64,
    ) -> DomainResult<Course> {
        let course = CatalogRepository::find_course(conn, course_id)?
            .ok_or_else(|| DomainError::course_not_found(course_id))?;

        // === 检查 1: 专业开课关联 ===
        if !CatalogRepository::link_exists(conn, &student.program_id, course_id, &period.level_id)?
        {
            return Err(DomainError::CourseNotOffered {
                course_id: course_id.to_string(),
                program_id: student.program_id.clone(),
                level_id: period.level_id.clone(),
            });
        }

        // === 检查 2: 先修课集合 (AND 语义) ===
        for prerequisite_id in CatalogRepository::find_prerequisites(conn, course_id)? {
            let passes = RegistrationRepository::find_passing_records(
                conn,
                &student.student_id,
                &prerequisite_id,
            )?;
            if !EligibilityCore::prerequisite_satisfied(&passes, target) {
                return Err(DomainError::PrerequisiteNotMet {
                    course_id: course_id.to_string(),
                    prerequisite_id,
                });
            }
        }

        // === 检查 3: 学分上限 ===
        if let Some(requirement) = requirement {
            if EligibilityCore::would_exceed_maximum(
                tentative_total,
                course.credit_unit,
                requirement.maximum_credit_units,
            ) {
                return Err(DomainError::CreditUnitLimitExceeded {
                    course_id: course_id.to_string(),
                    attempted: tentative_total + course.credit_unit,
                    maximum: requirement.maximum_credit_units,
                });
            }
        }

        Ok(course)
    }

    /// 独立校验入口: 按课程 id 集合现算暂定学分
    ///
    /// # 参数
    /// - tentative_course_ids: 同周期已暂定选中的其他课程
    #[instrument(skip(conn, tentative_course_ids))]
    pub fn validate(
        conn: &Connection,
        student_id: &str,
        course_id: &str,
        period: &AcademicPeriod,
        tentative_course_ids: &[String],
    ) -> DomainResult<Course> {
        let student = StudentRepository::find_by_id(conn, student_id)?
            .ok_or_else(|| DomainError::student_not_found(student_id))?;
        let (target, requirement) = Self::load_period_context(conn, &student, period)?;

        let mut tentative_total = 0i64;
        for tentative_id in tentative_course_ids {
            let course = CatalogRepository::find_course(conn, tentative_id)?
                .ok_or_else(|| DomainError::course_not_found(tentative_id))?;
            tentative_total += course.credit_unit;
        }

        Self::validate_addition(
            conn,
            &student,
            course_id,
            period,
            &target,
            requirement.as_ref(),
            tentative_total,
        )
    }

    /// 加载周期坐标与学分要求 (对账引擎复用)
    pub fn load_period_context(
        conn: &Connection,
        student: &Student,
        period: &AcademicPeriod,
    ) -> DomainResult<(PeriodCoordinate, Option<CreditUnitRequirement>)> {
        let semester = CatalogRepository::find_semester(conn, &period.semester_id)?
            .ok_or_else(|| DomainError::semester_not_found(&period.semester_id))?;
        let season = CatalogRepository::find_season(conn, &period.season_id)?
            .ok_or_else(|| DomainError::season_not_found(&period.season_id))?;

        let target = PeriodCoordinate {
            season_id: season.season_id,
            ordering_year: season.ordering_year,
            semester_number: semester.semester_number,
        };
        let requirement = CatalogRepository::find_credit_requirement(
            conn,
            &student.program_id,
            &period.level_id,
            semester.semester_type,
        )?;
        Ok((target, requirement))
    }
}
