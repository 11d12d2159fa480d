// ==========================================
// 学籍成绩管理系统 - 教学参考目录实体
// ==========================================
// 职责: 选课/成绩校验所依赖的只读参考数据
// 约束: 注册周期内 Course.credit_unit 不可变
// ==========================================

use crate::domain::types::{CourseType, SemesterType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Program - 专业
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub program_id: String,
    pub name: String,
    pub department_id: String,
    pub created_at: DateTime<Utc>,
}

// ==========================================
// Course - 课程
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub course_id: String,
    pub code: String,
    pub title: String,
    /// 学分（正整数）, 既用于选课学分上下限也用于绩点加权
    pub credit_unit: i64,
    pub course_type: CourseType,
    pub preferred_semester_type: SemesterType,
    pub created_at: DateTime<Utc>,
}

// ==========================================
// Level - 年级层次
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub level_id: String,
    pub name: String,
    /// 层次序号 (100/200/300...)
    pub rank: i64,
}

// ==========================================
// Season - 学年周期
// ==========================================
// 周期先后通过 ordering_year 比较; 同一 Season 内再比较学期序号
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Season {
    pub season_id: String,
    pub name: String,
    /// 排序用起始年份, 例如 2024 表示 2024/2025 学年
    pub ordering_year: i64,
    pub is_active: bool,
}

// ==========================================
// Semester - 学期
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Semester {
    pub semester_id: String,
    pub season_id: String,
    /// 学期序号, 用于同一学年内的先后比较
    pub semester_number: i64,
    pub semester_type: SemesterType,
    /// 锁定后只有 Admin/PermittedStaff 可调整选课
    pub edits_locked: bool,
}

// ==========================================
// ProgramCourseLink - 专业开课关联
// ==========================================
// 缺失关联 = 该专业该层次不开此课, 选课非法
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramCourseLink {
    pub program_id: String,
    pub course_id: String,
    pub level_id: String,
}

// ==========================================
// CoursePrerequisite - 先修课边
// ==========================================
// 多条边构成先修课集合, AND 语义: 全部满足才可选
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoursePrerequisite {
    pub course_id: String,
    pub prerequisite_course_id: String,
}

// ==========================================
// CreditUnitRequirement - 学分上下限要求
// ==========================================
// 按 (program, level, semester_type) 配置; 缺失 = 不做上下限约束(策略性留白)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditUnitRequirement {
    pub program_id: String,
    pub level_id: String,
    pub semester_type: SemesterType,
    pub minimum_credit_units: i64,
    pub maximum_credit_units: i64,
}

// ==========================================
// CourseTimetable - 授课安排
// ==========================================
// 录入成绩的讲师授权依据之一: 在该周期被排课的讲师可录入该课成绩
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseTimetable {
    pub timetable_id: String,
    pub course_id: String,
    pub lecturer_id: String,
    pub semester_id: String,
    pub season_id: String,
}

// ==========================================
// AcademicPeriod - 教学周期标识
// ==========================================
// 贯穿选课/成绩/考务的 (season, semester, level) 组合键
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicPeriod {
    pub season_id: String,
    pub semester_id: String,
    pub level_id: String,
}
