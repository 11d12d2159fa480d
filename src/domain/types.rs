// ==========================================
// 学籍成绩管理系统 - 领域类型定义
// ==========================================
// 红线: 等级制封闭枚举,不允许自由字符串
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 成绩等级 (Grade)
// ==========================================
// 由 total_score 通过单调分段表推导; P 为历史导入的通过等级,
// 计算路径永远不会产出 P
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    A, // 优秀 (>= 70)
    B, // 良好 (>= 60)
    C, // 中等 (>= 50)
    D, // 及格 (>= 45)
    E, // 勉强及格 (>= 40)
    F, // 不及格 (< 40)
    P, // 通过 (免评分课程/历史数据)
}

impl Grade {
    /// 由总分推导等级（单调分段表）
    pub fn from_total(total_score: f64) -> Self {
        if total_score >= 70.0 {
            Grade::A
        } else if total_score >= 60.0 {
            Grade::B
        } else if total_score >= 50.0 {
            Grade::C
        } else if total_score >= 45.0 {
            Grade::D
        } else if total_score >= 40.0 {
            Grade::E
        } else {
            Grade::F
        }
    }

    /// 等级对应的绩点
    pub fn point(&self) -> f64 {
        match self {
            Grade::A => 5.0,
            Grade::B => 4.0,
            Grade::C => 3.0,
            Grade::D => 2.0,
            Grade::E => 1.0,
            Grade::F => 0.0,
            Grade::P => 0.0,
        }
    }

    /// 是否满足先修课通过要求
    /// 通过集合: {A, B, C, D, E, P}
    pub fn is_passing(&self) -> bool {
        !matches!(self, Grade::F)
    }

    /// 从数据库文本列解析
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "A" => Some(Grade::A),
            "B" => Some(Grade::B),
            "C" => Some(Grade::C),
            "D" => Some(Grade::D),
            "E" => Some(Grade::E),
            "F" => Some(Grade::F),
            "P" => Some(Grade::P),
            _ => None,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grade::A => write!(f, "A"),
            Grade::B => write!(f, "B"),
            Grade::C => write!(f, "C"),
            Grade::D => write!(f, "D"),
            Grade::E => write!(f, "E"),
            Grade::F => write!(f, "F"),
            Grade::P => write!(f, "P"),
        }
    }
}

// ==========================================
// 学期类型 (Semester Type)
// ==========================================
// 学分上下限要求按 (program, level, semester_type) 维度配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SemesterType {
    First,  // 第一学期
    Second, // 第二学期
}

impl SemesterType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "FIRST" => Some(SemesterType::First),
            "SECOND" => Some(SemesterType::Second),
            _ => None,
        }
    }
}

impl fmt::Display for SemesterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemesterType::First => write!(f, "FIRST"),
            SemesterType::Second => write!(f, "SECOND"),
        }
    }
}

// ==========================================
// 教职角色 (Lecturer Role)
// ==========================================
// 角色与院系绑定: Examiner/HeadOfDepartment 的权限只在本院系内生效
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LecturerRole {
    Lecturer,         // 普通讲师
    Examiner,         // 阅卷审批人
    HeadOfDepartment, // 系主任
}

impl fmt::Display for LecturerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LecturerRole::Lecturer => write!(f, "LECTURER"),
            LecturerRole::Examiner => write!(f, "EXAMINER"),
            LecturerRole::HeadOfDepartment => write!(f, "HOD"),
        }
    }
}

// ==========================================
// 课程类型 (Course Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourseType {
    Compulsory, // 必修
    Elective,   // 选修
}

impl CourseType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "COMPULSORY" => Some(CourseType::Compulsory),
            "ELECTIVE" => Some(CourseType::Elective),
            _ => None,
        }
    }
}

impl fmt::Display for CourseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CourseType::Compulsory => write!(f, "COMPULSORY"),
            CourseType::Elective => write!(f, "ELECTIVE"),
        }
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_table_monotonic() {
        // 分段表边界
        assert_eq!(Grade::from_total(100.0), Grade::A);
        assert_eq!(Grade::from_total(70.0), Grade::A);
        assert_eq!(Grade::from_total(69.9), Grade::B);
        assert_eq!(Grade::from_total(60.0), Grade::B);
        assert_eq!(Grade::from_total(50.0), Grade::C);
        assert_eq!(Grade::from_total(45.0), Grade::D);
        assert_eq!(Grade::from_total(40.0), Grade::E);
        assert_eq!(Grade::from_total(39.9), Grade::F);
        assert_eq!(Grade::from_total(0.0), Grade::F);
    }

    #[test]
    fn test_grade_points() {
        assert_eq!(Grade::A.point(), 5.0);
        assert_eq!(Grade::B.point(), 4.0);
        assert_eq!(Grade::C.point(), 3.0);
        assert_eq!(Grade::D.point(), 2.0);
        assert_eq!(Grade::E.point(), 1.0);
        assert_eq!(Grade::F.point(), 0.0);
    }

    #[test]
    fn test_passing_set() {
        // 通过集合 {A,B,C,D,E,P}, F 不通过
        for grade in [Grade::A, Grade::B, Grade::C, Grade::D, Grade::E, Grade::P] {
            assert!(grade.is_passing(), "{} 应在通过集合内", grade);
        }
        assert!(!Grade::F.is_passing());
    }

    #[test]
    fn test_grade_parse_roundtrip() {
        for grade in [
            Grade::A,
            Grade::B,
            Grade::C,
            Grade::D,
            Grade::E,
            Grade::F,
            Grade::P,
        ] {
            assert_eq!(Grade::parse(&grade.to_string()), Some(grade));
        }
        assert_eq!(Grade::parse("X"), None);
    }
}
