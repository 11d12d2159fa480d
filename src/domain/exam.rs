// ==========================================
// 学籍成绩管理系统 - 考务实体
// ==========================================
// 唯一键: seat_assignment (student_id, exam_id)
// 红线: 任何场次的分配数不得超过 max_attendees
// ==========================================

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Exam - 考试
// ==========================================
// 通过 (course, semester, season) 锚定参考周期, 决定考生资格
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exam {
    pub exam_id: String,
    pub course_id: String,
    pub semester_id: String,
    pub season_id: String,
    pub exam_date: Option<NaiveDate>,
    pub is_active: bool,
}

// ==========================================
// ExamSession - 考试场次
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamSession {
    pub session_id: String,
    pub exam_id: String,
    pub name: String,
    pub venue_id: Option<String>,
    /// 容量上限; None = 不限容量
    pub max_attendees: Option<i64>,
    pub is_active: bool,
}

impl ExamSession {
    /// 剩余容量; None 表示不限
    pub fn remaining_capacity(&self, current_count: i64) -> Option<i64> {
        self.max_attendees.map(|max| (max - current_count).max(0))
    }

    /// 当前人数下能否再接收一名考生
    pub fn can_admit(&self, current_count: i64) -> bool {
        match self.max_attendees {
            Some(max) => current_count < max,
            None => true,
        }
    }
}

// ==========================================
// SeatAssignment - 座位分配
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatAssignment {
    pub assignment_id: String,
    pub student_id: String,
    pub exam_id: String,
    pub session_id: String,
    pub seat_label: Option<String>,
    pub assigned_at: DateTime<Utc>,
}

// ==========================================
// ExamAttempt - 考试作答记录
// ==========================================
// 存在作答记录的 (student, session) 分配不可撤销
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamAttempt {
    pub attempt_id: String,
    pub student_id: String,
    pub session_id: String,
    pub started_at: DateTime<Utc>,
}
