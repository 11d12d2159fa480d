// ==========================================
// 学籍成绩管理系统 - 学生实体
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 学生
/// 归属招生模块维护; 核心引擎只读取, 不修改学籍字段
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub student_id: String,
    pub matric_no: String,
    pub program_id: String,
    pub department_id: String,
    pub current_level_id: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
