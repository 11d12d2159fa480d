// ==========================================
// 学籍成绩管理系统 - 选课记录实体
// ==========================================
// 唯一键: (student_id, course_id, semester_id, season_id)
// 并发约束: 重复选课依赖该唯一键兜底, 冲突需翻译为领域错误
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 选课记录
/// 由对账引擎创建; 仅当未挂成绩且学期未锁定时才可由对账引擎删除
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub registration_id: String,
    pub student_id: String,
    pub course_id: String,
    pub semester_id: String,
    pub season_id: String,
    pub level_id: String,
    /// 派生标记: 是否已有 Score 挂接 (成绩提交置位/成绩删除复位, 同事务维护)
    pub has_score: bool,
    pub registered_at: DateTime<Utc>,
}

/// 对账结果: 最小化 add/drop 差集, 整体原子提交
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}
