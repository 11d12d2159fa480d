// ==========================================
// 学籍成绩管理系统 - 成绩实体与推导
// ==========================================
// 职责: 原始分量校验 + total/grade/point/credit_points 推导
// 红线: 任何原始分量编辑必须清空两级审批状态(含操作人/时间戳)
// ==========================================

use crate::domain::types::Grade;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 平时成绩一/二的分量上限
pub const CA_COMPONENT_MAX: f64 = 30.0;
/// 期末考试分量上限
pub const EXAM_COMPONENT_MAX: f64 = 70.0;
/// 总分封顶
pub const TOTAL_SCORE_CAP: f64 = 100.0;

// ==========================================
// ScoreComponents - 原始分量
// ==========================================
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub first_ca: f64,
    pub second_ca: f64,
    pub exam_score: f64,
}

/// 分量越界详情（由引擎层翻译为领域错误）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentViolation {
    pub field: &'static str,
    pub value: f64,
    pub max: f64,
}

impl ScoreComponents {
    /// 校验每个分量落在 [0, 上限] 区间内
    pub fn validate(&self) -> Result<(), ComponentViolation> {
        let bounds = [
            ("first_ca", self.first_ca, CA_COMPONENT_MAX),
            ("second_ca", self.second_ca, CA_COMPONENT_MAX),
            ("exam_score", self.exam_score, EXAM_COMPONENT_MAX),
        ];
        for (field, value, max) in bounds {
            if !value.is_finite() || value < 0.0 || value > max {
                return Err(ComponentViolation { field, value, max });
            }
        }
        Ok(())
    }

    /// 总分 = min(100, 分量之和)
    pub fn total(&self) -> f64 {
        (self.first_ca + self.second_ca + self.exam_score).min(TOTAL_SCORE_CAP)
    }
}

// ==========================================
// Score - 成绩记录
// ==========================================
// 与 Registration 一对一; 审批子状态不变量: is_accepted_by_hod => is_approved_by_examiner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Score {
    pub score_id: String,
    pub registration_id: String,
    pub first_ca: f64,
    pub second_ca: f64,
    pub exam_score: f64,
    pub total_score: f64,
    pub grade: Grade,
    pub point: f64,
    pub credit_points: f64,
    pub is_approved_by_examiner: bool,
    pub examiner_id: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub is_accepted_by_hod: bool,
    pub hod_id: Option<String>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Score {
    /// 以校验过的分量重算派生字段, 并强制清空两级审批
    ///
    /// # 参数
    /// - components: 已通过 validate 的原始分量
    /// - credit_unit: 写入时刻取到的课程学分
    pub fn apply_components(&mut self, components: &ScoreComponents, credit_unit: i64) {
        self.first_ca = components.first_ca;
        self.second_ca = components.second_ca;
        self.exam_score = components.exam_score;
        self.total_score = components.total();
        self.grade = Grade::from_total(self.total_score);
        self.point = self.grade.point();
        self.credit_points = self.point * credit_unit as f64;
        self.reset_approvals();
        self.updated_at = Utc::now();
    }

    /// 清空两级审批状态及其操作人/时间戳
    pub fn reset_approvals(&mut self) {
        self.is_approved_by_examiner = false;
        self.examiner_id = None;
        self.approved_at = None;
        self.is_accepted_by_hod = false;
        self.hod_id = None;
        self.accepted_at = None;
    }
}
