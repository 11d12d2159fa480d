// ==========================================
// 学籍成绩管理系统 - 选课资格纯计算核心
// ==========================================
// 职责: 周期先后比较 + 学分累计判定, 不触库不落库
// 红线: 同期或更晚周期的通过记录不满足先修课要求
// ==========================================

use crate::repository::registration_repo::PrerequisitePass;

/// 周期坐标: 用于先修课"严格早于"比较
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodCoordinate {
    pub season_id: String,
    pub ordering_year: i64,
    pub semester_number: i64,
}

/// 选课资格纯计算核心
pub struct EligibilityCore;

impl EligibilityCore {
    /// 候选周期是否严格早于目标周期
    ///
    /// 规则: 更早的学年周期, 或同一学年周期内更小的学期序号。
    /// 同期或更晚一律不算更早。
    pub fn period_strictly_earlier(candidate: &PeriodCoordinate, target: &PeriodCoordinate) -> bool {
        if candidate.season_id == target.season_id {
            return candidate.semester_number < target.semester_number;
        }
        candidate.ordering_year < target.ordering_year
    }

    /// 先修课边是否被满足: 存在一条严格更早周期的通过记录
    /// (通过集合过滤已在仓储查询完成)
    pub fn prerequisite_satisfied(passes: &[PrerequisitePass], target: &PeriodCoordinate) -> bool {
        passes.iter().any(|pass| {
            let candidate = PeriodCoordinate {
                season_id: pass.season_id.clone(),
                ordering_year: pass.ordering_year,
                semester_number: pass.semester_number,
            };
            Self::period_strictly_earlier(&candidate, target)
        })
    }

    /// 加入该课程后是否突破学分上限
    pub fn would_exceed_maximum(tentative_total: i64, credit_unit: i64, maximum: i64) -> bool {
        tentative_total + credit_unit > maximum
    }

    /// 最终课程集合是否满足学分下限
    pub fn meets_minimum(final_total: i64, minimum: i64) -> bool {
        final_total >= minimum
    }
}
