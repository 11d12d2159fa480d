// ==========================================
// 学籍成绩管理系统 - 请求主体
// ==========================================
// 职责: 承载认证层交付的已鉴权操作者
// 红线: 封闭标签联合, 授权判定不做鸭子类型散判
// ==========================================

use crate::domain::types::LecturerRole;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 已鉴权的请求主体
/// 认证/令牌签发在核心之外完成, 核心只消费该联合类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Principal {
    /// 系统管理员, 所有操作放行
    Admin { id: String },
    /// 具备教务特批能力的职员
    PermittedStaff { id: String },
    /// 讲师, 权限按角色与院系收敛
    Lecturer {
        id: String,
        role: LecturerRole,
        department_id: String,
    },
    /// 学生本人
    Student { id: String },
}

impl Principal {
    pub fn id(&self) -> &str {
        match self {
            Principal::Admin { id }
            | Principal::PermittedStaff { id }
            | Principal::Lecturer { id, .. }
            | Principal::Student { id } => id,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Principal::Admin { .. })
    }

    /// Admin 或 PermittedStaff: 不受学期锁定与院系范围限制
    pub fn is_staff(&self) -> bool {
        matches!(
            self,
            Principal::Admin { .. } | Principal::PermittedStaff { .. }
        )
    }

    /// 是否为指定院系中担任指定角色的讲师
    pub fn is_department_role(&self, department_id: &str, role: LecturerRole) -> bool {
        matches!(
            self,
            Principal::Lecturer {
                role: r,
                department_id: d,
                ..
            } if *r == role && d == department_id
        )
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Principal::Admin { id } => write!(f, "ADMIN({})", id),
            Principal::PermittedStaff { id } => write!(f, "PERMITTED_STAFF({})", id),
            Principal::Lecturer { id, role, .. } => write!(f, "LECTURER({}, {})", id, role),
            Principal::Student { id } => write!(f, "STUDENT({})", id),
        }
    }
}
