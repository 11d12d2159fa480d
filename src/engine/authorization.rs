// ==========================================
// 学籍成绩管理系统 - 授权判定
// ==========================================
// 职责: 按操作逐一给出类型化授权决定
// 红线: 不做散落的布尔链判断; 每个拒绝必须带显式原因
// ==========================================

use crate::domain::principal::Principal;
use crate::domain::types::LecturerRole;
use crate::engine::error::{DomainError, DomainResult};

// ==========================================
// Capability - 放行依据
// ==========================================
// 审计日志可据此记录操作为何被允许
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    AdminOverride,
    PermittedStaff,
    DepartmentExaminer,
    DepartmentHod,
    TimetabledLecturer,
    SelfService,
}

// ==========================================
// AuthDecision - 授权决定
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    Granted(Capability),
    Denied { reason: String },
}

impl AuthDecision {
    fn denied(reason: &str) -> Self {
        AuthDecision::Denied {
            reason: reason.to_string(),
        }
    }

    /// 转换为领域错误: 拒绝 => Unauthorized
    pub fn require(self) -> DomainResult<Capability> {
        match self {
            AuthDecision::Granted(capability) => Ok(capability),
            AuthDecision::Denied { reason } => Err(DomainError::Unauthorized { reason }),
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, AuthDecision::Granted(_))
    }
}

fn staff_capability(principal: &Principal) -> Option<Capability> {
    match principal {
        Principal::Admin { .. } => Some(Capability::AdminOverride),
        Principal::PermittedStaff { .. } => Some(Capability::PermittedStaff),
        _ => None,
    }
}

fn department_capability(
    principal: &Principal,
    department_id: &str,
    role: LecturerRole,
) -> Option<Capability> {
    if principal.is_department_role(department_id, role) {
        match role {
            LecturerRole::Examiner => Some(Capability::DepartmentExaminer),
            LecturerRole::HeadOfDepartment => Some(Capability::DepartmentHod),
            LecturerRole::Lecturer => None,
        }
    } else {
        None
    }
}

// ==========================================
// 选课对账
// ==========================================

/// 选课对账授权
/// 学期锁定后仅 Admin/PermittedStaff; 未锁定时学生只能操作本人选课
pub fn can_reconcile_registrations(
    principal: &Principal,
    student_id: &str,
    edits_locked: bool,
) -> AuthDecision {
    if let Some(capability) = staff_capability(principal) {
        return AuthDecision::Granted(capability);
    }
    if edits_locked {
        return AuthDecision::denied("学期已锁定, 仅管理员/特批职员可调整选课");
    }
    match principal {
        Principal::Student { id } if id == student_id => {
            AuthDecision::Granted(Capability::SelfService)
        }
        Principal::Student { .. } => AuthDecision::denied("学生只能调整本人的选课"),
        _ => AuthDecision::denied("讲师不可调整学生选课"),
    }
}

// ==========================================
// 成绩生命周期
// ==========================================

/// 成绩录入/修改授权
/// 讲师需满足: 本院系 Examiner/HOD 角色, 或在该周期被排课到该课程
pub fn can_submit_score(
    principal: &Principal,
    student_department_id: &str,
    is_timetabled: bool,
) -> AuthDecision {
    if let Some(capability) = staff_capability(principal) {
        return AuthDecision::Granted(capability);
    }
    if let Some(capability) =
        department_capability(principal, student_department_id, LecturerRole::Examiner)
            .or_else(|| {
                department_capability(
                    principal,
                    student_department_id,
                    LecturerRole::HeadOfDepartment,
                )
            })
    {
        return AuthDecision::Granted(capability);
    }
    if matches!(principal, Principal::Lecturer { .. }) && is_timetabled {
        return AuthDecision::Granted(Capability::TimetabledLecturer);
    }
    AuthDecision::denied("仅本院系审批角色或该课程排课讲师可录入成绩")
}

/// 阅卷批准授权: 本院系 Examiner
pub fn can_approve_score(principal: &Principal, student_department_id: &str) -> AuthDecision {
    if let Some(capability) = staff_capability(principal) {
        return AuthDecision::Granted(capability);
    }
    match department_capability(principal, student_department_id, LecturerRole::Examiner) {
        Some(capability) => AuthDecision::Granted(capability),
        None => AuthDecision::denied("仅本院系阅卷审批人可批准成绩"),
    }
}

/// 系主任接受授权: 本院系 HOD
pub fn can_accept_score(principal: &Principal, student_department_id: &str) -> AuthDecision {
    if let Some(capability) = staff_capability(principal) {
        return AuthDecision::Granted(capability);
    }
    match department_capability(
        principal,
        student_department_id,
        LecturerRole::HeadOfDepartment,
    ) {
        Some(capability) => AuthDecision::Granted(capability),
        None => AuthDecision::denied("仅本院系系主任可接受成绩"),
    }
}

/// 撤销批准授权: Examiner/HOD/Admin(含特批职员)
pub fn can_deapprove_score(principal: &Principal, student_department_id: &str) -> AuthDecision {
    if let Some(capability) = staff_capability(principal) {
        return AuthDecision::Granted(capability);
    }
    if let Some(capability) =
        department_capability(principal, student_department_id, LecturerRole::Examiner)
            .or_else(|| {
                department_capability(
                    principal,
                    student_department_id,
                    LecturerRole::HeadOfDepartment,
                )
            })
    {
        return AuthDecision::Granted(capability);
    }
    AuthDecision::denied("仅本院系审批角色可撤销批准")
}

/// 撤销接受授权: HOD/Admin(含特批职员)
pub fn can_deaccept_score(principal: &Principal, student_department_id: &str) -> AuthDecision {
    if let Some(capability) = staff_capability(principal) {
        return AuthDecision::Granted(capability);
    }
    match department_capability(
        principal,
        student_department_id,
        LecturerRole::HeadOfDepartment,
    ) {
        Some(capability) => AuthDecision::Granted(capability),
        None => AuthDecision::denied("仅本院系系主任可撤销接受"),
    }
}

/// 成绩删除授权
/// 已接受: 仅 Admin; 已批准: Admin 或本院系 HOD; 其余同录入资格
pub fn can_delete_score(
    principal: &Principal,
    student_department_id: &str,
    is_approved: bool,
    is_accepted: bool,
) -> AuthDecision {
    if is_accepted {
        return if principal.is_admin() {
            AuthDecision::Granted(Capability::AdminOverride)
        } else {
            AuthDecision::denied("成绩已被系主任接受, 仅管理员可删除")
        };
    }
    if is_approved {
        if principal.is_admin() {
            return AuthDecision::Granted(Capability::AdminOverride);
        }
        return match department_capability(
            principal,
            student_department_id,
            LecturerRole::HeadOfDepartment,
        ) {
            Some(capability) => AuthDecision::Granted(capability),
            None => AuthDecision::denied("成绩已批准, 仅管理员或本院系系主任可删除"),
        };
    }
    if let Some(capability) = staff_capability(principal) {
        return AuthDecision::Granted(capability);
    }
    if let Some(capability) =
        department_capability(principal, student_department_id, LecturerRole::Examiner)
            .or_else(|| {
                department_capability(
                    principal,
                    student_department_id,
                    LecturerRole::HeadOfDepartment,
                )
            })
    {
        return AuthDecision::Granted(capability);
    }
    AuthDecision::denied("仅本院系审批角色可删除未审批成绩")
}

// ==========================================
// 考务座位分配
// ==========================================

/// 座位分配/撤销授权: 仅 Admin/PermittedStaff
pub fn can_manage_seating(principal: &Principal) -> AuthDecision {
    match staff_capability(principal) {
        Some(capability) => AuthDecision::Granted(capability),
        None => AuthDecision::denied("仅管理员/特批职员可管理考场分配"),
    }
}
