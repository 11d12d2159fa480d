// ==========================================
// 成绩生命周期引擎集成测试
// ==========================================
// 场景: 录入推导 / 两级审批状态机 / 编辑清空审批 / 删除授权
// ==========================================

mod helpers;

use academic_records::domain::score::ScoreComponents;
use academic_records::domain::types::{Grade, LecturerRole};
use academic_records::engine::error::{DomainError, ErrorKind};
use academic_records::engine::ScoreLifecycleManager;
use helpers::*;
use rusqlite::Connection;

// ==========================================
// 测试夹具
// ==========================================

/// 基础: 学生 S1 (院系 D1) 在 SEA1/SEM1 选了 C1 (3 学分), 选课记录 R1
fn seed_base(conn: &Connection) {
    seed_program(conn, "P1", "D1");
    seed_level(conn, "LV1", 1);
    seed_season(conn, "SEA1", 2024, true);
    seed_semester(conn, "SEM1", "SEA1", 1, "FIRST", false);
    seed_course(conn, "C1", 3);
    link_course(conn, "P1", "C1", "LV1");
    seed_student(conn, "S1", "P1", "D1", "LV1");
    seed_registration(conn, "R1", "S1", "C1", "SEM1", "SEA1", "LV1", false);
}

fn components(first_ca: f64, second_ca: f64, exam_score: f64) -> ScoreComponents {
    ScoreComponents {
        first_ca,
        second_ca,
        exam_score,
    }
}

fn has_score_flag(conn: &Connection, registration_id: &str) -> bool {
    conn.query_row(
        "SELECT has_score FROM registration WHERE registration_id = ?1",
        [registration_id],
        |row| row.get(0),
    )
    .unwrap()
}

// ==========================================
// 录入与推导
// ==========================================

#[test]
fn test_submit_derives_fields_and_sets_flag() {
    let (conn, _db) = setup_db();
    {
        let c = conn.lock().unwrap();
        seed_base(&c);
    }

    let manager = ScoreLifecycleManager::new(conn.clone());
    let score = manager
        .submit_or_update("R1", &components(28.0, 25.0, 40.0), &staff())
        .unwrap();

    assert_eq!(score.total_score, 93.0);
    assert_eq!(score.grade, Grade::A);
    assert_eq!(score.point, 5.0);
    assert_eq!(score.credit_points, 15.0);
    assert!(!score.is_approved_by_examiner);
    assert!(!score.is_accepted_by_hod);

    let c = conn.lock().unwrap();
    assert!(has_score_flag(&c, "R1"));
}

#[test]
fn test_component_out_of_range_rejected() {
    let (conn, _db) = setup_db();
    {
        let c = conn.lock().unwrap();
        seed_base(&c);
    }

    let manager = ScoreLifecycleManager::new(conn.clone());
    let err = manager
        .submit_or_update("R1", &components(30.5, 0.0, 0.0), &staff())
        .unwrap_err();
    assert!(matches!(err, DomainError::ComponentOutOfRange { .. }));
    assert_eq!(err.kind(), ErrorKind::InvariantViolation);

    let err = manager
        .submit_or_update("R1", &components(0.0, 0.0, 70.5), &staff())
        .unwrap_err();
    assert!(matches!(err, DomainError::ComponentOutOfRange { .. }));

    // 拒绝后不留任何成绩
    let c = conn.lock().unwrap();
    assert!(!has_score_flag(&c, "R1"));
}

#[test]
fn test_resubmit_recomputes_in_place() {
    let (conn, _db) = setup_db();
    {
        let c = conn.lock().unwrap();
        seed_base(&c);
    }

    let manager = ScoreLifecycleManager::new(conn.clone());
    let first = manager
        .submit_or_update("R1", &components(10.0, 10.0, 20.0), &staff())
        .unwrap();
    let second = manager
        .submit_or_update("R1", &components(20.0, 20.0, 30.0), &staff())
        .unwrap();

    // 同一条成绩记录被整行重算
    assert_eq!(first.score_id, second.score_id);
    assert_eq!(second.total_score, 70.0);
    assert_eq!(second.grade, Grade::A);
}

// ==========================================
// 录入授权
// ==========================================

#[test]
fn test_untimetabled_lecturer_cannot_submit() {
    let (conn, _db) = setup_db();
    {
        let c = conn.lock().unwrap();
        seed_base(&c);
    }

    let manager = ScoreLifecycleManager::new(conn.clone());
    let plain = lecturer("L1", LecturerRole::Lecturer, "D9");
    let err = manager
        .submit_or_update("R1", &components(10.0, 10.0, 20.0), &plain)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

#[test]
fn test_timetabled_lecturer_can_submit() {
    let (conn, _db) = setup_db();
    {
        let c = conn.lock().unwrap();
        seed_base(&c);
        seed_timetable(&c, "L1", "C1", "SEM1", "SEA1");
    }

    let manager = ScoreLifecycleManager::new(conn.clone());
    let plain = lecturer("L1", LecturerRole::Lecturer, "D9");
    let score = manager
        .submit_or_update("R1", &components(10.0, 10.0, 20.0), &plain)
        .unwrap();
    assert_eq!(score.total_score, 40.0);
}

// ==========================================
// 两级审批状态机
// ==========================================

#[test]
fn test_approve_then_accept_happy_path() {
    let (conn, _db) = setup_db();
    {
        let c = conn.lock().unwrap();
        seed_base(&c);
    }

    let manager = ScoreLifecycleManager::new(conn.clone());
    let score = manager
        .submit_or_update("R1", &components(20.0, 20.0, 40.0), &staff())
        .unwrap();

    let examiner = lecturer("EX1", LecturerRole::Examiner, "D1");
    let hod = lecturer("H1", LecturerRole::HeadOfDepartment, "D1");

    let approved = manager.approve_by_examiner(&score.score_id, &examiner).unwrap();
    assert!(approved.is_approved_by_examiner);
    assert_eq!(approved.examiner_id.as_deref(), Some("EX1"));
    assert!(approved.approved_at.is_some());

    let accepted = manager.accept_by_hod(&score.score_id, &hod).unwrap();
    assert!(accepted.is_accepted_by_hod);
    assert_eq!(accepted.hod_id.as_deref(), Some("H1"));
    assert!(accepted.is_approved_by_examiner);
}

#[test]
fn test_accept_before_approve_violates_order() {
    let (conn, _db) = setup_db();
    {
        let c = conn.lock().unwrap();
        seed_base(&c);
    }

    let manager = ScoreLifecycleManager::new(conn.clone());
    let score = manager
        .submit_or_update("R1", &components(20.0, 20.0, 40.0), &staff())
        .unwrap();

    let hod = lecturer("H1", LecturerRole::HeadOfDepartment, "D1");
    let err = manager.accept_by_hod(&score.score_id, &hod).unwrap_err();
    assert!(matches!(err, DomainError::ApprovalOrderViolation { .. }));
}

#[test]
fn test_double_approve_rejected() {
    let (conn, _db) = setup_db();
    {
        let c = conn.lock().unwrap();
        seed_base(&c);
    }

    let manager = ScoreLifecycleManager::new(conn.clone());
    let score = manager
        .submit_or_update("R1", &components(20.0, 20.0, 40.0), &staff())
        .unwrap();

    let examiner = lecturer("EX1", LecturerRole::Examiner, "D1");
    manager.approve_by_examiner(&score.score_id, &examiner).unwrap();
    let err = manager
        .approve_by_examiner(&score.score_id, &examiner)
        .unwrap_err();
    assert!(matches!(err, DomainError::AlreadyApproved { .. }));
}

#[test]
fn test_wrong_department_examiner_cannot_approve() {
    let (conn, _db) = setup_db();
    {
        let c = conn.lock().unwrap();
        seed_base(&c);
    }

    let manager = ScoreLifecycleManager::new(conn.clone());
    let score = manager
        .submit_or_update("R1", &components(20.0, 20.0, 40.0), &staff())
        .unwrap();

    let outsider = lecturer("EX9", LecturerRole::Examiner, "D9");
    let err = manager
        .approve_by_examiner(&score.score_id, &outsider)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

#[test]
fn test_edit_resets_both_approvals() {
    let (conn, _db) = setup_db();
    {
        let c = conn.lock().unwrap();
        seed_base(&c);
    }

    let manager = ScoreLifecycleManager::new(conn.clone());
    let score = manager
        .submit_or_update("R1", &components(20.0, 20.0, 40.0), &staff())
        .unwrap();
    let examiner = lecturer("EX1", LecturerRole::Examiner, "D1");
    let hod = lecturer("H1", LecturerRole::HeadOfDepartment, "D1");
    manager.approve_by_examiner(&score.score_id, &examiner).unwrap();
    manager.accept_by_hod(&score.score_id, &hod).unwrap();

    let edited = manager
        .submit_or_update("R1", &components(20.0, 20.0, 41.0), &staff())
        .unwrap();
    assert!(!edited.is_approved_by_examiner);
    assert!(edited.examiner_id.is_none());
    assert!(edited.approved_at.is_none());
    assert!(!edited.is_accepted_by_hod);
    assert!(edited.hod_id.is_none());
    assert!(edited.accepted_at.is_none());
}

#[test]
fn test_deapprove_blocked_while_accepted() {
    let (conn, _db) = setup_db();
    {
        let c = conn.lock().unwrap();
        seed_base(&c);
    }

    let manager = ScoreLifecycleManager::new(conn.clone());
    let score = manager
        .submit_or_update("R1", &components(20.0, 20.0, 40.0), &staff())
        .unwrap();
    let examiner = lecturer("EX1", LecturerRole::Examiner, "D1");
    let hod = lecturer("H1", LecturerRole::HeadOfDepartment, "D1");
    manager.approve_by_examiner(&score.score_id, &examiner).unwrap();
    manager.accept_by_hod(&score.score_id, &hod).unwrap();

    let err = manager.deapprove(&score.score_id, &examiner).unwrap_err();
    assert!(matches!(err, DomainError::DeapproveWhileAccepted { .. }));

    // 先撤销接受, 再撤销批准
    let deaccepted = manager.deaccept(&score.score_id, &hod).unwrap();
    assert!(!deaccepted.is_accepted_by_hod);
    assert!(deaccepted.is_approved_by_examiner);

    let deapproved = manager.deapprove(&score.score_id, &examiner).unwrap();
    assert!(!deapproved.is_approved_by_examiner);
}

#[test]
fn test_deapprove_without_approval_rejected() {
    let (conn, _db) = setup_db();
    {
        let c = conn.lock().unwrap();
        seed_base(&c);
    }

    let manager = ScoreLifecycleManager::new(conn.clone());
    let score = manager
        .submit_or_update("R1", &components(20.0, 20.0, 40.0), &staff())
        .unwrap();

    let examiner = lecturer("EX1", LecturerRole::Examiner, "D1");
    let err = manager.deapprove(&score.score_id, &examiner).unwrap_err();
    assert!(matches!(err, DomainError::NotApproved { .. }));

    let hod = lecturer("H1", LecturerRole::HeadOfDepartment, "D1");
    let err = manager.deaccept(&score.score_id, &hod).unwrap_err();
    assert!(matches!(err, DomainError::NotAccepted { .. }));
}

// ==========================================
// 删除
// ==========================================

#[test]
fn test_delete_resets_registration_flag() {
    let (conn, _db) = setup_db();
    {
        let c = conn.lock().unwrap();
        seed_base(&c);
    }

    let manager = ScoreLifecycleManager::new(conn.clone());
    let score = manager
        .submit_or_update("R1", &components(20.0, 20.0, 40.0), &staff())
        .unwrap();

    manager.delete(&score.score_id, &staff()).unwrap();

    let c = conn.lock().unwrap();
    assert!(!has_score_flag(&c, "R1"));
    let count: i64 = c
        .query_row("SELECT COUNT(*) FROM score", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn test_delete_accepted_score_requires_admin() {
    let (conn, _db) = setup_db();
    {
        let c = conn.lock().unwrap();
        seed_base(&c);
    }

    let manager = ScoreLifecycleManager::new(conn.clone());
    let score = manager
        .submit_or_update("R1", &components(20.0, 20.0, 40.0), &staff())
        .unwrap();
    let examiner = lecturer("EX1", LecturerRole::Examiner, "D1");
    let hod = lecturer("H1", LecturerRole::HeadOfDepartment, "D1");
    manager.approve_by_examiner(&score.score_id, &examiner).unwrap();
    manager.accept_by_hod(&score.score_id, &hod).unwrap();

    let err = manager.delete(&score.score_id, &staff()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    let err = manager.delete(&score.score_id, &hod).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    manager.delete(&score.score_id, &admin()).unwrap();
}

#[test]
fn test_missing_score_reports_not_found() {
    let (conn, _db) = setup_db();
    {
        let c = conn.lock().unwrap();
        seed_base(&c);
    }

    let manager = ScoreLifecycleManager::new(conn.clone());
    let err = manager
        .approve_by_examiner("no-such-score", &admin())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
