// ==========================================
// API 层集成测试
// ==========================================
// 场景: 引擎到传输状态码的端到端翻译
// ==========================================

mod helpers;

use academic_records::api::{ExamApi, RegistrationApi, ScoreApi};
use academic_records::domain::score::ScoreComponents;
use academic_records::engine::{AllocationRequest, ReconcileRequest};
use academic_records::repository::StudentFilters;
use helpers::*;
use rusqlite::Connection;

fn seed_base(conn: &Connection) {
    seed_program(conn, "P1", "D1");
    seed_level(conn, "LV1", 1);
    seed_season(conn, "SEA1", 2024, true);
    seed_semester(conn, "SEM1", "SEA1", 1, "FIRST", false);
    seed_course(conn, "C1", 3);
    link_course(conn, "P1", "C1", "LV1");
    seed_student(conn, "S1", "P1", "D1", "LV1");
}

#[test]
fn test_full_flow_through_api() {
    let (conn, _db) = setup_db();
    {
        let c = conn.lock().unwrap();
        seed_base(&c);
        seed_exam(&c, "E1", "C1", "SEM1", "SEA1");
        seed_session(&c, "SES1", "E1", Some(10), true);
    }

    let registration_api = RegistrationApi::new(conn.clone());
    let score_api = ScoreApi::new(conn.clone());
    let exam_api = ExamApi::new(conn.clone());

    // 选课
    let outcome = registration_api
        .reconcile(
            &ReconcileRequest {
                student_id: "S1".to_string(),
                period: period("SEA1", "SEM1", "LV1"),
                desired_course_ids: vec!["C1".to_string()],
            },
            &student_principal("S1"),
        )
        .unwrap();
    assert_eq!(outcome.added, vec!["C1".to_string()]);

    // 排考
    let allocation = exam_api
        .distribute_seats(
            &AllocationRequest {
                exam_id: "E1".to_string(),
                filters: StudentFilters::default(),
                overwrite: false,
            },
            &staff(),
        )
        .unwrap();
    assert_eq!(allocation.succeeded.len(), 1);

    // 录成绩
    let registration_id = {
        let c = conn.lock().unwrap();
        c.query_row(
            "SELECT registration_id FROM registration WHERE student_id = 'S1'",
            [],
            |row| row.get::<_, String>(0),
        )
        .unwrap()
    };
    let score = score_api
        .submit(
            &registration_id,
            &ScoreComponents {
                first_ca: 25.0,
                second_ca: 20.0,
                exam_score: 30.0,
            },
            &staff(),
        )
        .unwrap();
    assert_eq!(score.total_score, 75.0);
}

#[test]
fn test_error_status_codes() {
    let (conn, _db) = setup_db();
    {
        let c = conn.lock().unwrap();
        seed_base(&c);
    }

    let registration_api = RegistrationApi::new(conn.clone());
    let score_api = ScoreApi::new(conn.clone());

    // 404: 学生不存在
    let err = registration_api
        .reconcile(
            &ReconcileRequest {
                student_id: "NOPE".to_string(),
                period: period("SEA1", "SEM1", "LV1"),
                desired_course_ids: vec![],
            },
            &staff(),
        )
        .unwrap_err();
    assert_eq!(err.status_code(), 404);

    // 403: 他人代选
    let err = registration_api
        .reconcile(
            &ReconcileRequest {
                student_id: "S1".to_string(),
                period: period("SEA1", "SEM1", "LV1"),
                desired_course_ids: vec!["C1".to_string()],
            },
            &student_principal("S2"),
        )
        .unwrap_err();
    assert_eq!(err.status_code(), 403);

    // 422: 分量越界
    {
        let c = conn.lock().unwrap();
        seed_registration(&c, "R1", "S1", "C1", "SEM1", "SEA1", "LV1", false);
    }
    let err = score_api
        .submit(
            "R1",
            &ScoreComponents {
                first_ca: 99.0,
                second_ca: 0.0,
                exam_score: 0.0,
            },
            &staff(),
        )
        .unwrap_err();
    assert_eq!(err.status_code(), 422);
    let body = err.to_body();
    assert_eq!(body.status, 422);
    assert!(!body.message.is_empty());
}

#[test]
fn test_eligibility_precheck_is_read_only() {
    let (conn, _db) = setup_db();
    {
        let c = conn.lock().unwrap();
        seed_base(&c);
    }

    let registration_api = RegistrationApi::new(conn.clone());
    let course = registration_api
        .check_eligibility("S1", "C1", &period("SEA1", "SEM1", "LV1"), &[])
        .unwrap();
    assert_eq!(course.course_id, "C1");

    // 预检不落库
    let c = conn.lock().unwrap();
    let count: i64 = c
        .query_row("SELECT COUNT(*) FROM registration", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}
