// ==========================================
// 测试辅助: 建库与造数
// ==========================================
// 所有集成测试共用: 临时库文件 + 统一建表 + 最小造数函数
// ==========================================

#![allow(dead_code)]

use academic_records::db;
use academic_records::domain::catalog::AcademicPeriod;
use academic_records::domain::principal::Principal;
use academic_records::domain::types::LecturerRole;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// 建一个带完整 schema 的临时库
/// NamedTempFile 须由调用方持有, 否则库文件被提前删除
pub fn setup_db() -> (Arc<Mutex<Connection>>, NamedTempFile) {
    let file = NamedTempFile::new().expect("create temp db file");
    let conn = db::open_sqlite_connection(file.path().to_str().unwrap()).expect("open db");
    db::init_schema(&conn).expect("init schema");
    (Arc::new(Mutex::new(conn)), file)
}

// ==========================================
// 主体构造
// ==========================================

pub fn admin() -> Principal {
    Principal::Admin {
        id: "ADM1".to_string(),
    }
}

pub fn staff() -> Principal {
    Principal::PermittedStaff {
        id: "STF1".to_string(),
    }
}

pub fn student_principal(id: &str) -> Principal {
    Principal::Student { id: id.to_string() }
}

pub fn lecturer(id: &str, role: LecturerRole, department_id: &str) -> Principal {
    Principal::Lecturer {
        id: id.to_string(),
        role,
        department_id: department_id.to_string(),
    }
}

pub fn period(season_id: &str, semester_id: &str, level_id: &str) -> AcademicPeriod {
    AcademicPeriod {
        season_id: season_id.to_string(),
        semester_id: semester_id.to_string(),
        level_id: level_id.to_string(),
    }
}

// ==========================================
// 目录造数
// ==========================================

pub fn seed_program(conn: &Connection, program_id: &str, department_id: &str) {
    conn.execute(
        "INSERT INTO program (program_id, name, department_id, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![program_id, format!("Program {program_id}"), department_id, Utc::now()],
    )
    .expect("seed program");
}

pub fn seed_level(conn: &Connection, level_id: &str, rank: i64) {
    conn.execute(
        "INSERT INTO level (level_id, name, rank) VALUES (?1, ?2, ?3)",
        params![level_id, format!("Level {rank}00"), rank],
    )
    .expect("seed level");
}

pub fn seed_season(conn: &Connection, season_id: &str, ordering_year: i64, is_active: bool) {
    conn.execute(
        "INSERT INTO season (season_id, name, ordering_year, is_active) VALUES (?1, ?2, ?3, ?4)",
        params![
            season_id,
            format!("{}/{}", ordering_year, ordering_year + 1),
            ordering_year,
            is_active
        ],
    )
    .expect("seed season");
}

pub fn seed_semester(
    conn: &Connection,
    semester_id: &str,
    season_id: &str,
    semester_number: i64,
    semester_type: &str,
    edits_locked: bool,
) {
    conn.execute(
        r#"
        INSERT INTO semester (semester_id, season_id, semester_number, semester_type, edits_locked)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![semester_id, season_id, semester_number, semester_type, edits_locked],
    )
    .expect("seed semester");
}

pub fn seed_course(conn: &Connection, course_id: &str, credit_unit: i64) {
    conn.execute(
        r#"
        INSERT INTO course (course_id, code, title, credit_unit, course_type,
                            preferred_semester_type, created_at)
        VALUES (?1, ?2, ?3, ?4, 'COMPULSORY', 'FIRST', ?5)
        "#,
        params![
            course_id,
            format!("C-{course_id}"),
            format!("Course {course_id}"),
            credit_unit,
            Utc::now()
        ],
    )
    .expect("seed course");
}

pub fn link_course(conn: &Connection, program_id: &str, course_id: &str, level_id: &str) {
    conn.execute(
        "INSERT INTO program_course_link (program_id, course_id, level_id) VALUES (?1, ?2, ?3)",
        params![program_id, course_id, level_id],
    )
    .expect("seed program_course_link");
}

pub fn seed_prerequisite(conn: &Connection, course_id: &str, prerequisite_course_id: &str) {
    conn.execute(
        "INSERT INTO course_prerequisite (course_id, prerequisite_course_id) VALUES (?1, ?2)",
        params![course_id, prerequisite_course_id],
    )
    .expect("seed course_prerequisite");
}

pub fn seed_credit_requirement(
    conn: &Connection,
    program_id: &str,
    level_id: &str,
    semester_type: &str,
    minimum: i64,
    maximum: i64,
) {
    conn.execute(
        r#"
        INSERT INTO credit_unit_requirement
            (program_id, level_id, semester_type, minimum_credit_units, maximum_credit_units)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![program_id, level_id, semester_type, minimum, maximum],
    )
    .expect("seed credit_unit_requirement");
}

pub fn seed_timetable(
    conn: &Connection,
    lecturer_id: &str,
    course_id: &str,
    semester_id: &str,
    season_id: &str,
) {
    conn.execute(
        r#"
        INSERT INTO course_timetable (timetable_id, lecturer_id, course_id, semester_id, season_id)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            Uuid::new_v4().to_string(),
            lecturer_id,
            course_id,
            semester_id,
            season_id
        ],
    )
    .expect("seed course_timetable");
}

// ==========================================
// 学籍造数
// ==========================================

pub fn seed_student(
    conn: &Connection,
    student_id: &str,
    program_id: &str,
    department_id: &str,
    level_id: &str,
) {
    conn.execute(
        r#"
        INSERT INTO student (student_id, matric_no, program_id, department_id,
                             current_level_id, is_active, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)
        "#,
        params![
            student_id,
            format!("MAT/{student_id}"),
            program_id,
            department_id,
            level_id,
            Utc::now()
        ],
    )
    .expect("seed student");
}

pub fn seed_registration(
    conn: &Connection,
    registration_id: &str,
    student_id: &str,
    course_id: &str,
    semester_id: &str,
    season_id: &str,
    level_id: &str,
    has_score: bool,
) {
    conn.execute(
        r#"
        INSERT INTO registration (registration_id, student_id, course_id, semester_id,
                                  season_id, level_id, has_score, registered_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
        params![
            registration_id,
            student_id,
            course_id,
            semester_id,
            season_id,
            level_id,
            has_score,
            Utc::now()
        ],
    )
    .expect("seed registration");
}

/// 直插一条带等级的成绩记录 (先修课通过记录等造数场景)
pub fn seed_score_with_grade(conn: &Connection, registration_id: &str, grade: &str, total: f64) {
    conn.execute(
        r#"
        INSERT INTO score (score_id, registration_id, first_ca, second_ca, exam_score,
                           total_score, grade, point, credit_points,
                           is_approved_by_examiner, is_accepted_by_hod, created_at, updated_at)
        VALUES (?1, ?2, 0, 0, ?3, ?3, ?4, 0, 0, 0, 0, ?5, ?5)
        "#,
        params![
            Uuid::new_v4().to_string(),
            registration_id,
            total,
            grade,
            Utc::now()
        ],
    )
    .expect("seed score");
}

// ==========================================
// 考务造数
// ==========================================

pub fn seed_exam(
    conn: &Connection,
    exam_id: &str,
    course_id: &str,
    semester_id: &str,
    season_id: &str,
) {
    conn.execute(
        r#"
        INSERT INTO exam (exam_id, course_id, semester_id, season_id, exam_date, is_active)
        VALUES (?1, ?2, ?3, ?4, NULL, 1)
        "#,
        params![exam_id, course_id, semester_id, season_id],
    )
    .expect("seed exam");
}

pub fn seed_session(
    conn: &Connection,
    session_id: &str,
    exam_id: &str,
    max_attendees: Option<i64>,
    is_active: bool,
) {
    conn.execute(
        r#"
        INSERT INTO exam_session (session_id, exam_id, name, venue_id, max_attendees, is_active)
        VALUES (?1, ?2, ?3, NULL, ?4, ?5)
        "#,
        params![
            session_id,
            exam_id,
            format!("Session {session_id}"),
            max_attendees,
            is_active
        ],
    )
    .expect("seed exam_session");
}

pub fn seed_attempt(conn: &Connection, student_id: &str, session_id: &str) {
    conn.execute(
        r#"
        INSERT INTO exam_attempt (attempt_id, student_id, session_id, started_at)
        VALUES (?1, ?2, ?3, ?4)
        "#,
        params![Uuid::new_v4().to_string(), student_id, session_id, Utc::now()],
    )
    .expect("seed exam_attempt");
}
