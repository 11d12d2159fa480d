// ==========================================
// 学籍成绩管理系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为, 避免部分连接外键未开启
// - 统一 busy_timeout, 减少并发写入时的偶发 busy 错误
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 60_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明:
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 打开内存库并应用统一配置 (测试用)
pub fn open_in_memory() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表
///
/// 唯一键是并发兜底的最后防线:
/// - registration (student_id, course_id, semester_id, season_id)
/// - score (registration_id)
/// - seat_assignment (student_id, exam_id)
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS program (
            program_id      TEXT PRIMARY KEY,
            name            TEXT NOT NULL,
            department_id   TEXT NOT NULL,
            created_at      TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS level (
            level_id        TEXT PRIMARY KEY,
            name            TEXT NOT NULL,
            rank            INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS season (
            season_id       TEXT PRIMARY KEY,
            name            TEXT NOT NULL,
            ordering_year   INTEGER NOT NULL,
            is_active       INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS semester (
            semester_id     TEXT PRIMARY KEY,
            season_id       TEXT NOT NULL REFERENCES season(season_id),
            semester_number INTEGER NOT NULL,
            semester_type   TEXT NOT NULL,
            edits_locked    INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS course (
            course_id               TEXT PRIMARY KEY,
            code                    TEXT NOT NULL UNIQUE,
            title                   TEXT NOT NULL,
            credit_unit             INTEGER NOT NULL,
            course_type             TEXT NOT NULL,
            preferred_semester_type TEXT NOT NULL,
            created_at              TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS program_course_link (
            program_id      TEXT NOT NULL REFERENCES program(program_id),
            course_id       TEXT NOT NULL REFERENCES course(course_id),
            level_id        TEXT NOT NULL REFERENCES level(level_id),
            PRIMARY KEY (program_id, course_id, level_id)
        );

        CREATE TABLE IF NOT EXISTS course_prerequisite (
            course_id               TEXT NOT NULL REFERENCES course(course_id),
            prerequisite_course_id  TEXT NOT NULL REFERENCES course(course_id),
            PRIMARY KEY (course_id, prerequisite_course_id)
        );

        CREATE TABLE IF NOT EXISTS credit_unit_requirement (
            program_id           TEXT NOT NULL REFERENCES program(program_id),
            level_id             TEXT NOT NULL REFERENCES level(level_id),
            semester_type        TEXT NOT NULL,
            minimum_credit_units INTEGER NOT NULL,
            maximum_credit_units INTEGER NOT NULL,
            PRIMARY KEY (program_id, level_id, semester_type)
        );

        CREATE TABLE IF NOT EXISTS course_timetable (
            timetable_id    TEXT PRIMARY KEY,
            lecturer_id     TEXT NOT NULL,
            course_id       TEXT NOT NULL REFERENCES course(course_id),
            semester_id     TEXT NOT NULL REFERENCES semester(semester_id),
            season_id       TEXT NOT NULL REFERENCES season(season_id)
        );

        CREATE TABLE IF NOT EXISTS student (
            student_id       TEXT PRIMARY KEY,
            matric_no        TEXT NOT NULL UNIQUE,
            program_id       TEXT NOT NULL REFERENCES program(program_id),
            department_id    TEXT NOT NULL,
            current_level_id TEXT NOT NULL REFERENCES level(level_id),
            is_active        INTEGER NOT NULL DEFAULT 1,
            created_at       TEXT NOT NULL,
            updated_at       TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS registration (
            registration_id TEXT PRIMARY KEY,
            student_id      TEXT NOT NULL REFERENCES student(student_id),
            course_id       TEXT NOT NULL REFERENCES course(course_id),
            semester_id     TEXT NOT NULL REFERENCES semester(semester_id),
            season_id       TEXT NOT NULL REFERENCES season(season_id),
            level_id        TEXT NOT NULL REFERENCES level(level_id),
            has_score       INTEGER NOT NULL DEFAULT 0,
            registered_at   TEXT NOT NULL,
            UNIQUE (student_id, course_id, semester_id, season_id)
        );

        CREATE TABLE IF NOT EXISTS score (
            score_id                TEXT PRIMARY KEY,
            registration_id         TEXT NOT NULL UNIQUE REFERENCES registration(registration_id),
            first_ca                REAL NOT NULL,
            second_ca               REAL NOT NULL,
            exam_score              REAL NOT NULL,
            total_score             REAL NOT NULL,
            grade                   TEXT NOT NULL,
            point                   REAL NOT NULL,
            credit_points           REAL NOT NULL,
            is_approved_by_examiner INTEGER NOT NULL DEFAULT 0,
            examiner_id             TEXT,
            approved_at             TEXT,
            is_accepted_by_hod      INTEGER NOT NULL DEFAULT 0,
            hod_id                  TEXT,
            accepted_at             TEXT,
            created_at              TEXT NOT NULL,
            updated_at              TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS exam (
            exam_id     TEXT PRIMARY KEY,
            course_id   TEXT NOT NULL REFERENCES course(course_id),
            semester_id TEXT NOT NULL REFERENCES semester(semester_id),
            season_id   TEXT NOT NULL REFERENCES season(season_id),
            exam_date   TEXT,
            is_active   INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS exam_session (
            session_id    TEXT PRIMARY KEY,
            exam_id       TEXT NOT NULL REFERENCES exam(exam_id),
            name          TEXT NOT NULL,
            venue_id      TEXT,
            max_attendees INTEGER,
            is_active     INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS seat_assignment (
            assignment_id TEXT PRIMARY KEY,
            student_id    TEXT NOT NULL REFERENCES student(student_id),
            exam_id       TEXT NOT NULL REFERENCES exam(exam_id),
            session_id    TEXT NOT NULL REFERENCES exam_session(session_id),
            seat_label    TEXT,
            assigned_at   TEXT NOT NULL,
            UNIQUE (student_id, exam_id)
        );

        CREATE TABLE IF NOT EXISTS exam_attempt (
            attempt_id TEXT PRIMARY KEY,
            student_id TEXT NOT NULL REFERENCES student(student_id),
            session_id TEXT NOT NULL REFERENCES exam_session(session_id),
            started_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS action_log (
            action_id   TEXT PRIMARY KEY,
            action_type TEXT NOT NULL,
            actor       TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            entity_id   TEXT NOT NULL,
            payload_json TEXT,
            detail      TEXT,
            action_ts   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_registration_student_period
            ON registration (student_id, semester_id, season_id);
        CREATE INDEX IF NOT EXISTS idx_seat_assignment_session
            ON seat_assignment (session_id);
        CREATE INDEX IF NOT EXISTS idx_action_log_entity
            ON action_log (entity_type, entity_id);
        "#,
    )?;
    Ok(())
}
