// ==========================================
// 学籍成绩管理系统 - 成绩仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: score.registration_id 唯一, 与 Registration 一对一
// ==========================================

use crate::domain::score::Score;
use crate::domain::types::Grade;
use crate::repository::error::RepositoryResult;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};

/// 成绩仓储
pub struct ScoreRepository;

impl ScoreRepository {
    fn map_score(row: &Row<'_>) -> SqliteResult<Score> {
        Ok(Score {
            score_id: row.get(0)?,
            registration_id: row.get(1)?,
            first_ca: row.get(2)?,
            second_ca: row.get(3)?,
            exam_score: row.get(4)?,
            total_score: row.get(5)?,
            grade: Grade::parse(&row.get::<_, String>(6)?).unwrap_or(Grade::F),
            point: row.get(7)?,
            credit_points: row.get(8)?,
            is_approved_by_examiner: row.get(9)?,
            examiner_id: row.get(10)?,
            approved_at: row.get(11)?,
            is_accepted_by_hod: row.get(12)?,
            hod_id: row.get(13)?,
            accepted_at: row.get(14)?,
            created_at: row.get(15)?,
            updated_at: row.get(16)?,
        })
    }

    const SELECT_COLUMNS: &'static str = r#"
        SELECT score_id, registration_id, first_ca, second_ca, exam_score,
               total_score, grade, point, credit_points,
               is_approved_by_examiner, examiner_id, approved_at,
               is_accepted_by_hod, hod_id, accepted_at,
               created_at, updated_at
        FROM score
    "#;

    /// 按主键查询成绩
    pub fn find_by_id(conn: &Connection, score_id: &str) -> RepositoryResult<Option<Score>> {
        let sql = format!("{} WHERE score_id = ?1", Self::SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let score = stmt
            .query_row(params![score_id], Self::map_score)
            .optional()?;
        Ok(score)
    }

    /// 按选课记录查询成绩 (一对一)
    pub fn find_by_registration(
        conn: &Connection,
        registration_id: &str,
    ) -> RepositoryResult<Option<Score>> {
        let sql = format!("{} WHERE registration_id = ?1", Self::SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let score = stmt
            .query_row(params![registration_id], Self::map_score)
            .optional()?;
        Ok(score)
    }

    /// 插入成绩记录
    pub fn insert(conn: &Connection, score: &Score) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO score (
                score_id, registration_id, first_ca, second_ca, exam_score,
                total_score, grade, point, credit_points,
                is_approved_by_examiner, examiner_id, approved_at,
                is_accepted_by_hod, hod_id, accepted_at,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            "#,
            params![
                score.score_id,
                score.registration_id,
                score.first_ca,
                score.second_ca,
                score.exam_score,
                score.total_score,
                score.grade.to_string(),
                score.point,
                score.credit_points,
                score.is_approved_by_examiner,
                score.examiner_id,
                score.approved_at,
                score.is_accepted_by_hod,
                score.hod_id,
                score.accepted_at,
                score.created_at,
                score.updated_at,
            ],
        )?;
        Ok(())
    }

    /// 整行更新成绩 (分量/派生字段/审批状态一次落库)
    pub fn update(conn: &Connection, score: &Score) -> RepositoryResult<()> {
        conn.execute(
            r#"
            UPDATE score SET
                first_ca = ?2, second_ca = ?3, exam_score = ?4,
                total_score = ?5, grade = ?6, point = ?7, credit_points = ?8,
                is_approved_by_examiner = ?9, examiner_id = ?10, approved_at = ?11,
                is_accepted_by_hod = ?12, hod_id = ?13, accepted_at = ?14,
                updated_at = ?15
            WHERE score_id = ?1
            "#,
            params![
                score.score_id,
                score.first_ca,
                score.second_ca,
                score.exam_score,
                score.total_score,
                score.grade.to_string(),
                score.point,
                score.credit_points,
                score.is_approved_by_examiner,
                score.examiner_id,
                score.approved_at,
                score.is_accepted_by_hod,
                score.hod_id,
                score.accepted_at,
                score.updated_at,
            ],
        )?;
        Ok(())
    }

    /// 删除成绩记录
    pub fn delete(conn: &Connection, score_id: &str) -> RepositoryResult<()> {
        conn.execute("DELETE FROM score WHERE score_id = ?1", params![score_id])?;
        Ok(())
    }
}
