// ==========================================
// 学籍成绩管理系统 - 操作日志仓储
// ==========================================
// 红线: 所有提交成功的写入必须记录
// 用途: 审计追踪 (与业务写入同事务落库)
// ==========================================

use crate::repository::error::RepositoryResult;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result as SqliteResult};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

// ==========================================
// ActionLog - 操作日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,
    /// 操作类型 (RECONCILE_REGISTRATIONS / SUBMIT_SCORE / ALLOCATE_SEATS ...)
    pub action_type: String,
    /// 操作人 (Principal id)
    pub actor: String,
    pub entity_type: String,
    pub entity_id: String,
    pub payload_json: Option<JsonValue>,
    pub detail: Option<String>,
    pub action_ts: DateTime<Utc>,
}

/// 操作日志仓储
pub struct ActionLogRepository;

impl ActionLogRepository {
    /// 插入操作日志 (在调用方事务内执行)
    pub fn insert(conn: &Connection, log: &ActionLog) -> RepositoryResult<String> {
        conn.execute(
            r#"
            INSERT INTO action_log (
                action_id, action_type, actor, entity_type, entity_id,
                payload_json, detail, action_ts
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                log.action_id,
                log.action_type,
                log.actor,
                log.entity_type,
                log.entity_id,
                log.payload_json.as_ref().map(|v| v.to_string()),
                log.detail,
                log.action_ts,
            ],
        )?;
        Ok(log.action_id.clone())
    }

    /// 便捷记录入口
    pub fn record(
        conn: &Connection,
        action_type: &str,
        actor: &str,
        entity_type: &str,
        entity_id: &str,
        payload_json: Option<JsonValue>,
    ) -> RepositoryResult<String> {
        let log = ActionLog {
            action_id: Uuid::new_v4().to_string(),
            action_type: action_type.to_string(),
            actor: actor.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            payload_json,
            detail: None,
            action_ts: Utc::now(),
        };
        Self::insert(conn, &log)
    }

    /// 某实体的日志条数 (测试与审计查询用)
    pub fn count_for_entity(
        conn: &Connection,
        entity_type: &str,
        entity_id: &str,
    ) -> RepositoryResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM action_log WHERE entity_type = ?1 AND entity_id = ?2",
            params![entity_type, entity_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 最近的操作类型列表 (倒序)
    pub fn recent_action_types(conn: &Connection, limit: i64) -> RepositoryResult<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT action_type FROM action_log ORDER BY action_ts DESC, action_id LIMIT ?1",
        )?;
        let types = stmt
            .query_map(params![limit], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<Vec<String>>>()?;
        Ok(types)
    }
}
