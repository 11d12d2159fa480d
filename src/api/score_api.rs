// ==========================================
// 学籍成绩管理系统 - 成绩 API
// ==========================================
// 职责: 成绩录入与两级审批的外层入口
// 红线: 不在 API 层重做业务判断, 全部委托引擎
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::principal::Principal;
use crate::domain::score::{Score, ScoreComponents};
use crate::engine::ScoreLifecycleManager;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// 成绩 API
pub struct ScoreApi {
    lifecycle: ScoreLifecycleManager,
}

impl ScoreApi {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            lifecycle: ScoreLifecycleManager::new(conn),
        }
    }

    /// 录入或修改成绩分量 (编辑会清空两级审批)
    pub fn submit(
        &self,
        registration_id: &str,
        components: &ScoreComponents,
        principal: &Principal,
    ) -> ApiResult<Score> {
        debug!(registration_id = %registration_id, "score submit request");
        self.lifecycle
            .submit_or_update(registration_id, components, principal)
            .map_err(|err| {
                warn!(registration_id = %registration_id, error = %err, "score submit rejected");
                ApiError::from(err)
            })
    }

    /// 阅卷审批人批准
    pub fn approve(&self, score_id: &str, principal: &Principal) -> ApiResult<Score> {
        self.lifecycle
            .approve_by_examiner(score_id, principal)
            .map_err(ApiError::from)
    }

    /// 系主任接受
    pub fn accept(&self, score_id: &str, principal: &Principal) -> ApiResult<Score> {
        self.lifecycle
            .accept_by_hod(score_id, principal)
            .map_err(ApiError::from)
    }

    /// 撤销批准
    pub fn deapprove(&self, score_id: &str, principal: &Principal) -> ApiResult<Score> {
        self.lifecycle
            .deapprove(score_id, principal)
            .map_err(ApiError::from)
    }

    /// 撤销接受
    pub fn deaccept(&self, score_id: &str, principal: &Principal) -> ApiResult<Score> {
        self.lifecycle
            .deaccept(score_id, principal)
            .map_err(ApiError::from)
    }

    /// 删除成绩
    pub fn delete(&self, score_id: &str, principal: &Principal) -> ApiResult<()> {
        self.lifecycle.delete(score_id, principal).map_err(|err| {
            warn!(score_id = %score_id, error = %err, "score delete rejected");
            ApiError::from(err)
        })
    }
}
