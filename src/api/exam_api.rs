// ==========================================
// 学籍成绩管理系统 - 考务 API
// ==========================================
// 职责: 考场座位分配的外层入口
// 红线: 不在 API 层重做业务判断, 全部委托引擎
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::exam::SeatAssignment;
use crate::domain::principal::Principal;
use crate::engine::{AllocationOutcome, AllocationRequest, SeatAllocator, UnassignOutcome};
use crate::repository::StudentFilters;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// 考务 API
pub struct ExamApi {
    allocator: SeatAllocator,
}

impl ExamApi {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            allocator: SeatAllocator::new(conn),
        }
    }

    /// 批量均匀随机分配座位
    pub fn distribute_seats(
        &self,
        request: &AllocationRequest,
        principal: &Principal,
    ) -> ApiResult<AllocationOutcome> {
        debug!(exam_id = %request.exam_id, overwrite = request.overwrite, "seat distribution request");
        self.allocator.distribute(request, principal).map_err(|err| {
            warn!(exam_id = %request.exam_id, error = %err, "seat distribution rejected");
            ApiError::from(err)
        })
    }

    /// 定向分配一名考生
    pub fn assign_seat(
        &self,
        exam_id: &str,
        session_id: &str,
        student_id: &str,
        seat_label: Option<String>,
        overwrite: bool,
        principal: &Principal,
    ) -> ApiResult<SeatAssignment> {
        self.allocator
            .assign_student(exam_id, session_id, student_id, seat_label, overwrite, principal)
            .map_err(ApiError::from)
    }

    /// 批量撤销座位分配 (逐行部分成功)
    pub fn unassign_seats(
        &self,
        exam_id: &str,
        filters: &StudentFilters,
        principal: &Principal,
    ) -> ApiResult<UnassignOutcome> {
        self.allocator
            .unassign_many(exam_id, filters, principal)
            .map_err(ApiError::from)
    }

    /// 撤销一名考生的座位分配
    pub fn unassign_seat(
        &self,
        exam_id: &str,
        student_id: &str,
        principal: &Principal,
    ) -> ApiResult<()> {
        self.allocator
            .unassign_student(exam_id, student_id, principal)
            .map_err(ApiError::from)
    }
}
