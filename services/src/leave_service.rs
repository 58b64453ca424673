use crate::context::ServiceContext;
use crate::error::{AttendanceError, AttendanceResult};
use crate::marking_service::resolve_student;
use crate::reconciler::{LeaveReconciler, ReconcileReport};
use chrono::NaiveDate;
use db::models::{
    Session,
    leave_request::{self, LeaveFilter, LeaveStatus, LeaveType, NewLeaveRequest},
};
use serde::Serialize;
use tracing::info;
use util::clock::Clock;

#[derive(Debug, Clone)]
pub struct NewLeave {
    pub user_id: i64,
    pub leave_type: LeaveType,
    pub session: Option<Session>,
    pub date: NaiveDate,
    pub reason: String,
}

/// A leave request together with what approving it did to attendance.
#[derive(Debug, Clone, Serialize)]
pub struct LeaveOutcome {
    pub request: leave_request::Model,
    pub attendance: Option<ReconcileReport>,
}

/// Leave request workflow. Approval triggers the [`LeaveReconciler`].
#[derive(Clone)]
pub struct LeaveService {
    ctx: ServiceContext,
    reconciler: LeaveReconciler,
}

impl LeaveService {
    pub fn new(ctx: ServiceContext) -> Self {
        let reconciler = LeaveReconciler::new(ctx.clone());
        Self { ctx, reconciler }
    }

    fn check(req: &NewLeave) -> AttendanceResult<()> {
        if req.leave_type == LeaveType::HalfDay && req.session.is_none() {
            return Err(AttendanceError::InvalidSession);
        }
        if req.reason.trim().is_empty() {
            return Err(AttendanceError::validation("reason is required"));
        }
        Ok(())
    }

    /// Student-submitted request, left pending for review.
    pub async fn create_leave_request(
        &self,
        req: NewLeave,
    ) -> AttendanceResult<leave_request::Model> {
        Self::check(&req)?;

        self.ctx
            .bounded("create_leave_request", async {
                resolve_student(&self.ctx, req.user_id).await?;
                let request = leave_request::Model::create(
                    &self.ctx.db,
                    NewLeaveRequest {
                        user_id: req.user_id,
                        leave_type: req.leave_type,
                        session: req.session,
                        date: req.date,
                        reason: req.reason,
                        status: LeaveStatus::Pending,
                        reviewed_by: None,
                        reviewed_at: None,
                        is_manual_entry: false,
                        created_by: req.user_id,
                        created_at: self.ctx.clock.now(),
                    },
                )
                .await?;
                info!(
                    leave_id = request.id,
                    user_id = request.user_id,
                    leave_type = %request.leave_type,
                    date = %request.date,
                    "leave request created"
                );
                Ok::<_, AttendanceError>(request)
            })
            .await
    }

    /// Admin-entered request: approved immediately and reconciled.
    pub async fn admin_create_leave_request(
        &self,
        req: NewLeave,
        admin_id: i64,
    ) -> AttendanceResult<LeaveOutcome> {
        Self::check(&req)?;

        let request = self
            .ctx
            .bounded("admin_create_leave_request", async {
                resolve_student(&self.ctx, req.user_id).await?;
                let now = self.ctx.clock.now();
                let request = leave_request::Model::create(
                    &self.ctx.db,
                    NewLeaveRequest {
                        user_id: req.user_id,
                        leave_type: req.leave_type,
                        session: req.session,
                        date: req.date,
                        reason: req.reason,
                        status: LeaveStatus::Approved,
                        reviewed_by: Some(admin_id),
                        reviewed_at: Some(now),
                        is_manual_entry: true,
                        created_by: admin_id,
                        created_at: now,
                    },
                )
                .await?;
                Ok::<_, AttendanceError>(request)
            })
            .await?;

        info!(
            leave_id = request.id,
            user_id = request.user_id,
            admin_id,
            "manual leave entry approved"
        );
        let attendance = self.reconciler.reconcile_best_effort(&request, admin_id).await;
        Ok(LeaveOutcome { request, attendance: Some(attendance) })
    }

    /// Approves or rejects a pending request.
    pub async fn review_leave_request(
        &self,
        id: i64,
        decision: LeaveStatus,
        notes: Option<String>,
        admin_id: i64,
    ) -> AttendanceResult<LeaveOutcome> {
        if decision == LeaveStatus::Pending {
            return Err(AttendanceError::validation("status must be approved or rejected"));
        }

        let request = self
            .ctx
            .bounded("review_leave_request", async {
                let db = &self.ctx.db;
                let notes = notes.filter(|n| !n.trim().is_empty());
                let reviewed = leave_request::Model::review_pending(
                    db,
                    id,
                    decision,
                    admin_id,
                    notes,
                    self.ctx.clock.now(),
                )
                .await?;
                match reviewed {
                    Some(r) => Ok::<_, AttendanceError>(r),
                    // Nothing pending matched: tell a missing id apart from a lost race.
                    None => match leave_request::Model::find_by_id(db, id).await? {
                        Some(_) => Err(AttendanceError::LeaveAlreadyProcessed),
                        None => Err(AttendanceError::LeaveRequestNotFound),
                    },
                }
            })
            .await?;

        info!(
            leave_id = request.id,
            user_id = request.user_id,
            status = %request.status,
            admin_id,
            "leave request reviewed"
        );

        let attendance = match request.status {
            LeaveStatus::Approved => {
                Some(self.reconciler.reconcile_best_effort(&request, admin_id).await)
            }
            _ => None,
        };
        Ok(LeaveOutcome { request, attendance })
    }

    pub async fn list_leave_requests(
        &self,
        filter: LeaveFilter,
    ) -> AttendanceResult<Vec<leave_request::Model>> {
        self.ctx
            .bounded("list_leave_requests", async {
                Ok::<_, AttendanceError>(leave_request::Model::list(&self.ctx.db, &filter).await?)
            })
            .await
    }

    pub async fn my_leave_requests(
        &self,
        user_id: i64,
    ) -> AttendanceResult<Vec<leave_request::Model>> {
        self.list_leave_requests(LeaveFilter { user_id: Some(user_id), ..Default::default() })
            .await
    }
}
