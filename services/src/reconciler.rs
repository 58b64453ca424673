use crate::context::ServiceContext;
use crate::error::{AttendanceError, AttendanceResult};
use crate::marking_service::{mark_key, resolve_student};
use db::models::{
    Session,
    attendance_record::{self, AttendanceStatus},
    leave_request::{self, LeaveType},
};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct ReconcileFailure {
    pub session: Option<Session>,
    pub error: String,
}

/// What an approval did to the student's attendance.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    pub marked: Vec<attendance_record::Model>,
    pub failures: Vec<ReconcileFailure>,
}

impl ReconcileReport {
    fn failed(session: Option<Session>, err: &AttendanceError) -> Self {
        Self {
            marked: Vec::new(),
            failures: vec![ReconcileFailure { session, error: err.to_string() }],
        }
    }
}

/// Turns approved leave into excused attendance.
#[derive(Clone)]
pub struct LeaveReconciler {
    ctx: ServiceContext,
}

impl LeaveReconciler {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Sessions a leave covers and the status each is marked with.
    pub fn plan(
        leave_type: LeaveType,
        session: Option<Session>,
    ) -> AttendanceResult<Vec<(Session, AttendanceStatus)>> {
        match leave_type {
            LeaveType::Late => Ok(vec![(
                session.unwrap_or(Session::Morning),
                AttendanceStatus::LateExcused,
            )]),
            LeaveType::HalfDay => {
                let s = session.ok_or(AttendanceError::InvalidSession)?;
                Ok(vec![(s, AttendanceStatus::AbsentExcused)])
            }
            LeaveType::FullDay => Ok(Session::ALL
                .iter()
                .map(|s| (*s, AttendanceStatus::AbsentExcused))
                .collect()),
        }
    }

    /// Marks every session the leave covers. Each session is written on its
    /// own; a failed write is reported without undoing the others.
    pub async fn reconcile(
        &self,
        leave: &leave_request::Model,
        approved_by: i64,
    ) -> AttendanceResult<ReconcileReport> {
        let plan = Self::plan(leave.leave_type, leave.session)?;

        let mut report = ReconcileReport::default();
        for (session, status) in plan {
            let written = self
                .ctx
                .bounded("reconcile_leave", async {
                    let student = resolve_student(&self.ctx, leave.user_id).await?;
                    mark_key(&self.ctx, &student, leave.date, session, status, approved_by).await
                })
                .await;
            match written {
                Ok(record) => report.marked.push(record),
                Err(e) => {
                    warn!(
                        leave_id = leave.id,
                        user_id = leave.user_id,
                        date = %leave.date,
                        session = %session,
                        error = %e,
                        "leave reconciliation write failed"
                    );
                    report.failures.push(ReconcileFailure {
                        session: Some(session),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            leave_id = leave.id,
            user_id = leave.user_id,
            date = %leave.date,
            marked = report.marked.len(),
            failed = report.failures.len(),
            "leave reconciled into attendance"
        );
        Ok(report)
    }

    /// [`LeaveReconciler::reconcile`] that never fails; errors land in the report.
    pub async fn reconcile_best_effort(
        &self,
        leave: &leave_request::Model,
        approved_by: i64,
    ) -> ReconcileReport {
        match self.reconcile(leave, approved_by).await {
            Ok(report) => report,
            Err(e) => {
                warn!(leave_id = leave.id, error = %e, "leave reconciliation aborted");
                ReconcileReport::failed(leave.session, &e)
            }
        }
    }
}
