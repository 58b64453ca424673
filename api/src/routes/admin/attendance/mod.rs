use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::routes::attendance::get_active_code;
use crate::state::AppState;

pub mod delete;
pub mod get;
pub mod post;

pub use delete::{delete_record, purge_expired_codes};
pub use get::{
    attendance_logs, attendance_stats, attendance_stats_by_days, daily_stats, lock_status,
    student_history, today_overview,
};
pub use post::{bulk_mark, generate_code, lock_session, manual_mark};

pub fn attendance_admin_routes() -> Router<AppState> {
    Router::new()
        .route("/generate-code", post(generate_code))
        .route("/active-code", get(get_active_code))
        .route("/manual", post(manual_mark))
        .route("/bulk", post(bulk_mark))
        .route("/lock", post(lock_session).get(lock_status))
        .route("/today", get(today_overview))
        .route("/logs", get(attendance_logs))
        .route("/stats", get(attendance_stats))
        .route("/stats-by-days", get(attendance_stats_by_days))
        .route("/daily-stats", get(daily_stats))
        .route("/student/{user_id}", get(student_history))
        .route("/codes/expired", delete(purge_expired_codes))
        .route("/{record_id}", delete(delete_record))
}
