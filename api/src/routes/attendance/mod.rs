//! Student-facing attendance routes, mounted at `/api/attendance` behind
//! `allow_authenticated`.

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub mod get;
pub mod post;

pub use get::{get_active_code, my_history, my_status};
pub use post::submit_attendance;

pub fn attendance_routes() -> Router<AppState> {
    Router::new()
        .route("/code", get(get_active_code))
        .route("/submit", post(submit_attendance))
        .route("/me", get(my_status))
        .route("/me/history", get(my_history))
}
