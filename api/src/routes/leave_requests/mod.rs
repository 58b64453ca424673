//! Student leave requests, mounted at `/api/leave-requests` behind
//! `allow_authenticated`.

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub mod get;
pub mod post;

pub use get::my_leave_requests;
pub use post::{LeaveReq, create_leave_request};

pub fn leave_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_leave_request))
        .route("/me", get(my_leave_requests))
}
