use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

pub mod get;
pub mod post;
pub mod put;

pub use get::list_leave_requests;
pub use post::admin_create_leave_request;
pub use put::review_leave_request;

pub fn leave_admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_leave_requests).post(admin_create_leave_request))
        .route("/{leave_id}", put(review_leave_request))
}
