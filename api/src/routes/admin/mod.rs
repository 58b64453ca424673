//! Admin-only route groups, mounted at `/api/admin` behind `allow_admin`.

use axum::Router;

use crate::state::AppState;

pub mod attendance;
pub mod leave_requests;

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .nest("/attendance", attendance::attendance_admin_routes())
        .nest("/leave-requests", leave_requests::leave_admin_routes())
}
