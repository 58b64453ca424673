//! HTTP route entry point for `/api/...`.
//!
//! Route groups:
//! - `/health` → liveness check (public)
//! - `/attendance` → code lookup, submission and own history (authenticated)
//! - `/leave-requests` → filing and listing own leave (authenticated)
//! - `/admin/attendance` → codes, marking, locks, rosters and stats (admin)
//! - `/admin/leave-requests` → manual entry and review (admin)

use crate::auth::guards::{allow_admin, allow_authenticated};
use crate::routes::{
    admin::admin_routes, attendance::attendance_routes, health::health_routes,
    leave_requests::leave_routes,
};
use crate::state::AppState;
use axum::{Router, middleware::from_fn};

pub mod admin;
pub mod attendance;
pub mod common;
pub mod health;
pub mod leave_requests;

/// Builds the router mounted under `/api`.
///
/// Guards are applied with `route_layer`, so unknown paths still answer
/// `404` rather than `401`.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .nest(
            "/attendance",
            attendance_routes().route_layer(from_fn(allow_authenticated)),
        )
        .nest(
            "/leave-requests",
            leave_routes().route_layer(from_fn(allow_authenticated)),
        )
        .nest("/admin", admin_routes().route_layer(from_fn(allow_admin)))
        .with_state(app_state)
}
