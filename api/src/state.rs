use sea_orm::DatabaseConnection;
use services::{
    AttendancePolicy, CodeService, LeaveService, LockService, MarkingService, OverviewService,
    ServiceContext,
};
use util::config::AppConfig;

/// Shared handler state: one instance of each engine, all built over the same
/// [`ServiceContext`].
#[derive(Clone)]
pub struct AppState {
    pub codes: CodeService,
    pub marking: MarkingService,
    pub locks: LockService,
    pub overview: OverviewService,
    pub leave: LeaveService,
}

impl AppState {
    /// Production wiring over `db`, with the attendance policy read from config.
    pub fn new(db: DatabaseConnection) -> Self {
        let policy = AttendancePolicy::from_config(&AppConfig::global());
        Self::with_context(ServiceContext::from_db(db, policy))
    }

    /// Wires every engine over an explicit context (tests pin the clock here).
    pub fn with_context(ctx: ServiceContext) -> Self {
        Self {
            codes: CodeService::new(ctx.clone()),
            marking: MarkingService::new(ctx.clone()),
            locks: LockService::new(ctx.clone()),
            overview: OverviewService::new(ctx.clone()),
            leave: LeaveService::new(ctx),
        }
    }
}
