//! Attendance core: code issuance and redemption, manual and bulk marking,
//! session locks, overview statistics and the leave-to-attendance reconciler.

pub mod code_service;
pub mod context;
pub mod directory;
pub mod error;
pub mod leave_service;
pub mod lock_service;
pub mod marking_service;
pub mod overview_service;
pub mod policy;
pub mod reconciler;

#[cfg(test)]
pub(crate) mod test_support;

pub use code_service::{CodeService, SubmitAttendance};
pub use context::ServiceContext;
pub use directory::{DbUserDirectory, DirectoryUser, UserDirectory};
pub use error::{AttendanceError, AttendanceResult};
pub use leave_service::LeaveService;
pub use lock_service::LockService;
pub use marking_service::MarkingService;
pub use overview_service::OverviewService;
pub use policy::AttendancePolicy;
pub use reconciler::LeaveReconciler;
