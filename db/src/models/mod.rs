pub mod attendance_code;
pub mod attendance_record;
pub mod attendance_session_lock;
pub mod leave_request;
pub mod session;
pub mod user;

pub use attendance_code::Entity as AttendanceCode;
pub use attendance_record::Entity as AttendanceRecord;
pub use attendance_session_lock::Entity as AttendanceSessionLock;
pub use leave_request::Entity as LeaveRequest;
pub use session::Session;
pub use user::Entity as User;
