pub mod m202601050001_create_users;
pub mod m202601050002_create_attendance_codes;
pub mod m202601050003_create_attendance_records;
pub mod m202601050004_create_attendance_session_locks;
pub mod m202601050005_create_leave_requests;
