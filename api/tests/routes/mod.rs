mod admin_attendance_test;
mod attendance_test;
mod health_test;
mod leave_requests_test;
