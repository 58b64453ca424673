use sea_orm::DbErr;

pub type AttendanceResult<T> = Result<T, AttendanceError>;

/// Every failure the attendance core can report.
#[derive(Debug, thiserror::Error)]
pub enum AttendanceError {
    #[error("Invalid attendance code")]
    InvalidCode,

    #[error("No active attendance code for this session")]
    NoActiveCode,

    #[error("Attendance code has expired")]
    CodeExpired,

    #[error("This code belongs to a different cohort")]
    CodeForWrongCohort,

    #[error("Student not found")]
    StudentNotFound,

    #[error("Attendance already submitted for this session")]
    AlreadySubmitted,

    #[error("Attendance for this session is locked")]
    SessionLocked,

    #[error("Attendance record not found")]
    RecordNotFound,

    #[error("Session is required for a half-day leave")]
    InvalidSession,

    #[error("{0}")]
    Validation(String),

    #[error("Leave request not found")]
    LeaveRequestNotFound,

    #[error("Leave request already processed")]
    LeaveAlreadyProcessed,

    #[error("Timed out while running {0}")]
    Timeout(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl AttendanceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AttendanceError::Validation(msg.into())
    }
}
