//! Shared plumbing for the attendance workspace: configuration and civil time.

pub mod clock;
pub mod config;
