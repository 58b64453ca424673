use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Half-day slot an attendance code, record, lock or leave applies to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Session {
    #[sea_orm(string_value = "morning")]
    Morning,

    #[sea_orm(string_value = "afternoon")]
    Afternoon,
}

impl Session {
    pub const ALL: [Session; 2] = [Session::Morning, Session::Afternoon];

    /// Minutes after local midnight at which the session officially starts
    /// (09:00 and 13:00).
    pub fn starts_at_minute(self) -> i64 {
        match self {
            Session::Morning => 9 * 60,
            Session::Afternoon => 13 * 60,
        }
    }

    /// Upper-case prefix used in attendance codes, e.g. `MORNING`.
    pub fn code_prefix(self) -> &'static str {
        match self {
            Session::Morning => "MORNING",
            Session::Afternoon => "AFTERNOON",
        }
    }

    pub fn from_code_prefix(prefix: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.code_prefix().eq_ignore_ascii_case(prefix))
    }
}
