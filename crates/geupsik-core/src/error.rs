use thiserror::Error;

/// Locally correctable problems with user input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("school name must not be empty")]
    EmptyName,

    #[error("{0} must not be empty")]
    EmptyCode(&'static str),

    #[error("unknown region: {0}")]
    UnknownRegion(String),

    #[error("region {0:?} matches more than one office, use its code or short name")]
    AmbiguousRegion(String),

    #[error("unknown school level: {0}")]
    UnknownLevel(String),

    #[error("invalid date {0:?}, expected YYYY-MM-DD or YYYYMMDD")]
    InvalidDate(String),

    #[error("invalid time {0:?}, expected HH:MM")]
    InvalidTime(String),
}
