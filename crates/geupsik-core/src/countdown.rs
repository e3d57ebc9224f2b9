//! "Time until lunch" countdown.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};

use crate::QueryError;

/// Daily lunch service window, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LunchWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Default for LunchWindow {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default(),
            end: NaiveTime::from_hms_opt(13, 0, 0).unwrap_or_default(),
        }
    }
}

impl FromStr for LunchWindow {
    type Err = String;

    /// Parses `HH:MM-HH:MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| format!("expected HH:MM-HH:MM, got {s:?}"))?;
        let parse = |t: &str| {
            NaiveTime::parse_from_str(t.trim(), "%H:%M").map_err(|e| format!("{t:?}: {e}"))
        };
        let window = LunchWindow {
            start: parse(start)?,
            end: parse(end)?,
        };
        if window.end <= window.start {
            return Err(format!("lunch must end after it starts: {s:?}"));
        }
        Ok(window)
    }
}

impl fmt::Display for LunchWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LunchCountdown {
    Upcoming(TimeDelta),
    Serving,
    Over,
}

impl fmt::Display for LunchCountdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LunchCountdown::Upcoming(left) => {
                // Round partial minutes up so the display never reads zero early.
                let mins = (left.num_seconds() + 59) / 60;
                write!(f, "점심까지 {}시간 {}분 남았습니다", mins / 60, mins % 60)
            }
            LunchCountdown::Serving => f.write_str("지금은 점심시간입니다"),
            LunchCountdown::Over => f.write_str("오늘 점심시간이 끝났습니다"),
        }
    }
}

pub fn lunch_countdown(now: NaiveDateTime, window: LunchWindow) -> LunchCountdown {
    let time = now.time();
    if time < window.start {
        LunchCountdown::Upcoming(window.start - time)
    } else if time < window.end {
        LunchCountdown::Serving
    } else {
        LunchCountdown::Over
    }
}

/// Parse an `HH:MM` clock time for ad-hoc countdown queries.
pub fn parse_clock(s: &str) -> Result<NaiveTime, QueryError> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").map_err(|_| QueryError::InvalidTime(s.to_string()))
}
