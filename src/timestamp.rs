use std::fmt::Display;

use chrono::{DateTime, FixedOffset, TimeZone, Timelike};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(pub DateTime<FixedOffset>);

impl Timestamp {
    /// The current local time, truncated to whole seconds as that is all a commit records.
    pub fn now() -> Self {
        let now = chrono::offset::Local::now();
        Self(now.with_nanosecond(0).unwrap_or(now).into())
    }

    /// Parse a timestamp from a unix + HH + mm offset, e.g. `1658312219 +0100`.
    pub fn from_git(s: &str) -> Result<Self, String> {
        let invalid = || format!("invalid timestamp: {s:?}");

        let (unix, offset) = s.split_once(' ').ok_or_else(invalid)?;
        let unix: i64 = unix.parse().map_err(|_| invalid())?;

        if offset.len() != 5 || !offset.is_char_boundary(1) {
            return Err(invalid());
        }
        let (sign, hhmm) = offset.split_at(1);
        let hours: i32 = hhmm[..2].parse().map_err(|_| invalid())?;
        let minutes: i32 = hhmm[2..].parse().map_err(|_| invalid())?;
        let seconds = (hours * 60 + minutes) * 60;
        let seconds = match sign {
            "+" => seconds,
            "-" => -seconds,
            _ => return Err(invalid()),
        };

        let offset = FixedOffset::east_opt(seconds).ok_or_else(invalid)?;
        let when = offset.timestamp_opt(unix, 0).single().ok_or_else(invalid)?;
        Ok(Self(when))
    }

    pub fn unix(&self) -> i64 {
        self.0.timestamp()
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.0.timestamp(), self.0.format("%z"))
    }
}
