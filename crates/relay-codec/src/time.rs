//! Conversions between the wire's packed date/time word and Unix seconds.
//!
//! The reference implementation reconstructs a `struct tm` with `mktime` and the process's
//! local `timezone` global, then converts back through `localtime`. Which timezone the server
//! actually intended is unrecoverable from the wire format alone (Open Question in the source
//! material); CORE interprets the packed fields as UTC rather than reintroducing a dependency on
//! process-local timezone state, and documents the choice rather than guessing a platform
//! default.

use crate::buffer::PackedDateTime;
use chrono::{Datelike, TimeZone, Timelike, Utc};

pub fn timestamp_secs() -> i64 {
    Utc::now().timestamp()
}

impl PackedDateTime {
    pub fn from_unix_secs(secs: i64) -> Self {
        let dt = Utc
            .timestamp_opt(secs, 0)
            .single()
            .expect("timestamp out of range for a packed time field");
        PackedDateTime {
            minute: dt.minute(),
            hour: dt.hour(),
            weekday: dt.weekday().num_days_from_sunday(),
            day: dt.day(),
            month: dt.month0(),
            year: dt.year(),
        }
    }

    pub fn to_unix_secs(&self) -> i64 {
        Utc.with_ymd_and_hms(self.year, self.month + 1, self.day, self.hour, self.minute, 0)
            .single()
            .expect("packed time fields do not form a valid calendar date")
            .timestamp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_time_round_trips_through_unix_seconds() {
        // 2024-03-14 09:26:53 UTC
        let secs = 1_710_407_213;
        let packed = PackedDateTime::from_unix_secs(secs);
        assert_eq!(packed.year, 2024);
        assert_eq!(packed.month, 2); // March is month0 == 2
        assert_eq!(packed.day, 14);
        assert_eq!(packed.hour, 9);
        assert_eq!(packed.minute, 26);

        // round trip drops seconds, so compare at minute granularity
        let back = packed.to_unix_secs();
        assert_eq!(back, secs - 53);
    }

    #[test]
    fn timestamp_secs_is_plausible() {
        assert!(timestamp_secs() > 1_600_000_000);
    }
}
