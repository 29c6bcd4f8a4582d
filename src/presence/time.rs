use chrono::{NaiveTime, Timelike};

/// Number of seconds elapsed since 00:00:00 on the same day.
pub fn seconds_since_midnight(t: NaiveTime) -> i32 {
    (t.hour() * 3600 + t.minute() * 60 + t.second()) as i32
}

/// Seconds between two times of the same day. Negative when `end` precedes `start`.
pub fn interval(start: NaiveTime, end: NaiveTime) -> i32 {
    seconds_since_midnight(end) - seconds_since_midnight(start)
}
