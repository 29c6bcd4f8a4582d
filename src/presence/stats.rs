//! Weekday statistics derived from a single user's presence.
//!
//! Buckets are indexed Monday = 0 through Sunday = 6 and always cover the
//! whole week; a weekday without attendance holds an empty list.

use chrono::Datelike;
use serde::Serialize;

use super::records::UserPresence;
use super::time::{interval, seconds_since_midnight};

pub const DAYS_IN_WEEK: usize = 7;

pub const WEEKDAY_ABBR: [&str; DAYS_IN_WEEK] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

pub type WeekdayBuckets<T> = [T; DAYS_IN_WEEK];

/// Start and end times (in seconds since midnight) observed on one weekday.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StartEndBucket {
    pub start: Vec<i32>,
    pub end: Vec<i32>,
}

/// Groups presence intervals by weekday.
pub fn group_by_weekday(items: &UserPresence) -> WeekdayBuckets<Vec<i32>> {
    let mut result: WeekdayBuckets<Vec<i32>> = Default::default();
    for (date, span) in items {
        result[weekday_index(date)].push(interval(span.start, span.end));
    }
    result
}

/// Groups start and end times by weekday.
pub fn count_avg_group_by_weekday(items: &UserPresence) -> WeekdayBuckets<StartEndBucket> {
    let mut result: WeekdayBuckets<StartEndBucket> = Default::default();
    for (date, span) in items {
        let bucket = &mut result[weekday_index(date)];
        bucket.start.push(seconds_since_midnight(span.start));
        bucket.end.push(seconds_since_midnight(span.end));
    }
    result
}

/// Arithmetic mean. Returns zero for an empty slice.
pub fn mean<T>(items: &[T]) -> f64
where
    T: Copy + Into<f64>,
{
    if items.is_empty() {
        return 0.0;
    }
    let total: f64 = items.iter().map(|&v| v.into()).sum();
    total / items.len() as f64
}

/// Total presence in seconds per weekday, Monday first.
pub fn total_presence_by_weekday(items: &UserPresence) -> Vec<(&'static str, i64)> {
    group_by_weekday(items)
        .iter()
        .zip(WEEKDAY_ABBR)
        .map(|(intervals, day)| (day, intervals.iter().map(|&v| i64::from(v)).sum()))
        .collect()
}

/// Mean presence in seconds per weekday, Monday first.
pub fn mean_presence_by_weekday(items: &UserPresence) -> Vec<(&'static str, f64)> {
    group_by_weekday(items)
        .iter()
        .zip(WEEKDAY_ABBR)
        .map(|(intervals, day)| (day, mean(intervals)))
        .collect()
}

/// Mean start and mean end (seconds since midnight) per weekday, Monday first.
pub fn mean_start_end_by_weekday(items: &UserPresence) -> Vec<(&'static str, f64, f64)> {
    count_avg_group_by_weekday(items)
        .iter()
        .zip(WEEKDAY_ABBR)
        .map(|(bucket, day)| (day, mean(&bucket.start), mean(&bucket.end)))
        .collect()
}

fn weekday_index(date: &impl Datelike) -> usize {
    date.weekday().num_days_from_monday() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presence::records::PresenceSpan;
    use chrono::{NaiveDate, NaiveTime};

    fn span(start: (u32, u32, u32), end: (u32, u32, u32)) -> PresenceSpan {
        PresenceSpan {
            start: NaiveTime::from_hms_opt(start.0, start.1, start.2).unwrap(),
            end: NaiveTime::from_hms_opt(end.0, end.1, end.2).unwrap(),
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2013, 9, d).unwrap()
    }

    // Tuesday, Wednesday and Thursday only.
    fn user_10() -> UserPresence {
        UserPresence::from([
            (date(10), span((9, 39, 5), (17, 59, 52))),
            (date(11), span((9, 19, 52), (16, 7, 37))),
            (date(12), span((10, 48, 46), (17, 23, 51))),
        ])
    }

    fn user_11() -> UserPresence {
        UserPresence::from([
            (date(9), span((9, 12, 14), (15, 54, 17))),
            (date(10), span((9, 19, 50), (13, 55, 54))),
            (date(11), span((9, 13, 26), (16, 15, 27))),
            (date(5), span((10, 18, 36), (16, 41, 25))),
            (date(12), span((9, 28, 8), (15, 51, 27))),
            (date(13), span((13, 16, 56), (15, 4, 2))),
        ])
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean::<i32>(&[]), 0.0);
        assert_eq!(mean(&[1, 2, 3, 78, 119]), 40.6);
        assert!((mean(&[1.5, 2.2, 78.31054, 19.86465484]) - 25.4687987).abs() < 1e-7);
        assert!((mean(&[74.51, 0.9243, 78.64, 19.545]) - 43.404825).abs() < 1e-7);
        assert!((mean(&[54.2, 234.4, 59.93, 43.4]) - 97.9825).abs() < 1e-9);
    }

    #[test]
    fn test_group_by_weekday() {
        let result = group_by_weekday(&user_10());
        assert_eq!(
            result,
            [vec![], vec![30047], vec![24465], vec![23705], vec![], vec![], vec![]]
        );

        let result = group_by_weekday(&user_11());
        assert_eq!(
            result,
            [
                vec![24123],
                vec![16564],
                vec![25321],
                vec![22969, 22999],
                vec![6426],
                vec![],
                vec![],
            ]
        );
    }

    #[test]
    fn test_group_by_weekday_of_nothing_covers_whole_week() {
        let result = group_by_weekday(&UserPresence::new());
        assert_eq!(result.len(), DAYS_IN_WEEK);
        assert!(result.iter().all(Vec::is_empty));
    }

    #[test]
    fn test_count_avg_group_by_weekday() {
        let result = count_avg_group_by_weekday(&user_10());
        assert_eq!(result[0], StartEndBucket::default());
        assert_eq!(result[1], StartEndBucket { start: vec![34745], end: vec![64792] });
        assert_eq!(result[2], StartEndBucket { start: vec![33592], end: vec![58057] });
        assert_eq!(result[3], StartEndBucket { start: vec![38926], end: vec![62631] });
        assert!(result[4..].iter().all(|b| b == &StartEndBucket::default()));

        let result = count_avg_group_by_weekday(&user_11());
        assert_eq!(
            result[3],
            StartEndBucket { start: vec![37116, 34088], end: vec![60085, 57087] }
        );
        assert_eq!(result[4], StartEndBucket { start: vec![47816], end: vec![54242] });
    }

    #[test]
    fn test_total_presence_by_weekday() {
        let result = total_presence_by_weekday(&user_11());
        assert_eq!(
            result,
            vec![
                ("Mon", 24123),
                ("Tue", 16564),
                ("Wed", 25321),
                ("Thu", 45968),
                ("Fri", 6426),
                ("Sat", 0),
                ("Sun", 0),
            ]
        );
    }

    #[test]
    fn test_mean_presence_by_weekday() {
        let result = mean_presence_by_weekday(&user_11());
        assert_eq!(result[3], ("Thu", 22984.0));
        assert_eq!(result[6], ("Sun", 0.0));
    }

    #[test]
    fn test_mean_start_end_by_weekday() {
        let result = mean_start_end_by_weekday(&user_11());
        assert_eq!(result[0], ("Mon", 33134.0, 57257.0));
        assert_eq!(result[3], ("Thu", 35602.0, 58586.0));
        assert_eq!(result[5], ("Sat", 0.0, 0.0));
    }
}
