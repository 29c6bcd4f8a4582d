use chrono::{NaiveDate, NaiveTime};
use csv::StringRecord;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

use super::{Error, Result};

pub type UserId = u32;

const FIELD_COUNT: usize = 4;
const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Check-in and check-out times of one user on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceSpan {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Presence of a single user keyed by calendar date.
pub type UserPresence = BTreeMap<NaiveDate, PresenceSpan>;

/// Presence of every user found in the attendance source.
pub type PresenceByUser = BTreeMap<UserId, UserPresence>;

#[derive(Debug)]
struct PresenceRecord {
    user_id: UserId,
    date: NaiveDate,
    span: PresenceSpan,
}

/// Reads the attendance CSV at `path` and groups it by user and date.
///
/// Rows that do not have exactly four fields are treated as header or footer
/// lines and ignored. Rows whose fields fail to parse are logged and dropped
/// as a whole. A later row for the same user and date replaces the earlier one.
pub fn load_presence(path: &Path) -> Result<PresenceByUser> {
    let file = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut data = PresenceByUser::new();
    let mut skipped = 0usize;

    for (line, row) in reader.records().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                debug!(line, error = %e, "Unreadable attendance row, skipping.");
                skipped += 1;
                continue;
            }
        };

        if row.len() != FIELD_COUNT {
            continue;
        }

        match parse_row(&row) {
            Ok(record) => {
                data.entry(record.user_id)
                    .or_default()
                    .insert(record.date, record.span);
            }
            Err(reason) => {
                debug!(line, row = ?row, %reason, "Problem with attendance row, skipping.");
                skipped += 1;
            }
        }
    }

    info!(
        path = %path.display(),
        users = data.len(),
        skipped,
        "Loaded attendance data."
    );
    Ok(data)
}

fn parse_row(row: &StringRecord) -> std::result::Result<PresenceRecord, String> {
    let user_id = row[0]
        .parse::<UserId>()
        .map_err(|e| format!("invalid user id {:?}: {e}", &row[0]))?;
    let date = NaiveDate::parse_from_str(&row[1], DATE_FORMAT)
        .map_err(|e| format!("invalid date {:?}: {e}", &row[1]))?;
    let start = NaiveTime::parse_from_str(&row[2], TIME_FORMAT)
        .map_err(|e| format!("invalid start {:?}: {e}", &row[2]))?;
    let end = NaiveTime::parse_from_str(&row[3], TIME_FORMAT)
        .map_err(|e| format!("invalid end {:?}: {e}", &row[3]))?;

    Ok(PresenceRecord {
        user_id,
        date,
        span: PresenceSpan { start, end },
    })
}
