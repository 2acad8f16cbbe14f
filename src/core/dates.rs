use chrono::{DateTime, FixedOffset, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde_json::Value;

/// Offset-bearing forms the service emits besides plain RFC 3339.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Zone a task's dates are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Named(Tz),
    Local,
}

impl Zone {
    /// Resolve an IANA zone id, falling back to the process local zone.
    pub fn resolve(name: Option<&str>) -> Self {
        let Some(raw) = name.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::Local;
        };
        match raw.parse::<Tz>() {
            Ok(tz) => Self::Named(tz),
            Err(e) => {
                log::debug!("Unknown time zone {:?} ({}), using local zone", raw, e);
                Self::Local
            }
        }
    }

    fn at_instant(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self {
            Self::Named(tz) => instant.with_timezone(tz).fixed_offset(),
            Self::Local => instant.with_timezone(&Local).fixed_offset(),
        }
    }

    fn at_local(&self, naive: &NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::Named(tz) => earliest(tz.from_local_datetime(naive)),
            Self::Local => earliest(Local.from_local_datetime(naive)),
        }
    }
}

/// Earliest instant for a wall-clock time; `None` when it falls in a DST gap.
fn earliest<Z: TimeZone>(result: LocalResult<DateTime<Z>>) -> Option<DateTime<FixedOffset>> {
    match result {
        LocalResult::Single(dt) => Some(dt.fixed_offset()),
        LocalResult::Ambiguous(first, second) => {
            let chosen = if first <= second { first } else { second };
            Some(chosen.fixed_offset())
        }
        LocalResult::None => None,
    }
}

/// Parse a remote date value (string or epoch milliseconds) in the given zone.
///
/// Values carrying their own offset keep their instant and are re-expressed at
/// the zone's offset. Naive values are read as wall-clock time in the zone.
pub fn parse_remote_date(value: &Value, zone: Zone) -> Option<DateTime<FixedOffset>> {
    match value {
        Value::String(s) => parse_date_str(s.trim(), zone),
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| zone.at_instant(dt))
        }
        _ => None,
    }
}

fn parse_date_str(s: &str, zone: Zone) -> Option<DateTime<FixedOffset>> {
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(zone.at_instant(dt.with_timezone(&Utc)));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(zone.at_instant(dt.with_timezone(&Utc)));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return zone.at_local(&naive);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return zone.at_local(&date.and_hms_opt(0, 0, 0)?);
    }
    None
}

/// Local midnight of the day containing `now`, in `now`'s own zone.
pub fn start_of_day<Z: TimeZone>(now: &DateTime<Z>) -> DateTime<FixedOffset> {
    let date = now.date_naive();
    // Zones that skip midnight on DST days start the day at the first valid hour.
    (0..=3)
        .filter_map(|hour| date.and_hms_opt(hour, 0, 0))
        .find_map(|naive| earliest(now.timezone().from_local_datetime(&naive)))
        .unwrap_or_else(|| now.fixed_offset())
}

/// Timestamp format of the completed-range query parameters.
pub fn format_query_time(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
