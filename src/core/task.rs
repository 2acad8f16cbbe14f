use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::dates::{Zone, parse_remote_date};
use super::list::{List, ListLookup};

/// Remote `status` value of a finished task.
const STATUS_COMPLETED: i64 = 2;

/// A task as held in the store: typed core fields plus the remote record's
/// remaining fields, untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub project_id: String,
    pub time_zone: Option<String>,
    pub sort_order: f64,
    pub start_date: Option<DateTime<FixedOffset>>,
    pub completed_time: Option<DateTime<FixedOffset>>,
    pub is_completed: bool,
    /// Owning list, when `project_id` was known at normalization time.
    pub list: Option<Arc<List>>,
    /// Other date-like fields that parsed (`dueDate`, `modifiedTime`, ...).
    pub dates: BTreeMap<String, DateTime<FixedOffset>>,
    /// Everything else from the remote record, including date-like fields
    /// whose value could not be parsed.
    pub extra: Map<String, Value>,
}

impl Task {
    /// Build a task from a raw remote record.
    ///
    /// Date-like fields (keys ending in `Date` or `Time`) with a truthy value
    /// are parsed in the record's own `timeZone`. A value that does not parse
    /// stays in `extra` exactly as received.
    pub fn normalize(raw: Map<String, Value>, lookup: &ListLookup) -> Self {
        let time_zone = raw
            .get("timeZone")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        let zone = Zone::resolve(time_zone.as_deref());

        let mut task = Self {
            id: String::new(),
            title: String::new(),
            project_id: String::new(),
            time_zone,
            sort_order: 0.0,
            start_date: None,
            completed_time: None,
            is_completed: false,
            list: None,
            dates: BTreeMap::new(),
            extra: Map::new(),
        };

        for (key, value) in raw {
            match key.as_str() {
                "id" => task.id = text(value),
                "title" => task.title = text(value),
                "projectId" => task.project_id = text(value),
                "timeZone" => {}
                "sortOrder" => task.sort_order = value.as_f64().unwrap_or(0.0),
                "isCompleted" => task.is_completed |= value.as_bool().unwrap_or(false),
                _ if is_date_key(&key) && is_truthy(&value) => {
                    match parse_remote_date(&value, zone) {
                        Some(dt) => task.set_date(key, dt),
                        None => {
                            log::debug!("Leaving {} unparsed: {}", key, value);
                            task.extra.insert(key, value);
                        }
                    }
                }
                _ => {
                    task.extra.insert(key, value);
                }
            }
        }

        if task
            .extra
            .get("status")
            .and_then(Value::as_i64)
            .is_some_and(|s| s >= STATUS_COMPLETED)
        {
            task.is_completed = true;
        }

        task.list = lookup.get(&task.project_id).cloned();
        task
    }

    fn set_date(&mut self, key: String, dt: DateTime<FixedOffset>) {
        match key.as_str() {
            "startDate" => self.start_date = Some(dt),
            "completedTime" => self.completed_time = Some(dt),
            _ => {
                self.dates.insert(key, dt);
            }
        }
    }

    /// Any normalized date field by its remote name.
    pub fn date(&self, key: &str) -> Option<DateTime<FixedOffset>> {
        match key {
            "startDate" => self.start_date,
            "completedTime" => self.completed_time,
            _ => self.dates.get(key).copied(),
        }
    }

    /// A passthrough field by its remote name.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    pub fn list_title(&self) -> Option<&str> {
        self.list.as_deref().map(|l| l.title.as_str())
    }
}

pub fn is_date_key(key: &str) -> bool {
    key.ends_with("Date") || key.ends_with("Time")
}

/// Truthiness as the remote payloads use it: null, false, 0 and "" are empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
