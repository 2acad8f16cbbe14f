//! Local queries over a store snapshot. Nothing here touches the network.
//!
//! Results are ordered ascending by a numeric key. Keys are compared with
//! [`f64::total_cmp`]: a NaN key sorts after every number rather than making
//! the order undefined. Equal keys keep their fetch order.

use chrono::{DateTime, FixedOffset, Local, TimeZone};

use super::dates::start_of_day;
use super::store::Snapshot;
use super::task::Task;

pub type Filter<'a> = &'a dyn Fn(&Task) -> bool;
pub type OrderBy<'a> = &'a dyn Fn(&Task) -> f64;

/// Filter then stable-sort `tasks`. Without `order_by`, tasks sort by `sort_order`.
pub fn query(tasks: &[Task], filter: Option<Filter<'_>>, order_by: Option<OrderBy<'_>>) -> Vec<Task> {
    let mut items: Vec<Task> = match filter {
        Some(filter) => tasks.iter().filter(|t| filter(t)).cloned().collect(),
        None => tasks.to_vec(),
    };
    match order_by {
        Some(key) => items.sort_by(|a, b| key(a).total_cmp(&key(b))),
        None => items.sort_by(|a, b| a.sort_order.total_cmp(&b.sort_order)),
    }
    items
}

/// Unresolved lists count as "not in the inbox".
pub fn in_inbox(task: &Task) -> bool {
    task.list.as_deref().is_some_and(|l| l.is_inbox())
}

/// Completed tasks count when finished after `day_start`; open tasks when
/// their start date is on or before it.
pub fn due_today(task: &Task, day_start: &DateTime<FixedOffset>) -> bool {
    if task.is_completed {
        return task.completed_time.is_some_and(|done| done > *day_start);
    }
    task.start_date.is_some_and(|start| start <= *day_start)
}

impl Snapshot {
    pub fn query(&self, filter: Option<Filter<'_>>, order_by: Option<OrderBy<'_>>) -> Vec<Task> {
        query(self.tasks(), filter, order_by)
    }

    pub fn query_inbox(&self) -> Vec<Task> {
        self.query(Some(&in_inbox), None)
    }

    /// Today's tasks, with "today" starting at local midnight now.
    pub fn query_today(&self) -> Vec<Task> {
        self.query_today_at(&Local::now())
    }

    pub fn query_today_at<Z: TimeZone>(&self, now: &DateTime<Z>) -> Vec<Task> {
        let day_start = start_of_day(now);
        self.query(Some(&|t: &Task| due_today(t, &day_start)), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::list::{List, ListLookup, build_lookup};
    use crate::core::store::StateStore;
    use chrono::Duration;
    use chrono_tz::Europe::Berlin;
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn make(record: Value, lookup: &ListLookup) -> Task {
        Task::normalize(record.as_object().cloned().unwrap_or_default(), lookup)
    }

    fn store_with(tasks: Vec<Task>) -> StateStore {
        let mut store = StateStore::new();
        store.replace_tasks(tasks);
        store
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn default_query_sorts_by_sort_order_stably() {
        let lookup = ListLookup::new();
        let store = store_with(vec![
            make(json!({"id": "c", "sortOrder": 5}), &lookup),
            make(json!({"id": "a", "sortOrder": -3}), &lookup),
            make(json!({"id": "b1", "sortOrder": 2}), &lookup),
            make(json!({"id": "b2", "sortOrder": 2}), &lookup),
        ]);
        let all = store.current().query(None, None);
        assert_eq!(ids(&all), vec!["a", "b1", "b2", "c"]);
    }

    #[test]
    fn custom_filter_and_key() {
        let lookup = ListLookup::new();
        let store = store_with(vec![
            make(json!({"id": "x", "priority": 1, "sortOrder": 1}), &lookup),
            make(json!({"id": "y", "priority": 5, "sortOrder": 2}), &lookup),
            make(json!({"id": "z", "priority": 3, "sortOrder": 3}), &lookup),
        ]);
        let priority = |t: &Task| t.field("priority").and_then(Value::as_f64).unwrap_or(0.0);
        let important = |t: &Task| priority(t) >= 3.0;
        let by_priority_desc = |t: &Task| -priority(t);
        let found = store.current().query(Some(&important), Some(&by_priority_desc));
        assert_eq!(ids(&found), vec!["y", "z"]);
    }

    #[test]
    fn fractional_sort_orders_stay_distinct() {
        let lookup = ListLookup::new();
        let store = store_with(vec![
            make(json!({"id": "later", "sortOrder": 1.7}), &lookup),
            make(json!({"id": "sooner", "sortOrder": 1.2}), &lookup),
        ]);
        assert_eq!(ids(&store.current().query(None, None)), vec!["sooner", "later"]);
    }

    #[test]
    fn nan_keys_sort_last() {
        let lookup = ListLookup::new();
        let store = store_with(vec![
            make(json!({"id": "nan", "sortOrder": 0}), &lookup),
            make(json!({"id": "one", "sortOrder": 1}), &lookup),
        ]);
        let key = |t: &Task| if t.id == "nan" { f64::NAN } else { 1.0 };
        let found = store.current().query(None, Some(&key));
        assert_eq!(ids(&found), vec!["one", "nan"]);
    }

    #[test]
    fn inbox_query_matches_inbox_list_only() {
        let lookup = build_lookup(&[Arc::new(List::new("1", "Inbox")), Arc::new(List::new("2", "Work"))]);
        let milk = make(
            json!({"id": "t1", "projectId": "1", "title": "Buy milk", "sortOrder": 1}),
            &lookup,
        );
        let store = store_with(vec![
            milk.clone(),
            make(json!({"id": "t2", "projectId": "2"}), &lookup),
            make(json!({"id": "t3", "projectId": "missing"}), &lookup),
        ]);
        assert_eq!(milk.list_title(), Some("Inbox"));
        assert_eq!(store.current().query_inbox(), vec![milk]);
    }

    #[test]
    fn today_completed_tasks_use_completion_time() {
        let now = Berlin.with_ymd_and_hms(2024, 6, 10, 15, 0, 0).unwrap();
        let midnight = Berlin.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
        let lookup = ListLookup::new();
        let done_today = make(
            json!({"id": "today", "status": 2, "completedTime": (midnight + Duration::hours(1)).to_rfc3339()}),
            &lookup,
        );
        let done_yesterday = make(
            json!({"id": "yesterday", "status": 2, "completedTime": (midnight - Duration::hours(3)).to_rfc3339()}),
            &lookup,
        );
        let store = store_with(vec![done_today, done_yesterday]);
        assert_eq!(ids(&store.current().query_today_at(&now)), vec!["today"]);
    }

    #[test]
    fn today_open_tasks_use_start_date() {
        let now = Berlin.with_ymd_and_hms(2024, 6, 10, 15, 0, 0).unwrap();
        let midnight = Berlin.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
        let lookup = ListLookup::new();
        let store = store_with(vec![
            make(json!({"id": "at-midnight", "sortOrder": 1, "startDate": midnight.to_rfc3339()}), &lookup),
            make(
                json!({"id": "tomorrow", "sortOrder": 2, "startDate": (midnight + Duration::days(1)).to_rfc3339()}),
                &lookup,
            ),
            make(
                json!({"id": "overdue", "sortOrder": 3, "startDate": (midnight - Duration::days(2)).to_rfc3339()}),
                &lookup,
            ),
            make(json!({"id": "unscheduled", "sortOrder": 4}), &lookup),
        ]);
        assert_eq!(
            ids(&store.current().query_today_at(&now)),
            vec!["at-midnight", "overdue"]
        );
    }
}
