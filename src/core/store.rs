use std::sync::Arc;

use super::list::{INBOX_TITLE, List, ListLookup, build_lookup};
use super::task::Task;

/// Consistent view of the store at one point in time.
///
/// Every collection is reference counted, so a snapshot taken before a
/// refresh keeps seeing the old data while the store moves on.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub lists: Arc<[Arc<List>]>,
    pub list_lookup: Arc<ListLookup>,
    pub projects: Arc<[List]>,
    pub inbox_id: Option<String>,
    /// `None` until the first task fetch.
    pub tasks: Option<Arc<[Task]>>,
    pub completed: Option<Arc<[Task]>>,
}

impl Snapshot {
    pub fn tasks(&self) -> &[Task] {
        self.tasks.as_deref().unwrap_or(&[])
    }

    pub fn completed(&self) -> &[Task] {
        self.completed.as_deref().unwrap_or(&[])
    }

    /// The list titled "Inbox", or the inbox id reported by the last sync.
    pub fn inbox(&self) -> Option<&Arc<List>> {
        self.lists
            .iter()
            .find(|l| l.is_inbox())
            .or_else(|| self.list_lookup.get(self.inbox_id.as_deref()?))
    }

    pub fn list_id(&self, title: &str) -> Option<&str> {
        self.lists
            .iter()
            .find(|l| l.title == title)
            .map(|l| l.id.as_str())
    }

    /// First time zone found on an active task.
    pub fn guess_timezone(&self) -> Option<&str> {
        self.tasks().iter().find_map(|t| t.time_zone.as_deref())
    }
}

/// Holder of the merged remote state. Writes replace whole collections.
#[derive(Debug, Default)]
pub struct StateStore {
    current: Snapshot,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.current.clone()
    }

    pub fn current(&self) -> &Snapshot {
        &self.current
    }

    pub fn has_tasks(&self) -> bool {
        self.current.tasks.is_some()
    }

    pub fn list_lookup(&self) -> &ListLookup {
        &self.current.list_lookup
    }

    /// Replace the list metadata. A known inbox id that the new lists lack
    /// keeps its "Inbox" entry.
    pub fn replace_lists(&mut self, lists: Vec<List>) {
        let lists: Vec<Arc<List>> = lists.into_iter().map(Arc::new).collect();
        self.current.list_lookup = Arc::new(build_lookup(&lists));
        self.current.lists = lists.into();
        if let Some(inbox_id) = self.current.inbox_id.take() {
            self.set_inbox_id(inbox_id);
        }
    }

    pub fn replace_projects(&mut self, projects: Vec<List>) {
        self.current.projects = projects.into();
    }

    pub fn replace_tasks(&mut self, tasks: Vec<Task>) {
        self.current.tasks = Some(tasks.into());
    }

    pub fn replace_completed(&mut self, tasks: Vec<Task>) {
        self.current.completed = Some(tasks.into());
    }

    /// Record the inbox id from a sync. The inbox is not part of the list
    /// payloads, so an "Inbox" list is added for it when no list has that id.
    pub fn set_inbox_id(&mut self, inbox_id: String) {
        if !self.current.list_lookup.contains_key(&inbox_id) {
            let mut lists: Vec<Arc<List>> = self.current.lists.to_vec();
            lists.push(Arc::new(List::new(inbox_id.clone(), INBOX_TITLE)));
            self.current.list_lookup = Arc::new(build_lookup(&lists));
            self.current.lists = lists.into();
        }
        self.current.inbox_id = Some(inbox_id);
    }
}
