use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

pub const INBOX_TITLE: &str = "Inbox";

/// A remote project: a named container of tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    pub id: String,
    /// `api/v2` calls this field `name`.
    #[serde(alias = "name", default)]
    pub title: String,
}

impl List {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }

    pub fn is_inbox(&self) -> bool {
        self.title == INBOX_TITLE
    }
}

/// Index from list id to the shared list value tasks link to.
pub type ListLookup = HashMap<String, Arc<List>>;

pub fn build_lookup(lists: &[Arc<List>]) -> ListLookup {
    lists
        .iter()
        .map(|list| (list.id.clone(), Arc::clone(list)))
        .collect()
}
