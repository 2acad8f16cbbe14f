pub mod gateway;
pub mod keyring;
pub mod session;
pub mod transport;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::config::{ClientConfig, Credentials};
use crate::core::object_id::new_object_id;
use crate::core::query::{Filter, OrderBy};
use crate::core::store::{Snapshot, StateStore};
use crate::core::task::Task;
use crate::error::{Error, Result};
use gateway::RawTask;
use session::Session;
use transport::{HttpTransport, Transport};

/// Client for one TickTick account.
///
/// Network operations take `&mut self`: one top-level operation is in flight
/// per client at a time. Queries read the last fetched state and never touch
/// the network.
///
/// `add` and `delete` do not touch local state. Call [`TickTick::fetch`]
/// afterwards to see their effect.
pub struct TickTick<T = HttpTransport> {
    credentials: Credentials,
    config: ClientConfig,
    transport: T,
    session: Option<Session<T>>,
    store: StateStore,
}

impl TickTick<HttpTransport> {
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_config(credentials, ClientConfig::default())
    }

    pub fn with_config(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(credentials, config, transport))
    }
}

impl<T: Transport> TickTick<T> {
    pub fn with_transport(credentials: Credentials, config: ClientConfig, transport: T) -> Self {
        Self {
            credentials,
            config,
            transport,
            session: None,
            store: StateStore::new(),
        }
    }

    /// Sign on, then pull lists (unless disabled) and tasks.
    ///
    /// Every login starts from an empty store. If the sign-on succeeds but the
    /// first fetch fails, the session is kept and the error returned.
    pub async fn login(&mut self) -> Result<()> {
        let session = Session::login(self.transport.clone(), &self.config, &self.credentials).await?;
        self.session = Some(session);
        self.store = StateStore::new();

        if self.config.fetch_lists_on_login {
            self.fetch_lists().await?;
        }
        self.fetch().await
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    fn session(&self) -> Result<&Session<T>> {
        self.session.as_ref().ok_or(Error::NotLoggedIn)
    }

    pub async fn fetch_lists(&mut self) -> Result<()> {
        let lists = gateway::list_lists(self.session()?).await?;
        log::info!("Fetched {} lists", lists.len());
        self.store.replace_lists(lists);
        Ok(())
    }

    /// Replace active and completed tasks. A failure in the completed half
    /// leaves the freshly fetched active tasks in place.
    pub async fn fetch(&mut self) -> Result<()> {
        self.fetch_tasks().await?;
        let limit = self.config.completed_limit;
        self.fetch_completed(None, None, limit).await
    }

    pub async fn fetch_tasks(&mut self) -> Result<()> {
        let check = gateway::batch_check(self.session()?).await?;
        if let Some(inbox_id) = check.inbox_id {
            self.store.set_inbox_id(inbox_id);
        }
        self.store.replace_projects(check.project_profiles);

        let tasks = self.normalize_all(check.sync_task_bean.update);
        log::info!("Fetched {} active tasks", tasks.len());
        self.store.replace_tasks(tasks);
        Ok(())
    }

    pub async fn fetch_completed(
        &mut self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        limit: u32,
    ) -> Result<()> {
        let raw = gateway::completed_in_range(self.session()?, from, to, limit).await?;
        let completed = self.normalize_all(raw);
        log::info!("Fetched {} completed tasks", completed.len());
        self.store.replace_completed(completed);
        Ok(())
    }

    fn normalize_all(&self, raw: Vec<RawTask>) -> Vec<Task> {
        let lookup = self.store.list_lookup();
        raw.into_iter().map(|r| Task::normalize(r, lookup)).collect()
    }

    /// Create a task and return its generated id.
    ///
    /// `list_name` is matched against list titles; an unknown name sends the
    /// task without a `projectId`. Without a name the inbox is used. Fields in
    /// `extra` override the base fields.
    pub async fn add(
        &mut self,
        title: &str,
        list_name: Option<&str>,
        extra: Option<Map<String, Value>>,
    ) -> Result<String> {
        if !self.store.has_tasks() {
            self.fetch().await?;
        }

        let current = self.store.current();
        let list_id = match list_name {
            Some(name) => {
                let id = current.list_id(name);
                if id.is_none() {
                    log::warn!("No list titled {:?}, adding without a list", name);
                }
                id.map(str::to_owned)
            }
            None => current.inbox().map(|l| l.id.clone()),
        };

        let task_id = new_object_id();
        let mut task = Map::new();
        task.insert("title".into(), Value::from(title));
        if let Some(tz) = current.guess_timezone() {
            task.insert("timeZone".into(), Value::from(tz));
        }
        task.insert("id".into(), Value::from(task_id.clone()));
        if let Some(list_id) = list_id {
            task.insert("projectId".into(), Value::from(list_id));
        }
        if let Some(extra) = extra {
            task.extend(extra);
        }

        gateway::add_tasks(self.session()?, vec![task]).await?;
        log::info!("Added task {}", task_id);
        Ok(task_id)
    }

    /// Delete a task remotely. No existence check is made.
    pub async fn delete(&mut self, task_id: &str, list_id: &str) -> Result<()> {
        gateway::delete_task(self.session()?, task_id, list_id).await?;
        log::info!("Deleted task {}", task_id);
        Ok(())
    }

    /// The current state, detached from later fetches.
    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    pub fn state(&self) -> &Snapshot {
        self.store.current()
    }

    pub fn query(&self, filter: Option<Filter<'_>>, order_by: Option<OrderBy<'_>>) -> Vec<Task> {
        self.state().query(filter, order_by)
    }

    pub fn query_inbox(&self) -> Vec<Task> {
        self.state().query_inbox()
    }

    pub fn query_today(&self) -> Vec<Task> {
        self.state().query_today()
    }

    pub fn list_id(&self, title: &str) -> Option<&str> {
        self.state().list_id(title)
    }

    pub fn guess_timezone(&self) -> Option<&str> {
        self.state().guess_timezone()
    }
}
