//! Typed calls for each remote endpoint of the `api/v2` contract.

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value, json};
use std::fmt;

use super::session::Session;
use super::transport::Transport;
use crate::core::dates::format_query_time;
use crate::core::list::List;
use crate::error::Result;

pub type RawTask = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    SignOn,
    Lists,
    BatchCheck,
    Completed,
    BatchTask,
    DeleteTask,
}

impl Endpoint {
    pub fn method(&self) -> Method {
        match self {
            Self::SignOn | Self::BatchTask => Method::POST,
            Self::Lists | Self::BatchCheck | Self::Completed => Method::GET,
            Self::DeleteTask => Method::DELETE,
        }
    }

    /// Path below the API root.
    pub fn path(&self) -> &'static str {
        match self {
            Self::SignOn => "user/signon",
            Self::Lists => "projects",
            Self::BatchCheck => "batch/check/0",
            Self::Completed => "project/all/completedInAll/",
            Self::BatchTask => "batch/task",
            Self::DeleteTask => "task",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SignOn => "sign-on",
            Self::Lists => "list-lists",
            Self::BatchCheck => "batch-check",
            Self::Completed => "completed-in-range",
            Self::BatchTask => "batch-task",
            Self::DeleteTask => "delete-task",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Active tasks and project metadata from one batch-check.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCheck {
    #[serde(default)]
    pub inbox_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub project_profiles: Vec<List>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sync_task_bean: SyncTaskBean,
}

#[derive(Debug, Default, Deserialize)]
pub struct SyncTaskBean {
    #[serde(default, deserialize_with = "null_as_default")]
    pub update: Vec<RawTask>,
}

/// The service sends `null` for empty sections.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub async fn list_lists<T: Transport>(session: &Session<T>) -> Result<Vec<List>> {
    let body = session.request(Endpoint::Lists, Vec::new(), None).await?;
    session.decode(Endpoint::Lists, &body)
}

pub async fn batch_check<T: Transport>(session: &Session<T>) -> Result<BatchCheck> {
    let body = session.request(Endpoint::BatchCheck, Vec::new(), None).await?;
    session.decode(Endpoint::BatchCheck, &body)
}

/// Completed tasks between `from` and `to`; an open bound is sent empty.
pub async fn completed_in_range<T: Transport>(
    session: &Session<T>,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    limit: u32,
) -> Result<Vec<RawTask>> {
    let query = vec![
        ("from".to_string(), from.as_ref().map(format_query_time).unwrap_or_default()),
        ("to".to_string(), to.as_ref().map(format_query_time).unwrap_or_default()),
        ("limit".to_string(), limit.to_string()),
    ];
    let body = session.request(Endpoint::Completed, query, None).await?;
    session.decode(Endpoint::Completed, &body)
}

pub async fn add_tasks<T: Transport>(session: &Session<T>, tasks: Vec<RawTask>) -> Result<()> {
    let payload = json!({ "add": tasks });
    session.request(Endpoint::BatchTask, Vec::new(), Some(payload)).await?;
    Ok(())
}

pub async fn delete_task<T: Transport>(session: &Session<T>, task_id: &str, project_id: &str) -> Result<()> {
    let payload = json!([{ "taskId": task_id, "projectId": project_id }]);
    session.request(Endpoint::DeleteTask, Vec::new(), Some(payload)).await?;
    Ok(())
}
