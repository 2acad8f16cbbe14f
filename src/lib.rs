//! Client for the TickTick web API.
//!
//! [`TickTick`] signs on, pulls lists, active tasks and completed tasks into an
//! in-memory store, and answers queries (inbox, today, arbitrary filters)
//! from that store without further network calls.

pub mod config;
pub mod core;
pub mod error;
pub mod sync;

pub use crate::config::{ClientConfig, Credentials};
pub use crate::core::list::List;
pub use crate::core::task::Task;
pub use crate::error::{Error, Result};
pub use crate::sync::TickTick;
