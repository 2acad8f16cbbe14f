pub mod dates;
pub mod list;
pub mod object_id;
pub mod query;
pub mod store;
pub mod task;
