//! # roster_client
//!
//! Authenticated request pipeline, query cache and typed operations for the
//! Roster API.

pub mod config;
pub mod error;
pub mod navigator;
pub mod query;
pub mod request;
pub mod service;

pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
pub use navigator::{LogNavigator, Navigator};
pub use query::{QueryCache, QueryKey, RetryPolicy};
pub use request::{ApiClient, RequestOptions};
pub use service::RosterService;
