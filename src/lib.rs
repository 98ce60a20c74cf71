pub mod api;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod forms;
pub mod http;
pub mod middleware;
pub mod models;
pub mod query;
pub mod services;
pub mod session;
pub mod stats;
pub mod table;
pub mod upload;

pub use context::AppContext;
pub use error::{ApiError, ApiResult};
