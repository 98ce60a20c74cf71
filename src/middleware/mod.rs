pub mod auth;

pub use auth::{RefreshInterceptor, Transport};
