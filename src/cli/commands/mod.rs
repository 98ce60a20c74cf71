pub mod auth;
pub mod ramps;
pub mod server;
pub mod stats;
pub mod users;
