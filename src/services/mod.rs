//! Cache-backed facades over the resource functions.
//!
//! Reads go through a [`QueryCache`](crate::query::QueryCache); every
//! successful mutation invalidates the cache it affects so the next read
//! refetches.

pub mod account_service;
pub mod ramp_service;

pub use account_service::{AccountService, AuthStatus};
pub use ramp_service::RampService;
