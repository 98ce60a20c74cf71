pub mod cache;
pub mod params;

pub use cache::QueryCache;
pub use params::{RampsQuery, SortOrder};
