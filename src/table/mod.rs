pub mod engine;
pub mod pagination;
pub mod row;
pub mod search;
pub mod selection;

pub use engine::{DataTable, FetchTicket, TableView, ALL_DISTRICTS, ALL_FACILITY_TYPES};
pub use pagination::{page_slice, total_pages, PageSource, PageWindow, PaginationMode, PAGE_BLOCK_SIZE};
pub use row::{format_korean_date, TableRow};
pub use search::SearchDebouncer;
pub use selection::Selection;
