//! Table state machine for the ramps list.
//!
//! The table owns the list query (page, page size, order, filters, search),
//! the row selection and the search debouncer. A front end drives it with
//! user events and runs fetches through [`DataTable::begin_fetch`] and
//! [`DataTable::apply_response`]; [`DataTable::view`] tells it what to show.
//!
//! Every page change clears the selection. Filter, search, page-size and
//! order changes also reset to page 1.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::TableConfig;
use crate::error::{ApiError, ApiResult};
use crate::query::{RampsQuery, SortOrder};
use crate::services::ramp_service::RampsListing;
use crate::services::RampService;

use super::pagination::{page_slice, total_pages, PageSource, PageWindow, PaginationMode};
use super::row::TableRow;
use super::search::SearchDebouncer;
use super::selection::Selection;

/// District filter label meaning "no district filter"
pub const ALL_DISTRICTS: &str = "서울특별시";
/// Facility-type filter label meaning "no type filter"
pub const ALL_FACILITY_TYPES: &str = "시설 유형";

/// Handle for one issued fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub query: RampsQuery,
}

/// Exactly one of these is shown at a time
#[derive(Debug, Clone, PartialEq)]
pub enum TableView {
    Loading,
    Error(ApiError),
    Empty,
    Rows(Vec<TableRow>),
}

#[derive(Debug, Clone)]
enum LoadState {
    Loading,
    Loaded,
    Failed(ApiError),
}

#[derive(Debug)]
pub struct DataTable {
    query: RampsQuery,
    mode: PaginationMode,
    selection: Selection,
    search: SearchDebouncer,
    listing: Option<Arc<RampsListing>>,
    rows: Vec<TableRow>,
    state: LoadState,
    issued: u64,
}

impl DataTable {
    pub fn new(config: &TableConfig) -> Self {
        Self {
            query: RampsQuery::with_take(config.default_take.max(1)),
            mode: config.pagination_mode,
            selection: Selection::new(),
            search: SearchDebouncer::new(Duration::from_millis(config.search_debounce_ms)),
            listing: None,
            rows: Vec::new(),
            state: LoadState::Loading,
            issued: 0,
        }
    }

    pub fn with_mode(mut self, mode: PaginationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn query(&self) -> &RampsQuery {
        &self.query
    }

    pub fn current_page(&self) -> u32 {
        self.query.page
    }

    pub fn page_size(&self) -> u32 {
        self.query.take
    }

    // -- fetching --

    /// Issue a fetch for the current query. Any earlier ticket becomes stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        self.state = LoadState::Loading;
        FetchTicket {
            seq: self.issued,
            query: self.query.clone(),
        }
    }

    /// Apply a fetch result. Results of superseded tickets, and of tickets
    /// whose query no longer matches the table's, are dropped and `false` is
    /// returned.
    pub fn apply_response(&mut self, ticket: &FetchTicket, result: ApiResult<Arc<RampsListing>>) -> bool {
        if ticket.seq != self.issued {
            tracing::debug!(seq = ticket.seq, latest = self.issued, "dropping superseded list response");
            return false;
        }
        if ticket.query != self.query {
            tracing::debug!(seq = ticket.seq, "dropping list response for an outdated query");
            return false;
        }

        match result {
            Ok(listing) => {
                self.rows = listing.data.iter().map(TableRow::from).collect();
                self.listing = Some(listing);
                self.state = LoadState::Loaded;
            }
            Err(e) => {
                tracing::warn!("ramps list failed: {}", e);
                self.state = LoadState::Failed(e);
            }
        }
        true
    }

    /// Fetch the current query through the service and apply it
    pub async fn refresh(&mut self, service: &RampService) -> ApiResult<()> {
        let ticket = self.begin_fetch();
        let result = service.list(&ticket.query).await;
        let outcome = result.as_ref().map(|_| ()).map_err(|e| e.clone());
        self.apply_response(&ticket, result);
        outcome
    }

    // -- display --

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading)
    }

    pub fn error(&self) -> Option<&ApiError> {
        match &self.state {
            LoadState::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn view(&self) -> TableView {
        match &self.state {
            LoadState::Loading => TableView::Loading,
            LoadState::Failed(e) => TableView::Error(e.clone()),
            LoadState::Loaded => {
                let rows = self.visible_rows();
                if rows.is_empty() {
                    TableView::Empty
                } else {
                    TableView::Rows(rows)
                }
            }
        }
    }

    /// Rows of the current page with their checked flag set
    pub fn visible_rows(&self) -> Vec<TableRow> {
        self.page_rows()
            .iter()
            .map(|row| TableRow {
                checked: self.selection.contains(row.id),
                ..row.clone()
            })
            .collect()
    }

    fn page_rows(&self) -> &[TableRow] {
        let Some(listing) = self.listing.as_ref() else {
            return &[];
        };
        match self.mode.resolve(listing.data.len(), listing.total) {
            PageSource::Client => page_slice(&self.rows, self.query.page, self.query.take),
            PageSource::Server => &self.rows,
        }
    }

    fn visible_ids(&self) -> Vec<i64> {
        self.page_rows().iter().map(|row| row.id).collect()
    }

    pub fn total_items(&self) -> u64 {
        self.listing.as_ref().map(|l| l.total).unwrap_or(0)
    }

    pub fn total_pages(&self) -> u32 {
        total_pages(self.total_items(), self.query.take)
    }

    pub fn window(&self) -> PageWindow {
        PageWindow::new(self.query.page, self.total_pages())
    }

    /// `서울특별시` followed by the districts of the loaded rows, sorted
    pub fn district_options(&self) -> Vec<String> {
        options(ALL_DISTRICTS, self.rows.iter().map(|r| r.district.as_str()))
    }

    /// `시설 유형` followed by the facility types of the loaded rows, sorted
    pub fn facility_type_options(&self) -> Vec<String> {
        options(ALL_FACILITY_TYPES, self.rows.iter().map(|r| r.facility_type.as_str()))
    }

    pub fn selected_district_label(&self) -> &str {
        self.query.district.as_deref().unwrap_or(ALL_DISTRICTS)
    }

    pub fn selected_facility_type_label(&self) -> &str {
        self.query.facility_type.as_deref().unwrap_or(ALL_FACILITY_TYPES)
    }

    // -- navigation --

    /// Move to `page` clamped into `[1, total_pages]`; always clears the
    /// selection. Returns whether the query changed.
    pub fn go_to_page(&mut self, page: u32) -> bool {
        let target = page.clamp(1, self.total_pages());
        self.selection.clear();
        self.set_page(target)
    }

    pub fn prev_page(&mut self) -> bool {
        match self.window().prev_page() {
            Some(page) => self.go_to_page(page),
            None => false,
        }
    }

    pub fn next_page(&mut self) -> bool {
        match self.window().next_page() {
            Some(page) => self.go_to_page(page),
            None => false,
        }
    }

    pub fn prev_block(&mut self) -> bool {
        match self.window().prev_block() {
            Some(page) => self.go_to_page(page),
            None => false,
        }
    }

    pub fn next_block(&mut self) -> bool {
        match self.window().next_block() {
            Some(page) => self.go_to_page(page),
            None => false,
        }
    }

    // -- filters --

    /// Pick a district by label; the "all" label removes the filter
    pub fn select_district(&mut self, label: &str) -> bool {
        let filter = filter_value(label, ALL_DISTRICTS);
        self.reset_with(|q| q.district = filter)
    }

    pub fn select_facility_type(&mut self, label: &str) -> bool {
        let filter = filter_value(label, ALL_FACILITY_TYPES);
        self.reset_with(|q| q.facility_type = filter)
    }

    pub fn set_page_size(&mut self, take: u32) -> bool {
        let take = take.max(1);
        self.reset_with(|q| q.take = take)
    }

    pub fn set_order(&mut self, order: SortOrder) -> bool {
        self.reset_with(|q| q.order = order)
    }

    // -- search --

    pub fn search_input(&mut self, text: impl Into<String>, now: Instant) {
        self.search.input(text, now);
    }

    pub fn search_composition_start(&mut self) {
        self.search.composition_start();
    }

    pub fn search_composition_end(&mut self, text: impl Into<String>, now: Instant) {
        self.search.composition_end(text, now);
    }

    /// Enter pressed: apply the search text immediately
    pub fn search_commit(&mut self) -> bool {
        let value = self.search.commit();
        self.apply_search(value)
    }

    /// Apply the search once the debounce delay has elapsed
    pub fn poll_search(&mut self, now: Instant) -> bool {
        match self.search.poll(now) {
            Some(value) => self.apply_search(value),
            None => false,
        }
    }

    /// Wait out a pending debounce, then apply it
    pub async fn wait_for_search(&mut self) -> bool {
        match self.search.wait_for_commit().await {
            Some(value) => self.apply_search(value),
            None => false,
        }
    }

    pub fn search_deadline(&self) -> Option<Instant> {
        self.search.deadline()
    }

    fn apply_search(&mut self, value: Option<String>) -> bool {
        self.reset_with(|q| q.search = value)
    }

    // -- selection --

    pub fn toggle_row(&mut self, id: i64) {
        self.selection.toggle(id);
    }

    /// Select or deselect every row on the current page
    pub fn toggle_all_visible(&mut self) {
        let visible = self.visible_ids();
        self.selection.toggle_all(&visible);
    }

    pub fn all_visible_selected(&self) -> bool {
        self.selection.all_selected(&self.visible_ids())
    }

    pub fn selected_ids(&self) -> Vec<i64> {
        self.selection.ids()
    }

    /// Delete every selected row in one request. The selection is cleared
    /// and the list refetched on success, and kept for a retry on failure.
    /// Returns how many ids were sent.
    pub async fn delete_selected(&mut self, service: &RampService) -> ApiResult<usize> {
        let ids = self.selection.ids();
        if ids.is_empty() {
            return Ok(0);
        }

        service.delete(&ids).await?;
        self.selection.clear();
        if let Err(e) = self.refresh(service).await {
            tracing::warn!("refetch after delete failed: {}", e);
        }
        Ok(ids.len())
    }

    /// Cancel the pending search timer
    pub fn teardown(&mut self) {
        self.search.cancel();
    }

    fn set_page(&mut self, page: u32) -> bool {
        if self.query.page == page {
            return false;
        }
        self.query.page = page;
        true
    }

    /// Apply a filter-like change, reset to page 1 and clear the selection
    fn reset_with(&mut self, change: impl FnOnce(&mut RampsQuery)) -> bool {
        let before = self.query.clone();
        change(&mut self.query);
        self.query.page = 1;
        self.selection.clear();
        self.query != before
    }
}

fn filter_value(label: &str, all_label: &str) -> Option<String> {
    let label = label.trim();
    (!label.is_empty() && label != all_label).then(|| label.to_string())
}

fn options<'a>(all_label: &str, values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let unique: BTreeSet<&str> = values.filter(|v| !v.is_empty()).collect();
    std::iter::once(all_label)
        .chain(unique)
        .map(str::to_string)
        .collect()
}
