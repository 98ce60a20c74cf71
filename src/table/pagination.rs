use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::ApiError;

/// Page-number buttons shown at once
pub const PAGE_BLOCK_SIZE: u32 = 10;

/// `ceil(total / take)`, never less than one page
pub fn total_pages(total: u64, take: u32) -> u32 {
    if take == 0 {
        return 1;
    }
    let pages = total.div_ceil(u64::from(take)).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// First page of the block containing `page`
pub fn block_start(page: u32) -> u32 {
    (page.max(1) - 1) / PAGE_BLOCK_SIZE * PAGE_BLOCK_SIZE + 1
}

/// The visible block of page numbers around the current page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub current: u32,
    pub total_pages: u32,
    pub block_start: u32,
    pub block_end: u32,
}

impl PageWindow {
    pub fn new(current: u32, total_pages: u32) -> Self {
        let total_pages = total_pages.max(1);
        let current = current.clamp(1, total_pages);
        let block_start = block_start(current);
        let block_end = (block_start + PAGE_BLOCK_SIZE - 1).min(total_pages);
        Self {
            current,
            total_pages,
            block_start,
            block_end,
        }
    }

    pub fn pages(&self) -> RangeInclusive<u32> {
        self.block_start..=self.block_end
    }

    pub fn prev_page(&self) -> Option<u32> {
        (self.current > 1).then(|| self.current - 1)
    }

    pub fn next_page(&self) -> Option<u32> {
        (self.current < self.total_pages).then(|| self.current + 1)
    }

    /// Start of the previous block; `None` on the first block
    pub fn prev_block(&self) -> Option<u32> {
        if self.block_start == 1 {
            return None;
        }
        Some(self.block_start.saturating_sub(PAGE_BLOCK_SIZE).max(1))
    }

    /// Start of the next block; `None` when it would pass the last page
    pub fn next_block(&self) -> Option<u32> {
        let next = self.block_start + PAGE_BLOCK_SIZE;
        (next <= self.total_pages).then_some(next)
    }
}

/// How a list response maps onto the current page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationMode {
    /// Slice locally when the response holds the whole collection
    #[default]
    Auto,
    /// The response is already the requested page
    ServerPaginated,
    /// The response is the whole filtered collection
    ClientPaginated,
}

/// Strategy actually applied to one response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSource {
    Server,
    Client,
}

impl PaginationMode {
    pub fn resolve(self, returned_len: usize, total: u64) -> PageSource {
        match self {
            PaginationMode::ServerPaginated => PageSource::Server,
            PaginationMode::ClientPaginated => PageSource::Client,
            PaginationMode::Auto if returned_len as u64 == total => PageSource::Client,
            PaginationMode::Auto => PageSource::Server,
        }
    }
}

impl FromStr for PaginationMode {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(PaginationMode::Auto),
            "server" | "server_paginated" => Ok(PaginationMode::ServerPaginated),
            "client" | "client_paginated" => Ok(PaginationMode::ClientPaginated),
            other => Err(ApiError::config(format!("unknown pagination mode: {}", other))),
        }
    }
}

/// Rows `[(page-1)*take, page*take)` of `rows`, empty past the end
pub fn page_slice<T>(rows: &[T], page: u32, take: u32) -> &[T] {
    let take = take as usize;
    let start = (page.max(1) as usize - 1).saturating_mul(take).min(rows.len());
    let end = start.saturating_add(take).min(rows.len());
    &rows[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up_with_one_page_minimum() {
        assert_eq!(total_pages(95, 10), 10);
        assert_eq!(total_pages(100, 10), 10);
        assert_eq!(total_pages(101, 10), 11);
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(1, 10), 1);
        for take in 1..=25u32 {
            for total in 0..=300u64 {
                let expected = ((total + take as u64 - 1) / take as u64).max(1) as u32;
                assert_eq!(total_pages(total, take), expected);
            }
        }
    }

    #[test]
    fn last_page_of_ninety_five_rows_is_a_single_block() {
        let window = PageWindow::new(10, total_pages(95, 10));
        assert_eq!(window.pages().collect::<Vec<_>>(), (1..=10).collect::<Vec<_>>());
        assert_eq!(window.next_block(), None);
        assert_eq!(window.prev_block(), None);
        assert_eq!(window.next_page(), None);
    }

    #[test]
    fn window_blocks_hold_at_most_ten_consecutive_pages() {
        for total in 1..=45u32 {
            for page in 1..=total {
                let w = PageWindow::new(page, total);
                assert_eq!(w.block_start, (page - 1) / 10 * 10 + 1);
                assert_eq!(w.block_end, (w.block_start + 9).min(total));
                assert!(w.pages().contains(&page));
                assert!(w.pages().count() <= 10);
            }
        }
    }

    #[test]
    fn block_jumps_move_by_ten() {
        let w = PageWindow::new(14, 35);
        assert_eq!(w.block_start, 11);
        assert_eq!(w.prev_block(), Some(1));
        assert_eq!(w.next_block(), Some(21));

        let w = PageWindow::new(23, 25);
        assert_eq!(w.next_block(), None);
        assert_eq!(w.prev_block(), Some(11));
    }

    #[test]
    fn window_clamps_out_of_range_pages() {
        assert_eq!(PageWindow::new(0, 5).current, 1);
        assert_eq!(PageWindow::new(9, 5).current, 5);
        assert_eq!(PageWindow::new(3, 0).total_pages, 1);
    }

    #[test]
    fn auto_mode_slices_full_collections_only() {
        assert_eq!(PaginationMode::Auto.resolve(95, 95), PageSource::Client);
        assert_eq!(PaginationMode::Auto.resolve(10, 95), PageSource::Server);
        assert_eq!(PaginationMode::ServerPaginated.resolve(95, 95), PageSource::Server);
        assert_eq!(PaginationMode::ClientPaginated.resolve(10, 95), PageSource::Client);
    }

    #[test]
    fn page_slice_takes_the_requested_window() {
        let rows: Vec<u32> = (1..=95).collect();
        assert_eq!(page_slice(&rows, 3, 10), &(21..=30).collect::<Vec<_>>()[..]);
        assert_eq!(page_slice(&rows, 10, 10), &[91, 92, 93, 94, 95]);
        assert!(page_slice(&rows, 11, 10).is_empty());
    }

    #[test]
    fn pagination_mode_parses_env_values() {
        assert_eq!("server".parse::<PaginationMode>().unwrap(), PaginationMode::ServerPaginated);
        assert_eq!("Client".parse::<PaginationMode>().unwrap(), PaginationMode::ClientPaginated);
        assert!("sometimes".parse::<PaginationMode>().is_err());
    }
}
