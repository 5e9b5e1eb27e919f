//! Pagination options for list calls.

use crate::request::Request;

pub const PAGE_NUMBER_PARAM: &str = "page[number]";
pub const PAGE_SIZE_PARAM: &str = "page[size]";

/// Optional paging for list calls. Unset fields are left to the server's defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    page_number: Option<u32>,
    page_size: Option<u32>,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero-based page to fetch.
    pub fn page_number(mut self, page: u32) -> Self {
        self.page_number = Some(page);
        self
    }

    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    pub(crate) fn apply<'a>(&self, mut request: Request<'a>) -> Request<'a> {
        if let Some(page) = self.page_number {
            request = request.query(PAGE_NUMBER_PARAM, page);
        }
        if let Some(size) = self.page_size {
            request = request.query(PAGE_SIZE_PARAM, size);
        }
        request
    }
}
