use crate::config::{ExecutionMode, REQUEST_LOG_WINDOW};
use crate::error::Result;
use crate::index::{DocumentFilter, SearchIndex};
use crate::Document;
use std::collections::VecDeque;

/// Wraps top-document queries and counts how many of the most recent
/// [`REQUEST_LOG_WINDOW`] calls came back empty.
pub struct RequestLog<'a> {
    index: &'a SearchIndex,
    requests: VecDeque<bool>,
    no_result_requests: usize,
    window: usize,
}

impl<'a> RequestLog<'a> {
    pub fn new(index: &'a SearchIndex) -> Self {
        Self::with_window(index, REQUEST_LOG_WINDOW)
    }

    /// `window` is clamped to at least one request.
    pub fn with_window(index: &'a SearchIndex, window: usize) -> Self {
        let window = window.max(1);
        Self {
            index,
            requests: VecDeque::with_capacity(window),
            no_result_requests: 0,
            window,
        }
    }

    pub fn add_find_request(&mut self, raw_query: &str) -> Result<Vec<Document>> {
        self.add_find_request_filtered(raw_query, DocumentFilter::Default)
    }

    /// Failed queries are returned to the caller and not recorded.
    pub fn add_find_request_filtered<'f>(
        &mut self,
        raw_query: &str,
        filter: impl Into<DocumentFilter<'f>>,
    ) -> Result<Vec<Document>> {
        let documents =
            self.index
                .find_top_documents_with(ExecutionMode::Sequential, raw_query, filter)?;
        self.record(documents.is_empty());
        Ok(documents)
    }

    fn record(&mut self, empty: bool) {
        if self.requests.len() == self.window {
            if let Some(true) = self.requests.pop_front() {
                self.no_result_requests -= 1;
            }
        }
        self.requests.push_back(empty);
        if empty {
            self.no_result_requests += 1;
        }
    }

    pub fn no_result_requests(&self) -> usize {
        self.no_result_requests
    }

    pub fn recorded_requests(&self) -> usize {
        self.requests.len()
    }
}
