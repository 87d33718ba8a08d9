//! Scripted backends for driving the search flows without a server.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::sleep;

use pillseek::error::ApiError;
use pillseek::models::candidate::{CandidateSummary, Page};
use pillseek::models::query::SearchQuery;
use pillseek::services::session::PageSource;

pub fn candidate(code: &str) -> CandidateSummary {
    CandidateSummary {
        code: code.to_string(),
        name: format!("pill-{code}"),
        image_url: String::new(),
    }
}

/// A paginated backend generating `items_per_page` items per page, with an
/// optional response delay. Tracks how many fetches ran at the same time.
pub struct PagedBackend {
    pub total_pages: u32,
    pub items_per_page: usize,
    pub delay: Duration,
    pub calls: AtomicU32,
    concurrent: AtomicUsize,
    pub max_concurrent: AtomicUsize,
}

impl PagedBackend {
    pub fn new(total_pages: u32, items_per_page: usize) -> Self {
        Self::with_delay(total_pages, items_per_page, Duration::ZERO)
    }

    pub fn with_delay(total_pages: u32, items_per_page: usize, delay: Duration) -> Self {
        Self {
            total_pages,
            items_per_page,
            delay,
            calls: AtomicU32::new(0),
            concurrent: AtomicUsize::new(0),
            max_concurrent: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent.load(Ordering::SeqCst)
    }
}

impl PageSource for &PagedBackend {
    async fn fetch_page(&self, _query: &SearchQuery, page: u32) -> Result<Page, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.concurrent.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let items = (0..self.items_per_page)
            .map(|i| candidate(&format!("p{page}-i{i}")))
            .collect();

        self.concurrent.fetch_sub(1, Ordering::SeqCst);
        Ok(Page {
            number: page,
            total_pages: self.total_pages,
            items,
        })
    }
}

/// A backend answering from a fixed script of page results.
pub struct ScriptedPages {
    script: Mutex<VecDeque<Result<Page, ApiError>>>,
}

impl ScriptedPages {
    pub fn new(script: Vec<Result<Page, ApiError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
        }
    }
}

impl PageSource for &ScriptedPages {
    async fn fetch_page(&self, _query: &SearchQuery, _page: u32) -> Result<Page, ApiError> {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .expect("page script exhausted")
    }
}

/// A backend that records every query it is asked for and answers with an
/// empty single page.
pub struct RecordingBackend {
    pub seen: Mutex<Vec<(SearchQuery, u32)>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl PageSource for &RecordingBackend {
    async fn fetch_page(&self, query: &SearchQuery, page: u32) -> Result<Page, ApiError> {
        self.seen.lock().unwrap().push((query.clone(), page));
        Ok(Page {
            number: page,
            total_pages: 1,
            items: Vec::new(),
        })
    }
}
