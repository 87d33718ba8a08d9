//! One search-query lifetime: page-by-page retrieval into a single growing
//! result list.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use strum::Display;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::candidate::{CandidateSummary, Page};
use crate::models::query::SearchQuery;

/// Where result pages come from. The production source is the API client;
/// tests script one.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn fetch_page(&self, query: &SearchQuery, page: u32) -> Result<Page, ApiError>;
}

/// What the consumer should render right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SessionPhase {
    /// First page not yet in.
    Loading,
    /// Results available (more pages may remain).
    Ready,
    /// The first page came back well-formed but with zero items.
    Empty,
    /// The first page could not be fetched; `start` may be called again.
    Failed,
}

/// Outcome of a scroll-proximity signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOutcome {
    /// The next page was fetched; this many items were appended.
    Appended(usize),
    /// Nothing happened: a fetch was already in flight, or no pages remain.
    Ignored,
}

#[derive(Debug)]
struct SessionState {
    items: Vec<CandidateSummary>,
    current_page: u32,
    total_pages: u32,
    phase: SessionPhase,
}

/// Accumulates search results for exactly one query lifetime.
///
/// Pages are fetched strictly in increasing order, never skipped and never
/// re-fetched; items are appended in page order with no deduplication. The
/// `in_flight` flag is the sole fetch gate: acquired before a request goes
/// out and released on every exit path (success, empty page, error), so an
/// abandoned or failed fetch can never leave the session stuck loading.
/// A new query gets a new session; lists are never merged across queries.
pub struct SearchSession<S> {
    source: S,
    query: SearchQuery,
    session_id: Uuid,
    in_flight: AtomicBool,
    state: Mutex<SessionState>,
}

impl<S: PageSource> SearchSession<S> {
    /// A session that will fetch pages for `query`, starting empty.
    pub fn new(source: S, query: SearchQuery) -> Self {
        Self {
            source,
            query,
            session_id: Uuid::new_v4(),
            in_flight: AtomicBool::new(false),
            state: Mutex::new(SessionState {
                items: Vec::new(),
                current_page: 0,
                total_pages: 0,
                phase: SessionPhase::Loading,
            }),
        }
    }

    /// A session over a pre-computed candidate list (e.g. one selected
    /// result group). The single page is already complete, so no fetch is
    /// ever issued for this lifetime.
    pub fn with_results(source: S, items: Vec<CandidateSummary>) -> Self {
        let phase = if items.is_empty() {
            SessionPhase::Empty
        } else {
            SessionPhase::Ready
        };
        Self {
            source,
            query: SearchQuery::default(),
            session_id: Uuid::new_v4(),
            in_flight: AtomicBool::new(false),
            state: Mutex::new(SessionState {
                items,
                current_page: 1,
                total_pages: 1,
                phase,
            }),
        }
    }

    /// Fetch page 1 and adopt its page count as fixed for this lifetime.
    ///
    /// An empty first page is a valid terminal outcome (`Empty`), distinct
    /// from both loading and failure. On error the phase becomes `Failed`
    /// and the error propagates; calling `start` again re-attempts.
    pub async fn start(&self) -> Result<(), ApiError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            tracing::debug!(session = %self.session_id, "start ignored, fetch already in flight");
            return Ok(());
        }

        {
            let mut state = self.state();
            state.items.clear();
            state.current_page = 0;
            state.total_pages = 0;
            state.phase = SessionPhase::Loading;
        }

        let result = self.source.fetch_page(&self.query, 1).await;
        self.in_flight.store(false, Ordering::Release);

        match result {
            Ok(page) => {
                let mut state = self.state();
                state.current_page = 1;
                state.total_pages = page.total_pages.max(1);
                state.phase = if page.items.is_empty() {
                    SessionPhase::Empty
                } else {
                    SessionPhase::Ready
                };
                tracing::debug!(
                    session = %self.session_id,
                    items = page.items.len(),
                    total_pages = state.total_pages,
                    phase = %state.phase,
                    "first page loaded"
                );
                state.items.extend(page.items);
                Ok(())
            }
            Err(err) => {
                self.state().phase = SessionPhase::Failed;
                tracing::warn!(session = %self.session_id, error = %err, "first page failed");
                Err(err)
            }
        }
    }

    /// React to a scroll-proximity signal: fetch the next page. If a fetch
    /// is already in flight or the last page has been reached, the signal
    /// is a no-op.
    ///
    /// A failed fetch is not retried here; the next signal re-attempts the
    /// same page.
    pub async fn notify_scroll(&self) -> Result<ScrollOutcome, ApiError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Ok(ScrollOutcome::Ignored);
        }

        let next_page = {
            let state = self.state();
            if state.phase != SessionPhase::Ready || state.current_page >= state.total_pages {
                None
            } else {
                Some(state.current_page + 1)
            }
        };

        let Some(next_page) = next_page else {
            self.in_flight.store(false, Ordering::Release);
            return Ok(ScrollOutcome::Ignored);
        };

        let result = self.source.fetch_page(&self.query, next_page).await;
        self.in_flight.store(false, Ordering::Release);

        match result {
            Ok(page) => {
                let mut state = self.state();
                state.current_page = next_page;
                let appended = page.items.len();
                state.items.extend(page.items);
                tracing::debug!(
                    session = %self.session_id,
                    page = next_page,
                    appended,
                    total = state.items.len(),
                    "page appended"
                );
                Ok(ScrollOutcome::Appended(appended))
            }
            Err(err) => {
                tracing::warn!(
                    session = %self.session_id,
                    page = next_page,
                    error = %err,
                    "page fetch failed"
                );
                Err(err)
            }
        }
    }

    /// Snapshot of the accumulated list, in page order.
    pub fn results(&self) -> Vec<CandidateSummary> {
        self.state().items.clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.state().phase
    }

    pub fn current_page(&self) -> u32 {
        self.state().current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.state().total_pages
    }

    pub fn result_count(&self) -> usize {
        self.state().items.len()
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().expect("session state lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NeverFetch;

    impl PageSource for NeverFetch {
        async fn fetch_page(&self, _query: &SearchQuery, _page: u32) -> Result<Page, ApiError> {
            panic!("a pre-computed session must never fetch");
        }
    }

    fn candidate(code: &str) -> CandidateSummary {
        CandidateSummary {
            code: code.to_string(),
            name: format!("pill-{code}"),
            image_url: String::new(),
        }
    }

    #[tokio::test]
    async fn test_precomputed_list_is_single_page() {
        let session = SearchSession::with_results(NeverFetch, vec![candidate("A"), candidate("B")]);
        assert_eq!(session.phase(), SessionPhase::Ready);
        assert_eq!(session.total_pages(), 1);
        assert_eq!(session.current_page(), 1);
        assert_eq!(session.result_count(), 2);

        // Scroll signals never reach the source.
        for _ in 0..3 {
            assert_eq!(session.notify_scroll().await.unwrap(), ScrollOutcome::Ignored);
        }
    }

    #[tokio::test]
    async fn test_precomputed_empty_list_is_empty_phase() {
        let session = SearchSession::with_results(NeverFetch, Vec::new());
        assert_eq!(session.phase(), SessionPhase::Empty);
        assert_eq!(session.notify_scroll().await.unwrap(), ScrollOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_scroll_before_start_is_ignored() {
        let session = SearchSession::new(NeverFetch, SearchQuery::default());
        assert_eq!(session.phase(), SessionPhase::Loading);
        assert_eq!(session.notify_scroll().await.unwrap(), ScrollOutcome::Ignored);
    }
}
