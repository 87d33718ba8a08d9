//! Recent-lookup repository.
//!
//! Injected into the flows instead of living as ambient global state:
//! loaded when a screen is entered, recorded into when a pill is viewed,
//! never persisted by this crate itself.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::ApiError;
use crate::models::candidate::CandidateSummary;

#[allow(async_fn_in_trait)]
pub trait RecentStore {
    /// Recent lookups, newest first.
    async fn recent(&self) -> Result<Vec<CandidateSummary>, ApiError>;

    /// Remember one viewed pill. A pill already present moves to the front
    /// rather than appearing twice.
    async fn record(&self, item: CandidateSummary) -> Result<(), ApiError>;
}

/// Bounded in-memory store, newest first.
pub struct MemoryRecent {
    cap: usize,
    entries: Mutex<VecDeque<CandidateSummary>>,
}

impl MemoryRecent {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            cap,
            entries: Mutex::new(VecDeque::new()),
        }
    }
}

impl RecentStore for MemoryRecent {
    async fn recent(&self) -> Result<Vec<CandidateSummary>, ApiError> {
        let entries = self.entries.lock().expect("recent store lock poisoned");
        Ok(entries.iter().cloned().collect())
    }

    async fn record(&self, item: CandidateSummary) -> Result<(), ApiError> {
        let mut entries = self.entries.lock().expect("recent store lock poisoned");
        if let Some(pos) = entries.iter().position(|e| e.code == item.code) {
            entries.remove(pos);
        }
        entries.push_front(item);
        entries.truncate(self.cap);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(code: &str) -> CandidateSummary {
        CandidateSummary {
            code: code.to_string(),
            name: format!("pill-{code}"),
            image_url: String::new(),
        }
    }

    #[tokio::test]
    async fn test_newest_first() {
        let store = MemoryRecent::with_capacity(5);
        store.record(candidate("A")).await.unwrap();
        store.record(candidate("B")).await.unwrap();

        let recent = store.recent().await.unwrap();
        assert_eq!(recent[0].code, "B");
        assert_eq!(recent[1].code, "A");
    }

    #[tokio::test]
    async fn test_revisit_moves_to_front_without_duplicate() {
        let store = MemoryRecent::with_capacity(5);
        store.record(candidate("A")).await.unwrap();
        store.record(candidate("B")).await.unwrap();
        store.record(candidate("A")).await.unwrap();

        let recent = store.recent().await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].code, "A");
    }

    #[tokio::test]
    async fn test_capacity_drops_oldest() {
        let store = MemoryRecent::with_capacity(2);
        store.record(candidate("A")).await.unwrap();
        store.record(candidate("B")).await.unwrap();
        store.record(candidate("C")).await.unwrap();

        let recent = store.recent().await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].code, "C");
        assert_eq!(recent[1].code, "B");
    }
}
