use crate::models::candidate::{CandidateSummary, ResultGroup};
use crate::models::query::SearchQuery;

/// Explicit message passed from one stage of the flow to the next, instead
/// of implicit navigation side channels: a result-list stage is opened with
/// exactly one of these.
#[derive(Debug, Clone)]
pub enum ResultHandoff {
    /// Image analysis produced one group per detected pill.
    Grouped(Vec<ResultGroup>),
    /// A pre-computed flat candidate list (e.g. one selected group).
    Flat(Vec<CandidateSummary>),
    /// A normalized filter query still to be executed page by page.
    Query(SearchQuery),
}

impl ResultHandoff {
    /// Narrow a grouped result set to the chosen group's candidates.
    /// `None` when the index is out of range.
    pub fn select_group(groups: &[ResultGroup], index: usize) -> Option<ResultHandoff> {
        groups
            .get(index)
            .map(|g| ResultHandoff::Flat(g.candidates.clone()))
    }
}
