use serde::{Deserialize, Serialize};

/// Minimal displayable identity of one matched pill.
///
/// `image_url` is always the proxy-wrapped form; the raw backend URL never
/// leaves the wire layer. An empty string means the backend supplied no
/// image for this candidate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CandidateSummary {
    pub code: String,
    pub name: String,
    pub image_url: String,
}

/// All plausible matches for a single pill detected in one image, in the
/// server's ranking order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultGroup {
    pub candidates: Vec<CandidateSummary>,
}

impl ResultGroup {
    /// The best-ranked candidate, used as the group's display face.
    /// `None` for an empty group, which is valid and simply skipped by
    /// consumers.
    pub fn representative(&self) -> Option<&CandidateSummary> {
        self.candidates.first()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }
}

/// One fetch unit of a paginated search result set.
#[derive(Debug, Clone)]
pub struct Page {
    /// 1-based page number.
    pub number: u32,
    /// Server-reported page count. Fixed for a query lifetime once known.
    pub total_pages: u32,
    pub items: Vec<CandidateSummary>,
}

/// Outcome of a finished analysis job: the annotated source image (may be
/// empty if the backend sent none) and one group per detected pill.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub processed_image: Vec<u8>,
    pub groups: Vec<ResultGroup>,
}

impl AnalysisOutcome {
    /// True when the analysis finished but found nothing to match. This is
    /// the "no candidates" empty state, not an error.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
