use serde::{Deserialize, Serialize};

/// Sentinel option meaning "no constraint" for a multi-select dimension.
/// It only ever exists in local selection state; it is never transmitted.
pub const SELECT_ALL: &str = "전체";

/// Selectable values per filter dimension, matching the backend's own
/// vocabulary. The sentinel is not part of the catalogs.
pub const SHAPE_OPTIONS: &[&str] = &["원형", "타원형", "장방형"];
pub const FORM_OPTIONS: &[&str] = &["정제", "경질캡슐", "연질캡슐"];
pub const COLOR_OPTIONS: &[&str] = &[
    "빨강", "검정", "하양", "회색", "주황", "노랑", "초록",
    "파랑", "남색", "보라", "분홍", "갈색", "살구",
];

/// Result of a toggle attempt on a [`SelectionSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The selection changed.
    Changed,
    /// The per-dimension cap was reached; state is untouched and the caller
    /// should show a notice.
    AtCapacity,
}

/// Multi-select state for one filter dimension.
///
/// Invariant: the set is never empty. It is either exactly `{전체}` or a
/// non-empty set of concrete values that does not contain the sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSet {
    chosen: Vec<String>,
    cap: usize,
}

impl Default for SelectionSet {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionSet {
    /// Unconstrained selection with no cap.
    pub fn new() -> Self {
        Self {
            chosen: vec![SELECT_ALL.to_string()],
            cap: 0,
        }
    }

    /// Unconstrained selection capped at `cap` concrete values (0 = unlimited).
    pub fn with_cap(cap: usize) -> Self {
        Self { cap, ..Self::new() }
    }

    /// Rebuild selection state from a previously built query value
    /// (comma-joined concrete values, or `None` for unconstrained).
    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() && v != SELECT_ALL => Self {
                chosen: v.split(',').map(str::to_string).collect(),
                cap: 0,
            },
            _ => Self::new(),
        }
    }

    /// Apply one tap on an option button.
    ///
    /// Choosing the sentinel resets to unconstrained. Choosing a concrete
    /// value drops the sentinel; deselecting the last concrete value falls
    /// back to unconstrained. Additions beyond the cap are rejected without
    /// mutating state.
    pub fn toggle(&mut self, label: &str) -> ToggleOutcome {
        if label == SELECT_ALL {
            self.chosen = vec![SELECT_ALL.to_string()];
            return ToggleOutcome::Changed;
        }

        let mut next: Vec<String> = self
            .chosen
            .iter()
            .filter(|v| *v != SELECT_ALL)
            .cloned()
            .collect();

        if let Some(pos) = next.iter().position(|v| v == label) {
            next.remove(pos);
        } else {
            if self.cap > 0 && next.len() >= self.cap {
                return ToggleOutcome::AtCapacity;
            }
            next.push(label.to_string());
        }

        if next.is_empty() {
            next.push(SELECT_ALL.to_string());
        }
        self.chosen = next;
        ToggleOutcome::Changed
    }

    pub fn is_unconstrained(&self) -> bool {
        self.chosen.len() == 1 && self.chosen[0] == SELECT_ALL
    }

    pub fn contains(&self, label: &str) -> bool {
        self.chosen.iter().any(|v| v == label)
    }

    pub fn selected(&self) -> &[String] {
        &self.chosen
    }

    /// The transmitted form: `None` when unconstrained, otherwise the
    /// comma-joined values in selection order.
    pub fn as_query_value(&self) -> Option<String> {
        if self.is_unconstrained() {
            None
        } else {
            Some(self.chosen.join(","))
        }
    }
}

/// Normalized filter criteria ready for transmission. A field is either
/// absent or a non-empty value; the sentinel never appears here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

impl SearchQuery {
    pub fn is_unconstrained(&self) -> bool {
        self.shape.is_none()
            && self.color.is_none()
            && self.form.is_none()
            && self.imprint.is_none()
            && self.name.is_none()
            && self.company.is_none()
    }
}

/// The full filter form: three multi-select dimensions plus free text.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub shapes: SelectionSet,
    pub forms: SelectionSet,
    pub colors: SelectionSet,
    pub imprint: String,
    pub name: String,
    pub company: String,
}

impl SearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the form from an existing query, e.g. when re-entering the
    /// filter screen to refine a previous search. Free-form dosage-form
    /// values are folded onto the three form categories and deduplicated.
    pub fn from_query(query: &SearchQuery) -> Self {
        let forms = match query.form.as_deref() {
            Some(v) if !v.is_empty() && v != SELECT_ALL => {
                let mut mapped: Vec<String> = Vec::new();
                for raw in v.split(',') {
                    let category = map_form_to_category(raw);
                    if !mapped.iter().any(|m| *m == category) {
                        mapped.push(category);
                    }
                }
                let mut set = SelectionSet::new();
                set.chosen = mapped;
                set
            }
            _ => SelectionSet::new(),
        };

        Self {
            shapes: SelectionSet::from_value(query.shape.as_deref()),
            forms,
            colors: SelectionSet::from_value(query.color.as_deref()),
            imprint: query.imprint.clone().unwrap_or_default(),
            name: query.name.clone().unwrap_or_default(),
            company: query.company.clone().unwrap_or_default(),
        }
    }

    /// Normalize the current form state into a transmissible query.
    /// Pure: no I/O, no mutation.
    pub fn build(&self) -> SearchQuery {
        SearchQuery {
            shape: self.shapes.as_query_value(),
            color: self.colors.as_query_value(),
            form: self.forms.as_query_value(),
            imprint: non_empty(&self.imprint),
            name: non_empty(&self.name),
            company: non_empty(&self.company),
        }
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Fold a free-form dosage-form string onto the three selectable categories.
/// Exact catalog values pass through; unknown values fall through unchanged.
pub fn map_form_to_category(raw: &str) -> String {
    if FORM_OPTIONS.contains(&raw) {
        return raw.to_string();
    }
    if raw.contains('정') {
        return "정제".to_string();
    }
    if raw.contains("연질") {
        return "연질캡슐".to_string();
    }
    if raw.contains("캡슐") {
        return "경질캡슐".to_string();
    }
    raw.to_string()
}
