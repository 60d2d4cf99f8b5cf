use serde::Serialize;

use ordertrack_core::{FALLBACK_RESULT_TYPE, SearchResult};

/// Lifecycle of the live-search panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    /// Nothing typed yet.
    #[default]
    Idle,
    /// Debounce window running or lookup in flight.
    Pending,
    /// Results (possibly zero) for the latest query.
    Showing,
    /// The lookup for the latest query failed.
    Failed,
    Hidden,
}

/// What the results panel should display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PanelView {
    Hidden,
    Loading,
    /// Lookup succeeded with zero matches. The panel stays open.
    NoResults,
    /// Lookup failed; distinct from [`PanelView::NoResults`].
    Failed { message: String },
    Results { rows: Vec<PanelRow> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelRow {
    pub id: String,
    pub name: String,
    /// `code · phone`
    pub secondary: String,
    /// Upper-cased category.
    pub pill: String,
    pub selected: bool,
}

/// Mutable state of one search input.
///
/// `selected` is `None` when no row is highlighted and is always a valid
/// index into `results` otherwise.
#[derive(Debug, Clone)]
pub struct SearchSession {
    query: String,
    results: Vec<SearchResult>,
    selected: Option<usize>,
    phase: SearchPhase,
    failure: Option<String>,
    generation: u64,
    fallback_type: String,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::with_fallback_type(FALLBACK_RESULT_TYPE)
    }
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session whose pills show `fallback_type` for untyped results.
    pub fn with_fallback_type(fallback_type: &str) -> Self {
        Self {
            query: String::new(),
            results: Vec::new(),
            selected: None,
            phase: SearchPhase::Idle,
            failure: None,
            generation: 0,
            fallback_type: fallback_type.to_string(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_result(&self) -> Option<&SearchResult> {
        self.selected.and_then(|i| self.results.get(i))
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    /// Identity of the latest issued query. Bumped on every new query and
    /// on hide, so late responses for anything older can be recognised.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The panel is open and accepts navigation keys.
    pub fn is_open(&self) -> bool {
        matches!(self.phase, SearchPhase::Showing | SearchPhase::Failed)
    }

    // ─── Transitions ───────────────────────────────────────

    /// Start waiting for `query`. Returns the generation its response must carry.
    pub fn begin(&mut self, query: &str) -> u64 {
        self.generation += 1;
        self.query = query.to_string();
        self.results.clear();
        self.selected = None;
        self.failure = None;
        self.phase = SearchPhase::Pending;
        self.generation
    }

    /// Accept a response if it belongs to the latest query.
    pub fn accept(&mut self, generation: u64, results: Vec<SearchResult>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.results = results;
        self.selected = None;
        self.failure = None;
        self.phase = SearchPhase::Showing;
        true
    }

    /// Record a failure if it belongs to the latest query.
    pub fn fail(&mut self, generation: u64, message: impl Into<String>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.results.clear();
        self.selected = None;
        self.failure = Some(message.into());
        self.phase = SearchPhase::Failed;
        true
    }

    pub fn hide(&mut self) {
        self.generation += 1;
        self.results.clear();
        self.selected = None;
        self.failure = None;
        self.phase = SearchPhase::Hidden;
    }

    /// ArrowDown: one row further, stopping at the last row.
    pub fn select_next(&mut self) {
        if self.results.is_empty() {
            return;
        }
        let last = self.results.len() - 1;
        self.selected = Some(match self.selected {
            Some(i) => (i + 1).min(last),
            None => 0,
        });
    }

    /// ArrowUp: one row back, stopping at the first row.
    pub fn select_prev(&mut self) {
        if self.results.is_empty() {
            return;
        }
        self.selected = Some(self.selected.map_or(0, |i| i.saturating_sub(1)));
    }

    // ─── Render ────────────────────────────────────────────

    pub fn view(&self) -> PanelView {
        match self.phase {
            SearchPhase::Idle | SearchPhase::Hidden => PanelView::Hidden,
            SearchPhase::Pending => PanelView::Loading,
            SearchPhase::Failed => PanelView::Failed {
                message: self.failure.clone().unwrap_or_default(),
            },
            SearchPhase::Showing if self.results.is_empty() => PanelView::NoResults,
            SearchPhase::Showing => PanelView::Results {
                rows: self
                    .results
                    .iter()
                    .enumerate()
                    .map(|(i, r)| PanelRow {
                        id: r.id.clone(),
                        name: r.name.clone(),
                        secondary: r.secondary(),
                        pill: r.category_or(&self.fallback_type).to_uppercase(),
                        selected: self.selected == Some(i),
                    })
                    .collect(),
            },
        }
    }
}
