//! Debounced, keyboard-navigable customer search.
//!
//! Each keystroke aborts the scheduled lookup and starts a fresh debounce
//! window, so a burst of typing issues one request for the final text. The
//! session's generation number decides whether a response is still wanted:
//! anything issued before the latest keystroke or hide is dropped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::debug;

use ordertrack_core::{Navigator, Popup, PopupSink};

use crate::client::Lookup;
use crate::session::{PanelView, SearchPhase, SearchSession};

/// Shown in the panel when a lookup fails.
pub const FAILED_MESSAGE: &str = "Search failed. Press Enter to retry.";

/// Shown when Enter is pressed on an empty result list.
pub const NO_MATCH_MESSAGE: &str = "No customers found";

/// Draws the results panel.
///
/// Called with the session locked, so draws arrive in state order. An
/// implementation must not call back into [`LiveSearch`].
pub trait PanelRenderer: Send + Sync {
    fn render(&self, view: &PanelView);
}

/// Outputs the controller drives.
#[derive(Clone)]
pub struct SearchPorts {
    pub renderer: Arc<dyn PanelRenderer>,
    pub navigator: Arc<dyn Navigator>,
    pub popups: Arc<dyn PopupSink>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKey {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
    Other,
}

impl SearchKey {
    /// Map a DOM `KeyboardEvent.key` name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowDown" | "Down" => Self::ArrowDown,
            "ArrowUp" | "Up" => Self::ArrowUp,
            "Enter" => Self::Enter,
            "Escape" | "Esc" => Self::Escape,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Ignored,
    Handled,
    /// Handled, and the host must suppress the key's default action (scrolling).
    HandledPreventDefault,
}

impl KeyOutcome {
    pub fn prevents_default(&self) -> bool {
        matches!(self, Self::HandledPreventDefault)
    }
}

enum Commit {
    Navigate(String),
    NoMatches,
    Ambiguous,
    Retry(String),
}

fn lock(session: &Mutex<SearchSession>) -> MutexGuard<'_, SearchSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

// ─── LiveSearch ──────────────────────────────────────────────────────────────

/// Controller for one search input and its results panel.
///
/// Must be driven from inside a tokio runtime.
pub struct LiveSearch {
    lookup: Arc<dyn Lookup>,
    ports: SearchPorts,
    debounce: Duration,
    session: Arc<Mutex<SearchSession>>,
    pending: Option<JoinHandle<()>>,
}

impl LiveSearch {
    pub fn new(lookup: Arc<dyn Lookup>, ports: SearchPorts, debounce: Duration) -> Self {
        Self {
            lookup,
            ports,
            debounce,
            session: Arc::new(Mutex::new(SearchSession::new())),
            pending: None,
        }
    }

    /// Show `fallback_type` in the pill of results the endpoint left untyped.
    pub fn with_fallback_type(self, fallback_type: &str) -> Self {
        *lock(&self.session) = SearchSession::with_fallback_type(fallback_type);
        self
    }

    /// The input's text changed.
    pub fn input(&mut self, text: &str) {
        self.cancel_pending();
        let query = text.trim();
        if query.is_empty() {
            self.hide();
            return;
        }
        let generation = self.update(|s| s.begin(query));
        self.schedule(generation, query.to_string(), self.debounce);
    }

    pub fn key(&mut self, key: SearchKey) -> KeyOutcome {
        let phase = lock(&self.session).phase();

        if key == SearchKey::Escape {
            if matches!(phase, SearchPhase::Idle | SearchPhase::Hidden) {
                return KeyOutcome::Ignored;
            }
            self.dismiss();
            return KeyOutcome::Handled;
        }

        if !matches!(phase, SearchPhase::Showing | SearchPhase::Failed) {
            return KeyOutcome::Ignored;
        }

        match key {
            SearchKey::ArrowDown => {
                self.update(SearchSession::select_next);
                KeyOutcome::HandledPreventDefault
            }
            SearchKey::ArrowUp => {
                self.update(SearchSession::select_prev);
                KeyOutcome::HandledPreventDefault
            }
            SearchKey::Enter => {
                self.commit();
                KeyOutcome::Handled
            }
            SearchKey::Escape | SearchKey::Other => KeyOutcome::Ignored,
        }
    }

    /// A rendered row was clicked; navigates regardless of keyboard selection.
    pub fn click_result(&mut self, index: usize) -> bool {
        let target = lock(&self.session)
            .results()
            .get(index)
            .map(|r| r.detail_path());
        match target {
            Some(target) => {
                self.cancel_pending();
                self.ports.navigator.navigate(&target);
                true
            }
            None => false,
        }
    }

    /// Pointer interaction outside the input and panel, or blur.
    pub fn dismiss(&mut self) {
        self.cancel_pending();
        self.hide();
    }

    pub fn view(&self) -> PanelView {
        lock(&self.session).view()
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> SearchSession {
        lock(&self.session).clone()
    }

    fn commit(&mut self) {
        let action = {
            let session = lock(&self.session);
            if session.phase() == SearchPhase::Failed {
                Commit::Retry(session.query().to_string())
            } else if let Some(result) = session.selected_result() {
                Commit::Navigate(result.detail_path())
            } else {
                match session.results() {
                    [] => Commit::NoMatches,
                    [only] => Commit::Navigate(only.detail_path()),
                    _ => Commit::Ambiguous,
                }
            }
        };

        match action {
            Commit::Navigate(target) => {
                self.cancel_pending();
                self.ports.navigator.navigate(&target);
            }
            Commit::NoMatches => self.ports.popups.show(Popup::error(NO_MATCH_MESSAGE)),
            Commit::Ambiguous => {}
            Commit::Retry(query) => {
                self.cancel_pending();
                let generation = self.update(|s| s.begin(&query));
                self.schedule(generation, query, Duration::ZERO);
            }
        }
    }

    fn hide(&mut self) {
        self.update(SearchSession::hide);
    }

    /// Apply `change` and draw the new state before releasing the session.
    fn update<R>(&self, change: impl FnOnce(&mut SearchSession) -> R) -> R {
        let mut session = lock(&self.session);
        let out = change(&mut session);
        self.ports.renderer.render(&session.view());
        out
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    fn schedule(&mut self, generation: u64, query: String, delay: Duration) {
        let lookup = Arc::clone(&self.lookup);
        let session = Arc::clone(&self.session);
        let renderer = Arc::clone(&self.ports.renderer);

        self.pending = Some(tokio::spawn(async move {
            if !delay.is_zero() {
                sleep(delay).await;
            }
            debug!(%query, generation, "issuing search");
            let outcome = lookup.search(&query).await;

            let mut state = lock(&session);
            let accepted = match outcome {
                Ok(results) => state.accept(generation, results),
                Err(e) => {
                    debug!(%query, error = %e, "search failed");
                    state.fail(generation, FAILED_MESSAGE)
                }
            };
            if !accepted {
                debug!(%query, generation, "discarding stale search response");
                return;
            }
            renderer.render(&state.view());
        }));
    }
}

impl Drop for LiveSearch {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
