//! Debounced search-box state machine.
//!
//! # Responsibility
//! - Coalesce keystrokes into at most one lookup per settled query.
//! - Apply lookup outcomes only when they still belong to the latest input.
//!
//! # Invariants
//! - Time is injected by the caller; the machine never sleeps or spawns.
//! - `generation` increases on every input, so a lookup dispatched for an
//!   older query can never overwrite newer results.
//! - Empty or whitespace-only input clears suggestions synchronously and
//!   never schedules a lookup.

use crate::search::geocode::{GeocodeError, GeocodeResult, PlaceSuggestion};
use std::time::{Duration, Instant};

/// Pause that must elapse after the last keystroke before a lookup fires.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Inline notice shown under the search box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchNotice {
    NoResults,
    Failed,
}

impl SearchNotice {
    /// The short user-facing message.
    pub fn message(self) -> &'static str {
        match self {
            Self::NoResults => "No results",
            Self::Failed => "Search failed",
        }
    }
}

/// A due lookup the caller must dispatch to the geocoder.
///
/// `generation` must be echoed back into [`SearchBox::apply`] so stale
/// completions are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLookup {
    pub generation: u64,
    pub query: String,
}

/// Debounce controller for the place-search box.
#[derive(Debug, Default)]
pub struct SearchBox {
    query: String,
    suggestions: Vec<PlaceSuggestion>,
    notice: Option<SearchNotice>,
    loading: bool,
    deadline: Option<Instant>,
    generation: u64,
}

impl SearchBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn suggestions(&self) -> &[PlaceSuggestion] {
        &self.suggestions
    }

    pub fn notice(&self) -> Option<SearchNotice> {
        self.notice
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Records a keystroke.
    ///
    /// Cancels any pending lookup scheduled by an earlier keystroke still
    /// inside the debounce window and reschedules from `now`. Blank input
    /// clears suggestions and notice immediately without a lookup.
    pub fn input(&mut self, text: impl Into<String>, now: Instant) {
        self.query = text.into();
        self.generation += 1;
        self.deadline = None;

        if self.query.trim().is_empty() {
            self.suggestions.clear();
            self.notice = None;
            self.loading = false;
            return;
        }

        self.loading = true;
        self.notice = None;
        self.deadline = Some(now + SEARCH_DEBOUNCE);
    }

    /// Returns the lookup to dispatch once the debounce window has settled.
    ///
    /// Yields each due lookup exactly once.
    pub fn poll(&mut self, now: Instant) -> Option<PendingLookup> {
        if now < self.deadline? {
            return None;
        }
        self.deadline = None;
        Some(PendingLookup {
            generation: self.generation,
            query: self.query.trim().to_string(),
        })
    }

    /// Applies a lookup outcome.
    ///
    /// Outcomes from a superseded generation are dropped so an older fetch
    /// resolving late can never overwrite a newer query's results.
    pub fn apply(&mut self, generation: u64, outcome: GeocodeResult<Vec<PlaceSuggestion>>) {
        if generation != self.generation {
            return;
        }
        self.loading = false;

        match outcome {
            Ok(suggestions) if suggestions.is_empty() => {
                self.suggestions.clear();
                self.notice = Some(SearchNotice::NoResults);
            }
            Ok(suggestions) => {
                self.suggestions = suggestions;
                self.notice = None;
            }
            Err(GeocodeError::NoResults) => {
                self.suggestions.clear();
                self.notice = Some(SearchNotice::NoResults);
            }
            Err(_) => {
                self.suggestions.clear();
                self.notice = Some(SearchNotice::Failed);
            }
        }
    }

    /// Picks a suggestion by list position.
    ///
    /// Clears the dropdown, echoes the display name into the box, and
    /// returns the coordinate for the caller's view jump.
    pub fn select(&mut self, index: usize) -> Option<(f64, f64)> {
        let chosen = self.suggestions.get(index)?.clone();
        self.query = chosen.display_name;
        self.suggestions.clear();
        self.notice = None;
        Some((chosen.lat, chosen.lng))
    }

    /// The "Go" button: implicit selection of the top suggestion.
    pub fn go(&mut self) -> Option<(f64, f64)> {
        self.select(0)
    }
}
