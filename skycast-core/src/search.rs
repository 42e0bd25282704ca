//! Search/suggest flow: debounced geocoding lookups, a keyboard-navigable
//! suggestion list, and the recent-searches ring.
//!
//! The flow is a pure state machine. It never owns a timer or a socket;
//! the event loop feeds it keystrokes with the current instant, polls
//! [`SearchFlow::take_due_lookup`] to learn when a lookup should actually
//! be issued, and hands back results via [`SearchFlow::apply_suggestions`].
//! Staleness is enforced with a keystroke generation counter: a resolved
//! lookup is applied only if no newer keystroke occurred since it was
//! scheduled.

use std::time::{Duration, Instant};

use crate::model::GeoSuggestion;

/// Quiet period after the last keystroke before a lookup is issued.
pub const DEBOUNCE: Duration = Duration::from_millis(300);

/// Inputs of this length or shorter never trigger a lookup.
pub const MIN_QUERY_CHARS: usize = 2;

/// Cap on the recent-searches ring.
pub const MAX_RECENT: usize = 5;

/// How many suggestions to request from the geocoding endpoint.
pub const SUGGESTION_LIMIT: usize = 5;

/// A scheduled geocoding lookup, handed to the event loop once its quiet
/// period has elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionLookup {
    /// Keystroke generation at scheduling time; echo it back into
    /// [`SearchFlow::apply_suggestions`].
    pub generation: u64,
    pub query: String,
}

#[derive(Debug, Clone)]
struct PendingLookup {
    generation: u64,
    query: String,
    due: Instant,
}

#[derive(Debug)]
pub struct SearchFlow {
    input: String,
    recent: Vec<String>,
    suggestions: Vec<GeoSuggestion>,
    highlighted: Option<usize>,
    generation: u64,
    pending: Option<PendingLookup>,
}

impl SearchFlow {
    /// Build the flow, seeding the recent list from durable storage.
    /// Anything past the cap (or duplicated) in the persisted copy is
    /// dropped on the way in.
    pub fn new(mut recent: Vec<String>) -> Self {
        let mut seen: Vec<String> = Vec::new();
        recent.retain(|entry| {
            if seen.contains(entry) {
                false
            } else {
                seen.push(entry.clone());
                true
            }
        });
        recent.truncate(MAX_RECENT);

        Self {
            input: String::new(),
            recent,
            suggestions: Vec::new(),
            highlighted: None,
            generation: 0,
            pending: None,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn recent(&self) -> &[String] {
        &self.recent
    }

    pub fn suggestions(&self) -> &[GeoSuggestion] {
        &self.suggestions
    }

    pub fn has_suggestions(&self) -> bool {
        !self.suggestions.is_empty()
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// Record a text change. Schedules a debounced lookup when the trimmed
    /// input is long enough; otherwise clears any shown suggestions and
    /// cancels the pending lookup.
    pub fn set_input(&mut self, text: String, now: Instant) {
        self.input = text;
        self.generation += 1;
        self.highlighted = None;

        let trimmed = self.input.trim();
        if trimmed.chars().count() >= MIN_QUERY_CHARS {
            self.pending = Some(PendingLookup {
                generation: self.generation,
                query: trimmed.to_string(),
                due: now + DEBOUNCE,
            });
        } else {
            self.pending = None;
            self.suggestions.clear();
        }
    }

    /// Hand out the pending lookup once its quiet period has elapsed.
    /// Returns at most one lookup per scheduling.
    pub fn take_due_lookup(&mut self, now: Instant) -> Option<SuggestionLookup> {
        if self.pending.as_ref().is_some_and(|p| now >= p.due) {
            let p = self.pending.take().expect("pending lookup checked above");
            Some(SuggestionLookup {
                generation: p.generation,
                query: p.query,
            })
        } else {
            None
        }
    }

    /// Instant at which the pending lookup becomes due, for event-loop poll
    /// timeouts.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    /// Apply a resolved lookup. Responses superseded by a newer keystroke
    /// are discarded; returns whether the list was replaced.
    pub fn apply_suggestions(&mut self, generation: u64, results: Vec<GeoSuggestion>) -> bool {
        if generation != self.generation {
            tracing::debug!("dropping stale suggestion response (gen {generation})");
            return false;
        }

        self.suggestions = results;
        self.highlighted = None;
        true
    }

    /// ArrowDown: advance the highlight circularly.
    pub fn highlight_next(&mut self) {
        if self.suggestions.is_empty() {
            return;
        }
        self.highlighted = Some(match self.highlighted {
            Some(i) => (i + 1) % self.suggestions.len(),
            None => 0,
        });
    }

    /// ArrowUp: move the highlight circularly backward.
    pub fn highlight_prev(&mut self) {
        if self.suggestions.is_empty() {
            return;
        }
        let len = self.suggestions.len();
        self.highlighted = Some(match self.highlighted {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        });
    }

    /// Escape or a click outside the control: hide the list without
    /// submitting. In-flight lookups keep running; their results are
    /// dropped by the generation check.
    pub fn dismiss_suggestions(&mut self) {
        self.generation += 1;
        self.pending = None;
        self.suggestions.clear();
        self.highlighted = None;
    }

    /// Commit the highlighted suggestion (Enter or click). Sets the display
    /// label as the input text, records it in the recent list, and returns
    /// the query to search for.
    pub fn commit_highlighted(&mut self) -> Option<String> {
        let suggestion = self.highlighted.and_then(|i| self.suggestions.get(i))?;
        let label = suggestion.display_label();

        self.input = label.clone();
        self.dismiss_suggestions();
        self.record_recent(&label);
        Some(label)
    }

    /// Submit the raw input (Enter without a highlight, or explicit
    /// submit). Whitespace-only input is a no-op.
    pub fn submit(&mut self) -> Option<String> {
        let query = self.input.trim().to_string();
        if query.is_empty() {
            return None;
        }

        self.dismiss_suggestions();
        self.record_recent(&query);
        Some(query)
    }

    /// Re-run a recent search. Sets it as the input text and returns the
    /// query; the entry is already in the list, so nothing is re-added.
    pub fn select_recent(&mut self, index: usize) -> Option<String> {
        let entry = self.recent.get(index)?.clone();
        self.input = entry.clone();
        self.dismiss_suggestions();
        Some(entry)
    }

    pub fn clear_recent(&mut self) {
        self.recent.clear();
    }

    /// Duplicates are skipped, not reordered; the oldest entry falls off
    /// the end once the cap is reached.
    fn record_recent(&mut self, query: &str) {
        if self.recent.iter().any(|r| r == query) {
            return;
        }
        self.recent.insert(0, query.to_string());
        self.recent.truncate(MAX_RECENT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion(name: &str) -> GeoSuggestion {
        GeoSuggestion {
            name: name.to_string(),
            state: None,
            country: "GB".to_string(),
        }
    }

    fn three_suggestions(flow: &mut SearchFlow, now: Instant) {
        flow.set_input("Lon".to_string(), now);
        let lookup = flow.take_due_lookup(now + DEBOUNCE).expect("lookup due");
        assert!(flow.apply_suggestions(
            lookup.generation,
            vec![suggestion("London"), suggestion("Londonderry"), suggestion("Long Eaton")],
        ));
    }

    #[test]
    fn rapid_keystrokes_issue_one_lookup_for_the_final_text() {
        let start = Instant::now();
        let mut flow = SearchFlow::new(Vec::new());

        flow.set_input("Lon".to_string(), start);
        flow.set_input("Lond".to_string(), start + Duration::from_millis(100));
        flow.set_input("London".to_string(), start + Duration::from_millis(200));

        // Not yet quiet for 300ms after the last keystroke.
        assert_eq!(flow.take_due_lookup(start + Duration::from_millis(400)), None);

        let lookup = flow
            .take_due_lookup(start + Duration::from_millis(500))
            .expect("due after quiet period");
        assert_eq!(lookup.query, "London");

        // Only one lookup per scheduling.
        assert_eq!(flow.take_due_lookup(start + Duration::from_millis(600)), None);
    }

    #[test]
    fn pausing_after_each_keystroke_issues_one_lookup_per_pause() {
        let start = Instant::now();
        let mut flow = SearchFlow::new(Vec::new());

        flow.set_input("Lon".to_string(), start);
        let first = flow.take_due_lookup(start + DEBOUNCE).expect("first lookup");
        assert_eq!(first.query, "Lon");

        let later = start + Duration::from_secs(1);
        flow.set_input("Lond".to_string(), later);
        let second = flow.take_due_lookup(later + DEBOUNCE).expect("second lookup");
        assert_eq!(second.query, "Lond");
    }

    #[test]
    fn short_input_never_schedules_and_clears_suggestions() {
        let start = Instant::now();
        let mut flow = SearchFlow::new(Vec::new());

        three_suggestions(&mut flow, start);
        assert!(flow.has_suggestions());

        flow.set_input("L".to_string(), start + Duration::from_secs(1));
        assert!(!flow.has_suggestions());
        assert_eq!(flow.take_due_lookup(start + Duration::from_secs(2)), None);

        flow.set_input(String::new(), start + Duration::from_secs(3));
        assert_eq!(flow.take_due_lookup(start + Duration::from_secs(4)), None);
    }

    #[test]
    fn whitespace_around_input_is_not_a_query() {
        let start = Instant::now();
        let mut flow = SearchFlow::new(Vec::new());

        flow.set_input("  Lo  ".to_string(), start);
        let lookup = flow.take_due_lookup(start + DEBOUNCE).expect("lookup");
        assert_eq!(lookup.query, "Lo");

        flow.set_input("  L ".to_string(), start + Duration::from_secs(1));
        assert_eq!(flow.take_due_lookup(start + Duration::from_secs(2)), None);
    }

    #[test]
    fn stale_responses_are_discarded() {
        let start = Instant::now();
        let mut flow = SearchFlow::new(Vec::new());

        flow.set_input("Par".to_string(), start);
        let stale = flow.take_due_lookup(start + DEBOUNCE).expect("stale lookup");

        // A newer keystroke supersedes the in-flight lookup.
        flow.set_input("Pari".to_string(), start + Duration::from_secs(1));

        assert!(!flow.apply_suggestions(stale.generation, vec![suggestion("Paris")]));
        assert!(!flow.has_suggestions());

        let fresh = flow
            .take_due_lookup(start + Duration::from_secs(2))
            .expect("fresh lookup");
        assert!(flow.apply_suggestions(fresh.generation, vec![suggestion("Paris")]));
        assert!(flow.has_suggestions());
    }

    #[test]
    fn applying_suggestions_resets_the_highlight() {
        let start = Instant::now();
        let mut flow = SearchFlow::new(Vec::new());

        three_suggestions(&mut flow, start);
        flow.highlight_next();
        assert_eq!(flow.highlighted(), Some(0));

        let later = start + Duration::from_secs(1);
        flow.set_input("Lond".to_string(), later);
        let lookup = flow.take_due_lookup(later + DEBOUNCE).expect("lookup");
        assert!(flow.apply_suggestions(lookup.generation, vec![suggestion("London")]));
        assert_eq!(flow.highlighted(), None);
    }

    #[test]
    fn arrows_wrap_circularly() {
        let start = Instant::now();
        let mut flow = SearchFlow::new(Vec::new());
        three_suggestions(&mut flow, start);

        // Down from no highlight lands on the first entry.
        flow.highlight_next();
        assert_eq!(flow.highlighted(), Some(0));
        flow.highlight_next();
        flow.highlight_next();
        assert_eq!(flow.highlighted(), Some(2));

        // Wrap from last to first...
        flow.highlight_next();
        assert_eq!(flow.highlighted(), Some(0));

        // ...and from first back to last.
        flow.highlight_prev();
        assert_eq!(flow.highlighted(), Some(2));
    }

    #[test]
    fn arrows_do_nothing_without_suggestions() {
        let mut flow = SearchFlow::new(Vec::new());
        flow.highlight_next();
        flow.highlight_prev();
        assert_eq!(flow.highlighted(), None);
    }

    #[test]
    fn committing_a_suggestion_builds_the_display_label() {
        let start = Instant::now();
        let mut flow = SearchFlow::new(Vec::new());

        flow.set_input("Springf".to_string(), start);
        let lookup = flow.take_due_lookup(start + DEBOUNCE).expect("lookup");
        flow.apply_suggestions(
            lookup.generation,
            vec![GeoSuggestion {
                name: "Springfield".to_string(),
                state: Some("Illinois".to_string()),
                country: "US".to_string(),
            }],
        );

        flow.highlight_next();
        let query = flow.commit_highlighted().expect("committed");
        assert_eq!(query, "Springfield, Illinois, US");
        assert_eq!(flow.input(), "Springfield, Illinois, US");
        assert_eq!(flow.recent(), ["Springfield, Illinois, US"]);
        assert!(!flow.has_suggestions());
    }

    #[test]
    fn commit_without_highlight_is_a_no_op() {
        let start = Instant::now();
        let mut flow = SearchFlow::new(Vec::new());
        three_suggestions(&mut flow, start);

        assert_eq!(flow.commit_highlighted(), None);
        assert!(flow.has_suggestions());
    }

    #[test]
    fn submit_trims_and_rejects_empty_input() {
        let mut flow = SearchFlow::new(Vec::new());

        flow.input = "  London  ".to_string();
        assert_eq!(flow.submit(), Some("London".to_string()));
        assert_eq!(flow.recent(), ["London"]);

        flow.input = "   ".to_string();
        assert_eq!(flow.submit(), None);
        assert_eq!(flow.recent(), ["London"]);
    }

    #[test]
    fn recent_list_caps_at_five_and_skips_duplicates() {
        let mut flow = SearchFlow::new(Vec::new());

        for city in ["A", "B", "C", "D", "E"] {
            flow.input = city.to_string();
            flow.submit();
        }
        assert_eq!(flow.recent(), ["E", "D", "C", "B", "A"]);

        // A duplicate is skipped, not moved to the front.
        flow.input = "C".to_string();
        flow.submit();
        assert_eq!(flow.recent(), ["E", "D", "C", "B", "A"]);

        // A sixth distinct entry drops the oldest.
        flow.input = "F".to_string();
        flow.submit();
        assert_eq!(flow.recent(), ["F", "E", "D", "C", "B"]);
    }

    #[test]
    fn selecting_a_recent_entry_does_not_reorder() {
        let mut flow = SearchFlow::new(vec!["Paris".to_string(), "Berlin".to_string()]);

        let query = flow.select_recent(1).expect("recent entry");
        assert_eq!(query, "Berlin");
        assert_eq!(flow.input(), "Berlin");
        assert_eq!(flow.recent(), ["Paris", "Berlin"]);

        assert_eq!(flow.select_recent(5), None);
    }

    #[test]
    fn seeded_recent_list_is_sanitized() {
        let flow = SearchFlow::new(vec![
            "A".to_string(),
            "B".to_string(),
            "A".to_string(),
            "C".to_string(),
            "D".to_string(),
            "E".to_string(),
            "F".to_string(),
        ]);
        assert_eq!(flow.recent(), ["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn dismissal_hides_the_list_and_drops_late_responses() {
        let start = Instant::now();
        let mut flow = SearchFlow::new(Vec::new());

        flow.set_input("Ber".to_string(), start);
        let lookup = flow.take_due_lookup(start + DEBOUNCE).expect("lookup");

        flow.dismiss_suggestions();
        assert!(!flow.apply_suggestions(lookup.generation, vec![suggestion("Berlin")]));
        assert!(!flow.has_suggestions());
    }
}
