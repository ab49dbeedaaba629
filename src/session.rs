//! One user's search box: input in, debounced results and suggestions out.
//!
//! The session owns the engine and the history store it was given. Typing
//! schedules a match after the debounce delay; clearing the box, switching
//! category or toggling fuzzy mode schedules one immediately. `poll` runs
//! whatever is due and lets the history store write owed changes.
//!
//! Only typed queries are recorded in history; reruns of the same text for
//! another category or mode are not.

use jiff::{SignedDuration, Timestamp};
use std::sync::Arc;

use crate::clock::Clock;
use crate::debounce::Debouncer;
use crate::history::{SearchHistory, SearchMode};
use crate::render::{group_by_category, CategoryGroup};
use crate::search::{SearchEngine, SearchResult, ALL_CATEGORIES};
use crate::suggest::Suggestion;

#[derive(Debug, Clone, PartialEq)]
struct PendingSearch {
    query: String,
    category: String,
    fuzzy: bool,
}

pub struct SearchSession {
    engine: SearchEngine,
    history: SearchHistory,
    clock: Arc<dyn Clock>,
    debounce: SignedDuration,
    pending: Debouncer<PendingSearch>,
    query: String,
    category: String,
    fuzzy: bool,
    typed: bool,
    results: Vec<SearchResult>,
}

impl SearchSession {
    pub fn new(
        engine: SearchEngine,
        history: SearchHistory,
        clock: Arc<dyn Clock>,
        debounce: SignedDuration,
        fuzzy: bool,
    ) -> Self {
        let results = engine.search("", ALL_CATEGORIES, fuzzy);
        SearchSession {
            engine,
            history,
            clock,
            debounce,
            pending: Debouncer::new(),
            query: String::new(),
            category: ALL_CATEGORIES.to_string(),
            fuzzy,
            typed: false,
            results,
        }
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.typed = true;
        let delay = if query.trim().is_empty() {
            SignedDuration::ZERO
        } else {
            self.debounce
        };
        self.schedule(delay);
    }

    pub fn set_category(&mut self, category: &str) {
        self.category = category.to_string();
        self.schedule(SignedDuration::ZERO);
    }

    pub fn set_fuzzy(&mut self, fuzzy: bool) {
        self.fuzzy = fuzzy;
        self.schedule(SignedDuration::ZERO);
    }

    /// Run a due search, if any. Returns true when results changed.
    pub fn poll(&mut self) -> bool {
        let ran = match self.pending.take_due(self.clock.now()) {
            Some(search) => {
                self.execute(search);
                true
            }
            None => false,
        };
        self.history.tick();
        ran
    }

    /// Skip the debounce and run the pending search now.
    pub fn run_now(&mut self) -> bool {
        match self.pending.cancel() {
            Some(search) => {
                self.execute(search);
                true
            }
            None => false,
        }
    }

    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.pending.deadline()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn fuzzy(&self) -> bool {
        self.fuzzy
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn grouped(&self) -> Vec<CategoryGroup<'_>> {
        group_by_category(&self.results)
    }

    pub fn suggestions(&self) -> Vec<Suggestion> {
        let limit = self.history.settings().max_suggestions;
        self.history.get_suggestions(&self.query, limit)
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut SearchHistory {
        &mut self.history
    }

    fn schedule(&mut self, delay: SignedDuration) {
        let search = PendingSearch {
            query: self.query.clone(),
            category: self.category.clone(),
            fuzzy: self.fuzzy,
        };
        self.pending.schedule(search, delay, self.clock.now());
    }

    fn execute(&mut self, search: PendingSearch) {
        self.results = self.engine.search(&search.query, &search.category, search.fuzzy);
        log::debug!(
            "Search {:?} in {} matched {} settings",
            search.query,
            search.category,
            self.results.len()
        );
        if std::mem::take(&mut self.typed) && !search.query.trim().is_empty() {
            self.history
                .add_search(&search.query, &self.results, SearchMode::from_fuzzy(search.fuzzy));
        }
    }
}
