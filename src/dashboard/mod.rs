//! The drafts list controller.
//!
//! Filters and pagination live in [`QueryState`]. Changing status, date range or page
//! requests a fetch for the next [`Dashboard::tick`]; search text goes through a
//! [`Debouncer`] first. Each dispatched fetch carries a generation number and only
//! the newest generation is ever applied, so a slow response to an older query
//! cannot overwrite a fresher one. Mutations never patch the list locally: a
//! successful mutation requests a refetch of the current query.

mod debounce;
mod fetch;
mod mutation;
mod query;
mod view;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::models::{DateRange, DraftListQuery, DraftListResult, DraftStats, DraftSummary, StatusFilter};
use crate::services::DraftsApi;

use debounce::Debouncer;
use fetch::{FetchOutcome, FetchTracker};
use query::QueryState;
use view::{list_view, ViewInput};

pub use mutation::{Mutation, MutationError, MutationKind, MutationOutcome};
pub use view::{available_actions, EmptyState, ListBody, ListView, RowAction};

pub struct Dashboard {
    query: QueryState,
    search_gate: Debouncer<String>,
    fetch_requested: bool,
    tracker: FetchTracker,

    // Last good result
    result: DraftListResult,
    revealed_at: Option<Instant>,
    pub fetch_error: Option<String>,

    mutation_pending: Option<(String, MutationKind)>,
    pub mutation_error: Option<MutationError>,

    api: Arc<dyn DraftsApi>,
    fetch_tx: mpsc::Sender<FetchOutcome>,
    fetch_rx: mpsc::Receiver<FetchOutcome>,
    mutation_tx: mpsc::Sender<MutationOutcome>,
    mutation_rx: mpsc::Receiver<MutationOutcome>,
}

impl Dashboard {
    /// The first tick fetches the default query.
    pub fn new(api: Arc<dyn DraftsApi>, search_debounce: Duration) -> Self {
        let (fetch_tx, fetch_rx) = mpsc::channel(8);
        let (mutation_tx, mutation_rx) = mpsc::channel(1);

        Self {
            query: QueryState::default(),
            search_gate: Debouncer::new(search_debounce),
            fetch_requested: true,
            tracker: FetchTracker::default(),
            result: DraftListResult::default(),
            revealed_at: None,
            fetch_error: None,
            mutation_pending: None,
            mutation_error: None,
            api,
            fetch_tx,
            fetch_rx,
            mutation_tx,
            mutation_rx,
        }
    }

    pub fn query(&self) -> &DraftListQuery {
        self.query.query()
    }

    pub fn items(&self) -> &[DraftSummary] {
        &self.result.drafts
    }

    pub fn stats(&self) -> &DraftStats {
        &self.result.stats
    }

    pub fn total(&self) -> u64 {
        self.result.total
    }

    pub fn total_pages(&self) -> u32 {
        self.result.total_pages
    }

    pub fn loading(&self) -> bool {
        self.tracker.in_flight()
    }

    #[cfg(test)]
    pub fn fetches_issued(&self) -> u64 {
        self.tracker.issued()
    }

    pub fn search_pending(&self) -> bool {
        self.search_gate.is_pending()
    }

    pub fn mutation_pending(&self) -> Option<&(String, MutationKind)> {
        self.mutation_pending.as_ref()
    }

    // Filter mutators

    pub fn set_status(&mut self, status: StatusFilter) {
        if self.query.set_status(status) {
            self.request_fetch();
        }
    }

    pub fn set_date_range(&mut self, date_range: DateRange) {
        if self.query.set_date_range(date_range) {
            self.request_fetch();
        }
    }

    pub fn set_page(&mut self, page: u32) {
        if self.query.set_page(page) {
            self.request_fetch();
        }
    }

    pub fn set_search(&mut self, search: &str, now: Instant) {
        if self.query.set_search(search) {
            self.search_gate.push(search.to_string(), now);
        }
    }

    /// Resets every filter in one step and issues exactly one fetch for it.
    pub fn clear_all(&mut self) {
        self.query.clear_all();
        self.search_gate.cancel();
        self.request_fetch();
    }

    /// Refetch the current query, e.g. to retry after an error.
    pub fn refresh(&mut self) {
        self.request_fetch();
    }

    fn request_fetch(&mut self) {
        self.fetch_requested = true;
    }

    /// Fires a due debounced search and dispatches at most one fetch.
    /// Returns true when a fetch was dispatched.
    pub fn tick(&mut self, now: Instant) -> bool {
        if let Some(search) = self.search_gate.poll(now) {
            tracing::debug!("Debounced search fired: {:?}", search);
            self.query.reset_page();
            self.fetch_requested = true;
        }

        if !self.fetch_requested {
            return false;
        }
        self.fetch_requested = false;
        self.dispatch_fetch();
        true
    }

    fn dispatch_fetch(&mut self) {
        let generation = self.tracker.begin();
        let query = self.query.query().clone();
        let api = Arc::clone(&self.api);
        let tx = self.fetch_tx.clone();

        tracing::debug!("Dispatching fetch #{} for {:?}", generation, query);

        tokio::spawn(async move {
            let result = api.list_drafts(&query).await.map_err(|e| e.to_string());
            let _ = tx.send(FetchOutcome { generation, result }).await;
        });
    }

    /// Poll for completed fetches (non-blocking)
    pub fn poll_fetch_result(&mut self, now: Instant) {
        while let Ok(outcome) = self.fetch_rx.try_recv() {
            self.apply_fetch(outcome, now);
        }
    }

    /// Waits for the next fetch outcome and applies it.
    /// Returns whether it was applied (`false` for a superseded response).
    pub async fn recv_fetch(&mut self) -> Option<bool> {
        let outcome = self.fetch_rx.recv().await?;
        Some(self.apply_fetch(outcome, Instant::now()))
    }

    /// Waits until the newest dispatched fetch has landed.
    pub async fn settle_fetch(&mut self) {
        while self.loading() {
            if self.recv_fetch().await.is_none() {
                break;
            }
        }
    }

    fn apply_fetch(&mut self, outcome: FetchOutcome, now: Instant) -> bool {
        if !self.tracker.complete(outcome.generation) {
            tracing::debug!(
                "Discarding stale response #{} (latest is #{})",
                outcome.generation,
                self.tracker.issued()
            );
            return false;
        }

        match outcome.result {
            Ok(result) => {
                self.result = result;
                self.fetch_error = None;
                self.revealed_at = Some(now);
            }
            Err(e) => {
                tracing::warn!("Failed to load drafts: {}", e);
                self.fetch_error = Some(e);
            }
        }
        true
    }

    // Mutations

    /// Starts a mutation unless one is already running. Returns whether it started.
    pub fn mutate(&mut self, mutation: Mutation) -> bool {
        if self.mutation_pending.is_some() {
            return false;
        }

        self.mutation_pending = Some((mutation.draft_id().to_string(), mutation.kind()));
        self.mutation_error = None;

        let api = Arc::clone(&self.api);
        let tx = self.mutation_tx.clone();

        tokio::spawn(async move {
            let result = mutation.apply(api).await.map_err(|e| e.to_string());
            let _ = tx
                .send(MutationOutcome {
                    draft_id: mutation.draft_id().to_string(),
                    kind: mutation.kind(),
                    result,
                })
                .await;
        });

        true
    }

    /// Poll for a completed mutation (non-blocking)
    pub fn poll_mutation_result(&mut self) -> Option<MutationOutcome> {
        let outcome = self.mutation_rx.try_recv().ok()?;
        self.apply_mutation(&outcome);
        Some(outcome)
    }

    #[cfg(test)]
    pub async fn settle_mutation(&mut self) -> Option<MutationOutcome> {
        if self.mutation_pending.is_none() {
            return None;
        }
        let outcome = self.mutation_rx.recv().await?;
        self.apply_mutation(&outcome);
        Some(outcome)
    }

    fn apply_mutation(&mut self, outcome: &MutationOutcome) {
        self.mutation_pending = None;

        match &outcome.result {
            Ok(_) => {
                tracing::info!("Draft {} {} succeeded", outcome.draft_id, outcome.kind.label());
                self.mutation_error = None;
                self.request_fetch();
            }
            Err(e) => {
                tracing::error!("Failed to {} draft {}: {}", outcome.kind.label(), outcome.draft_id, e);
                self.mutation_error = Some(MutationError {
                    draft_id: outcome.draft_id.clone(),
                    kind: outcome.kind,
                    message: e.clone(),
                });
            }
        }
    }

    pub fn view(&self, now: Instant) -> ListView {
        list_view(&ViewInput {
            items: &self.result.drafts,
            loading: self.loading(),
            error: self.fetch_error.as_deref(),
            has_active_filters: self.query().has_active_filters(),
            revealed_for: self.revealed_at.map(|at| now.saturating_duration_since(at)),
        })
    }
}
