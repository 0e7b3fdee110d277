//! Debounced query controller.
//!
//! Text input is coalesced over a quiet period, each issued lookup is tagged
//! with a sequence number, and a response only reaches the published state if
//! its sequence is still the latest. New input, `clear` and `dispose` all bump
//! the sequence, which turns every in-flight response into a stale one.

use crate::cache::ResultCache;
use crate::lookup::{LookupError, LookupService};
use crate::state::QueryState;
use haulboard_core::{SearchResult, SearchSettings};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};

/// Owns the query text and the single authoritative [`QueryState`].
///
/// Timers and lookups run on the runtime the controller was built with, so
/// its methods can be called from any thread.
pub struct QueryController<L: LookupService> {
    shared: Arc<Shared<L>>,
}

struct Shared<L> {
    lookup: L,
    settings: SearchSettings,
    runtime: Handle,
    state_tx: watch::Sender<QueryState>,
    inner: Mutex<Inner>,
}

struct Inner {
    query: String,
    /// Latest sequence. Issued lookups are tagged with it; input changes,
    /// `clear` and `dispose` advance it without issuing.
    seq: u64,
    issued: u64,
    disposed: bool,
    timer: Option<JoinHandle<()>>,
    /// Issued lookups that have not settled yet, by sequence.
    in_flight: Vec<(u64, AbortHandle)>,
    cache: Option<ResultCache>,
}

impl Inner {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    fn abort_in_flight(&mut self) {
        for (_, task) in self.in_flight.drain(..) {
            task.abort();
        }
    }

    fn invalidate(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }
}

impl<L: LookupService> QueryController<L> {
    /// Build a controller on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime; use
    /// [`QueryController::with_handle`] there.
    pub fn new(lookup: L, settings: SearchSettings) -> Self {
        Self::with_handle(lookup, settings, Handle::current())
    }

    pub fn with_handle(lookup: L, settings: SearchSettings, runtime: Handle) -> Self {
        let (state_tx, _) = watch::channel(QueryState::Idle);
        let inner = Inner {
            query: String::new(),
            seq: 0,
            issued: 0,
            disposed: false,
            timer: None,
            in_flight: Vec::new(),
            cache: settings.cache_results.then(ResultCache::new),
        };

        Self {
            shared: Arc::new(Shared {
                lookup,
                settings,
                runtime,
                state_tx,
                inner: Mutex::new(inner),
            }),
        }
    }

    /// Record new input and restart the debounce window.
    ///
    /// Blank input settles to `Idle` immediately without a lookup.
    pub fn set_query(&self, text: impl Into<String>) {
        let text = text.into();
        let mut inner = self.shared.lock();
        if inner.disposed {
            tracing::debug!("Ignoring query {:?} on disposed controller", text);
            return;
        }

        inner.cancel_timer();
        let seq = inner.invalidate();
        let trimmed = text.trim().to_string();
        inner.query = text;

        if trimmed.is_empty() {
            self.shared.publish(QueryState::Idle);
            return;
        }

        let shared = Arc::clone(&self.shared);
        let debounce = self.shared.settings.debounce;
        // Read the clock of the runtime the timer will run on.
        let _runtime = self.shared.runtime.enter();
        let deadline = tokio::time::Instant::now() + debounce;
        tracing::debug!("Scheduling lookup for {:?} in {:?}", trimmed, debounce);
        inner.timer = Some(self.shared.runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            Shared::fire(&shared, seq, trimmed);
        }));
    }

    /// Reset to an empty query and `Idle`, invalidating pending work.
    pub fn clear(&self) {
        let mut inner = self.shared.lock();
        if inner.disposed {
            return;
        }

        inner.cancel_timer();
        inner.invalidate();
        inner.query.clear();
        self.shared.publish(QueryState::Idle);
    }

    /// Stop all work. The state is frozen from here on.
    pub fn dispose(&self) {
        let mut inner = self.shared.lock();
        if inner.disposed {
            return;
        }

        inner.disposed = true;
        inner.cancel_timer();
        inner.invalidate();
        inner.abort_in_flight();
        tracing::debug!("Query controller disposed");
    }

    pub fn current_state(&self) -> QueryState {
        self.shared.state_tx.borrow().clone()
    }

    /// Watch state transitions without polling.
    pub fn subscribe(&self) -> watch::Receiver<QueryState> {
        self.shared.state_tx.subscribe()
    }

    pub fn query(&self) -> String {
        self.shared.lock().query.clone()
    }

    /// Number of lookups issued so far.
    pub fn issued_lookups(&self) -> u64 {
        self.shared.lock().issued
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.lock().disposed
    }

    pub fn settings(&self) -> SearchSettings {
        self.shared.settings
    }
}

impl<L: LookupService> Drop for QueryController<L> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<L: LookupService> Shared<L> {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: QueryState) {
        tracing::trace!("Query state -> {}", state.label());
        self.state_tx.send_replace(state);
    }

    /// Debounce window elapsed for `query`, scheduled at sequence `scheduled`.
    fn fire(self: &Arc<Self>, scheduled: u64, query: String) {
        let mut inner = self.lock();
        if inner.disposed || inner.seq != scheduled {
            return;
        }
        inner.timer = None;

        if let Some(results) = inner.cache.as_ref().and_then(|c| c.get(&query)) {
            tracing::debug!("Serving {:?} from session cache", query);
            self.publish(QueryState::Success(results.to_vec()));
            return;
        }

        let seq = inner.invalidate();
        inner.issued += 1;
        self.publish(QueryState::Loading);
        tracing::debug!("Issuing lookup #{} for {:?}", seq, query);

        let shared = Arc::clone(self);
        let task = self.runtime.spawn(async move {
            let outcome = shared.lookup.lookup(&query).await;
            shared.settle(seq, query, outcome);
        });
        inner.in_flight.retain(|(_, handle)| !handle.is_finished());
        inner.in_flight.push((seq, task.abort_handle()));
    }

    fn settle(&self, seq: u64, query: String, outcome: Result<Vec<SearchResult>, LookupError>) {
        let mut inner = self.lock();
        inner.in_flight.retain(|(issued, _)| *issued != seq);
        if inner.disposed || inner.seq != seq {
            tracing::debug!(
                "Discarding stale response #{} for {:?} (latest #{})",
                seq,
                query,
                inner.seq
            );
            return;
        }

        match outcome {
            Ok(results) => {
                if let Some(cache) = inner.cache.as_mut() {
                    cache.insert(query, results.clone());
                }
                self.publish(QueryState::Success(results));
            }
            Err(err) => {
                tracing::warn!("Lookup for {:?} failed: {}", query, err);
                self.publish(QueryState::Error(err.message().to_string()));
            }
        }
    }
}
