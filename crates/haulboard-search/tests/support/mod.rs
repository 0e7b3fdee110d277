//! Lookup double whose responses are released by the test, in any order.

#![allow(dead_code)]

use haulboard_core::{EntityKind, SearchResult};
use haulboard_search::{LookupError, LookupService};
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::oneshot;

type Reply = Result<Vec<SearchResult>, LookupError>;

#[derive(Default)]
pub struct ScriptedLookup {
    calls: Mutex<Vec<String>>,
    pending: Mutex<Vec<(String, oneshot::Sender<Reply>)>>,
}

impl ScriptedLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every query the controller sent, in issue order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Release the oldest outstanding call for `query`.
    pub fn respond(&self, query: &str, reply: Reply) {
        let mut pending = self.pending.lock().unwrap();
        let index = pending
            .iter()
            .position(|(q, _)| q == query)
            .unwrap_or_else(|| panic!("no outstanding lookup for {query:?}"));
        let (_, tx) = pending.remove(index);
        // The controller may have aborted the call already.
        let _ = tx.send(reply);
    }
}

impl LookupService for ScriptedLookup {
    fn lookup(&self, query: &str) -> impl Future<Output = Reply> + Send {
        let (tx, rx) = oneshot::channel();
        self.calls.lock().unwrap().push(query.to_string());
        self.pending.lock().unwrap().push((query.to_string(), tx));
        async move {
            rx.await
                .unwrap_or_else(|_| Err(LookupError::new("lookup double dropped")))
        }
    }
}

pub fn shipper(id: u64, name: &str) -> SearchResult {
    SearchResult {
        id,
        entity_kind: EntityKind::Shipper,
        display_name: name.to_string(),
        secondary_label: Some(format!("{name} Logistics")),
        unique_id: Some(format!("SHP-{id:03}")),
        email: None,
        phone: None,
    }
}

pub fn trucker(id: u64, name: &str) -> SearchResult {
    SearchResult {
        id,
        entity_kind: EntityKind::Trucker,
        display_name: name.to_string(),
        secondary_label: Some(format!("{name} Transport")),
        unique_id: Some(format!("TRK-{id:03}")),
        email: None,
        phone: Some("9845000000".to_string()),
    }
}

pub const DEBOUNCE: Duration = Duration::from_millis(300);

/// Let spawned timer and lookup tasks run without moving the clock.
pub async fn flush() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// Move the paused clock forward and let woken tasks run.
pub async fn elapse(duration: Duration) {
    tokio::time::advance(duration).await;
    flush().await;
}
