//! Debounced result counts for an open filter or search panel.
//!
//! While the panel is open every facet edit is pushed into a
//! [`CountSubscription`]. A count request goes out once edits have been quiet
//! for the debounce window; only the most recently issued request may update
//! the visible count, and failures show up as an unavailable count rather
//! than an error.

use crate::config::CountConfig;
use crate::error::{Error, Result};
use crate::facets::FacetSet;
use crate::format;
use crate::query::{self, Predicate};
use crate::store::ListingStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{self, Instant};
use tracing::{debug, warn};

/// What the count badge should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountState {
    /// A request is in flight
    Pending,
    Ready(u64),
    /// The last request failed or timed out
    Unavailable,
}

impl CountState {
    /// Visible count; anything but a settled count reads as zero.
    pub fn count(&self) -> u64 {
        match self {
            CountState::Ready(count) => *count,
            CountState::Pending | CountState::Unavailable => 0,
        }
    }

    pub fn button_label(&self) -> String {
        match self {
            CountState::Ready(count) => format::button_label(Some(*count)),
            CountState::Pending | CountState::Unavailable => format::button_label(None),
        }
    }
}

#[derive(Clone)]
pub struct CountClient {
    store: Arc<dyn ListingStore>,
    debounce: Duration,
    timeout: Duration,
}

impl CountClient {
    pub fn new(store: Arc<dyn ListingStore>, config: &CountConfig) -> Self {
        Self::with_timing(store, config.debounce(), config.timeout())
    }

    pub fn with_timing(
        store: Arc<dyn ListingStore>,
        debounce: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            debounce,
            timeout,
        }
    }

    /// One immediate, time-bounded count without debouncing.
    pub async fn count_now(&self, facets: &FacetSet) -> Result<u64> {
        request(Arc::clone(&self.store), query::build(facets), self.timeout).await
    }

    /// Start counting for `initial` and every later [`CountSubscription::update`].
    /// `on_count` runs on the runtime, once per state change.
    pub fn subscribe<F>(&self, initial: FacetSet, on_count: F) -> CountSubscription
    where
        F: FnMut(CountState) + Send + 'static,
    {
        let (facets, rx) = watch::channel(initial);
        let task = tokio::spawn(drive(
            Arc::clone(&self.store),
            self.debounce,
            self.timeout,
            rx,
            on_count,
        ));
        CountSubscription { facets, task }
    }
}

/// Live count subscription. Dropping or closing it cancels the pending timer
/// and every in-flight request.
pub struct CountSubscription {
    facets: watch::Sender<FacetSet>,
    task: JoinHandle<()>,
}

impl CountSubscription {
    /// Replace the facet state; restarts the debounce window.
    pub fn update(&self, facets: FacetSet) {
        self.facets.send_replace(facets);
    }

    pub fn close(self) {
        // Drop does the work.
    }
}

impl Drop for CountSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn request(
    store: Arc<dyn ListingStore>,
    predicate: Predicate,
    timeout: Duration,
) -> Result<u64> {
    match time::timeout(timeout, store.count(&predicate)).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout {
            millis: timeout.as_millis() as u64,
        }),
    }
}

async fn drive<F>(
    store: Arc<dyn ListingStore>,
    debounce: Duration,
    timeout: Duration,
    mut rx: watch::Receiver<FacetSet>,
    mut on_count: F,
) where
    F: FnMut(CountState) + Send + 'static,
{
    // The initial facets count as a change.
    let mut deadline = Some(Instant::now() + debounce);
    let mut latest: u64 = 0;
    let mut in_flight: JoinSet<(u64, Result<u64>)> = JoinSet::new();

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                deadline = Some(Instant::now() + debounce);
            }
            _ = time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                deadline = None;
                latest += 1;
                let id = latest;
                let predicate = query::build(&rx.borrow_and_update());
                debug!("Issuing count request #{}: {}", id, predicate);

                let store = Arc::clone(&store);
                in_flight.spawn(async move { (id, request(store, predicate, timeout).await) });
                on_count(CountState::Pending);
            }
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                match joined {
                    Ok((id, outcome)) if id == latest => match outcome {
                        Ok(count) => on_count(CountState::Ready(count)),
                        Err(e) => {
                            warn!("Count request #{} failed: {}", id, e);
                            on_count(CountState::Unavailable);
                        }
                    },
                    Ok((id, _)) => {
                        debug!("Discarding stale count response #{} (latest #{})", id, latest)
                    }
                    Err(e) => warn!("Count task ended abnormally: {}", e),
                }
            }
        }
    }
}
