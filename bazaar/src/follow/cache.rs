use crate::domain::FollowKey;
use crate::events::FollowEvent;
use crate::ports::{FollowApi, FollowStore};
use futures::future::{BoxFuture, FutureExt, Shared};
use log::{debug, info, warn};
use parking_lot::Mutex;
use shared::Error;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::broadcast;

/// A status query shared by every caller waiting on the same key.
/// Resolves to `None` when the query failed.
type StatusLookup = Shared<BoxFuture<'static, Option<bool>>>;

/// Default number of targets sent in one batch-status request
pub const DEFAULT_BATCH_LIMIT: usize = 100;

#[derive(Default)]
struct Lookups {
    // Bumped by every reset; results started under an older generation are dropped.
    generation: u64,
    in_flight: HashMap<FollowKey, StatusLookup>,
}

/// Single source of truth for "does the current viewer follow this target".
///
/// Constructed once per session and shared by reference with every consumer.
/// Answers come from the store when known; unknown keys are resolved through
/// the follow API, with overlapping lookups for the same key sharing one
/// request. Failed lookups answer `false` and leave the key unknown so a later
/// call can retry.
pub struct FollowCache {
    api: Arc<dyn FollowApi>,
    store: Arc<dyn FollowStore>,
    lookups: Arc<Mutex<Lookups>>,
    batch_limit: usize,
    event_broadcaster: Option<broadcast::Sender<FollowEvent>>,
}

impl FollowCache {
    pub fn new(api: Arc<dyn FollowApi>, store: Arc<dyn FollowStore>) -> Self {
        Self {
            api,
            store,
            lookups: Arc::new(Mutex::new(Lookups::default())),
            batch_limit: DEFAULT_BATCH_LIMIT,
            event_broadcaster: None,
        }
    }

    pub fn with_batch_limit(mut self, batch_limit: usize) -> Self {
        self.batch_limit = batch_limit.max(1);
        self
    }

    pub fn with_event_broadcaster(mut self, broadcaster: broadcast::Sender<FollowEvent>) -> Self {
        self.event_broadcaster = Some(broadcaster);
        self
    }

    pub fn subscribe(&self) -> Option<broadcast::Receiver<FollowEvent>> {
        self.event_broadcaster.as_ref().map(|tx| tx.subscribe())
    }

    /// Follow state for `key`, querying the server only when it is unknown.
    pub async fn get_status(&self, key: &FollowKey) -> bool {
        if let Some(is_following) = self.store.get(key) {
            return is_following;
        }

        let lookup = {
            let mut lookups = self.lookups.lock();
            // A lookup may have landed between the first read and taking the lock
            if let Some(is_following) = self.store.get(key) {
                return is_following;
            }
            let generation = lookups.generation;
            lookups
                .in_flight
                .entry(key.clone())
                .or_insert_with(|| self.status_lookup(key.clone(), generation))
                .clone()
        };

        let result = lookup.clone().await;

        {
            let mut lookups = self.lookups.lock();
            if lookups
                .in_flight
                .get(key)
                .is_some_and(|current| current.ptr_eq(&lookup))
            {
                lookups.in_flight.remove(key);
            }
        }

        result.unwrap_or(false)
    }

    fn status_lookup(&self, key: FollowKey, generation: u64) -> StatusLookup {
        let api = Arc::clone(&self.api);
        let store = Arc::clone(&self.store);
        let lookups = Arc::clone(&self.lookups);
        let events = self.event_broadcaster.clone();

        async move {
            debug!("Querying follow status for {key}");
            match api.status(&key).await {
                Ok(is_following) => {
                    let lookups = lookups.lock();
                    if lookups.generation == generation {
                        store.insert(key, is_following);
                    } else {
                        debug!("Dropping follow status for {key}: cache was reset mid-flight");
                    }
                    Some(is_following)
                }
                Err(e) => {
                    warn!("Follow status lookup for {key} failed: {e}");
                    report_failure(events.as_ref(), "follow status", &e);
                    None
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Record a server-confirmed state, replacing whatever was cached.
    pub fn update_status(&self, key: FollowKey, is_following: bool) {
        debug!("Caching confirmed follow state {key} = {is_following}");
        self.store.insert(key, is_following);
    }

    /// Resolve a page of targets with batch requests instead of one query per target.
    ///
    /// Duplicate keys collapse before the request is built and keys that are
    /// already cached are re-confirmed. Returns the number of entries written.
    pub async fn batch_prime(&self, keys: &[FollowKey]) -> usize {
        let mut seen = HashSet::with_capacity(keys.len());
        let unique: Vec<FollowKey> = keys.iter().filter(|k| seen.insert(*k)).cloned().collect();
        if unique.is_empty() {
            return 0;
        }

        let generation = self.lookups.lock().generation;
        let mut written = 0;

        for chunk in unique.chunks(self.batch_limit) {
            let statuses = match self.api.batch_status(chunk).await {
                Ok(statuses) => statuses,
                Err(e) => {
                    warn!("Batch follow status for {} targets failed: {e}", chunk.len());
                    self.report("follow batch status", &e);
                    continue;
                }
            };

            let parsed: Vec<(FollowKey, bool)> = statuses
                .into_iter()
                .filter_map(|(wire_key, is_following)| {
                    match FollowKey::from_wire_key(&wire_key) {
                        Ok(key) => Some((key, is_following)),
                        Err(e) => {
                            warn!("Ignoring batch status entry {wire_key}: {e}");
                            None
                        }
                    }
                })
                .collect();

            let lookups = self.lookups.lock();
            if lookups.generation != generation {
                debug!("Dropping batch follow status: cache was reset mid-flight");
                return written;
            }
            for (key, is_following) in parsed {
                self.store.insert(key, is_following);
                written += 1;
            }
        }

        debug!("Primed {written} follow entries from {} targets", unique.len());
        written
    }

    /// Forget every entry, e.g. on sign-out or account switch.
    pub fn reset(&self) {
        let mut lookups = self.lookups.lock();
        lookups.generation += 1;
        lookups.in_flight.clear();
        self.store.clear();
        info!("Follow cache reset (generation {})", lookups.generation);
    }

    /// Cached state without touching the network
    pub fn peek(&self, key: &FollowKey) -> Option<bool> {
        self.store.get(key)
    }

    pub fn len(&self) -> u64 {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub(crate) fn api(&self) -> &Arc<dyn FollowApi> {
        &self.api
    }

    pub(crate) fn emit(&self, event: FollowEvent) {
        if let Some(tx) = &self.event_broadcaster {
            // No subscribers is fine
            let _ = tx.send(event);
        }
    }

    pub(crate) fn report(&self, operation: &'static str, error: &Error) {
        report_failure(self.event_broadcaster.as_ref(), operation, error);
    }
}

pub(crate) fn report_failure(
    events: Option<&broadcast::Sender<FollowEvent>>,
    operation: &'static str,
    error: &Error,
) {
    let Some(tx) = events else {
        return;
    };
    let event = if error.is_session_expired() {
        FollowEvent::session_expired()
    } else {
        FollowEvent::request_failed(operation, error.to_string())
    };
    let _ = tx.send(event);
}

impl Debug for FollowCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lookups = self.lookups.lock();
        f.debug_struct("FollowCache")
            .field("entries", &self.store.len())
            .field("in_flight", &lookups.in_flight.len())
            .field("generation", &lookups.generation)
            .field("batch_limit", &self.batch_limit)
            .finish()
    }
}
