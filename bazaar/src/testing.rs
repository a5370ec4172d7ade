// Test doubles shared by the follow module tests

use crate::domain::{FollowKey, FollowListEntry, FollowListQuery, FollowListType};
use crate::ports::{FollowApi, FollowStore};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared::{Error, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// In-process stand-in for the remote follow endpoints
#[derive(Default)]
pub(crate) struct FakeFollowApi {
    server: Mutex<HashMap<FollowKey, bool>>,
    list_entries: Mutex<Vec<FollowListEntry>>,
    failing: AtomicBool,
    session_expired: AtomicBool,
    delay: Mutex<Option<Duration>>,
    failing_batch_call: Mutex<Option<usize>>,
    pub status_calls: AtomicUsize,
    pub batch_calls: AtomicUsize,
    pub toggle_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub batch_sizes: Mutex<Vec<usize>>,
}

impl FakeFollowApi {
    pub fn with_server_state(state: &[(FollowKey, bool)]) -> Self {
        let api = Self::default();
        api.server.lock().extend(state.iter().cloned());
        api
    }

    pub fn set_server_state(&self, key: FollowKey, is_following: bool) {
        self.server.lock().insert(key, is_following);
    }

    pub fn set_list_entries(&self, entries: Vec<FollowListEntry>) {
        *self.list_entries.lock() = entries;
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_session_expired(&self, expired: bool) {
        self.session_expired.store(expired, Ordering::SeqCst);
    }

    /// Fail only the `nth` batch-status call (1-based)
    pub fn fail_batch_call(&self, nth: usize) {
        *self.failing_batch_call.lock() = Some(nth);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    pub fn toggle_calls(&self) -> usize {
        self.toggle_calls.load(Ordering::SeqCst)
    }

    pub fn network_calls(&self) -> usize {
        self.status_calls()
            + self.batch_calls()
            + self.toggle_calls()
            + self.list_calls.load(Ordering::SeqCst)
    }

    async fn round_trip(&self) -> Result<()> {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.session_expired.load(Ordering::SeqCst) {
            return Err(Error::SessionExpired);
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl FollowApi for FakeFollowApi {
    async fn toggle(&self, key: &FollowKey) -> Result<bool> {
        self.toggle_calls.fetch_add(1, Ordering::SeqCst);
        self.round_trip().await?;
        let mut server = self.server.lock();
        let next = !server.get(key).copied().unwrap_or(false);
        server.insert(key.clone(), next);
        Ok(next)
    }

    async fn status(&self, key: &FollowKey) -> Result<bool> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.round_trip().await?;
        Ok(self.server.lock().get(key).copied().unwrap_or(false))
    }

    async fn batch_status(&self, keys: &[FollowKey]) -> Result<HashMap<String, bool>> {
        let call = self.batch_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.batch_sizes.lock().push(keys.len());
        self.round_trip().await?;
        if *self.failing_batch_call.lock() == Some(call) {
            return Err(Error::Transport("connection reset".to_string()));
        }
        let server = self.server.lock();
        Ok(keys
            .iter()
            .map(|key| (key.wire_key(), server.get(key).copied().unwrap_or(false)))
            .collect())
    }

    async fn list(
        &self,
        _slug: &str,
        _list_type: FollowListType,
        query: &FollowListQuery,
    ) -> Result<Vec<FollowListEntry>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.round_trip().await?;
        Ok(self
            .list_entries
            .lock()
            .iter()
            .filter(|entry| query.entity_type.is_none_or(|t| t == entry.target_type))
            .cloned()
            .collect())
    }
}

/// Plain map-backed store
#[derive(Default)]
pub(crate) struct MemoryStore {
    entries: Mutex<HashMap<FollowKey, bool>>,
}

impl FollowStore for MemoryStore {
    fn get(&self, key: &FollowKey) -> Option<bool> {
        self.entries.lock().get(key).copied()
    }

    fn insert(&self, key: FollowKey, is_following: bool) {
        self.entries.lock().insert(key, is_following);
    }

    fn clear(&self) {
        self.entries.lock().clear();
    }

    fn len(&self) -> u64 {
        self.entries.lock().len() as u64
    }
}

pub(crate) fn shop_keys(count: usize) -> Vec<FollowKey> {
    (1..=count)
        .map(|i| FollowKey::shop(format!("S{i}")).unwrap())
        .collect()
}
