#![deny(clippy::all)]

use crate::domain::{FollowKey, FollowListEntry, FollowListQuery, FollowListType};
use async_trait::async_trait;
use shared::Result;
use std::collections::HashMap;

// Ports are the pluggable seams between the follow cache and the outside world

/// Port for the remote follow endpoints
#[async_trait]
pub trait FollowApi: Send + Sync + 'static {
    /// Flip the follow relationship and return the confirmed state
    async fn toggle(&self, key: &FollowKey) -> Result<bool>;

    /// Ask whether the viewer follows a single target
    async fn status(&self, key: &FollowKey) -> Result<bool>;

    /// Resolve many targets at once, keyed by `FollowKey::wire_key`
    async fn batch_status(&self, keys: &[FollowKey]) -> Result<HashMap<String, bool>>;

    async fn list(
        &self,
        slug: &str,
        list_type: FollowListType,
        query: &FollowListQuery,
    ) -> Result<Vec<FollowListEntry>>;
}

/// Port for the local follow-boolean store.
///
/// Reads are synchronous; an absent key means "unknown".
pub trait FollowStore: Send + Sync + 'static {
    fn get(&self, key: &FollowKey) -> Option<bool>;
    fn insert(&self, key: FollowKey, is_following: bool);
    fn clear(&self);
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
