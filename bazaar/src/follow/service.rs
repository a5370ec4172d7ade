use crate::domain::{FollowKey, FollowListEntry, FollowListQuery, FollowListType};
use crate::events::FollowEvent;
use crate::follow::cache::FollowCache;
use log::{info, warn};
use shared::Result;
use std::sync::Arc;

/// Follow actions for UI surfaces, keeping the shared cache authoritative.
///
/// Toggles are confirm-then-update: the cache only changes after the server
/// answers, and a failed toggle leaves it untouched.
#[derive(Clone, Debug)]
pub struct FollowService {
    cache: Arc<FollowCache>,
}

impl FollowService {
    pub fn new(cache: Arc<FollowCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<FollowCache> {
        &self.cache
    }

    /// Flip the follow relationship and cache the confirmed state.
    pub async fn toggle(&self, key: &FollowKey) -> Result<bool> {
        match self.cache.api().toggle(key).await {
            Ok(is_following) => {
                info!("Follow toggled for {key}: following = {is_following}");
                self.cache.update_status(key.clone(), is_following);
                self.cache.emit(FollowEvent::changed(key.clone(), is_following));
                Ok(is_following)
            }
            Err(e) => {
                warn!("Follow toggle for {key} failed: {e}");
                self.cache.report("follow toggle", &e);
                Err(e)
            }
        }
    }

    pub async fn status(&self, key: &FollowKey) -> bool {
        self.cache.get_status(key).await
    }

    pub async fn prime(&self, keys: &[FollowKey]) -> usize {
        self.cache.batch_prime(keys).await
    }

    /// Fetch a followers/following page; rows that carry the viewer's follow
    /// state seed the cache.
    pub async fn list(
        &self,
        slug: &str,
        list_type: FollowListType,
        query: &FollowListQuery,
    ) -> Result<Vec<FollowListEntry>> {
        let entries = match self.cache.api().list(slug, list_type, query).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Follow list {slug}/{list_type} failed: {e}");
                self.cache.report("follow list", &e);
                return Err(e);
            }
        };

        for entry in &entries {
            if let (Some(is_following), Ok(key)) = (entry.is_following, entry.key()) {
                self.cache.update_status(key, is_following);
            }
        }

        Ok(entries)
    }
}
