use crate::events::FollowEvent;
use crate::follow::FollowCache;
use chrono::DateTime;
use log::info;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Viewer identity type alias
pub type ViewerId = String;

/// Get current timestamp in milliseconds since Unix epoch
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Format a timestamp (ms since epoch) as ISO 8601 UTC string
pub fn format_utc_time(timestamp_ms: u64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms as i64)
        .unwrap_or_default()
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}

#[derive(Debug, Clone)]
pub struct Viewer {
    pub id: ViewerId,
    /// UTC timestamp in milliseconds
    pub signed_in_at: u64,
    /// Human-readable UTC time (ISO 8601)
    pub signed_in_at_utc: String,
}

impl Viewer {
    fn new(id: ViewerId) -> Self {
        let now = current_timestamp_ms();
        Self {
            id,
            signed_in_at: now,
            signed_in_at_utc: format_utc_time(now),
        }
    }
}

/// Tracks who is viewing and keeps the follow cache scoped to them.
///
/// Any change of viewer clears the cache so relationships never leak between
/// accounts.
pub struct ViewerSession {
    viewer: RwLock<Option<Viewer>>,
    cache: Arc<FollowCache>,
}

impl ViewerSession {
    pub fn new(cache: Arc<FollowCache>) -> Self {
        Self {
            viewer: RwLock::new(None),
            cache,
        }
    }

    /// Make `viewer_id` the current viewer.
    ///
    /// Anything cached under another viewer, or before anyone signed in, is
    /// dropped. Signing the same viewer in again keeps the cache.
    pub fn sign_in(&self, viewer_id: impl Into<ViewerId>) {
        let viewer_id = viewer_id.into();
        let mut viewer = self.viewer.write();

        if viewer.as_ref().is_some_and(|current| current.id == viewer_id) {
            return;
        }

        info!("Viewer changed, clearing follow state");
        self.cache.reset();
        self.cache.emit(FollowEvent::cache_reset());

        info!("Viewer {viewer_id} signed in");
        *viewer = Some(Viewer::new(viewer_id));
    }

    pub fn sign_out(&self) {
        let previous = self.viewer.write().take();
        self.cache.reset();
        self.cache.emit(FollowEvent::cache_reset());
        if let Some(viewer) = previous {
            info!(
                "Viewer {} signed out (session started {})",
                viewer.id, viewer.signed_in_at_utc
            );
        }
    }

    pub fn current(&self) -> Option<Viewer> {
        self.viewer.read().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.viewer.read().is_some()
    }
}
