use crate::domain::FollowKey;
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// Notifications for UI surfaces (toasts, re-login prompts).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FollowEvent {
    Changed(FollowChangedEvent),
    RequestFailed(RequestFailedEvent),
    SessionExpired(SessionExpiredEvent),
    CacheReset(CacheResetEvent),
}

impl FollowEvent {
    pub fn changed(key: FollowKey, is_following: bool) -> Self {
        FollowEvent::Changed(FollowChangedEvent {
            key,
            is_following,
            timestamp: now_timestamp(),
        })
    }

    pub fn request_failed(operation: &'static str, message: impl Into<String>) -> Self {
        FollowEvent::RequestFailed(RequestFailedEvent {
            operation,
            message: message.into(),
            timestamp: now_timestamp(),
        })
    }

    pub fn session_expired() -> Self {
        FollowEvent::SessionExpired(SessionExpiredEvent {
            timestamp: now_timestamp(),
        })
    }

    pub fn cache_reset() -> Self {
        FollowEvent::CacheReset(CacheResetEvent {
            timestamp: now_timestamp(),
        })
    }

    /// Text suitable for a transient notification.
    pub fn notice(&self) -> String {
        match self {
            FollowEvent::Changed(e) if e.is_following => format!("Now following {}", e.key),
            FollowEvent::Changed(e) => format!("Unfollowed {}", e.key),
            FollowEvent::RequestFailed(e) => format!("{} failed: {}", e.operation, e.message),
            FollowEvent::SessionExpired(_) => "Session expired, please sign in again".to_string(),
            FollowEvent::CacheReset(_) => "Follow state cleared".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FollowChangedEvent {
    pub key: FollowKey,
    pub is_following: bool,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestFailedEvent {
    pub operation: &'static str,
    pub message: String,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionExpiredEvent {
    pub timestamp: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheResetEvent {
    pub timestamp: u64,
}

/// Helper to get current timestamp in seconds since UNIX epoch
pub fn now_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
