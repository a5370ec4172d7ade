pub mod moka_cache;

pub use moka_cache::MokaFollowStore;

use shared::config::ClientConfig;

/// Build the follow store described by the client configuration
pub fn follow_store_from_config(config: &ClientConfig) -> MokaFollowStore {
    MokaFollowStore::new(config.follow_cache_max, config.follow_cache_ttl)
}
