use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Client-side configuration for talking to the Bazaar REST API.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub follow_cache_max: Option<u64>,
    pub follow_cache_ttl: Option<Duration>,
    pub follow_batch_limit: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: Self::DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_millis(Self::DEFAULT_REQUEST_TIMEOUT_MS),
            follow_cache_max: None,
            follow_cache_ttl: None,
            follow_batch_limit: Self::DEFAULT_FOLLOW_BATCH_LIMIT,
        }
    }
}

impl ClientConfig {
    const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
    const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
    const DEFAULT_FOLLOW_BATCH_LIMIT: usize = 100;

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("BAZAAR_API_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_API_BASE_URL.to_string());

        let timeout_ms = parse_or(
            &lookup,
            "BAZAAR_REQUEST_TIMEOUT_MS",
            Self::DEFAULT_REQUEST_TIMEOUT_MS,
        );

        let follow_batch_limit = match parse_or(
            &lookup,
            "BAZAAR_FOLLOW_BATCH_LIMIT",
            Self::DEFAULT_FOLLOW_BATCH_LIMIT,
        ) {
            0 => {
                warn!("BAZAAR_FOLLOW_BATCH_LIMIT must be positive, using default");
                Self::DEFAULT_FOLLOW_BATCH_LIMIT
            }
            limit => limit,
        };

        Self {
            api_base_url,
            request_timeout: Duration::from_millis(timeout_ms),
            follow_cache_max: parse_opt(&lookup, "BAZAAR_FOLLOW_CACHE_MAX"),
            follow_cache_ttl: parse_opt::<u64, _>(&lookup, "BAZAAR_FOLLOW_CACHE_TTL_SECS")
                .map(Duration::from_secs),
            follow_batch_limit,
        }
    }
}

fn parse_opt<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Invalid {key} value {raw:?}: {e}, ignoring");
            None
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    parse_opt(lookup, key).unwrap_or(default)
}
