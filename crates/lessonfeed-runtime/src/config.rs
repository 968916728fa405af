//! Feed settings resolved from the CLI.

use lessonfeed_core::backoff::ReconnectPolicy;
use lessonfeed_core::store::StoreConfig;
use reqwest::Url;
use thiserror::Error;

use crate::cli::WatchOpts;

/// Notification endpoint path on the origin.
pub const FEED_PATH: &str = "/ws/lesson/";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid origin {origin}: {detail}")]
    InvalidOrigin { origin: String, detail: String },

    #[error("unsupported scheme {0:?} (expected http, https, ws or wss)")]
    UnsupportedScheme(String),

    #[error("origin {0} has no host")]
    MissingHost(String),

    #[error("capacity must be at least 1")]
    InvalidCapacity,

    #[error("retention of {0}s is out of range (expected 1s up to 100 years)")]
    InvalidRetention(i64),
}

/// Largest retention accepted, one hundred years.
pub const MAX_RETENTION_SECS: i64 = 100 * 365 * 24 * 3_600;

#[derive(Debug, Clone, PartialEq)]
pub struct WatchSettings {
    pub ws_url: String,
    pub reconnect: ReconnectPolicy,
    pub store: StoreConfig,
}

impl WatchSettings {
    pub fn resolve(origin: &str, opts: &WatchOpts) -> Result<Self, ConfigError> {
        let ws_url = match &opts.ws_url {
            Some(url) => url.clone(),
            None => feed_url(origin)?,
        };
        if opts.capacity == 0 {
            return Err(ConfigError::InvalidCapacity);
        }
        if !(1..=MAX_RETENTION_SECS).contains(&opts.retention_secs) {
            return Err(ConfigError::InvalidRetention(opts.retention_secs));
        }
        Ok(Self {
            ws_url,
            reconnect: ReconnectPolicy {
                max_attempts: opts.max_attempts,
                base_delay_ms: opts.base_delay_ms,
                cap_ms: opts.cap_ms,
            },
            store: StoreConfig {
                capacity: opts.capacity,
                retention_secs: opts.retention_secs,
            },
        })
    }
}

/// Feed endpoint for `origin`: a secure origin gets a secure transport.
pub fn feed_url(origin: &str) -> Result<String, ConfigError> {
    let url = Url::parse(origin).map_err(|e| ConfigError::InvalidOrigin {
        origin: origin.to_owned(),
        detail: e.to_string(),
    })?;
    let scheme = match url.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => return Err(ConfigError::UnsupportedScheme(other.to_owned())),
    };
    let host = url
        .host_str()
        .ok_or_else(|| ConfigError::MissingHost(origin.to_owned()))?;
    let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();
    Ok(format!("{scheme}://{host}{port}{FEED_PATH}"))
}
