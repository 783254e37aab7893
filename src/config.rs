//! Connection and cache configuration.

use std::time::Duration;

use serde::Deserialize;

/// Default TCP port of the renderer daemon. Configuration, not part of
/// the protocol itself.
pub const TEXTWRITER_PORT: u16 = 47251;

fn default_host() -> String {
    String::from("localhost")
}

fn default_port() -> u16 {
    TEXTWRITER_PORT
}

fn default_timeout_ms() -> u64 {
    1_000
}

fn default_cache_ttl_secs() -> u64 {
    7 * 24 * 60 * 60
}

/// Where the renderer lives and how patient the client is.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Host name of the renderer daemon.
    pub host: String,
    /// TCP port of the renderer daemon.
    pub port: u16,
    /// Connect and per-exchange socket timeout, in milliseconds.
    pub timeout_ms: u64,
    /// Age past which cached images are eligible for purging, in seconds.
    pub cache_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_ms: default_timeout_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl Config {
    /// Parses a configuration from TOML text; absent fields keep their
    /// defaults.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Socket timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Cache entry lifetime as a [`Duration`].
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
