use crate::error::FetchMockError;
use getset::Getters;
use log::debug;
use serde::Deserialize;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::time::Duration;

/*
Config only shapes the passthrough handler, the real network client that sits
in the fetch slot before any blocker or mock is installed (and after
`restore_passthrough`). Blocking and mocking take no configuration.

Loading order, later sources overriding earlier ones:

1. DEFAULTS: `Config::with_defaults()`
2. JSON: `Config::from_json_str` / `Config::from_file`, merged on top with `merge`

Nothing is read implicitly: no environment variables, no well-known file names.

```rust
let mut config = Config::with_defaults();
config.merge(Config::from_json_str(r#"{"passthrough_timeout_secs": 5}"#)?);
let hook = FetchHook::with_config(config)?;
```
*/

pub const DEFAULT_PASSTHROUGH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PASSTHROUGH_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_USER_AGENT: &str = concat!("fetchmock/", env!("CARGO_PKG_VERSION"));

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Getters)]
pub struct Config {
    /// Total time allowed for one passthrough call.
    #[getset(get = "pub")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    passthrough_timeout_secs: Option<u64>,
    #[getset(get = "pub")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    passthrough_connect_timeout_secs: Option<u64>,
    #[getset(get = "pub")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_agent: Option<String>,
}

impl Config {
    pub fn new(
        passthrough_timeout_secs: Option<u64>,
        passthrough_connect_timeout_secs: Option<u64>,
        user_agent: Option<String>,
    ) -> Config {
        Config {
            passthrough_timeout_secs,
            passthrough_connect_timeout_secs,
            user_agent,
        }
    }

    /// Create a Config with only hardcoded defaults.
    pub fn with_defaults() -> Self {
        Config {
            passthrough_timeout_secs: Some(DEFAULT_PASSTHROUGH_TIMEOUT_SECS),
            passthrough_connect_timeout_secs: Some(DEFAULT_PASSTHROUGH_CONNECT_TIMEOUT_SECS),
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
        }
    }

    /// Merge another config into this one.
    /// Values from `other` will override values in `self` if they are Some.
    pub fn merge(&mut self, other: Config) {
        if other.passthrough_timeout_secs.is_some() {
            self.passthrough_timeout_secs = other.passthrough_timeout_secs;
        }
        if other.passthrough_connect_timeout_secs.is_some() {
            self.passthrough_connect_timeout_secs = other.passthrough_connect_timeout_secs;
        }
        if other.user_agent.is_some() {
            self.user_agent = other.user_agent;
        }
    }

    /// Parse a config from JSON. Missing fields stay `None`.
    pub fn from_json_str(json: &str) -> Result<Config, FetchMockError> {
        let config: Config = serde_json::from_str(json)
            .map_err(|e| FetchMockError::ConfigError(format!("Invalid config JSON: {}", e)))?;
        if config.passthrough_timeout_secs == Some(0) {
            return Err(FetchMockError::ConfigError(
                "passthrough_timeout_secs must be greater than zero".to_string(),
            ));
        }
        debug!("config from json {:?}", config);
        Ok(config)
    }

    /// Load a config from a JSON file. Only called explicitly.
    pub fn from_file(path: &str) -> Result<Config, FetchMockError> {
        let json_str = fs::read_to_string(path).map_err(|e| {
            FetchMockError::ConfigError(format!("Failed to read config file '{}': {}", path, e))
        })?;
        Config::from_json_str(&json_str)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.passthrough_timeout_secs.map(Duration::from_secs)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.passthrough_connect_timeout_secs.map(Duration::from_secs)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn show<T: fmt::Display>(value: &Option<T>) -> String {
            value
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string())
        }
        write!(
            f,
            r#"
        fetchmock passthrough config:
            passthrough_timeout_secs:         {},
            passthrough_connect_timeout_secs: {},
            user_agent:                       {}
        "#,
            show(&self.passthrough_timeout_secs),
            show(&self.passthrough_connect_timeout_secs),
            show(&self.user_agent),
        )
    }
}
