//! Fixture push configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default location of the fixture file, relative to the working directory.
pub const DEFAULT_FIXTURE_PATH: &str = "./_ft/ersatz-fixtures.yml";
/// Media type the mock server expects fixtures in.
pub const YAML_CONTENT_TYPE: &str = "application/x-yaml";

/// What to do when the fixture request cannot be delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushFailurePolicy {
    /// Fail the hook, aborting test setup.
    #[default]
    Abort,
    /// Log a warning and let the suite run.
    Continue,
}

impl std::str::FromStr for PushFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "abort" => Ok(PushFailurePolicy::Abort),
            "continue" => Ok(PushFailurePolicy::Continue),
            other => Err(format!(
                "unknown push failure policy '{}' (expected 'abort' or 'continue')",
                other
            )),
        }
    }
}

/// Configuration for pushing fixtures to the mock server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureConfig {
    /// Fixture file to push.
    pub fixture_path: PathBuf,
    /// Mock server host.
    pub host: String,
    /// Mock server port.
    pub port: u16,
    /// Path of the mock server's configuration endpoint.
    pub configure_path: String,
    /// Content type sent with the fixture body.
    pub content_type: String,
    /// How long to wait after dispatch for the mock server to apply the fixtures.
    pub settle_delay_ms: u64,
    /// Behaviour on connection failure.
    pub on_push_failure: PushFailurePolicy,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            fixture_path: PathBuf::from(DEFAULT_FIXTURE_PATH),
            host: "localhost".to_string(),
            port: 9000,
            configure_path: "/__configure".to_string(),
            content_type: YAML_CONTENT_TYPE.to_string(),
            settle_delay_ms: 5000,
            on_push_failure: PushFailurePolicy::Abort,
        }
    }
}

impl FixtureConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fixture file path.
    pub fn fixture_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.fixture_path = path.into();
        self
    }

    /// Set the mock server host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the mock server port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the configuration endpoint path.
    pub fn configure_path(mut self, path: impl Into<String>) -> Self {
        self.configure_path = path.into();
        self
    }

    /// Set the settle delay in milliseconds.
    pub fn settle_delay_ms(mut self, millis: u64) -> Self {
        self.settle_delay_ms = millis;
        self
    }

    /// Set the connection failure policy.
    pub fn on_push_failure(mut self, policy: PushFailurePolicy) -> Self {
        self.on_push_failure = policy;
        self
    }

    /// Full URI of the configuration endpoint.
    pub fn endpoint_uri(&self) -> String {
        let path = if self.configure_path.starts_with('/') {
            self.configure_path.clone()
        } else {
            format!("/{}", self.configure_path)
        };
        format!("http://{}:{}{}", self.host, self.port, path)
    }

    /// Settle delay as a [`Duration`].
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
