//! Fixture loading and delivery to the ersatz mock server.

pub mod client;
pub mod config;
pub mod hook;
pub mod loader;

pub use client::{
    ConfigureClient, ConfigureRequest, HttpConfigureClient, PendingResponse, PushReceipt,
};
pub use config::{FixtureConfig, PushFailurePolicy, DEFAULT_FIXTURE_PATH, YAML_CONTENT_TYPE};
pub use hook::{FixtureHook, PushOutcome};
pub use loader::{load_fixture, FixturePayload};
