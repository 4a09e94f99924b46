//! Hooks-handler wire messages.
//!
//! The runner sends one JSON object per line; the handler answers every
//! message with exactly one line carrying the same `uuid` and `event`.

use serde::{Deserialize, Serialize};

/// Delimiter terminating every message on the wire.
pub const MESSAGE_DELIMITER: u8 = b'\n';

/// One message exchanged with the test runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookMessage {
    /// Correlates a reply with its request.
    pub uuid: String,
    /// Event name, e.g. `beforeAll` or `beforeEach`.
    pub event: String,
    /// Transaction data. Passed back untouched.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl HookMessage {
    /// Parse a single line received from the runner.
    pub fn decode(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line.trim_end_matches(['\r', '\n']))
    }

    /// Serialize the message, delimiter included.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut bytes = serde_json::to_vec(self)?;
        bytes.push(MESSAGE_DELIMITER);
        Ok(bytes)
    }
}
