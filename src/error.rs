//! Error types for the bridge and the stores behind it

use thiserror::Error;

/// Failure reported by a [`Store`](crate::store::Store) implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No storage facility is reachable (no window, storage disabled)
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// Write would exceed the store's quota; browsers do not report the limit
    #[error("quota exceeded writing {key:?} ({needed} bytes)")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: Option<usize>,
    },
    /// Platform rejected the operation
    #[error("{0}")]
    Platform(String),
}

/// Everything that can go wrong while relaying a journal
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Payload could not be turned into JSON text
    #[error("failed to encode journal payload: {0}")]
    Encode(String),

    /// Stored text is not valid JSON
    #[error("failed to decode stored value for {key:?}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read {key:?}: {source}")]
    Read {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to write {key:?}: {source}")]
    Write {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Outbound message is not an object, so it carries no action
    #[error("malformed outbound message: {0}")]
    MalformedMessage(String),

    /// The application core refused an inbound message
    #[error("inbound port rejected message: {0}")]
    Port(String),
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Encode(err.to_string())
    }
}

/// DOMException names browsers use for a full storage area
const QUOTA_EXCEPTION_NAMES: [&str; 2] = ["QuotaExceededError", "NS_ERROR_DOM_QUOTA_REACHED"];

impl StoreError {
    /// Classify a failed platform write by its exception name
    pub fn from_write_failure(name: &str, message: &str, key: &str, value: &str) -> Self {
        if QUOTA_EXCEPTION_NAMES.contains(&name) {
            StoreError::QuotaExceeded {
                key: key.to_string(),
                needed: key.len() + value.len(),
                quota: None,
            }
        } else {
            StoreError::Platform(format!("{}: {}", name, message))
        }
    }
}

impl BridgeError {
    /// Short machine-readable kind, used in log lines and JS error names
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeError::Encode(_) => "Encode",
            BridgeError::Decode { .. } => "Decode",
            BridgeError::Read { .. } => "Read",
            BridgeError::Write { .. } => "Write",
            BridgeError::Unavailable(_) => "Unavailable",
            BridgeError::MalformedMessage(_) => "MalformedMessage",
            BridgeError::Port(_) => "Port",
        }
    }
}
