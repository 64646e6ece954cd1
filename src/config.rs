//! Bridge configuration
//!
//! Which key the journal lives under, which ports the application core
//! exposes, and how chatty the logger is.

use serde::{Deserialize, Serialize};

/// Default LocalStorage key for the journal record
pub const DEFAULT_JOURNAL_KEY: &str = "journal";
/// Default name of the port the core sends persistence requests on
pub const DEFAULT_OUTBOUND_PORT: &str = "toJs";
/// Default name of the port the core receives journals on
pub const DEFAULT_INBOUND_PORT: &str = "fromJs";

/// Bridge settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Store key holding the journal
    pub journal_key: String,
    /// Log level name ("error", "warn", "info", "debug", "trace")
    pub log_level: String,
    /// Port the core pushes outbound messages through
    pub outbound_port: String,
    /// Port the core accepts inbound messages on
    pub inbound_port: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            journal_key: DEFAULT_JOURNAL_KEY.to_string(),
            log_level: "info".to_string(),
            outbound_port: DEFAULT_OUTBOUND_PORT.to_string(),
            inbound_port: DEFAULT_INBOUND_PORT.to_string(),
        }
    }
}

impl BridgeConfig {
    pub fn with_journal_key(mut self, key: impl Into<String>) -> Self {
        self.journal_key = key.into();
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_ports(mut self, outbound: impl Into<String>, inbound: impl Into<String>) -> Self {
        self.outbound_port = outbound.into();
        self.inbound_port = inbound.into();
        self
    }

    /// Parsed log level; unknown names fall back to `Info`
    pub fn level(&self) -> log::Level {
        match self.log_level.to_lowercase().as_str() {
            "error" => log::Level::Error,
            "warn" | "warning" => log::Level::Warn,
            "debug" => log::Level::Debug,
            "trace" => log::Level::Trace,
            _ => log::Level::Info,
        }
    }
}
