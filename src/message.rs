//! Message shapes exchanged with the application core
//!
//! Outbound (core → bridge):
//! - `{ "action": "saveJournal", "data": <json> }`
//! - `{ "action": "loadJournal" }`
//!
//! Inbound (bridge → core): the decoded journal, or `null`.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::BridgeError;

/// Action selector for persisting a journal
pub const SAVE_JOURNAL: &str = "saveJournal";
/// Action selector for requesting the stored journal
pub const LOAD_JOURNAL: &str = "loadJournal";

/// Message delivered to the core: the decoded journal, `Null` when none
pub type Inbound = Value;

/// Persistence request from the core
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound<T = Value> {
    /// Persist `T` as the journal
    SaveJournal(T),
    /// Send the stored journal back
    LoadJournal,
    /// Any other action; carries the raw message for diagnostics
    Unrecognized(Value),
}

impl Outbound<Value> {
    /// Interpret a wire message.
    ///
    /// Objects with an unknown (or missing) action become `Unrecognized`.
    /// A `saveJournal` without `data` saves `null`: the core's messages cross
    /// the JS boundary through JSON, where an undefined field simply vanishes.
    pub fn from_value(message: Value) -> Result<Self, BridgeError> {
        let Value::Object(mut fields) = message else {
            return Err(BridgeError::MalformedMessage(message.to_string()));
        };

        let action = fields
            .get("action")
            .and_then(Value::as_str)
            .map(str::to_owned);

        Ok(match action.as_deref() {
            Some(SAVE_JOURNAL) => Outbound::SaveJournal(fields.remove("data").unwrap_or(Value::Null)),
            Some(LOAD_JOURNAL) => Outbound::LoadJournal,
            _ => Outbound::Unrecognized(Value::Object(fields)),
        })
    }

    /// Parse a message from JSON text
    pub fn from_json(text: &str) -> Result<Self, BridgeError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| BridgeError::MalformedMessage(e.to_string()))?;
        Self::from_value(value)
    }
}

impl<T> Outbound<T> {
    /// Action name, as it appears on the wire
    pub fn action(&self) -> &str {
        match self {
            Outbound::SaveJournal(_) => SAVE_JOURNAL,
            Outbound::LoadJournal => LOAD_JOURNAL,
            Outbound::Unrecognized(raw) => raw
                .get("action")
                .and_then(Value::as_str)
                .unwrap_or("<none>"),
        }
    }
}

impl<T: Serialize> Outbound<T> {
    /// Wire form of this message
    pub fn to_value(&self) -> Result<Value, BridgeError> {
        Ok(match self {
            Outbound::SaveJournal(data) => {
                let mut fields = Map::new();
                fields.insert("action".to_string(), Value::from(SAVE_JOURNAL));
                fields.insert("data".to_string(), serde_json::to_value(data)?);
                Value::Object(fields)
            }
            Outbound::LoadJournal => serde_json::json!({ "action": LOAD_JOURNAL }),
            Outbound::Unrecognized(raw) => raw.clone(),
        })
    }
}
