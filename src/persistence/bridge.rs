//! The journal bridge: core messages in, store operations, journals out

use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;

use super::fault::FaultSink;
use super::inbox::Inbox;
use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::message::{Inbound, Outbound};
use crate::store::{StorageChange, Store};

/// Decode stored journal text.
///
/// Absent text decodes to `Null`, and so does the literal text `"null"`.
/// A journal explicitly saved as `null` therefore reads back exactly like a
/// journal that was never saved.
pub fn decode_journal(key: &str, text: Option<&str>) -> Result<Inbound, BridgeError> {
    match text {
        None => Ok(Value::Null),
        Some(text) => serde_json::from_str(text).map_err(|source| BridgeError::Decode {
            key: key.to_string(),
            source,
        }),
    }
}

/// Synchronizes one journal record between the core and a [`Store`].
///
/// Holds no state of its own beyond the key: every read goes to the store.
pub struct JournalBridge<S, I, F> {
    key: String,
    store: S,
    inbox: I,
    faults: F,
}

impl<S: Store, I: Inbox, F: FaultSink> JournalBridge<S, I, F> {
    pub fn new(config: &BridgeConfig, store: S, inbox: I, faults: F) -> Self {
        Self {
            key: config.journal_key.clone(),
            store,
            inbox,
            faults,
        }
    }

    pub fn journal_key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handle a raw outbound message from the core.
    ///
    /// Never fails: parse and handling faults go to the fault sink.
    pub fn handle_value(&self, message: Value) {
        match Outbound::from_value(message) {
            Ok(message) => self.handle(message),
            Err(err) => self.defer_fault(err),
        }
    }

    /// Handle an outbound message, isolating any fault from the caller
    pub fn handle<T: Serialize>(&self, message: Outbound<T>) {
        if let Err(err) = self.try_handle(message) {
            self.defer_fault(err);
        }
    }

    /// Handle an outbound message, returning faults to the caller
    pub fn try_handle<T: Serialize>(&self, message: Outbound<T>) -> Result<(), BridgeError> {
        match message {
            Outbound::SaveJournal(data) => self.save_journal(&data),
            Outbound::LoadJournal => self.send_journal(),
            Outbound::Unrecognized(raw) => {
                log::warn!("Unrecognized message from core: {}", raw);
                Ok(())
            }
        }
    }

    /// Persist `data`, then read it back and send it to the core
    pub fn save_journal<T: Serialize + ?Sized>(&self, data: &T) -> Result<(), BridgeError> {
        let text = serde_json::to_string(data)?;
        self.store
            .set_item(&self.key, &text)
            .map_err(|source| BridgeError::Write {
                key: self.key.clone(),
                source,
            })?;
        log::debug!("Journal saved ({} bytes)", text.len());
        self.send_journal()
    }

    /// Read the stored journal and send it to the core
    pub fn send_journal(&self) -> Result<(), BridgeError> {
        let journal = self.read_journal()?;
        self.inbox.deliver(journal)
    }

    /// Current stored journal, decoded
    pub fn read_journal(&self) -> Result<Inbound, BridgeError> {
        let text = self
            .store
            .get_item(&self.key)
            .map_err(|source| BridgeError::Read {
                key: self.key.clone(),
                source,
            })?;
        decode_journal(&self.key, text.as_deref())
    }

    /// React to a change made by another context.
    ///
    /// Returns whether a journal was forwarded. Faults are returned as-is.
    pub fn on_external_change(&self, change: &StorageChange) -> Result<bool, BridgeError> {
        log::debug!("Storage event: {:?}", change);
        if change.key.as_deref() != Some(self.key.as_str()) {
            return Ok(false);
        }
        let journal = decode_journal(&self.key, change.new_value.as_deref())?;
        self.inbox.deliver(journal)?;
        Ok(true)
    }

    /// Hand `err` to the fault sink instead of returning it
    pub fn defer_fault(&self, err: BridgeError) {
        log::error!("{} fault while handling core message: {}", err.kind(), err);
        self.faults.defer(err);
    }
}

impl<S, I, F> JournalBridge<S, I, F>
where
    S: Store + 'static,
    I: Inbox + 'static,
    F: FaultSink + 'static,
{
    /// Subscribe this bridge to the store's external change notifications
    pub fn listen(self: &Rc<Self>) -> Result<(), BridgeError> {
        let bridge = Rc::downgrade(self);
        self.store
            .subscribe(Box::new(move |change: &StorageChange| match bridge.upgrade() {
                Some(bridge) => bridge.on_external_change(change).map(|_| ()),
                None => Ok(()),
            }))
            .map_err(|e| BridgeError::Unavailable(e.to_string()))
    }
}
