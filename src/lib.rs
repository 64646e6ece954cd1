//! Journal Bridge - LocalStorage persistence for a browser journal app
//!
//! Core modules:
//! - `persistence`: The bridge itself (save/load/cross-tab sync, fault boundary)
//! - `store`: Key-value store capability and an in-memory multi-tab store
//! - `message`: Outbound/inbound message shapes
//! - `platform`: Browser bindings (LocalStorage, core ports, `setTimeout` rethrow)
//! - `config`: Journal key, port names, log level

pub mod config;
pub mod error;
pub mod message;
pub mod persistence;
#[cfg(target_arch = "wasm32")]
pub mod platform;
pub mod store;

pub use config::BridgeConfig;
pub use error::{BridgeError, StoreError};
pub use message::{Inbound, Outbound};
pub use persistence::{DeferredFaults, FaultSink, Inbox, JournalBridge, Mailbox};
pub use store::{MemoryStore, StorageChange, Store};
