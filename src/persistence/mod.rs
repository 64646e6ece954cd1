//! Journal persistence bridge
//!
//! Features:
//! - Single JSON record under a fixed key
//! - Re-read after every save, so save and load share one decode path
//! - Cross-tab sync through the store's change notifications
//! - Fault boundary keeping handler failures out of the core's dispatch

pub mod bridge;
pub mod fault;
pub mod inbox;

pub use bridge::{JournalBridge, decode_journal};
pub use fault::{DeferredFaults, FaultSink};
pub use inbox::{Inbox, Mailbox};
