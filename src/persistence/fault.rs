//! Fault boundary between the bridge and the core's dispatch loop
//!
//! A failure while handling an outbound message must not unwind into the
//! code that dispatched it. It is handed to a [`FaultSink`] instead, which
//! re-raises it on a later turn.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::error::BridgeError;

pub trait FaultSink {
    /// Take ownership of `fault` and surface it after the current turn
    fn defer(&self, fault: BridgeError);
}

/// Queue of deferred faults, drained by whoever runs the next turn
#[derive(Clone, Default)]
pub struct DeferredFaults {
    queue: Rc<RefCell<VecDeque<BridgeError>>>,
}

impl DeferredFaults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Re-raise the oldest deferred fault, if any
    pub fn rethrow_next(&self) -> Result<(), BridgeError> {
        match self.queue.borrow_mut().pop_front() {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }
}

impl FaultSink for DeferredFaults {
    fn defer(&self, fault: BridgeError) {
        self.queue.borrow_mut().push_back(fault);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rethrow_in_order() {
        let faults = DeferredFaults::new();
        assert!(faults.rethrow_next().is_ok());

        faults.defer(BridgeError::Encode("first".to_string()));
        faults.defer(BridgeError::Port("second".to_string()));
        assert_eq!(faults.pending(), 2);

        assert!(matches!(faults.rethrow_next(), Err(BridgeError::Encode(_))));
        assert!(matches!(faults.rethrow_next(), Err(BridgeError::Port(_))));
        assert!(faults.rethrow_next().is_ok());
    }

    #[test]
    fn test_clones_share_queue() {
        let faults = DeferredFaults::new();
        let handle = faults.clone();
        handle.defer(BridgeError::Unavailable("no window".to_string()));
        assert_eq!(faults.pending(), 1);
    }
}
