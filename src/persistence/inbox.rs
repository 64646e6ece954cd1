//! Delivery of inbound messages to the application core

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::BridgeError;
use crate::message::Inbound;

/// The core's receiving end
pub trait Inbox {
    fn deliver(&self, inbound: Inbound) -> Result<(), BridgeError>;
}

/// Inbox that just keeps everything it receives, for native hosts and tests
#[derive(Clone, Default)]
pub struct Mailbox {
    received: Rc<RefCell<Vec<Inbound>>>,
}

impl Mailbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.received.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.received.borrow().is_empty()
    }

    pub fn last(&self) -> Option<Inbound> {
        self.received.borrow().last().cloned()
    }

    /// Remove and return everything received so far
    pub fn take(&self) -> Vec<Inbound> {
        std::mem::take(&mut *self.received.borrow_mut())
    }
}

impl Inbox for Mailbox {
    fn deliver(&self, inbound: Inbound) -> Result<(), BridgeError> {
        self.received.borrow_mut().push(inbound);
        Ok(())
    }
}
