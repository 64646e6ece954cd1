//! Key-value store capability
//!
//! The bridge never touches a global store directly. It is handed something
//! implementing [`Store`]: `window.localStorage` in the browser
//! (`platform::storage`), or [`MemoryStore`] everywhere else.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::error::{BridgeError, StoreError};

/// A change made to the store by another execution context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    /// Changed key; `None` when the whole store was cleared
    pub key: Option<String>,
    pub old_value: Option<String>,
    /// New text; `None` when the key was removed
    pub new_value: Option<String>,
}

/// Callback for external changes; a failure propagates to the event source
pub type ChangeListener = Box<dyn Fn(&StorageChange) -> Result<(), BridgeError>>;

/// Synchronous, origin-scoped string store
pub trait Store {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Register for changes made by *other* contexts sharing this store.
    /// Writes through `self` never reach `listener`.
    fn subscribe(&self, listener: ChangeListener) -> Result<(), StoreError>;
}

type SharedListener = Rc<dyn Fn(&StorageChange) -> Result<(), BridgeError>>;

#[derive(Default)]
struct Origin {
    items: RefCell<HashMap<String, String>>,
    listeners: RefCell<Vec<(usize, SharedListener)>>,
    pending: RefCell<VecDeque<(usize, StorageChange)>>,
    contexts: Cell<usize>,
    quota: Option<usize>,
}

impl Origin {
    fn used_bytes_without(&self, key: &str) -> usize {
        self.items
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }

    /// Queue `change` for every context except `source`
    fn broadcast(&self, source: usize, change: StorageChange) {
        let mut pending = self.pending.borrow_mut();
        for context in (0..self.contexts.get()).filter(|&c| c != source) {
            pending.push_back((context, change.clone()));
        }
    }
}

/// In-memory store shared by any number of simulated tabs.
///
/// Each handle belongs to one execution context. Cloning a handle stays in
/// the same context; [`MemoryStore::open_context`] opens another one over the
/// same data. Change notifications are queued, not delivered inline:
/// [`MemoryStore::dispatch_pending`] plays the part of the browser's event
/// loop turn.
#[derive(Clone)]
pub struct MemoryStore {
    origin: Rc<Origin>,
    context: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty store with no quota
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Empty store that rejects writes once keys plus values exceed `bytes`
    pub fn with_quota(bytes: usize) -> Self {
        Self::build(Some(bytes))
    }

    fn build(quota: Option<usize>) -> Self {
        let origin = Origin {
            quota,
            contexts: Cell::new(1),
            ..Default::default()
        };
        Self {
            origin: Rc::new(origin),
            context: 0,
        }
    }

    /// Handle for a new execution context over the same data
    pub fn open_context(&self) -> Self {
        let context = self.origin.contexts.get();
        self.origin.contexts.set(context + 1);
        Self {
            origin: self.origin.clone(),
            context,
        }
    }

    pub fn remove_item(&self, key: &str) {
        let old = self.origin.items.borrow_mut().remove(key);
        if old.is_some() {
            self.origin.broadcast(
                self.context,
                StorageChange {
                    key: Some(key.to_string()),
                    old_value: old,
                    new_value: None,
                },
            );
        }
    }

    pub fn clear(&self) {
        let had_items = {
            let mut items = self.origin.items.borrow_mut();
            let had = !items.is_empty();
            items.clear();
            had
        };
        if had_items {
            self.origin.broadcast(
                self.context,
                StorageChange {
                    key: None,
                    old_value: None,
                    new_value: None,
                },
            );
        }
    }

    pub fn len(&self) -> usize {
        self.origin.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Notifications queued but not yet delivered, across all contexts
    pub fn pending_notifications(&self) -> usize {
        self.origin.pending.borrow().len()
    }

    /// Deliver queued notifications in order.
    ///
    /// Stops at the first listener failure and returns it; notifications
    /// behind it stay queued. Returns how many were delivered otherwise.
    pub fn dispatch_pending(&self) -> Result<usize, BridgeError> {
        let mut delivered = 0;
        loop {
            // Release the queue before calling out: listeners may write.
            let Some((context, change)) = self.origin.pending.borrow_mut().pop_front() else {
                return Ok(delivered);
            };
            let listeners: Vec<SharedListener> = self
                .origin
                .listeners
                .borrow()
                .iter()
                .filter(|(c, _)| *c == context)
                .map(|(_, l)| l.clone())
                .collect();
            for listener in listeners {
                listener(&change)?;
            }
            delivered += 1;
        }
    }
}

impl Store for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.origin.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(quota) = self.origin.quota {
            let needed = self.origin.used_bytes_without(key) + key.len() + value.len();
            if needed > quota {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    quota: Some(quota),
                });
            }
        }

        let old = self
            .origin
            .items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());

        // Rewriting the same text is not a change
        if old.as_deref() != Some(value) {
            self.origin.broadcast(
                self.context,
                StorageChange {
                    key: Some(key.to_string()),
                    old_value: old,
                    new_value: Some(value.to_string()),
                },
            );
        }
        Ok(())
    }

    fn subscribe(&self, listener: ChangeListener) -> Result<(), StoreError> {
        self.origin
            .listeners
            .borrow_mut()
            .push((self.context, Rc::from(listener)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(store: &MemoryStore) -> Rc<RefCell<Vec<StorageChange>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        store
            .subscribe(Box::new(move |change: &StorageChange| {
                sink.borrow_mut().push(change.clone());
                Ok(())
            }))
            .unwrap();
        seen
    }

    #[test]
    fn test_get_set() {
        let store = MemoryStore::new();
        assert_eq!(store.get_item("journal").unwrap(), None);
        store.set_item("journal", "[1]").unwrap();
        assert_eq!(store.get_item("journal").unwrap().as_deref(), Some("[1]"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_contexts_share_data() {
        let tab_a = MemoryStore::new();
        let tab_b = tab_a.open_context();
        tab_a.set_item("k", "v").unwrap();
        assert_eq!(tab_b.get_item("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_own_writes_do_not_notify_self() {
        let tab_a = MemoryStore::new();
        let tab_b = tab_a.open_context();
        let seen_a = recorder(&tab_a);
        let seen_b = recorder(&tab_b);

        tab_a.set_item("k", "1").unwrap();
        assert_eq!(tab_a.dispatch_pending().unwrap(), 1);

        assert!(seen_a.borrow().is_empty());
        assert_eq!(
            seen_b.borrow().as_slice(),
            &[StorageChange {
                key: Some("k".to_string()),
                old_value: None,
                new_value: Some("1".to_string()),
            }]
        );
    }

    #[test]
    fn test_notifications_wait_for_dispatch() {
        let tab_a = MemoryStore::new();
        let tab_b = tab_a.open_context();
        let seen_b = recorder(&tab_b);

        tab_a.set_item("k", "1").unwrap();
        assert_eq!(tab_a.pending_notifications(), 1);
        assert!(seen_b.borrow().is_empty());

        tab_b.dispatch_pending().unwrap();
        assert_eq!(seen_b.borrow().len(), 1);
        assert_eq!(tab_a.pending_notifications(), 0);
    }

    #[test]
    fn test_unchanged_value_is_not_a_change() {
        let tab_a = MemoryStore::new();
        let _tab_b = tab_a.open_context();
        tab_a.set_item("k", "1").unwrap();
        tab_a.set_item("k", "1").unwrap();
        assert_eq!(tab_a.pending_notifications(), 1);
    }

    #[test]
    fn test_remove_and_clear_notify() {
        let tab_a = MemoryStore::new();
        let tab_b = tab_a.open_context();
        let seen_b = recorder(&tab_b);

        tab_a.set_item("k", "1").unwrap();
        tab_a.remove_item("k");
        tab_a.remove_item("k");
        tab_a.set_item("j", "2").unwrap();
        tab_a.clear();
        tab_a.dispatch_pending().unwrap();

        let seen = seen_b.borrow();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[1].key.as_deref(), Some("k"));
        assert_eq!(seen[1].new_value, None);
        assert_eq!(seen[3].key, None);
        assert!(tab_b.is_empty());
    }

    #[test]
    fn test_quota_rejects_and_leaves_old_value() {
        let store = MemoryStore::with_quota(10);
        store.set_item("k", "12345").unwrap();
        let err = store.set_item("k", "1234567890").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { needed: 11, quota: Some(10), .. }));
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("12345"));
    }

    #[test]
    fn test_listener_failure_stops_dispatch() {
        let tab_a = MemoryStore::new();
        let tab_b = tab_a.open_context();
        tab_b
            .subscribe(Box::new(|_: &StorageChange| Err(BridgeError::Port("closed".to_string()))))
            .unwrap();

        tab_a.set_item("k", "1").unwrap();
        tab_a.set_item("k", "2").unwrap();
        assert!(matches!(tab_a.dispatch_pending(), Err(BridgeError::Port(_))));
        assert_eq!(tab_a.pending_notifications(), 1);
    }
}
