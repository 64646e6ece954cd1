//! `window.localStorage` as a [`Store`]

use wasm_bindgen::prelude::*;
use web_sys::{DomException, Storage, StorageEvent, Window};

use super::describe;
use crate::error::{BridgeError, StoreError};
use crate::store::{ChangeListener, StorageChange, Store};

pub struct LocalStorage {
    window: Window,
    storage: Storage,
}

impl LocalStorage {
    /// LocalStorage of the current window
    pub fn open() -> Result<Self, BridgeError> {
        let window =
            web_sys::window().ok_or_else(|| BridgeError::Unavailable("no window".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| BridgeError::Unavailable(describe(&e)))?
            .ok_or_else(|| BridgeError::Unavailable("localStorage disabled".to_string()))?;
        Ok(Self { window, storage })
    }
}

impl Store for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage
            .get_item(key)
            .map_err(|e| StoreError::Platform(describe(&e)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage.set_item(key, value).map_err(|e| match e.dyn_ref::<DomException>() {
            Some(dom) => StoreError::from_write_failure(&dom.name(), &dom.message(), key, value),
            None => StoreError::Platform(describe(&e)),
        })
    }

    fn subscribe(&self, listener: ChangeListener) -> Result<(), StoreError> {
        // The browser raises `storage` only in the other tabs of this origin
        let closure = Closure::<dyn FnMut(_) -> Result<(), JsValue>>::new(
            move |event: StorageEvent| {
                let change = StorageChange {
                    key: event.key(),
                    old_value: event.old_value(),
                    new_value: event.new_value(),
                };
                listener(&change).map_err(|err| JsValue::from(js_sys::Error::new(&err.to_string())))
            },
        );
        self.window
            .add_event_listener_with_callback("storage", closure.as_ref().unchecked_ref())
            .map_err(|e| StoreError::Unavailable(describe(&e)))?;
        closure.forget();
        Ok(())
    }
}
