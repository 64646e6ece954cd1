//! Browser platform layer
//!
//! Handles the wasm side of the bridge:
//! - Storage (LocalStorage on web, `storage` events for other tabs)
//! - The application core's ports (`toJs` / `fromJs`)
//! - Deferred rethrow of handler faults via `setTimeout`

pub mod fault;
pub mod ports;
pub mod storage;

use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::persistence::JournalBridge;

pub use fault::TimeoutRethrow;
pub use ports::JsPorts;
pub use storage::LocalStorage;

/// Bridge as wired up in the browser
pub type BrowserBridge = JournalBridge<LocalStorage, JsPorts, TimeoutRethrow>;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // Level is narrowed per bridge in `attach`
    if console_log::init_with_level(log::Level::Trace).is_err() {
        log::warn!("Logger already initialized");
    }
}

/// Connect the application core's ports to LocalStorage with default settings
#[wasm_bindgen]
pub fn setup(ports: JsValue) -> Result<(), JsValue> {
    attach(&ports, &BridgeConfig::default())
}

/// Same as [`setup`], with a JSON-encoded [`BridgeConfig`]
#[wasm_bindgen(js_name = setupWithConfig)]
pub fn setup_with_config(ports: JsValue, config: &str) -> Result<(), JsValue> {
    let config: BridgeConfig =
        serde_json::from_str(config).map_err(|e| js_sys::Error::new(&e.to_string()))?;
    attach(&ports, &config)
}

fn attach(ports: &JsValue, config: &BridgeConfig) -> Result<(), JsValue> {
    log::set_max_level(config.level().to_level_filter());
    log::info!("Journal bridge attaching to ports {:?}", ports);

    let result = (|| -> Result<(), BridgeError> {
        let store = LocalStorage::open()?;
        let inbox = JsPorts::new(ports, config)?;
        let bridge: Rc<BrowserBridge> =
            Rc::new(JournalBridge::new(config, store, inbox, TimeoutRethrow));
        ports::subscribe_outbound(ports, config, bridge.clone())?;
        bridge.listen()
    })();

    result.map_err(|err| {
        log::error!("Journal bridge setup failed: {}", err);
        JsValue::from(js_sys::Error::new(&err.to_string()))
    })?;

    log::info!("Journal bridge ready (key {:?})", config.journal_key);
    Ok(())
}

/// Best-effort text for a thrown JS value
pub(crate) fn describe(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
