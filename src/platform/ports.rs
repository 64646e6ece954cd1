//! The application core's ports
//!
//! The core exposes an object of ports: an outbound one with
//! `subscribe(callback)` and an inbound one with `send(value)`. Values cross
//! the boundary as JSON, so the bridge only ever sees `serde_json::Value`.

use std::rc::Rc;

use js_sys::{Function, JSON, Reflect};
use serde_json::Value;
use wasm_bindgen::prelude::*;

use super::describe;
use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::message::Inbound;
use crate::persistence::{FaultSink, Inbox, JournalBridge};
use crate::store::Store;

fn port(ports: &JsValue, name: &str) -> Result<JsValue, BridgeError> {
    let port = Reflect::get(ports, &JsValue::from_str(name))
        .map_err(|e| BridgeError::Port(describe(&e)))?;
    if port.is_undefined() || port.is_null() {
        return Err(BridgeError::Port(format!("core has no port named {:?}", name)));
    }
    Ok(port)
}

fn method(port: &JsValue, name: &str) -> Result<Function, BridgeError> {
    Reflect::get(port, &JsValue::from_str(name))
        .map_err(|e| BridgeError::Port(describe(&e)))?
        .dyn_into::<Function>()
        .map_err(|_| BridgeError::Port(format!("port has no {}() method", name)))
}

/// Convert a JS value through `JSON.stringify`.
///
/// Values that stringify to nothing (`undefined`, functions) become `Null`;
/// values that cannot be stringified (cycles, BigInt) are encode faults.
pub fn to_json_value(value: &JsValue) -> Result<Value, BridgeError> {
    let text = JSON::stringify(value).map_err(|e| BridgeError::Encode(describe(&e)))?;
    match text.as_string() {
        Some(text) => serde_json::from_str(&text).map_err(|e| BridgeError::Encode(e.to_string())),
        None => Ok(Value::Null),
    }
}

/// Inbound side of the core's ports
pub struct JsPorts {
    port: JsValue,
    send: Function,
}

impl JsPorts {
    pub fn new(ports: &JsValue, config: &BridgeConfig) -> Result<Self, BridgeError> {
        let port = port(ports, &config.inbound_port)?;
        let send = method(&port, "send")?;
        Ok(Self { port, send })
    }
}

impl Inbox for JsPorts {
    fn deliver(&self, inbound: Inbound) -> Result<(), BridgeError> {
        let text = serde_json::to_string(&inbound)?;
        let value = JSON::parse(&text).map_err(|e| BridgeError::Port(describe(&e)))?;
        log::debug!("Sending journal to core ({} bytes)", text.len());
        self.send
            .call1(&self.port, &value)
            .map(|_| ())
            .map_err(|e| BridgeError::Port(describe(&e)))
    }
}

/// Feed every message on the core's outbound port into `bridge`
pub fn subscribe_outbound<S, I, F>(
    ports: &JsValue,
    config: &BridgeConfig,
    bridge: Rc<JournalBridge<S, I, F>>,
) -> Result<(), BridgeError>
where
    S: Store + 'static,
    I: Inbox + 'static,
    F: FaultSink + 'static,
{
    let port = port(ports, &config.outbound_port)?;
    let subscribe = method(&port, "subscribe")?;

    let closure = Closure::<dyn FnMut(_)>::new(move |message: JsValue| {
        match to_json_value(&message) {
            Ok(message) => bridge.handle_value(message),
            Err(err) => bridge.defer_fault(err),
        }
    });
    subscribe
        .call1(&port, closure.as_ref())
        .map_err(|e| BridgeError::Port(describe(&e)))?;
    closure.forget();
    Ok(())
}
