//! Rethrow deferred faults on the next browser task

use wasm_bindgen::prelude::*;

use crate::error::BridgeError;
use crate::persistence::FaultSink;

// Throwing from a timer callback leaves the core's dispatch untouched and
// still surfaces as an uncaught error in the console.
#[wasm_bindgen(inline_js = "
    export function rethrow_later(name, message) {
        setTimeout(() => {
            const err = new Error(message);
            err.name = name;
            throw err;
        }, 1);
    }
")]
extern "C" {
    fn rethrow_later(name: &str, message: &str);
}

/// Fault sink that rethrows each fault from a `setTimeout` callback
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeoutRethrow;

impl FaultSink for TimeoutRethrow {
    fn defer(&self, fault: BridgeError) {
        rethrow_later(&format!("Journal{}Error", fault.kind()), &fault.to_string());
    }
}
