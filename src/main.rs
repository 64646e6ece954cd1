//! Journal Bridge entry point
//!
//! On the web the library's `setup` export is the entry point; natively this
//! binary walks two simulated tabs through a save, a load and a cross-tab
//! update.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), journal_bridge::BridgeError> {
    use std::rc::Rc;

    use journal_bridge::{
        BridgeConfig, DeferredFaults, JournalBridge, Mailbox, MemoryStore, Outbound,
    };
    use serde_json::json;

    env_logger::init();
    log::info!("Journal Bridge (native) starting...");

    let config = BridgeConfig::default();
    let tab_a = MemoryStore::new();
    let tab_b = tab_a.open_context();

    let inbox_a = Mailbox::new();
    let inbox_b = Mailbox::new();
    let faults = DeferredFaults::new();

    let bridge_a = Rc::new(JournalBridge::new(&config, tab_a.clone(), inbox_a.clone(), faults.clone()));
    let bridge_b = Rc::new(JournalBridge::new(&config, tab_b, inbox_b.clone(), faults.clone()));
    bridge_a.listen()?;
    bridge_b.listen()?;

    bridge_b.handle(Outbound::<()>::LoadJournal);
    println!("tab B loads: {:?}", inbox_b.take());

    bridge_a.handle(Outbound::SaveJournal(json!({
        "entries": [{ "date": "2026-10-18", "text": "First entry" }]
    })));
    println!("tab A echo:  {:?}", inbox_a.take());

    let delivered = tab_a.dispatch_pending()?;
    println!("tab B sync:  {:?} ({} notification(s))", inbox_b.take(), delivered);

    bridge_a.handle_value(json!({ "action": "exportJournal" }));
    faults.rethrow_next()?;

    log::info!("Done");
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is the library's `setup`, this is just to satisfy the compiler
}
