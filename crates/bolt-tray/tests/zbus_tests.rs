//! zbus transport tests. They need a session bus and return early without one.

use std::sync::{Arc, RwLock};

use bolt_core::action_channel;
use bolt_tray::{
    Bus, ITEM_INTERFACE, ITEM_PATH, ItemHandler, TrayModel, ZbusBus, load_contracts, service_name,
};

#[test]
fn test_call_right_after_name_request_is_answered() {
    let Ok(mut bus) = ZbusBus::connect(|_| {}) else {
        return;
    };
    let Ok(client) = zbus::blocking::Connection::session() else {
        return;
    };

    let (item, _menu) = load_contracts().unwrap();
    let (actions, _rx) = action_channel();
    let model = Arc::new(RwLock::new(TrayModel::default()));
    bus.register_object(ITEM_PATH, &item, Arc::new(ItemHandler::new(model, actions)))
        .unwrap();

    let name = service_name(std::process::id(), 7);
    bus.own_name(&name).unwrap();

    let reply = client
        .call_method(
            Some(name.as_str()),
            ITEM_PATH,
            Some("org.freedesktop.DBus.Introspectable"),
            "Introspect",
            &(),
        )
        .unwrap();
    let xml: String = reply.body().deserialize().unwrap();
    assert!(xml.contains(ITEM_INTERFACE));
}
